//! System sizing: closed-form battery, solar, controller, and inverter
//! formulas plus catalog part selection.
//!
//! Every function here is pure; identical inputs produce identical outputs.
//! Division guards live in the input validation (`DesignParams::validate`),
//! not in the formulas.

use std::fmt;

use serde::Deserialize;
use tracing::warn;

use crate::catalog::{BatterySpec, Catalog, ConfigError, ControllerSpec, InverterSpec, PanelSpec};

/// Fixed 20% loss margin applied to the solar array requirement.
pub const SOLAR_LOSS_MARGIN: f64 = 1.2;
/// 25% safety margin on the charge controller current.
pub const CONTROLLER_MARGIN: f64 = 1.25;
/// 30% safety margin on the inverter rating.
pub const INVERTER_MARGIN: f64 = 1.3;
/// Smallest inverter worth quoting (W).
pub const INVERTER_FLOOR_W: f64 = 1000.0;

/// Supported DC bus voltages (V).
pub const SYSTEM_VOLTAGES: &[u32] = &[12, 24, 48];

/// User-adjustable design parameters for one audit session.
///
/// Defaults and allowed ranges mirror the sales-form sliders. All divisor
/// parameters are constrained strictly positive by [`DesignParams::validate`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesignParams {
    /// Required backup time during outages (hours, 1-24).
    pub backup_hours: f64,
    /// DC bus voltage (V, one of 12/24/48).
    pub system_voltage: u32,
    /// Usable depth of discharge (%, 50-100).
    pub dod_pct: f64,
    /// Temperature derating factor (%, 80-100).
    pub derating_pct: f64,
    /// Average daily peak sun hours (3-8).
    pub sun_hours: f64,
    /// Overall system efficiency (%, 50-95).
    pub efficiency_pct: f64,
    /// Grid electricity rate (₦/kWh, 25-100).
    pub grid_rate_per_kwh: f64,
    /// Expected system lifespan (years, 5-25).
    pub lifespan_years: f64,
}

impl Default for DesignParams {
    fn default() -> Self {
        Self {
            backup_hours: 5.0,
            system_voltage: 24,
            dod_pct: 80.0,
            derating_pct: 90.0,
            sun_hours: 5.0,
            efficiency_pct: 75.0,
            grid_rate_per_kwh: 50.0,
            lifespan_years: 10.0,
        }
    }
}

impl DesignParams {
    /// Validates all parameters and returns a list of errors.
    ///
    /// Returns an empty vector if the parameters are valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        check_range(self.backup_hours, 1.0, 24.0, "design.backup_hours", &mut errors);
        if !SYSTEM_VOLTAGES.contains(&self.system_voltage) {
            errors.push(ConfigError::new(
                "design.system_voltage",
                format!("must be one of 12, 24, 48, got {}", self.system_voltage),
            ));
        }
        check_range(self.dod_pct, 50.0, 100.0, "design.dod_pct", &mut errors);
        check_range(self.derating_pct, 80.0, 100.0, "design.derating_pct", &mut errors);
        check_range(self.sun_hours, 3.0, 8.0, "design.sun_hours", &mut errors);
        check_range(self.efficiency_pct, 50.0, 95.0, "design.efficiency_pct", &mut errors);
        check_range(
            self.grid_rate_per_kwh,
            25.0,
            100.0,
            "design.grid_rate_per_kwh",
            &mut errors,
        );
        check_range(self.lifespan_years, 5.0, 25.0, "design.lifespan_years", &mut errors);
        errors
    }

    fn dod_fraction(&self) -> f64 {
        self.dod_pct / 100.0
    }

    fn derating_fraction(&self) -> f64 {
        self.derating_pct / 100.0
    }

    fn efficiency_fraction(&self) -> f64 {
        self.efficiency_pct / 100.0
    }
}

fn check_range(value: f64, min: f64, max: f64, field: &str, errors: &mut Vec<ConfigError>) {
    if !(min..=max).contains(&value) {
        errors.push(ConfigError::new(
            field,
            format!("must be within [{min}, {max}], got {value}"),
        ));
    }
}

/// Required battery bank capacity (Ah) to carry the daily load through the
/// backup window at the configured voltage, depth of discharge, and derating.
pub fn battery_capacity_ah(total_energy_wh: f64, params: &DesignParams) -> f64 {
    total_energy_wh * params.backup_hours
        / (f64::from(params.system_voltage) * params.dod_fraction() * params.derating_fraction())
}

/// Number of units of the chosen battery (fractional; rounded up only at
/// costing time so partial-unit arithmetic stays visible).
pub fn battery_count(capacity_ah: f64, battery: &BatterySpec) -> f64 {
    capacity_ah / battery.capacity_ah
}

/// Required solar array capacity (W) including the fixed loss margin.
pub fn required_solar_w(total_energy_wh: f64, params: &DesignParams) -> f64 {
    total_energy_wh * SOLAR_LOSS_MARGIN / (params.sun_hours * params.efficiency_fraction())
}

/// Number of units of the chosen panel (fractional).
///
/// Preserves the legacy formula, which folds a voltage ratio into the
/// capacity count; kept verbatim for parity with existing quotations.
pub fn panel_count(required_solar_w: f64, panel: &PanelSpec, system_voltage: u32) -> f64 {
    required_solar_w / panel.vmp * (f64::from(system_voltage) / panel.vmp)
}

/// Required charge controller current (A) including the safety margin.
pub fn controller_current_a(required_solar_w: f64, system_voltage: u32) -> f64 {
    required_solar_w * CONTROLLER_MARGIN / f64::from(system_voltage)
}

/// Recommended inverter rating (W): peak demand plus margin, floored at 1 kW.
pub fn inverter_size_w(total_power_w: f64) -> f64 {
    (total_power_w * INVERTER_MARGIN).max(INVERTER_FLOOR_W)
}

/// Outcome of a catalog part selection.
///
/// Selection failure is a reportable sentinel, not an error; downstream
/// costing treats a missing part as zero cost.
#[derive(Debug, Clone, PartialEq)]
pub enum PartPick<T> {
    /// First catalog part meeting both the rating and the voltage constraint.
    Rated(T),
    /// Fallback: first part matching the voltage constraint alone.
    VoltageOnly(T),
    /// No catalog part satisfies even the voltage constraint.
    NotFound,
}

impl<T> PartPick<T> {
    /// The selected part, if any.
    pub fn part(&self) -> Option<&T> {
        match self {
            PartPick::Rated(part) | PartPick::VoltageOnly(part) => Some(part),
            PartPick::NotFound => None,
        }
    }

    /// True when the rating constraint had to be dropped.
    pub fn is_fallback(&self) -> bool {
        matches!(self, PartPick::VoltageOnly(_))
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, PartPick::NotFound)
    }
}

/// Selects the inverter: first catalog entry whose rating meets the required
/// size on the matching DC bus, falling back to the bus voltage alone.
pub fn select_inverter(
    catalog: &Catalog,
    required_w: f64,
    system_voltage: u32,
) -> PartPick<InverterSpec> {
    if let Some(inv) = catalog
        .inverters
        .iter()
        .find(|i| i.power_w >= required_w && i.voltage == system_voltage)
    {
        return PartPick::Rated(inv.clone());
    }
    if let Some(inv) = catalog
        .inverters
        .iter()
        .find(|i| i.voltage == system_voltage)
    {
        warn!(
            required_w,
            system_voltage,
            inverter = %inv.name,
            "no inverter meets the required rating; falling back to voltage match"
        );
        return PartPick::VoltageOnly(inv.clone());
    }
    warn!(required_w, system_voltage, "no suitable inverter found");
    PartPick::NotFound
}

/// Selects the charge controller: first catalog entry whose current rating
/// covers the requirement and whose PV voltage rating covers the array
/// open-circuit voltage, falling back to the voltage constraint alone.
pub fn select_controller(
    catalog: &Catalog,
    required_a: f64,
    array_voc: f64,
) -> PartPick<ControllerSpec> {
    if let Some(ctl) = catalog
        .controllers
        .iter()
        .find(|c| c.current_a >= required_a && c.voltage >= array_voc)
    {
        return PartPick::Rated(ctl.clone());
    }
    if let Some(ctl) = catalog.controllers.iter().find(|c| c.voltage >= array_voc) {
        warn!(
            required_a,
            array_voc,
            controller = %ctl.name,
            "no controller meets the required current; falling back to voltage match"
        );
        return PartPick::VoltageOnly(ctl.clone());
    }
    warn!(required_a, array_voc, "no suitable controller found");
    PartPick::NotFound
}

/// Complete sizing output for one audit: the six derived figures plus the
/// chosen battery/panel models and the auto-selected inverter/controller.
#[derive(Debug, Clone, PartialEq)]
pub struct SizingResult {
    /// Required battery bank capacity (Ah).
    pub battery_capacity_ah: f64,
    /// Units of the chosen battery (fractional).
    pub battery_count: f64,
    /// Required solar array capacity (W).
    pub required_solar_w: f64,
    /// Units of the chosen panel (fractional).
    pub panel_count: f64,
    /// Required charge controller current (A).
    pub controller_current_a: f64,
    /// Recommended inverter rating (W).
    pub inverter_size_w: f64,
    /// User-chosen battery model.
    pub battery: BatterySpec,
    /// User-chosen panel model.
    pub panel: PanelSpec,
    /// Auto-selected inverter.
    pub inverter: PartPick<InverterSpec>,
    /// Auto-selected charge controller.
    pub controller: PartPick<ControllerSpec>,
}

impl SizingResult {
    /// Computes the full sizing for the aggregated load.
    ///
    /// Pure function of its inputs; recomputed in full whenever any upstream
    /// value changes.
    pub fn compute(
        total_energy_wh: f64,
        total_power_w: f64,
        params: &DesignParams,
        battery: &BatterySpec,
        panel: &PanelSpec,
        catalog: &Catalog,
    ) -> Self {
        let capacity_ah = battery_capacity_ah(total_energy_wh, params);
        let batteries = battery_count(capacity_ah, battery);
        let solar_w = required_solar_w(total_energy_wh, params);
        let panels = panel_count(solar_w, panel, params.system_voltage);
        let controller_a = controller_current_a(solar_w, params.system_voltage);
        let inverter_w = inverter_size_w(total_power_w);

        let inverter = select_inverter(catalog, inverter_w, params.system_voltage);
        let array_voc = panel.voc * panels.ceil();
        let controller = select_controller(catalog, controller_a, array_voc);

        Self {
            battery_capacity_ah: capacity_ah,
            battery_count: batteries,
            required_solar_w: solar_w,
            panel_count: panels,
            controller_current_a: controller_a,
            inverter_size_w: inverter_w,
            battery: battery.clone(),
            panel: panel.clone(),
            inverter,
            controller,
        }
    }

    /// Name of the selected inverter, or the sentinel text.
    pub fn inverter_name(&self) -> &str {
        self.inverter
            .part()
            .map_or("No suitable inverter found", |i| i.name.as_str())
    }

    /// Name of the selected controller, or the sentinel text.
    pub fn controller_name(&self) -> &str {
        self.controller
            .part()
            .map_or("No suitable controller found", |c| c.name.as_str())
    }
}

impl fmt::Display for SizingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- System Sizing ---")?;
        writeln!(
            f,
            "Battery capacity:      {:.0} Ah ({:.1} x {})",
            self.battery_capacity_ah, self.battery_count, self.battery.name
        )?;
        writeln!(
            f,
            "Solar array:           {:.0} W ({:.1} x {})",
            self.required_solar_w, self.panel_count, self.panel.name
        )?;
        writeln!(
            f,
            "Charge controller:     {:.0} A ({})",
            self.controller_current_a,
            self.controller_name()
        )?;
        write!(
            f,
            "Inverter:              {:.0} W ({})",
            self.inverter_size_w,
            self.inverter_name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> DesignParams {
        DesignParams::default()
    }

    #[test]
    fn default_params_valid() {
        let errors = params().validate();
        assert!(errors.is_empty(), "defaults should be valid: {errors:?}");
    }

    #[test]
    fn validate_catches_bad_voltage() {
        let p = DesignParams {
            system_voltage: 36,
            ..params()
        };
        let errors = p.validate();
        assert!(errors.iter().any(|e| e.field == "design.system_voltage"));
    }

    #[test]
    fn validate_catches_out_of_range_dod() {
        let p = DesignParams {
            dod_pct: 40.0,
            ..params()
        };
        let errors = p.validate();
        assert!(errors.iter().any(|e| e.field == "design.dod_pct"));
    }

    #[test]
    fn battery_capacity_reference_case() {
        // 1000 Wh, 5 h backup, 24 V, 80% DoD, 90% derating
        // => 1000*5 / (24*0.8*0.9) = 289.35 Ah
        let p = params();
        let ah = battery_capacity_ah(1000.0, &p);
        assert!((ah - 289.35).abs() < 0.01, "got {ah}");
    }

    #[test]
    fn required_solar_reference_case() {
        // 1000 Wh, 5 sun hours, 75% efficiency => 1000*1.2 / (5*0.75) = 320 W
        let p = params();
        let w = required_solar_w(1000.0, &p);
        assert!((w - 320.0).abs() < 0.01, "got {w}");
    }

    #[test]
    fn backup_hours_monotonicity() {
        let base = params();
        let longer = DesignParams {
            backup_hours: 6.0,
            ..base.clone()
        };
        assert!(battery_capacity_ah(1000.0, &longer) > battery_capacity_ah(1000.0, &base));
    }

    #[test]
    fn minimum_dod_and_derating_do_not_divide_by_zero() {
        let p = DesignParams {
            dod_pct: 50.0,
            derating_pct: 80.0,
            ..params()
        };
        assert!(p.validate().is_empty());
        assert!(battery_capacity_ah(1000.0, &p).is_finite());
    }

    #[test]
    fn inverter_floor_applies_to_small_loads() {
        assert_eq!(inverter_size_w(100.0), 1000.0);
        // 30% margin above the floor
        assert!((inverter_size_w(2000.0) - 2600.0).abs() < 1e-9);
    }

    #[test]
    fn controller_current_margin() {
        // 320 W at 24 V with 25% margin => 16.67 A
        let a = controller_current_a(320.0, 24);
        assert!((a - 16.666_666).abs() < 1e-3);
    }

    #[test]
    fn inverter_selection_prefers_first_rated_match() {
        let catalog = Catalog::builtin();
        let pick = select_inverter(&catalog, 2600.0, 24);
        assert_eq!(
            pick.part().map(|i| i.name.as_str()),
            Some("Growatt 3000W 24V")
        );
        assert!(!pick.is_fallback());
    }

    #[test]
    fn inverter_selection_falls_back_to_voltage_match() {
        // 24 V bus but the only 24 V inverter is too small
        let catalog = Catalog::builtin();
        let pick = select_inverter(&catalog, 4000.0, 24);
        assert!(pick.is_fallback());
        assert_eq!(
            pick.part().map(|i| i.name.as_str()),
            Some("Growatt 3000W 24V")
        );
    }

    #[test]
    fn inverter_selection_reports_not_found() {
        // No 12 V inverter exists in the builtin catalog
        let catalog = Catalog::builtin();
        let pick = select_inverter(&catalog, 1000.0, 12);
        assert_eq!(pick, PartPick::NotFound);
        assert!(pick.part().is_none());
    }

    #[test]
    fn controller_selection_first_match_wins() {
        let catalog = Catalog::builtin();
        // 45 A required, array Voc 120 V: EPever 40A fails on current,
        // Victron 100/50 fails on voltage, EPever 60A matches both.
        let pick = select_controller(&catalog, 45.0, 120.0);
        assert_eq!(
            pick.part().map(|c| c.name.as_str()),
            Some("EPever 60A MPPT")
        );
        assert!(!pick.is_fallback());
    }

    #[test]
    fn controller_selection_falls_back_on_current() {
        let catalog = Catalog::builtin();
        // 80 A exceeds every controller; voltage-only fallback picks the first
        // entry whose rating covers the array Voc.
        let pick = select_controller(&catalog, 80.0, 120.0);
        assert!(pick.is_fallback());
        assert_eq!(
            pick.part().map(|c| c.name.as_str()),
            Some("EPever 40A MPPT")
        );
    }

    #[test]
    fn controller_selection_not_found_for_tall_arrays() {
        let catalog = Catalog::builtin();
        let pick = select_controller(&catalog, 10.0, 500.0);
        assert_eq!(pick, PartPick::NotFound);
    }

    #[test]
    fn sizing_is_idempotent() {
        let catalog = Catalog::builtin();
        let p = params();
        let battery = &catalog.batteries[0];
        let panel = &catalog.panels[0];
        let a = SizingResult::compute(4000.0, 800.0, &p, battery, panel, &catalog);
        let b = SizingResult::compute(4000.0, 800.0, &p, battery, panel, &catalog);
        assert_eq!(a, b);
    }

    #[test]
    fn legacy_panel_count_formula_preserved() {
        let catalog = Catalog::builtin();
        let panel = &catalog.panels[0]; // vmp 35.5
        // 320 / 35.5 * (24 / 35.5)
        let n = panel_count(320.0, panel, 24);
        let expected = 320.0 / 35.5 * (24.0 / 35.5);
        assert!((n - expected).abs() < 1e-9);
    }
}
