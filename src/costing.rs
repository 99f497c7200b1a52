//! Cost breakdown and financial metrics for a sized system.

use std::fmt;

use crate::sizing::{DesignParams, SizingResult};

/// Minimum installation charge (₦).
pub const INSTALLATION_FLOOR_NGN: f64 = 150_000.0;
/// Installation charge as a fraction of equipment cost.
pub const INSTALLATION_RATE: f64 = 0.20;
/// Minimum wiring and accessories charge (₦).
pub const WIRING_FLOOR_NGN: f64 = 50_000.0;
/// Wiring charge as a fraction of equipment cost.
pub const WIRING_RATE: f64 = 0.10;

/// Itemized system cost plus the derived financial metrics.
///
/// Pure function of the sizing result and design parameters. Fractional part
/// counts are rounded up here, at the point of purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct CostBreakdown {
    /// Battery bank cost (₦).
    pub battery_cost: f64,
    /// Solar array cost (₦).
    pub solar_cost: f64,
    /// Inverter cost (₦); 0 when no suitable part was found.
    pub inverter_cost: f64,
    /// Charge controller cost (₦); 0 when no suitable part was found.
    pub controller_cost: f64,
    /// Installation charge (₦).
    pub installation_cost: f64,
    /// Wiring and accessories charge (₦).
    pub wiring_cost: f64,
    /// Total system cost (₦).
    pub total_cost: f64,
    /// Monthly energy consumption (kWh).
    pub monthly_energy_kwh: f64,
    /// Monthly grid-bill savings (₦).
    pub monthly_savings: f64,
    /// Annual savings (₦).
    pub annual_savings: f64,
    /// Savings over the system lifespan (₦).
    pub lifetime_savings: f64,
    /// Years for cumulative savings to equal the system cost; 0 when there
    /// are no savings.
    pub payback_years: f64,
    /// Return on investment over the lifespan (%); 0 for a zero-cost system.
    pub roi_pct: f64,
}

impl CostBreakdown {
    /// Prices the sized system and computes the financial metrics.
    pub fn compute(sizing: &SizingResult, params: &DesignParams, total_energy_wh: f64) -> Self {
        let battery_cost = sizing.battery_count.ceil() * sizing.battery.price;
        let solar_cost = sizing.panel_count.ceil() * sizing.panel.price;
        let inverter_cost = sizing.inverter.part().map_or(0.0, |i| i.price);
        let controller_cost = sizing.controller.part().map_or(0.0, |c| c.price);

        let equipment = battery_cost + solar_cost + inverter_cost + controller_cost;
        let installation_cost = (equipment * INSTALLATION_RATE).max(INSTALLATION_FLOOR_NGN);
        let wiring_cost = (equipment * WIRING_RATE).max(WIRING_FLOOR_NGN);
        let total_cost = equipment + installation_cost + wiring_cost;

        let monthly_energy_kwh = total_energy_wh / 1000.0;
        let monthly_savings = monthly_energy_kwh * 30.0 * params.grid_rate_per_kwh;
        let annual_savings = monthly_savings * 12.0;
        let lifetime_savings = annual_savings * params.lifespan_years;

        // The only guarded divisions in the pipeline.
        let payback_years = if annual_savings > 0.0 {
            total_cost / annual_savings
        } else {
            0.0
        };
        let roi_pct = if total_cost > 0.0 {
            (lifetime_savings - total_cost) / total_cost * 100.0
        } else {
            0.0
        };

        Self {
            battery_cost,
            solar_cost,
            inverter_cost,
            controller_cost,
            installation_cost,
            wiring_cost,
            total_cost,
            monthly_energy_kwh,
            monthly_savings,
            annual_savings,
            lifetime_savings,
            payback_years,
            roi_pct,
        }
    }
}

impl fmt::Display for CostBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Cost Breakdown ---")?;
        writeln!(f, "Battery bank:          {}", format_naira(self.battery_cost))?;
        writeln!(f, "Solar array:           {}", format_naira(self.solar_cost))?;
        writeln!(f, "Inverter:              {}", format_naira(self.inverter_cost))?;
        writeln!(f, "Charge controller:     {}", format_naira(self.controller_cost))?;
        writeln!(
            f,
            "Installation:          {}",
            format_naira(self.installation_cost)
        )?;
        writeln!(f, "Wiring & accessories:  {}", format_naira(self.wiring_cost))?;
        writeln!(f, "Total system cost:     {}", format_naira(self.total_cost))?;
        writeln!(
            f,
            "Monthly consumption:   {:.1} kWh",
            self.monthly_energy_kwh
        )?;
        writeln!(
            f,
            "Monthly savings:       {}",
            format_naira(self.monthly_savings)
        )?;
        writeln!(
            f,
            "Annual savings:        {}",
            format_naira(self.annual_savings)
        )?;
        writeln!(f, "Payback period:        {:.1} years", self.payback_years)?;
        write!(f, "ROI:                   {:.0}%", self.roi_pct)
    }
}

/// Formats an amount as naira with thousands separators, e.g. `₦1,085,000`.
pub fn format_naira(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("₦{sign}{grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::sizing::SizingResult;

    fn sized(total_energy_wh: f64, total_power_w: f64, params: &DesignParams) -> SizingResult {
        let catalog = Catalog::builtin();
        SizingResult::compute(
            total_energy_wh,
            total_power_w,
            params,
            &catalog.batteries[0],
            &catalog.panels[0],
            &catalog,
        )
    }

    #[test]
    fn component_costs_round_up_fractional_units() {
        let params = DesignParams::default();
        let sizing = sized(1000.0, 200.0, &params);
        let costs = CostBreakdown::compute(&sizing, &params, 1000.0);

        // 289.35 Ah / 225 Ah = 1.29 batteries -> 2 units at ₦65,000
        assert_eq!(costs.battery_cost, 2.0 * 65_000.0);
        let expected_panels = sizing.panel_count.ceil();
        assert_eq!(costs.solar_cost, expected_panels * 85_000.0);
    }

    #[test]
    fn installation_and_wiring_floors_apply() {
        let params = DesignParams::default();
        let sizing = sized(1000.0, 200.0, &params);
        let costs = CostBreakdown::compute(&sizing, &params, 1000.0);

        let equipment =
            costs.battery_cost + costs.solar_cost + costs.inverter_cost + costs.controller_cost;
        assert_eq!(
            costs.installation_cost,
            (equipment * INSTALLATION_RATE).max(INSTALLATION_FLOOR_NGN)
        );
        assert_eq!(
            costs.wiring_cost,
            (equipment * WIRING_RATE).max(WIRING_FLOOR_NGN)
        );
        assert_eq!(
            costs.total_cost,
            equipment + costs.installation_cost + costs.wiring_cost
        );
    }

    #[test]
    fn small_system_hits_the_floors() {
        // Tiny load: 20% / 10% of equipment falls below the fixed floors.
        let params = DesignParams::default();
        let sizing = sized(100.0, 50.0, &params);
        let costs = CostBreakdown::compute(&sizing, &params, 100.0);
        assert_eq!(costs.installation_cost, INSTALLATION_FLOOR_NGN);
        assert_eq!(costs.wiring_cost, WIRING_FLOOR_NGN);
    }

    #[test]
    fn savings_chain() {
        let params = DesignParams::default(); // ₦50/kWh, 10 years
        let sizing = sized(1000.0, 200.0, &params);
        let costs = CostBreakdown::compute(&sizing, &params, 1000.0);
        assert_eq!(costs.monthly_energy_kwh, 1.0);
        assert_eq!(costs.monthly_savings, 1500.0);
        assert_eq!(costs.annual_savings, 18_000.0);
        assert_eq!(costs.lifetime_savings, 180_000.0);
        assert!((costs.payback_years - costs.total_cost / 18_000.0).abs() < 1e-9);
    }

    #[test]
    fn zero_savings_reports_zero_payback() {
        let params = DesignParams::default();
        let sizing = sized(1000.0, 200.0, &params);
        // Zero energy means zero savings; payback must be 0, not a division error.
        let costs = CostBreakdown::compute(&sizing, &params, 0.0);
        assert_eq!(costs.annual_savings, 0.0);
        assert_eq!(costs.payback_years, 0.0);
        assert!(costs.roi_pct < 0.0); // all cost, no savings
    }

    #[test]
    fn missing_inverter_costs_nothing_but_totals_still_compute() {
        // 12 V system: builtin catalog has no 12 V inverter.
        let params = DesignParams {
            system_voltage: 12,
            ..DesignParams::default()
        };
        let sizing = sized(1000.0, 200.0, &params);
        assert!(!sizing.inverter.is_found());
        let costs = CostBreakdown::compute(&sizing, &params, 1000.0);
        assert_eq!(costs.inverter_cost, 0.0);
        assert!(costs.total_cost > 0.0);
        assert!(costs.total_cost.is_finite());
    }

    #[test]
    fn naira_formatting_groups_thousands() {
        assert_eq!(format_naira(0.0), "₦0");
        assert_eq!(format_naira(999.0), "₦999");
        assert_eq!(format_naira(65_000.0), "₦65,000");
        assert_eq!(format_naira(1_085_000.0), "₦1,085,000");
        assert_eq!(format_naira(-50_000.0), "₦-50,000");
        assert_eq!(format_naira(1_499.6), "₦1,500");
    }

    #[test]
    fn naira_formatting_survives_extreme_amounts() {
        // Beyond i64 range; must not saturate
        assert_eq!(format_naira(1e19), "₦10,000,000,000,000,000,000");
        assert_eq!(format_naira(-0.4), "₦0");
    }
}
