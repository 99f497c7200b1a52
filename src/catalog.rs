//! Component and appliance reference tables.
//!
//! The tables ship with built-in Nigerian market data and can be overridden
//! per section from a TOML file. Iteration order is the file/builtin order;
//! part selection breaks ties by picking the first match, so order matters.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Configuration error with field path and constraint description.
///
/// Shared by the catalog and audit-file loaders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config error: {field} - {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"panel[0].price"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub(crate) fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Solar panel electrical ratings and price.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PanelSpec {
    pub name: String,
    /// Unit price (₦).
    pub price: f64,
    /// Voltage at maximum power (V).
    pub vmp: f64,
    /// Short-circuit current (A).
    pub isc: f64,
    /// Open-circuit voltage (V).
    pub voc: f64,
}

/// Battery capacity, nominal voltage, and price.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatterySpec {
    pub name: String,
    /// Unit price (₦).
    pub price: f64,
    /// Nominal capacity (Ah).
    pub capacity_ah: f64,
    /// Nominal voltage (V).
    pub voltage: u32,
    /// Battery technology, e.g. `"Lead Acid"` or `"Li-ion"`.
    pub chemistry: String,
}

/// Inverter power rating, DC bus voltage, and price.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InverterSpec {
    pub name: String,
    /// Unit price (₦).
    pub price: f64,
    /// Continuous power rating (W).
    pub power_w: f64,
    /// DC bus voltage (V); must equal the system voltage to be eligible.
    pub voltage: u32,
    /// Inverter topology, e.g. `"Hybrid"` or `"Grid-Tie"`.
    pub topology: String,
}

/// Charge controller current rating, maximum PV voltage, and price.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerSpec {
    pub name: String,
    /// Unit price (₦).
    pub price: f64,
    /// Maximum charge current (A).
    pub current_a: f64,
    /// Maximum PV input voltage (V); compared against the array open-circuit voltage.
    pub voltage: f64,
    /// Controller topology, e.g. `"MPPT"`.
    pub topology: String,
}

/// Common appliance with its typical wattage and daily usage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppliancePreset {
    pub name: String,
    /// Typical unit wattage (W).
    pub watt: f64,
    /// Typical usage (hours per day).
    pub hours: f64,
}

/// Full component and appliance catalog.
///
/// Sections omitted from a TOML override fall back to the built-in tables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    #[serde(rename = "panel", default = "builtin_panels")]
    pub panels: Vec<PanelSpec>,
    #[serde(rename = "battery", default = "builtin_batteries")]
    pub batteries: Vec<BatterySpec>,
    #[serde(rename = "inverter", default = "builtin_inverters")]
    pub inverters: Vec<InverterSpec>,
    #[serde(rename = "controller", default = "builtin_controllers")]
    pub controllers: Vec<ControllerSpec>,
    #[serde(rename = "appliance", default = "builtin_appliances")]
    pub appliances: Vec<AppliancePreset>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Returns the built-in Nigerian market catalog.
    pub fn builtin() -> Self {
        Self {
            panels: builtin_panels(),
            batteries: builtin_batteries(),
            inverters: builtin_inverters(),
            controllers: builtin_controllers(),
            appliances: builtin_appliances(),
        }
    }

    /// Parses a catalog from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new(
                "catalog",
                format!("cannot read \"{}\": {e}", path.display()),
            )
        })?;
        let catalog = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "catalog loaded");
        Ok(catalog)
    }

    /// Parses a catalog from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all tables and returns a list of errors.
    ///
    /// Returns an empty vector if the catalog is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        check_duplicates("panel", self.panels.iter().map(|p| p.name.as_str()), &mut errors);
        check_duplicates(
            "battery",
            self.batteries.iter().map(|b| b.name.as_str()),
            &mut errors,
        );
        check_duplicates(
            "inverter",
            self.inverters.iter().map(|i| i.name.as_str()),
            &mut errors,
        );
        check_duplicates(
            "controller",
            self.controllers.iter().map(|c| c.name.as_str()),
            &mut errors,
        );
        check_duplicates(
            "appliance",
            self.appliances.iter().map(|a| a.name.as_str()),
            &mut errors,
        );

        for (i, p) in self.panels.iter().enumerate() {
            check_name(&p.name, format!("panel[{i}].name"), &mut errors);
            check_positive(p.price, format!("panel[{i}].price"), &mut errors);
            check_positive(p.vmp, format!("panel[{i}].vmp"), &mut errors);
            check_positive(p.isc, format!("panel[{i}].isc"), &mut errors);
            check_positive(p.voc, format!("panel[{i}].voc"), &mut errors);
        }
        for (i, b) in self.batteries.iter().enumerate() {
            check_name(&b.name, format!("battery[{i}].name"), &mut errors);
            check_positive(b.price, format!("battery[{i}].price"), &mut errors);
            check_positive(b.capacity_ah, format!("battery[{i}].capacity_ah"), &mut errors);
            if b.voltage == 0 {
                errors.push(ConfigError::new(
                    format!("battery[{i}].voltage"),
                    "must be > 0",
                ));
            }
        }
        for (i, inv) in self.inverters.iter().enumerate() {
            check_name(&inv.name, format!("inverter[{i}].name"), &mut errors);
            check_positive(inv.price, format!("inverter[{i}].price"), &mut errors);
            check_positive(inv.power_w, format!("inverter[{i}].power_w"), &mut errors);
            if inv.voltage == 0 {
                errors.push(ConfigError::new(
                    format!("inverter[{i}].voltage"),
                    "must be > 0",
                ));
            }
        }
        for (i, c) in self.controllers.iter().enumerate() {
            check_name(&c.name, format!("controller[{i}].name"), &mut errors);
            check_positive(c.price, format!("controller[{i}].price"), &mut errors);
            check_positive(c.current_a, format!("controller[{i}].current_a"), &mut errors);
            check_positive(c.voltage, format!("controller[{i}].voltage"), &mut errors);
        }
        for (i, a) in self.appliances.iter().enumerate() {
            check_name(&a.name, format!("appliance[{i}].name"), &mut errors);
            check_positive(a.watt, format!("appliance[{i}].watt"), &mut errors);
            if !(0.0..=24.0).contains(&a.hours) {
                errors.push(ConfigError::new(
                    format!("appliance[{i}].hours"),
                    "must be within [0, 24]",
                ));
            }
        }

        errors
    }

    /// Looks up a panel by exact name.
    pub fn panel(&self, name: &str) -> Option<&PanelSpec> {
        self.panels.iter().find(|p| p.name == name)
    }

    /// Looks up a battery by exact name.
    pub fn battery(&self, name: &str) -> Option<&BatterySpec> {
        self.batteries.iter().find(|b| b.name == name)
    }

    /// Looks up an inverter by exact name.
    pub fn inverter(&self, name: &str) -> Option<&InverterSpec> {
        self.inverters.iter().find(|i| i.name == name)
    }

    /// Looks up a charge controller by exact name.
    pub fn controller(&self, name: &str) -> Option<&ControllerSpec> {
        self.controllers.iter().find(|c| c.name == name)
    }

    /// Looks up an appliance preset by exact name.
    pub fn appliance(&self, name: &str) -> Option<&AppliancePreset> {
        self.appliances.iter().find(|a| a.name == name)
    }
}

fn check_positive(value: f64, field: String, errors: &mut Vec<ConfigError>) {
    if !value.is_finite() || value <= 0.0 {
        errors.push(ConfigError::new(field, "must be > 0"));
    }
}

fn check_name(name: &str, field: String, errors: &mut Vec<ConfigError>) {
    if name.trim().is_empty() {
        errors.push(ConfigError::new(field, "must not be empty"));
    }
}

fn check_duplicates<'a>(
    kind: &str,
    names: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ConfigError>,
) {
    let mut seen: Vec<&str> = Vec::new();
    for name in names {
        if seen.contains(&name) {
            errors.push(ConfigError::new(
                kind.to_string(),
                format!("duplicate name \"{name}\""),
            ));
        } else {
            seen.push(name);
        }
    }
}

fn builtin_panels() -> Vec<PanelSpec> {
    vec![
        PanelSpec {
            name: "Jinko Tiger 350W".into(),
            price: 85_000.0,
            vmp: 35.5,
            isc: 9.8,
            voc: 42.5,
        },
        PanelSpec {
            name: "Canadian Solar 400W".into(),
            price: 105_000.0,
            vmp: 37.2,
            isc: 10.9,
            voc: 45.5,
        },
        PanelSpec {
            name: "Trina Solar 450W".into(),
            price: 125_000.0,
            vmp: 39.8,
            isc: 11.3,
            voc: 48.2,
        },
    ]
}

fn builtin_batteries() -> Vec<BatterySpec> {
    vec![
        BatterySpec {
            name: "Trojan T-105 (225Ah)".into(),
            price: 65_000.0,
            capacity_ah: 225.0,
            voltage: 6,
            chemistry: "Lead Acid".into(),
        },
        BatterySpec {
            name: "Pylontech US2000 (200Ah)".into(),
            price: 280_000.0,
            capacity_ah: 200.0,
            voltage: 48,
            chemistry: "Li-ion".into(),
        },
        BatterySpec {
            name: "Vision 6FM200D (200Ah)".into(),
            price: 75_000.0,
            capacity_ah: 200.0,
            voltage: 6,
            chemistry: "Lead Acid".into(),
        },
    ]
}

fn builtin_inverters() -> Vec<InverterSpec> {
    vec![
        InverterSpec {
            name: "Growatt 3000W 24V".into(),
            price: 185_000.0,
            power_w: 3000.0,
            voltage: 24,
            topology: "Hybrid".into(),
        },
        InverterSpec {
            name: "Victron 5000W 48V".into(),
            price: 450_000.0,
            power_w: 5000.0,
            voltage: 48,
            topology: "Hybrid".into(),
        },
        InverterSpec {
            name: "SMA Sunny Boy 5000W".into(),
            price: 520_000.0,
            power_w: 5000.0,
            voltage: 48,
            topology: "Grid-Tie".into(),
        },
    ]
}

fn builtin_controllers() -> Vec<ControllerSpec> {
    vec![
        ControllerSpec {
            name: "EPever 40A MPPT".into(),
            price: 45_000.0,
            current_a: 40.0,
            voltage: 150.0,
            topology: "MPPT".into(),
        },
        ControllerSpec {
            name: "Victron 100/50 MPPT".into(),
            price: 85_000.0,
            current_a: 50.0,
            voltage: 100.0,
            topology: "MPPT".into(),
        },
        ControllerSpec {
            name: "EPever 60A MPPT".into(),
            price: 65_000.0,
            current_a: 60.0,
            voltage: 150.0,
            topology: "MPPT".into(),
        },
    ]
}

fn builtin_appliances() -> Vec<AppliancePreset> {
    fn preset(name: &str, watt: f64, hours: f64) -> AppliancePreset {
        AppliancePreset {
            name: name.into(),
            watt,
            hours,
        }
    }
    vec![
        preset("Ceiling Fan", 75.0, 8.0),
        preset("Standing Fan", 55.0, 6.0),
        preset("TV (32-inch LED)", 50.0, 5.0),
        preset("TV (42-inch LED)", 80.0, 5.0),
        preset("Refrigerator (Medium)", 150.0, 8.0),
        preset("Deep Freezer", 200.0, 10.0),
        preset("Air Conditioner (1HP)", 750.0, 6.0),
        preset("Air Conditioner (1.5HP)", 1100.0, 6.0),
        preset("Water Pump (1HP)", 750.0, 2.0),
        preset("Lighting (LED Bulb)", 10.0, 8.0),
        preset("Computer Desktop", 200.0, 4.0),
        preset("Laptop", 65.0, 5.0),
        preset("Decoder", 25.0, 6.0),
        preset("Home Theatre", 100.0, 3.0),
        preset("Washing Machine", 500.0, 2.0),
        preset("Electric Iron", 1000.0, 1.0),
        preset("Microwave Oven", 1000.0, 0.5),
        preset("Electric Kettle", 1500.0, 0.5),
    ]
}
