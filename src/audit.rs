//! Declarative audit file: the session inputs normally collected by the
//! sales front-end, expressed as TOML with named presets.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::catalog::{Catalog, ConfigError};
use crate::session::{ClientInfo, Session};
use crate::sizing::DesignParams;

/// Chosen component models; `None` keeps the catalog default (first entry).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComponentChoice {
    pub battery: Option<String>,
    pub panel: Option<String>,
}

/// One appliance line: either a catalog `preset` (with optional overrides)
/// or a fully manual entry with `name`, `watt`, and `hours`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApplianceItem {
    pub preset: Option<String>,
    pub name: Option<String>,
    pub watt: Option<f64>,
    pub quantity: u32,
    pub hours: Option<f64>,
}

impl Default for ApplianceItem {
    fn default() -> Self {
        Self {
            preset: None,
            name: None,
            watt: None,
            quantity: 1,
            hours: None,
        }
    }
}

/// Top-level audit configuration parsed from TOML.
///
/// All sections have defaults; load from TOML with
/// [`AuditConfig::from_toml_file`] or use a named preset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Client metadata.
    pub client: ClientInfo,
    /// Design parameters.
    pub design: DesignParams,
    /// Chosen battery/panel models.
    pub components: ComponentChoice,
    /// Audited appliances.
    #[serde(rename = "appliance")]
    pub appliances: Vec<ApplianceItem>,
}

impl AuditConfig {
    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "small-home"];

    /// Demo preset: a typical urban household audit.
    pub fn demo() -> Self {
        Self {
            client: ClientInfo {
                name: "Demo Client".into(),
                address: "Plot 14 Gwarinpa Estate".into(),
                phone: "08012345678".into(),
                email: String::new(),
                location: "Abuja".into(),
            },
            design: DesignParams::default(),
            components: ComponentChoice::default(),
            appliances: vec![
                preset_item("Ceiling Fan", 2),
                preset_item("TV (32-inch LED)", 1),
                preset_item("Refrigerator (Medium)", 1),
                preset_item("Lighting (LED Bulb)", 6),
                preset_item("Laptop", 1),
            ],
        }
    }

    /// Small-home preset: lighting and fans only.
    pub fn small_home() -> Self {
        Self {
            client: ClientInfo {
                name: String::new(),
                ..ClientInfo::default()
            },
            design: DesignParams {
                backup_hours: 4.0,
                system_voltage: 12,
                ..DesignParams::default()
            },
            components: ComponentChoice::default(),
            appliances: vec![
                preset_item("Lighting (LED Bulb)", 4),
                preset_item("Standing Fan", 1),
                preset_item("TV (32-inch LED)", 1),
            ],
        }
    }

    /// Loads an audit from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            "small-home" => Ok(Self::small_home()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses an audit from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("audit", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        let audit = Self::from_toml_str(&content)?;
        info!(path = %path.display(), appliances = audit.appliances.len(), "audit loaded");
        Ok(audit)
    }

    /// Parses an audit from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates the design parameters and appliance lines.
    ///
    /// Returns an empty vector if the audit is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = self.design.validate();

        for (i, item) in self.appliances.iter().enumerate() {
            match (&item.preset, &item.name) {
                (Some(_), Some(_)) => errors.push(ConfigError::new(
                    format!("appliance[{i}]"),
                    "preset and name are mutually exclusive",
                )),
                (None, None) => errors.push(ConfigError::new(
                    format!("appliance[{i}]"),
                    "either preset or name is required",
                )),
                (None, Some(_)) => {
                    if item.watt.is_none() {
                        errors.push(ConfigError::new(
                            format!("appliance[{i}].watt"),
                            "required for a manual entry",
                        ));
                    }
                    if item.hours.is_none() {
                        errors.push(ConfigError::new(
                            format!("appliance[{i}].hours"),
                            "required for a manual entry",
                        ));
                    }
                }
                (Some(_), None) => {}
            }
            if item.quantity == 0 {
                errors.push(ConfigError::new(
                    format!("appliance[{i}].quantity"),
                    "must be at least 1",
                ));
            }
            if let Some(watt) = item.watt {
                if !watt.is_finite() || watt <= 0.0 {
                    errors.push(ConfigError::new(
                        format!("appliance[{i}].watt"),
                        "must be > 0",
                    ));
                }
            }
            if let Some(hours) = item.hours {
                if !(0.0..=24.0).contains(&hours) {
                    errors.push(ConfigError::new(
                        format!("appliance[{i}].hours"),
                        "must be within [0, 24]",
                    ));
                }
            }
        }

        errors
    }

    /// Builds a ready session: resolves presets against the catalog, applies
    /// component choices, and adds every appliance line.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the offending field when a model is
    /// unknown or an entry fails validation.
    pub fn build_session<'a>(&self, catalog: &'a Catalog) -> Result<Session<'a>, ConfigError> {
        let mut session = Session::new(catalog);
        session.client = self.client.clone();
        session.params = self.design.clone();

        if let Some(battery) = &self.components.battery {
            session
                .set_battery_model(battery)
                .map_err(|e| ConfigError::new("components.battery", e.to_string()))?;
        }
        if let Some(panel) = &self.components.panel {
            session
                .set_panel_model(panel)
                .map_err(|e| ConfigError::new("components.panel", e.to_string()))?;
        }

        for (i, item) in self.appliances.iter().enumerate() {
            let field = format!("appliance[{i}]");
            match (&item.preset, &item.name) {
                (Some(preset_name), None) => {
                    let preset = catalog.appliance(preset_name).ok_or_else(|| {
                        ConfigError::new(
                            format!("{field}.preset"),
                            format!("unknown appliance \"{preset_name}\""),
                        )
                    })?;
                    // Overrides fall back to the catalog defaults.
                    let watt = item.watt.unwrap_or(preset.watt);
                    let hours = item.hours.unwrap_or(preset.hours);
                    let name = preset.name.clone();
                    session
                        .add_load(&name, watt, item.quantity, hours)
                        .map_err(|e| ConfigError::new(field, e.to_string()))?;
                }
                (None, Some(name)) => {
                    let watt = item
                        .watt
                        .ok_or_else(|| ConfigError::new(format!("{field}.watt"), "required"))?;
                    let hours = item
                        .hours
                        .ok_or_else(|| ConfigError::new(format!("{field}.hours"), "required"))?;
                    session
                        .add_load(name, watt, item.quantity, hours)
                        .map_err(|e| ConfigError::new(field, e.to_string()))?;
                }
                _ => {
                    return Err(ConfigError::new(
                        field,
                        "exactly one of preset or name is required",
                    ));
                }
            }
        }

        Ok(session)
    }
}

fn preset_item(name: &str, quantity: u32) -> ApplianceItem {
    ApplianceItem {
        preset: Some(name.to_string()),
        quantity,
        ..ApplianceItem::default()
    }
}
