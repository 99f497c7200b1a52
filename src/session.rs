//! Single-audit session state: client details, design parameters, chosen
//! component models, and the load list.
//!
//! The session is the explicit state object threaded through the pipeline;
//! there are no ambient globals. Derived results are recomputed in full on
//! every read rather than cached.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::costing::CostBreakdown;
use crate::load::{ApplianceEntry, LoadList, ValidationError};
use crate::report::QuoteReport;
use crate::sizing::{DesignParams, SizingResult};

/// Recoverable session-level failures.
///
/// "Not ready" conditions (empty load list, missing client name) prompt the
/// user to complete the prior step; they are never fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("load list is empty; complete the load audit first")]
    EmptyLoadList,
    #[error("client name is required before a quotation can be generated")]
    MissingClientName,
    #[error("unknown {kind} \"{name}\"")]
    UnknownModel { kind: &'static str, name: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Client metadata attached to the quotation. Free text; only the name gates
/// report generation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub location: String,
}

/// One sales-audit session against an immutable catalog.
#[derive(Debug, Clone)]
pub struct Session<'a> {
    catalog: &'a Catalog,
    pub client: ClientInfo,
    pub params: DesignParams,
    loads: LoadList,
    battery_model: String,
    panel_model: String,
}

impl<'a> Session<'a> {
    /// Starts an empty session with default parameters. The chosen battery
    /// and panel models default to the first catalog entry of each table.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            client: ClientInfo::default(),
            params: DesignParams::default(),
            loads: LoadList::new(),
            battery_model: catalog
                .batteries
                .first()
                .map(|b| b.name.clone())
                .unwrap_or_default(),
            panel_model: catalog
                .panels
                .first()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog
    }

    pub fn loads(&self) -> &LoadList {
        &self.loads
    }

    pub fn battery_model(&self) -> &str {
        &self.battery_model
    }

    pub fn panel_model(&self) -> &str {
        &self.panel_model
    }

    /// Adds a manually specified appliance.
    ///
    /// # Errors
    ///
    /// Returns a validation error if any constraint is violated; no partial
    /// entry is stored.
    pub fn add_load(
        &mut self,
        name: &str,
        unit_watt: f64,
        quantity: u32,
        hours_per_day: f64,
    ) -> Result<(), SessionError> {
        self.loads
            .add(ApplianceEntry::new(name, unit_watt, quantity, hours_per_day)?);
        Ok(())
    }

    /// Adds a catalog appliance preset with the given quantity.
    ///
    /// # Errors
    ///
    /// Returns `UnknownModel` when the preset name is not in the catalog.
    pub fn add_preset_load(&mut self, preset: &str, quantity: u32) -> Result<(), SessionError> {
        let preset = self
            .catalog
            .appliance(preset)
            .ok_or_else(|| SessionError::UnknownModel {
                kind: "appliance",
                name: preset.to_string(),
            })?;
        self.loads.add(ApplianceEntry::from_preset(preset, quantity)?);
        Ok(())
    }

    /// Empties the load list; all derived state is gone with it.
    pub fn clear_loads(&mut self) {
        self.loads.clear();
    }

    /// Chooses the battery model used for bank sizing.
    ///
    /// # Errors
    ///
    /// Returns `UnknownModel` when the name is not in the catalog.
    pub fn set_battery_model(&mut self, name: &str) -> Result<(), SessionError> {
        if self.catalog.battery(name).is_none() {
            return Err(SessionError::UnknownModel {
                kind: "battery",
                name: name.to_string(),
            });
        }
        self.battery_model = name.to_string();
        Ok(())
    }

    /// Chooses the panel model used for array sizing.
    ///
    /// # Errors
    ///
    /// Returns `UnknownModel` when the name is not in the catalog.
    pub fn set_panel_model(&mut self, name: &str) -> Result<(), SessionError> {
        if self.catalog.panel(name).is_none() {
            return Err(SessionError::UnknownModel {
                kind: "panel",
                name: name.to_string(),
            });
        }
        self.panel_model = name.to_string();
        Ok(())
    }

    /// Sizes the system for the current load list.
    ///
    /// # Errors
    ///
    /// Returns `EmptyLoadList` until the audit has at least one entry.
    pub fn sizing(&self) -> Result<SizingResult, SessionError> {
        if self.loads.is_empty() {
            return Err(SessionError::EmptyLoadList);
        }
        let battery =
            self.catalog
                .battery(&self.battery_model)
                .ok_or_else(|| SessionError::UnknownModel {
                    kind: "battery",
                    name: self.battery_model.clone(),
                })?;
        let panel =
            self.catalog
                .panel(&self.panel_model)
                .ok_or_else(|| SessionError::UnknownModel {
                    kind: "panel",
                    name: self.panel_model.clone(),
                })?;
        Ok(SizingResult::compute(
            self.loads.total_energy_wh(),
            self.loads.total_power_w(),
            &self.params,
            battery,
            panel,
            self.catalog,
        ))
    }

    /// Sizes and prices the system.
    ///
    /// # Errors
    ///
    /// Same readiness conditions as [`Session::sizing`].
    pub fn costs(&self) -> Result<CostBreakdown, SessionError> {
        let sizing = self.sizing()?;
        Ok(CostBreakdown::compute(
            &sizing,
            &self.params,
            self.loads.total_energy_wh(),
        ))
    }

    /// Assembles the full quotation for the given date.
    ///
    /// # Errors
    ///
    /// Additionally requires a non-empty client name; the quotation is
    /// withheld (not a panic) until both gates pass.
    pub fn quote(&self, date: NaiveDate) -> Result<QuoteReport, SessionError> {
        if self.client.name.trim().is_empty() {
            return Err(SessionError::MissingClientName);
        }
        let sizing = self.sizing()?;
        let costs = CostBreakdown::compute(&sizing, &self.params, self.loads.total_energy_wh());
        Ok(QuoteReport {
            client: self.client.clone(),
            entries: self.loads.entries().to_vec(),
            params: self.params.clone(),
            sizing,
            costs,
            date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap_or_default()
    }

    #[test]
    fn sizing_requires_a_nonempty_load_list() {
        let catalog = Catalog::builtin();
        let session = Session::new(&catalog);
        assert_eq!(session.sizing(), Err(SessionError::EmptyLoadList));
        assert!(session.costs().is_err());
    }

    #[test]
    fn quote_requires_a_client_name() {
        let catalog = Catalog::builtin();
        let mut session = Session::new(&catalog);
        assert!(session.add_load("Fan", 75.0, 2, 8.0).is_ok());
        assert_eq!(session.quote(date()), Err(SessionError::MissingClientName));

        session.client.name = "Amina Bello".into();
        assert!(session.quote(date()).is_ok());
    }

    #[test]
    fn default_models_come_from_the_catalog_head() {
        let catalog = Catalog::builtin();
        let session = Session::new(&catalog);
        assert_eq!(session.battery_model(), "Trojan T-105 (225Ah)");
        assert_eq!(session.panel_model(), "Jinko Tiger 350W");
    }

    #[test]
    fn unknown_models_are_rejected() {
        let catalog = Catalog::builtin();
        let mut session = Session::new(&catalog);
        assert!(matches!(
            session.set_battery_model("Acme 9000"),
            Err(SessionError::UnknownModel { kind: "battery", .. })
        ));
        assert!(matches!(
            session.add_preset_load("Quantum Kettle", 1),
            Err(SessionError::UnknownModel { kind: "appliance", .. })
        ));
    }

    #[test]
    fn invalid_entry_is_not_stored() {
        let catalog = Catalog::builtin();
        let mut session = Session::new(&catalog);
        assert!(session.add_load("Fan", -5.0, 1, 8.0).is_err());
        assert!(session.loads().is_empty());
    }

    #[test]
    fn clear_loads_resets_readiness() {
        let catalog = Catalog::builtin();
        let mut session = Session::new(&catalog);
        assert!(session.add_preset_load("Ceiling Fan", 2).is_ok());
        assert!(session.sizing().is_ok());
        session.clear_loads();
        assert_eq!(session.sizing(), Err(SessionError::EmptyLoadList));
    }

    #[test]
    fn preset_load_carries_catalog_defaults() {
        let catalog = Catalog::builtin();
        let mut session = Session::new(&catalog);
        assert!(session.add_preset_load("Deep Freezer", 1).is_ok());
        // 200 W x 10 h
        assert_eq!(session.loads().total_energy_wh(), 2000.0);
    }

    #[test]
    fn recompute_on_read_tracks_parameter_changes() {
        let catalog = Catalog::builtin();
        let mut session = Session::new(&catalog);
        assert!(session.add_load("Fan", 100.0, 2, 5.0).is_ok());
        let before = session.sizing().map(|s| s.battery_capacity_ah);
        session.params.backup_hours = 10.0;
        let after = session.sizing().map(|s| s.battery_capacity_ah);
        match (before, after) {
            (Ok(b), Ok(a)) => assert!(a > b),
            other => panic!("sizing should succeed: {other:?}"),
        }
    }
}
