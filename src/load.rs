//! Load audit: validated appliance entries and the aggregated demand list.

use thiserror::Error;

use crate::catalog::AppliancePreset;

/// Rejection reason for an appliance entry.
///
/// Validation happens at the point of entry; a rejected entry is never stored.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("appliance name must not be empty")]
    EmptyName,
    #[error("wattage must be positive and finite, got {0}")]
    InvalidWattage(f64),
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("hours per day must be within [0, 24], got {0}")]
    HoursOutOfRange(f64),
}

/// One audited appliance. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplianceEntry {
    name: String,
    unit_watt: f64,
    quantity: u32,
    hours_per_day: f64,
}

impl ApplianceEntry {
    /// Creates a validated entry.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the name is empty, the wattage is not a
    /// positive finite number, the quantity is zero, or the hours fall outside
    /// `[0, 24]`.
    pub fn new(
        name: impl Into<String>,
        unit_watt: f64,
        quantity: u32,
        hours_per_day: f64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !unit_watt.is_finite() || unit_watt <= 0.0 {
            return Err(ValidationError::InvalidWattage(unit_watt));
        }
        if quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }
        if !hours_per_day.is_finite() || !(0.0..=24.0).contains(&hours_per_day) {
            return Err(ValidationError::HoursOutOfRange(hours_per_day));
        }
        Ok(Self {
            name,
            unit_watt,
            quantity,
            hours_per_day,
        })
    }

    /// Creates an entry from a catalog preset with the given quantity.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the preset data or quantity is invalid.
    pub fn from_preset(preset: &AppliancePreset, quantity: u32) -> Result<Self, ValidationError> {
        Self::new(preset.name.clone(), preset.watt, quantity, preset.hours)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Per-unit wattage (W).
    pub fn unit_watt(&self) -> f64 {
        self.unit_watt
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Daily usage (hours).
    pub fn hours_per_day(&self) -> f64 {
        self.hours_per_day
    }

    /// Combined wattage across all units (W).
    pub fn total_watt(&self) -> f64 {
        self.unit_watt * f64::from(self.quantity)
    }

    /// Daily energy consumption (Wh).
    pub fn daily_energy_wh(&self) -> f64 {
        self.total_watt() * self.hours_per_day
    }
}

/// Accumulated appliance list with aggregate demand figures.
///
/// Entries are appended or cleared wholesale, never edited in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadList {
    entries: Vec<ApplianceEntry>,
}

impl LoadList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a validated entry.
    pub fn add(&mut self, entry: ApplianceEntry) {
        self.entries.push(entry);
    }

    /// Empties the list; downstream derived state is recomputed on the next read.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[ApplianceEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total daily energy demand (Wh); 0 for an empty list.
    pub fn total_energy_wh(&self) -> f64 {
        // fold, not sum: std's empty f64 sum is -0.0, which would print as "-0.0"
        self.entries
            .iter()
            .map(ApplianceEntry::daily_energy_wh)
            .fold(0.0, |acc, wh| acc + wh)
    }

    /// Total peak power demand (W); 0 for an empty list.
    pub fn total_power_w(&self) -> f64 {
        self.entries
            .iter()
            .map(ApplianceEntry::total_watt)
            .fold(0.0, |acc, w| acc + w)
    }
}
