//! Shared test fixtures for integration tests.

use chrono::NaiveDate;
use solar_quote::catalog::Catalog;
use solar_quote::session::{ClientInfo, Session};

/// Fixed quotation date used across tests (2025-03-14).
pub fn quote_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
}

/// Default client (Amina Bello, Lagos).
pub fn default_client() -> ClientInfo {
    ClientInfo {
        name: "Amina Bello".into(),
        address: "12 Marina Road, Lagos".into(),
        phone: "08012345678".into(),
        email: "amina@example.com".into(),
        location: "Lagos".into(),
    }
}

/// A session over the builtin catalog with a typical household load:
/// 2 ceiling fans, 1 medium refrigerator, 4 LED bulbs, and a TV.
pub fn household_session(catalog: &Catalog) -> Session<'_> {
    let mut session = Session::new(catalog);
    session.client = default_client();
    for (preset, quantity) in [
        ("Ceiling Fan", 2),
        ("Refrigerator (Medium)", 1),
        ("Lighting (LED Bulb)", 4),
        ("TV (32-inch LED)", 1),
    ] {
        session
            .add_preset_load(preset, quantity)
            .expect("builtin preset should exist");
    }
    session
}
