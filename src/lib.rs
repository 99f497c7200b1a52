//! Solar installation sizing, costing, and quotation engine.

pub mod audit;
pub mod catalog;
pub mod costing;
/// File output helpers (load-schedule CSV).
pub mod io;
pub mod load;
pub mod report;
pub mod session;
pub mod sizing;
pub mod telemetry;
