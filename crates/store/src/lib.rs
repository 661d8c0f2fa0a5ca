//! Report artifact persistence — a JSON-file-backed store with list,
//! filter, and delete, plus CSV/JSON materialization for external viewing.

pub mod export;
pub mod store;

pub use export::{export_csv, export_json};
pub use store::ReportStore;
