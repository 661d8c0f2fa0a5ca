//! Shared types for the newsletter campaign reporting core — request and
//! artifact model, error taxonomy, configuration, progress protocol.

pub mod cancel;
pub mod config;
pub mod error;
pub mod progress;
pub mod types;

pub use cancel::CancelToken;
pub use error::{ReportError, ReportResult};
pub use progress::{CaptureSink, NoOpSink, ProgressEvent, ProgressSink, Stage};
