//! Report generation engine — campaign matching, metric aggregation, and
//! the orchestrator state machine driving one generation end to end.

pub mod aggregate;
pub mod matcher;
pub mod orchestrator;
pub mod outcome;

pub use aggregate::aggregate;
pub use matcher::{match_campaigns, prefilter_campaigns};
pub use orchestrator::{ArtifactStore, ReportGenerator};
pub use outcome::{EmptyReason, ReportOutcome};
