//! # safedocs-core
//!
//! Foundational types shared by the SafeDocs setup crates:
//! - The setup state machine and its allowed transitions
//! - Status enums for stages, snapshot entries, enhancements and integration
//! - Readiness probe results and the threshold-based verdict
//! - The final run outcome and its exit-code contract

pub mod enums;
pub mod readiness;

pub use enums::{
    EnhancementState, EntryKind, IntegrationStatus, RestoreStatus, SetupOutcome, SetupState,
    StageStatus, Verdict,
};
pub use readiness::{ProbeResult, ReadinessReport};
