//! # safedocs-setup
//!
//! Setup pipeline for the SafeDocs document-analysis application.
//!
//! The [`Orchestrator`] runs each stage in order against a project root:
//!
//! - [`validator`] checks the interpreter version and required files
//! - [`snapshot`] backs up the paths setup may touch, and restores them on failure
//! - [`installer`] writes the dependency manifest and installs packages
//! - [`enhancements`] makes every optional enhancement importable
//! - [`materialize`] writes the configuration artifact and directory layout
//! - [`probe`] runs the readiness smoke probes
//!
//! External processes go through the [`Runtime`] and [`PackageManager`]
//! traits; [`PythonRuntime`] and [`Pip`] are the real implementations.

pub mod enhancements;
pub mod error;
pub mod installer;
pub mod materialize;
pub mod orchestrator;
pub mod package_manager;
pub mod probe;
pub mod runtime;
pub mod session;
pub mod snapshot;
pub mod stub;
pub mod validator;

pub use enhancements::{Capability, Enhancement, NullEnhancement};
pub use error::{Disposition, EnhancementError, EnvironmentViolation, SetupError};
pub use orchestrator::{Orchestrator, SetupOptions, SetupReport, StageObserver};
pub use package_manager::{PackageManager, Pip};
pub use runtime::{CommandOutput, PythonRuntime, Runtime};
pub use session::SetupSession;
pub use snapshot::{RestoreReport, SnapshotStore};
