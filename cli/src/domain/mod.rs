//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod env_file;
pub mod error;
pub mod outcome;
pub mod package;
pub mod settings;
pub mod state;
pub mod units;

pub use config::{AgentctlConfig, Layout, RuntimePrefix};
pub use error::{ConfigError, InstallError, LifecycleError, TemplateError};
pub use outcome::{BestEffort, Outcome};
pub use settings::{Incomplete, ResolvedSettings};
pub use state::{AgentState, LifecyclePhase, StatusKind, Trigger, UnitStatus};
