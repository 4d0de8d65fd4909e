//! Use cases orchestrating the core components.
//!
//! Each use case takes its collaborators by trait reference and returns plain
//! data describing what would happen; applying a plan against a
//! [`DependencyStore`](crate::package::DependencyStore) is a separate,
//! explicit step.

pub mod change_version;
pub mod install;

pub use change_version::{ChangeVersionPreview, VersionChange};
pub use install::{InstallPlan, InstallPlanner};
