pub mod application;
pub mod compat;
pub mod diff;
pub mod package;
pub mod resolver;
pub mod version;
