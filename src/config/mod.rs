//! Configuration Module
//!
//! Client settings and their loading from files and the environment.

pub mod loader;
pub mod settings;

pub use loader::{ConfigFile, ConfigLoader};
pub use settings::{ClientConfig, DEFAULT_BASE_URL};
