//! Configuration layer shared by the GenStudio editor core.
//!
//! Holds the provider/model registry, wire constants, the read-only settings
//! store, and API key resolution. No network or process code lives here.

pub mod api_keys;
pub mod constants;
pub mod models;
pub mod settings;

pub use models::{ModelPreset, Provider};
pub use settings::SettingsStore;
