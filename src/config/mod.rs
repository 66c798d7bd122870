//! Configuration management for Hent.

mod settings;

pub use settings::{DownloadSettings, GeneralSettings, ServerSettings, Settings};
