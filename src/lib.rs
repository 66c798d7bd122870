//! Hent - On-demand audio download service
//!
//! A small HTTP service that accepts a media URL and a quality selector,
//! delegates extraction and transcoding to yt-dlp, and streams the resulting
//! audio file back before deleting the temporary artifact.
//!
//! The name "Hent" comes from the Norwegian word for "fetch."
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `quality` - Quality selectors and their extraction profiles
//! - `download` - Download orchestration (yt-dlp invocation, file resolution, cleanup)
//! - `server` - HTTP API (axum router and handlers)
//! - `cli` - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use hent::config::Settings;
//! use hent::download::fetch_audio;
//! use hent::quality::Quality;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let url = url::Url::parse("https://www.youtube.com/watch?v=dQw4w9WgXcQ")?;
//!
//!     let audio = fetch_audio(&url, Quality::M4a, &settings.temp_dir(), &settings.download).await?;
//!     println!("Fetched {}", audio.filename);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod quality;
pub mod server;

pub use error::{HentError, Result};
