//! Common utilities and shared types for keyhold.
//!
//! This crate provides foundational components used across all keyhold crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based record identifiers via [`IdGenerator`]
//! - **Telemetry**: `tracing` subscriber setup via [`telemetry::init`]
//!
//! # Example
//!
//! ```no_run
//! use keyhold_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     keyhold_common::telemetry::init(&config.logging)?;
//!     let id = IdGenerator::new().generate();
//!     println!("Generated ID: {id}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod telemetry;

pub use config::{Config, DatabaseConfig, KeysConfig, LoggingConfig};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
