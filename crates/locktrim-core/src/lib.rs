#![forbid(unsafe_code)]
//! locktrim-core library.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums at I/O and config boundaries; callers
//!   wrap them in `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod category;
pub mod config;
pub mod error;
pub mod lockfile;

pub use category::{Bucket, CategoryRules, OTHER_LABEL};
pub use config::{CollisionPolicy, ProjectConfig};
pub use error::ErrorCode;
pub use lockfile::{DependencyRef, Lockfile, LockfileError, PackageRecord, ParseAnomaly};
