//! State controller for Keepsake.
//!
//! [`Keepsake`] owns the single live [`Document`](keepsake_types::Document)
//! of a session. It reconciles persisted content against the built-in
//! defaults on load, writes the content record back on save, and drives the
//! photo lifecycle: compression, storage and memory handles.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! # async fn run() -> keepsake_core::CoreResult<()> {
//! use keepsake_core::{Keepsake, SiteConfig};
//!
//! let mut keepsake = Keepsake::open(SiteConfig::load(None)?).await?;
//! keepsake.load().await?;
//! keepsake.document_mut().homepage.intro_message = "Hello".into();
//! let outcome = keepsake.save(false).await;
//! assert!(outcome.success);
//! # Ok(())
//! # }
//! ```

pub mod backup;
pub mod config;
pub mod controller;
pub mod error;

pub use config::SiteConfig;
pub use controller::{Health, Keepsake, SaveOutcome};
pub use error::{CoreError, CoreResult};
