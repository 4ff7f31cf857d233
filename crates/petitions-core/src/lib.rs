//! petitions-core library.
//!
//! Petition model, session handling, the route guard, and per-view state for
//! the petitions client. Network access goes through [`api::PetitionApi`].
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums per concern, each mapping to an
//!   [`error::ErrorCode`]; `anyhow::Result` only for config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod model;
pub mod session;
pub mod validate;
pub mod view;
