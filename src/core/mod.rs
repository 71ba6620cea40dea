//! Core types and functionality for SDD Kit.
//!
//! This module contains the pieces every engine operation sits on:
//! configuration, the error taxonomy, filesystem helpers and the
//! project state store.

mod config;
mod error;
pub mod fs;
mod state;

pub use config::{Config, DefaultsConfig, PathsConfig, SDD_DIR};
pub use error::{Artifact, EngineError, EngineResult};
pub use state::StateStore;
