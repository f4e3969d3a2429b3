//! ---
//! glx_section: "01-core-functionality"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Shared primitives and utilities for the field core."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
//! Shared primitives for the GeoLynx field-core workspace.
//! This crate exposes configuration loading and logging initialisation
//! consumed across the workspace.

pub mod config;
pub mod logging;

pub use config::{ApiConfig, AppConfig, LoadedAppConfig, LoggingConfig, MapConfig};
pub use logging::{init_tracing, LogFormat};
