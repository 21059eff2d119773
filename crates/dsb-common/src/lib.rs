//! ---
//! dsb_section: "01-core-functionality"
//! dsb_subsection: "module"
//! dsb_type: "source"
//! dsb_scope: "code"
//! dsb_description: "Shared primitives and utilities for the bridge runtime."
//! dsb_version: "v0.1.0-dev"
//! dsb_owner: "tbd"
//! ---
//! Shared runtime primitives for the DSB workspace: configuration loading
//! and tracing initialisation consumed by the bridge host and tests.

pub mod config;
pub mod logging;

pub use config::{BridgeConfig, LoggingConfig, SecurityConfig, ServiceConfig};
pub use logging::{init_tracing, LogFormat};
