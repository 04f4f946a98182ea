//! # so-shell
//!
//! Host layer for Shoutout: configuration loading, tracing, dependency
//! wiring, the runtime that owns the flows and the line-command surface
//! that drives them over stdin.

pub mod adapters;
pub mod bootstrap;
pub mod commands;
pub mod runtime;

pub use bootstrap::{init_tracing_subscriber, load_config, resolve_config, wire_dependencies};
pub use commands::{run_shell, Command};
pub use runtime::ShellRuntime;
