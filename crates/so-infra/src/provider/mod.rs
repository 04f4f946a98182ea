//! Authentication + data-store provider adapters.

mod memory;
mod rest;

pub use memory::{InMemoryOptions, InMemoryProvider};
pub use rest::{RestProvider, RestProviderConfig};
