//! # so-infra
//!
//! Adapters behind the provider ports: an in-process provider with the
//! hosted service's semantics, a REST client for the hosted service and the
//! auth event fan-out both of them share.

pub mod auth_events;
pub mod provider;

pub use auth_events::AuthEventHub;
pub use provider::{InMemoryOptions, InMemoryProvider, RestProvider, RestProviderConfig};
