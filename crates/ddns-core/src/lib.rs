// # ddns-core
//
// Core library for the DDNS update endpoint.
//
// ## Architecture Overview
//
// A router (or any HTTP client) calls the endpoint with its current
// addresses; this library decides what happens next:
// - **UpdateParams**: Query-string extraction and validation
// - **UpdateHandler**: Credential check and the A → AAAA update sequence
// - **DnsProvider**: Trait for writing records via provider APIs
// - **ProviderRegistry**: Plugin-based registry for DNS providers
//
// ## Design Principles
//
// 1. **Request-scoped**: Nothing survives a request; handlers share no mutable state
// 2. **Fail fast**: The first failing leg ends the request, later legs never run
// 3. **Plugin-Based**: Providers are registered dynamically, no hard-coded if-else
// 4. **Library-First**: The handler knows nothing about the HTTP server hosting it

pub mod traits;
pub mod handler;
pub mod params;
pub mod registry;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, ProviderStatus, RecordType};
pub use handler::{Credentials, UpdateHandler, UpdateOutcome};
pub use params::UpdateParams;
pub use registry::ProviderRegistry;
pub use config::{PorkbunSettings, ProviderConfig, RecordTargets, UpdaterConfig};
pub use error::{Error, Result};
