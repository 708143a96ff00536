//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env file (dotenvy, loaded by the binary)
//!     → config file (TOML, optional)
//!     → loader.rs (parse, environment overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Missing wallet project ID is fatal; missing subgraph URL only warns

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, ChainConfig, SubgraphConfig, TimingConfig, WalletConfig};
