//! # pda-service: PDA Engine Facade
//!
//! Composes the engine for the request-handling layer:
//!
//! - [`PostalService`]: allocation, minting, scoring and validation behind
//!   one cloneable handle.
//! - [`EngineConfig`]: YAML file and environment configuration.
//! - [`ServiceError`]: the per-layer error taxonomies under one type.
//!
//! ## Metrics
//!
//! Counters are recorded through the `metrics` facade. Installing an
//! exporter is left to the binary.
//!
//! | Counter | Labels |
//! |---|---|
//! | `pda_ids_minted_total` | |
//! | `pda_allocations_total` | `level` |
//! | `pda_validation_results_total` | `kind`, `status` |
//! | `pda_counter_retries_total` | |

pub mod config;
pub mod error;
pub mod metered;
pub mod service;

pub use config::{ConfigError, EngineConfig, RegistryConfig};
pub use error::ServiceError;
pub use metered::MeteredCounter;
pub use service::PostalService;
