//! Client-side reconciliation engine for the tactical map.
//!
//! Owns the live unit table, consumes one raw update buffer per network tick
//! through [`UnitRegistry::apply_update`], and exposes a consistent snapshot
//! (units, groups, selection, detection state) to the rendering layer and
//! panels. Decode failures never escape the engine: a bad buffer costs at
//! most the remainder of one tick.

pub mod commands;
mod config;
mod detection;
mod feed;
mod metrics;
mod registry;
mod visibility;

pub use config::{ClientConfig, ConfigError, BUILTIN_CLIENT_CONFIG};
pub use feed::{connect_update_feed, UpdateFeed};
pub use metrics::ClientMetrics;
pub use registry::{AbortReason, StateEvent, TickOutcome, TickReport, UnitRegistry};
pub use visibility::{is_visible, HiddenSets, VisibilityFlags};

/// Install the tracing and log subscribers, filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
    let _ = env_logger::Builder::from_default_env().try_init();
}
