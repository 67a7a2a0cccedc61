//! Keel lowering session.
//!
//! Ties the switch planner and the delegate cache synthesizer to one
//! compilation unit:
//!
//! ```text
//! CompilationUnit
//!     │
//!     ├── switches ──► SwitchPlanner (rayon) ──► DispatchPlan per switch
//!     │
//!     └── conversions ──► CacheSynthesizer ──► LoweredConversion per site
//!                              │
//!                              ▼
//!                       ContainerRegistry
//! ```
//!
//! Configuration comes from [`LoweringConfig`], usually
//! [`LoweringConfig::from_env`].

mod config;
mod session;

use std::sync::Once;

pub use config::LoweringConfig;
pub use session::{CompilationUnit, LoweredUnit, LoweringError, LoweringSession, SwitchInput};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Filters come from `KEEL_LOG`, falling back
/// to `RUST_LOG`; nothing is installed when neither is set. With
/// `KEEL_LOG_TREE` set, spans render as an indented tree.
///
/// ```text
/// KEEL_LOG=keel_switch=debug,keel_delegate=trace
/// ```
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Some(directives) = std::env::var("KEEL_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
        else {
            return;
        };
        let filter = EnvFilter::builder().parse_lossy(directives);
        let registry = tracing_subscriber::registry().with(filter);

        // `try_init` leaves a subscriber installed by the host in place.
        let installed = if std::env::var_os("KEEL_LOG_TREE").is_some() {
            registry
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_target(true).with_level(true))
                .try_init()
        };
        if let Err(e) = installed {
            tracing::debug!(error = %e, "tracing subscriber already installed");
        }
    });
}
