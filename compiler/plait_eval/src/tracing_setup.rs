//! Tracing subscriber installation.
//!
//! Nothing is installed unless `RUST_LOG` is set, so library users and tests
//! pay no cost by default.
//!
//! ```text
//! RUST_LOG=plait_eval=debug                 # phase entry and pool activity
//! RUST_LOG=plait_eval::production=trace     # evaluator construction passes
//! PLAIT_LOG_TREE=1 RUST_LOG=debug           # indented span tree
//! ```

use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install the global subscriber once per process.
pub fn init_tracing() {
    INIT.call_once(|| {
        if std::env::var_os("RUST_LOG").is_none() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        let registry = tracing_subscriber::registry().with(filter);
        // try_init: an embedder may already own the global subscriber.
        if std::env::var_os("PLAIT_LOG_TREE").is_some() {
            let tree = tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true);
            let _ = registry.with(tree).try_init();
        } else {
            let _ = registry
                .with(fmt::layer().with_target(true).with_level(true))
                .try_init();
        }
    });
}
