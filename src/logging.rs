#[cfg(not(target_arch = "wasm32"))]
use std::sync::Once;

#[cfg(not(target_arch = "wasm32"))]
static INIT: Once = Once::new();

/// Installs the global tracing subscriber. Safe to call more than once.
#[cfg(not(target_arch = "wasm32"))]
pub fn init() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    });
}

/// Browser builds surface failures through the devtools console in the host
/// glue; no subscriber is installed there.
#[cfg(target_arch = "wasm32")]
pub fn init() {}
