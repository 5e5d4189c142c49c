use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing for the bot process.
///
/// Default: info for our crates, warn for the noisy HTTP/Telegram stacks.
/// Can be overridden with `RUST_LOG`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,teloxide=warn,reqwest=warn,hyper=warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .init();
}
