use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

fn build_env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    let directives = [level.to_string(), "rusqlite=warn".to_string()];
    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|e| anyhow::anyhow!("Invalid tracing filter '{}': {}", filter_str, e))
}

/// Installs the global subscriber. Output always goes to stderr; stdout
/// carries the protocol.
pub fn init_logging(level: &str) -> anyhow::Result<()> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(true)
        .with_filter(build_env_filter(level)?);

    tracing_subscriber::registry().with(stderr_layer).try_init()?;

    tracing::trace!("Logging initialized: level={}", level);
    Ok(())
}
