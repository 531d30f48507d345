// server/src/telemetry.rs

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// True when `LOG_FORMAT` asks for JSON lines.
pub fn json_requested(log_format: Option<&str>) -> bool {
  log_format.is_some_and(|f| f.trim().eq_ignore_ascii_case("json"))
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
  let log_format = std::env::var("LOG_FORMAT").ok();

  if json_requested(log_format.as_deref()) {
    tracing_subscriber::registry()
      .with(filter)
      .with(tracing_subscriber::fmt::layer().json())
      .init();
  } else {
    tracing_subscriber::registry()
      .with(filter)
      .with(tracing_subscriber::fmt::layer())
      .init();
  }
}
