//! Gold price feed service — binary entrypoint.
//! Boots the Axum HTTP server with the live feed poller running behind it.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact stdout logs for local poller debugging.
///
/// Off unless `FEED_DEV_LOG=1` is set on a debug build or a local Shuttle
/// run; deployed instances keep the platform's subscriber.
fn enable_dev_tracing() {
    let dev_flag = std::env::var("FEED_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gold_price_feed=info,feed=info,warn"));

    // the runtime may already have a global subscriber; keep it if so
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let router = gold_price_feed::app().await?;
    Ok(router.into())
}
