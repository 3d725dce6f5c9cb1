use app_config::AppConfig;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber and, when a DSN is configured,
/// the Sentry client. Keep the returned guard alive for the lifetime of
/// the process so pending events are flushed on exit.
pub fn init_tracing(config: &AppConfig) -> Option<sentry::ClientInitGuard> {
    let sentry_config = &config.monitoring.sentry;
    let guard = sentry_config
        .dsn
        .as_deref()
        .filter(|dsn| !dsn.trim().is_empty())
        .map(|dsn| {
            sentry::init((
                dsn,
                sentry::ClientOptions {
                    release: sentry::release_name!(),
                    environment: Some(config.environment.clone().into()),
                    sample_rate: sentry_config.sample_rate,
                    traces_sample_rate: sentry_config.traces_sample_rate,
                    ..Default::default()
                },
            ))
        });

    let logging = &config.monitoring.logging;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    let fmt_layer = if logging.format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let result = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .with(sentry_tracing::layer())
        .try_init();

    if let Err(e) = result {
        tracing::warn!("Tracing subscriber already installed: {}", e);
    }

    guard
}
