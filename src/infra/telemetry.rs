use tracing::level_filters::LevelFilter;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, filter::Directive, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

// HTTP client and server internals only speak up at warn unless RUST_LOG asks.
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls"];

/// Install the global subscriber: env filter, span traces for errors, and
/// compact or JSON lines on stdout.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    tracing_subscriber::registry()
        .with(env_filter(logging.level))
        .with(ErrorLayer::default())
        .with(output_layer(logging.format))
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn env_filter(level: LevelFilter) -> EnvFilter {
    let mut filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if level > LevelFilter::WARN && std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
        for target in QUIET_TARGETS {
            if let Ok(directive) = format!("{target}=warn").parse::<Directive>() {
                filter = filter.add_directive(directive);
            }
        }
    }
    filter
}

fn output_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_levels_quiet_transport_crates() {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return;
        }
        let filter = env_filter(LevelFilter::DEBUG).to_string();
        assert!(filter.contains("hyper=warn"), "{filter}");
        assert!(filter.contains("reqwest=warn"), "{filter}");
    }

    #[test]
    fn warn_level_leaves_transport_crates_alone() {
        let filter = env_filter(LevelFilter::WARN).to_string();
        assert!(!filter.contains("hyper=warn"), "{filter}");
    }
}
