use thiserror::Error;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt};

#[derive(Debug, Error)]
pub enum TracerError {
    #[error("Invalid Log Filter Directive: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("Global Subscriber Already Set: {0}")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

#[derive(Default, Debug, Clone)]
pub struct TracerOptions<'a> {
    /// Filter directives used when `RUST_LOG` is not set, e.g. `"dwell_idealisation=debug"`.
    pub default_filter: Option<&'a str>,
    pub ansi: bool,
    pub with_target: bool,
}

/// This object initialises the stdout tracer, given a TracerOptions struct.
pub struct TracerEngine {
    service_name: String,
}

impl TracerEngine {
    /// Initialises the stdout tracer for the crate
    /// #Arguments
    /// * `options` - The caller-specified instance of TracerOptions.
    /// * `service_name` - The name recorded in the startup event.
    /// #Returns
    /// An instance of TracerEngine, or an error if a global subscriber already exists.
    pub fn new(options: TracerOptions, service_name: &str) -> Result<Self, TracerError> {
        let stdout_tracer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(options.ansi)
            .with_target(options.with_target);

        // This filter is applied to the stdout tracer
        let log_filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
            Ok(_) => EnvFilter::from_default_env(),
            Err(_) => EnvFilter::try_new(options.default_filter.unwrap_or("info"))?,
        };

        let subscriber =
            tracing_subscriber::Registry::default().with(stdout_tracer.with_filter(log_filter));

        tracing::subscriber::set_global_default(subscriber)?;
        tracing::info!(service = service_name, "Tracer initialised");

        Ok(Self {
            service_name: service_name.to_owned(),
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}
