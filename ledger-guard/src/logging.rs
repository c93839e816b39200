//! Logging utilities and configuration for ledger-guard.
//!
//! Library code only emits `tracing` events; binaries install a subscriber
//! through [`setup::init_logging`]. Events carry column names, counts and
//! scores. Cell values never reach a log line.

use tracing::Level;

/// Controls how much the analysis pipeline logs about individual rules.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for pipeline events
    pub base_level: Level,
    /// Whether to log the details of every failed rule
    pub log_rule_details: bool,
    /// Maximum length for logged field values (to prevent huge logs)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_rule_details: false,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_rule_details: true,
            max_field_length: 1024,
        }
    }
}

/// Macro for conditional rule logging.
#[macro_export]
macro_rules! log_rule {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_rule_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Truncates a string to at most `max_length` bytes, on a character boundary.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }

    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Subscriber installation for binaries and tests.
pub mod setup {
    use tracing::Level;

    /// Configuration for the global `tracing` subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for dependencies
        pub level: Level,
        /// Log level for ledger-guard components specifically
        pub crate_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::WARN,
                crate_level: Level::INFO,
                json_format: false,
            }
        }
    }

    impl LoggingConfig {
        /// Sets the log level for ledger-guard components.
        pub fn with_crate_level(mut self, level: Level) -> Self {
            self.crate_level = level;
            self
        }

        /// Sets whether to use JSON output format.
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            format!(
                "{},ledger_guard={}",
                self.level.as_str().to_lowercase(),
                self.crate_level.as_str().to_lowercase()
            )
        }
    }

    /// Installs the global subscriber. `RUST_LOG` takes precedence over the
    /// configured filter. Output goes to stderr so stdout stays clean for
    /// reports.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use ledger_guard::logging::setup::{init_logging, LoggingConfig};
    /// use tracing::Level;
    ///
    /// init_logging(
    ///     LoggingConfig::default()
    ///         .with_crate_level(Level::DEBUG)
    ///         .with_json_format(true),
    /// )
    /// .unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}
