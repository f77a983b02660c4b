use thiserror::Error;

/// Setup errors. Any of these aborts the run before a single task is scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("target domain cannot be empty")]
    EmptyTarget,

    #[error("invalid domain name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("invalid port '{0}': expected a number between 1 and 65535")]
    InvalidPort(String),

    #[error("invalid port range '{0}'")]
    InvalidPortRange(String),

    #[error("port list cannot be empty")]
    EmptyPortList,

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("concurrency {requested} exceeds the maximum of {max}")]
    ConcurrencyTooHigh { requested: usize, max: usize },

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}
