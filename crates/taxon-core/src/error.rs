//! Error types for Taxon

/// Result type alias using Taxon's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Taxon operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors (missing credentials, unknown provider, bad file)
    #[error("configuration error: {0}")]
    Config(String),

    /// Text generation transport errors (network failure, non-2xx status)
    #[error("generator error: {0}")]
    Generator(String),

    /// Model output that could not be interpreted
    #[error("parse error: {0}")]
    Parse(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Timeout errors
    #[error("operation timed out")]
    Timeout,
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new generator error
    pub fn generator(msg: impl Into<String>) -> Self {
        Self::Generator(msg.into())
    }

    /// Create a new parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Short, stable label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Generator(_) => "generator",
            Self::Parse(_) => "parse",
            Self::Io(_) => "io",
            Self::Timeout => "timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(Error::config("no key").kind(), "config");
        assert_eq!(Error::generator("503").kind(), "generator");
        assert_eq!(Error::parse("not json").kind(), "parse");
        assert_eq!(Error::Timeout.kind(), "timeout");
    }

    #[test]
    fn test_io_conversion() {
        fn read() -> Result<String> {
            Ok(std::fs::read_to_string("/definitely/not/here/taxon.yaml")?)
        }

        let err = read().unwrap_err();
        assert_eq!(err.kind(), "io");
        assert!(err.to_string().starts_with("io error:"));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Error::config("missing API key").to_string(),
            "configuration error: missing API key"
        );
        assert_eq!(Error::Timeout.to_string(), "operation timed out");
    }
}
