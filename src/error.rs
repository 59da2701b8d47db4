//! Unified error type.

use thiserror::Error as ThisError;

/// The error type returned by yhttp's fallible operations.
///
/// Application-level errors (404, 400, etc.) are expressed as
/// [`HttpStatus`](crate::HttpStatus) signals and HTTP responses, not as
/// `Error`s. This type surfaces infrastructure failures: loading settings,
/// binding to a port or accepting a connection.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid socket address `{addr}`: {source}")]
    InvalidAddress {
        addr: String,
        source: std::net::AddrParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_keep_their_message() {
        let err = Error::from(std::io::Error::other("boom"));
        assert_eq!(err.to_string(), "io: boom");
    }

    #[test]
    fn invalid_address_names_the_input() {
        let source = "nope".parse::<std::net::SocketAddr>().unwrap_err();
        let err = Error::InvalidAddress { addr: "nope".into(), source };
        assert!(err.to_string().starts_with("invalid socket address `nope`"));
    }
}
