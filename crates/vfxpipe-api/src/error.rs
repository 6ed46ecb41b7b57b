//! Listener failures surfaced to the server binary.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::net::SocketAddr;

/// Result alias for API server operations.
pub type ApiServerResult<T> = std::result::Result<T, ApiServerError>;

/// Listener failures.
#[derive(Debug)]
pub enum ApiServerError {
    /// The port is taken or the address is not local.
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// OS error.
        source: std::io::Error,
    },
    /// The accept loop stopped with an IO error.
    Serve {
        /// OS error.
        source: std::io::Error,
    },
}

impl Display for ApiServerError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind { addr, .. } => {
                write!(formatter, "cannot listen for ingest requests on {addr}")
            }
            Self::Serve { .. } => formatter.write_str("ingest server stopped accepting connections"),
        }
    }
}

impl Error for ApiServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Bind { source, .. } | Self::Serve { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn bind_failure_names_the_address() {
        let bind = ApiServerError::Bind {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5000),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert_eq!(
            bind.to_string(),
            "cannot listen for ingest requests on 127.0.0.1:5000"
        );
        assert!(bind.source().is_some());

        let serve = ApiServerError::Serve {
            source: io::Error::other("closed"),
        };
        assert!(serve.to_string().starts_with("ingest server stopped"));
        assert_eq!(
            serve.source().map(ToString::to_string).as_deref(),
            Some("closed")
        );
    }
}
