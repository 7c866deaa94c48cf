//! Common error types for network operations

/// A common error type for network operations.
///
/// This enum defines a set of common errors that can occur while running a
/// request/response session against a remote service. It is designed to be
/// simple and portable for `no_std` environments.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An error occurred during a write operation.
    WriteError,
    /// An error occurred during a read operation.
    ReadError,
    /// A connection attempt was refused.
    ConnectionRefused,
    /// No data arrived within the retry budget.
    Timeout,
    /// The connection was closed before a response arrived.
    ConnectionClosed,
    /// The request did not fit in the request buffer.
    RequestTooLarge,
    /// The response status line could not be parsed.
    ProtocolError,
    /// The server answered with a non-2xx status code.
    UnexpectedStatus,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::ConnectionRefused => defmt::write!(f, "ConnectionRefused"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::RequestTooLarge => defmt::write!(f, "RequestTooLarge"),
            Error::ProtocolError => defmt::write!(f, "ProtocolError"),
            Error::UnexpectedStatus => defmt::write!(f, "UnexpectedStatus"),
        }
    }
}
