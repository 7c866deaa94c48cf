use super::chunked::ChunkDecoder;
use crate::json::{Handler, ScanError, Scanner};
use crate::network::error::Error;
use crate::network::{Connect, Connection};
use crate::system::Delay;
use heapless::{String, Vec};
use serde::Deserialize;

const MAX_HEADERS: usize = 8;
const MAX_HEADER_NAME_LEN: usize = 32;
const MAX_HEADER_VALUE_LEN: usize = 128;
const REQUEST_CAPACITY: usize = 1024;
const STATUS_LINE_LEN: usize = 64;
const CHUNK_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct Header {
    pub name: String<MAX_HEADER_NAME_LEN>,
    pub value: String<MAX_HEADER_VALUE_LEN>,
}

impl Header {
    pub fn new(name: &str, value: &str) -> Result<Self, Error> {
        Ok(Self {
            name: String::try_from(name).map_err(|_| Error::RequestTooLarge)?,
            value: String::try_from(value).map_err(|_| Error::RequestTooLarge)?,
        })
    }
}

/// A bodyless GET request.
#[derive(Debug)]
pub struct Request<'a> {
    pub path: &'a str,
    pub headers: Vec<Header, MAX_HEADERS>,
}

impl<'a> Request<'a> {
    pub fn get(path: &'a str) -> Self {
        Self {
            path,
            headers: Vec::new(),
        }
    }

    pub fn header(&mut self, name: &str, value: &str) -> Result<(), Error> {
        self.headers
            .push(Header::new(name, value)?)
            .map_err(|_| Error::RequestTooLarge)
    }
}

/// Capped busy-wait used while a response is pending.
///
/// The client checks for available bytes, and while there are none sleeps
/// `interval_ms` up to `attempts` times before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub attempts: u8,
    pub interval_ms: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval_ms: 1_000,
        }
    }
}

impl RetryPolicy {
    /// Longest time a single wait can block.
    pub fn budget_ms(&self) -> u32 {
        u32::from(self.attempts).saturating_mul(self.interval_ms)
    }
}

#[derive(Debug)]
pub struct Client<C: Connection> {
    connection: C,
    /// Set when the last response announced a chunked body.
    chunks: Option<ChunkDecoder>,
}

impl<C: Connection> Client<C> {
    pub fn new(connection: C) -> Self {
        Self {
            connection,
            chunks: None,
        }
    }

    /// Writes `request` to the connection.
    pub fn send(&mut self, request: &Request) -> Result<(), Error> {
        // --- Build Request ---
        let mut request_buf: Vec<u8, REQUEST_CAPACITY> = Vec::new();

        // Request line
        request_buf
            .extend_from_slice(b"GET ")
            .map_err(|_| Error::RequestTooLarge)?;
        request_buf
            .extend_from_slice(request.path.as_bytes())
            .map_err(|_| Error::RequestTooLarge)?;
        request_buf
            .extend_from_slice(b" HTTP/1.1\r\n")
            .map_err(|_| Error::RequestTooLarge)?;

        // Headers
        for header in &request.headers {
            request_buf
                .extend_from_slice(header.name.as_bytes())
                .map_err(|_| Error::RequestTooLarge)?;
            request_buf
                .extend_from_slice(b": ")
                .map_err(|_| Error::RequestTooLarge)?;
            request_buf
                .extend_from_slice(header.value.as_bytes())
                .map_err(|_| Error::RequestTooLarge)?;
            request_buf
                .extend_from_slice(b"\r\n")
                .map_err(|_| Error::RequestTooLarge)?;
        }

        request_buf
            .extend_from_slice(b"\r\n")
            .map_err(|_| Error::RequestTooLarge)?;

        // --- Send Request ---
        let mut written = 0;
        while written < request_buf.len() {
            match self.connection.write(&request_buf[written..]) {
                Ok(0) | Err(_) => return Err(Error::WriteError),
                Ok(n) => written += n,
            }
        }
        self.connection.flush().map_err(|_| Error::WriteError)
    }

    /// Waits for at least one readable byte under `policy`.
    ///
    /// Returns `false` once the attempts are exhausted.
    pub fn wait_available<D: Delay>(&mut self, delay: &mut D, policy: &RetryPolicy) -> bool {
        let mut attempts = 0;
        while self.connection.available() == 0 {
            if attempts >= policy.attempts {
                return false;
            }
            delay.delay_ms(policy.interval_ms);
            attempts += 1;
        }
        true
    }

    /// Reads the status line, then discards header lines up to the blank
    /// line that opens the body. Returns the status code.
    ///
    /// A `Transfer-Encoding: chunked` header switches the following
    /// [`stream_json`](Self::stream_json) to chunk decoding.
    pub fn read_status_and_skip_headers<D: Delay>(
        &mut self,
        delay: &mut D,
        policy: &RetryPolicy,
    ) -> Result<u16, Error> {
        self.chunks = None;
        let mut line: Vec<u8, STATUS_LINE_LEN> = Vec::new();
        self.read_line(delay, policy, &mut line)?;
        let status = parse_status_line(&line)?;

        loop {
            self.read_line(delay, policy, &mut line)?;
            if line.is_empty() {
                return Ok(status);
            }
            if is_chunked_encoding(&line) {
                log::debug!("chunked body");
                self.chunks = Some(ChunkDecoder::new());
            }
        }
    }

    /// Streams the body into `scanner` until the document closes, the peer
    /// closes, or the body stalls after data was received.
    ///
    /// Returns the number of body bytes read, chunk framing excluded. A body
    /// cut off mid-document is not an error: `handler` has seen
    /// `document_end` and judges for itself.
    pub fn stream_json<D: Delay, H: Handler, const K: usize, const V: usize, const F: usize>(
        &mut self,
        scanner: &mut Scanner<K, V, F>,
        handler: &mut H,
        delay: &mut D,
        policy: &RetryPolicy,
    ) -> Result<usize, Error> {
        let mut received = 0;
        let mut chunk = [0u8; CHUNK_LEN];

        let outcome = loop {
            if scanner.is_finished() {
                break Ok(());
            }
            if !self.wait_available(delay, policy) {
                break if received == 0 {
                    Err(Error::Timeout)
                } else {
                    Ok(())
                };
            }

            let want = self.connection.available().clamp(1, CHUNK_LEN);
            let n = match self.connection.read(&mut chunk[..want]) {
                Ok(0) => break Ok(()),
                Ok(n) => n,
                Err(_) => break Err(Error::ReadError),
            };
            let decoded = self
                .chunks
                .as_mut()
                .map(|decoder| decoder.decode_in_place(&mut chunk[..n]));
            let n = match decoded {
                None => n,
                Some(Ok(len)) => len,
                Some(Err(error)) => {
                    log::warn!("bad chunk framing after {} bytes", received);
                    break Err(error);
                }
            };
            received += n;

            if let Err(error) = scanner.feed_slice(&chunk[..n], handler) {
                log::warn!("malformed body after {} bytes: {:?}", received, error);
                break Err(Error::ProtocolError);
            }
            if self.chunks.as_ref().is_some_and(ChunkDecoder::is_done) {
                break Ok(());
            }
        };

        let finished = scanner.finish(handler);
        outcome?;
        match finished {
            Ok(()) => Ok(received),
            Err(ScanError::Truncated) => {
                log::debug!("body ended inside the document after {} bytes", received);
                Ok(received)
            }
            Err(error) => {
                log::warn!("no usable document in {} bytes: {:?}", received, error);
                Err(Error::ProtocolError)
            }
        }
    }

    /// Runs a complete GET exchange: request, status check, body streaming.
    pub fn get_json<D: Delay, H: Handler>(
        &mut self,
        host: &str,
        path: &str,
        user_agent: &str,
        delay: &mut D,
        policy: &RetryPolicy,
        handler: &mut H,
    ) -> Result<usize, Error> {
        let mut request = Request::get(path);
        request.header("Host", host_name(host))?;
        request.header("User-Agent", user_agent)?;
        request.header("Content-Type", "application/json; charset=UTF-8")?;
        request.header("Connection", "close")?;
        self.send(&request)?;

        let status = self.read_status_and_skip_headers(delay, policy)?;
        if !(200..300).contains(&status) {
            log::warn!("{} answered {} for {}", host, status, path);
            return Err(Error::UnexpectedStatus);
        }

        let mut scanner: Scanner = Scanner::new();
        self.stream_json(&mut scanner, handler, delay, policy)
    }

    pub fn close(self) -> Result<(), Error> {
        self.connection.close().map_err(|_| Error::ConnectionClosed)
    }

    fn read_byte(&mut self) -> Result<u8, Error> {
        let mut byte = [0u8; 1];
        match self.connection.read(&mut byte) {
            Ok(0) => Err(Error::ConnectionClosed),
            Ok(_) => Ok(byte[0]),
            Err(_) => Err(Error::ReadError),
        }
    }

    /// Reads one line without its terminator. Overlong lines are cut.
    fn read_line<D: Delay, const L: usize>(
        &mut self,
        delay: &mut D,
        policy: &RetryPolicy,
        line: &mut Vec<u8, L>,
    ) -> Result<(), Error> {
        line.clear();
        loop {
            if !self.wait_available(delay, policy) {
                return Err(Error::Timeout);
            }
            match self.read_byte()? {
                b'\n' => return Ok(()),
                b'\r' => {}
                byte => {
                    let _ = line.push(byte);
                }
            }
        }
    }
}

/// Opens a connection to `host`, runs one GET exchange into `handler` and
/// closes the connection whatever the outcome.
pub fn get_json<N, D, H>(
    network: &mut N,
    delay: &mut D,
    host: &str,
    path: &str,
    user_agent: &str,
    policy: &RetryPolicy,
    handler: &mut H,
) -> Result<usize, Error>
where
    N: Connect,
    D: Delay,
    H: Handler,
{
    log::debug!("GET {}{}", host, path);
    let connection = network.connect(host).map_err(|error| {
        log::warn!("connection to {} failed: {:?}", host, error);
        Error::ConnectionRefused
    })?;

    let mut client = Client::new(connection);
    let result = client.get_json(host, path, user_agent, delay, policy, handler);
    if let Err(error) = client.close() {
        log::debug!("closing {} failed: {:?}", host, error);
    }

    match &result {
        Ok(received) => log::debug!("{}: {} body bytes", host, received),
        Err(error) => log::warn!("{}{} failed: {:?}", host, path, error),
    }
    result
}

/// `host` without its `:port` suffix.
fn host_name(host: &str) -> &str {
    host.split(':').next().unwrap_or(host)
}

/// `true` for a `Transfer-Encoding` header listing `chunked`.
fn is_chunked_encoding(line: &[u8]) -> bool {
    let Ok(line) = core::str::from_utf8(line) else {
        return false;
    };
    let Some((name, value)) = line.split_once(':') else {
        return false;
    };
    name.trim().eq_ignore_ascii_case("transfer-encoding")
        && value.split(',').any(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
}

fn parse_status_line(line: &[u8]) -> Result<u16, Error> {
    let line = core::str::from_utf8(line).map_err(|_| Error::ProtocolError)?;
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().ok_or(Error::ProtocolError)?;
    if !version.starts_with("HTTP/") {
        return Err(Error::ProtocolError);
    }
    parts
        .next()
        .ok_or(Error::ProtocolError)?
        .parse::<u16>()
        .map_err(|_| Error::ProtocolError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_parsing() {
        assert_eq!(parse_status_line(b"HTTP/1.1 200 OK"), Ok(200));
        assert_eq!(parse_status_line(b"HTTP/1.0 404 Not Found"), Ok(404));
        assert_eq!(parse_status_line(b"HTTP/1.1 2x0 OK"), Err(Error::ProtocolError));
        assert_eq!(parse_status_line(b"<html>"), Err(Error::ProtocolError));
        assert_eq!(parse_status_line(b""), Err(Error::ProtocolError));
    }

    #[test]
    fn test_chunked_header_detection() {
        assert!(is_chunked_encoding(b"Transfer-Encoding: chunked"));
        assert!(is_chunked_encoding(b"transfer-encoding:gzip, Chunked"));
        assert!(!is_chunked_encoding(b"Transfer-Encoding: identity"));
        assert!(!is_chunked_encoding(b"X-Note: Transfer-Encoding chunked"));
        assert!(!is_chunked_encoding(b"Content-Length: 12"));
    }

    #[test]
    fn test_host_name_strips_port() {
        assert_eq!(host_name("api.geonames.org:80"), "api.geonames.org");
        assert_eq!(host_name("api.geonames.org"), "api.geonames.org");
    }

    #[test]
    fn test_retry_budget() {
        assert_eq!(RetryPolicy::default().budget_ms(), 10_000);
    }
}
