//! Lookup sessions against the remote geolocation services.

use heapless::Vec;

use super::lookup::{FieldMapped, FixReply, Lookup, PlaceReply, TimezoneReply, fix_path, place_path, timezone_path};
use super::{AccessPoint, GeoFix, PlaceName, TimezoneInfo};
use crate::config::{Config, MAX_ACCESS_POINTS};
use crate::network::application::http::get_json;
use crate::network::error::Error;
use crate::network::{Connect, Link};
use crate::system::Delay;

/// Why a lookup session produced no result.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SessionError {
    /// Connecting, requesting or reading failed.
    Transport(Error),
    /// The reply arrived but lacked the mandatory fields.
    Incomplete,
    /// The WiFi scan found nothing to locate with.
    NoAccessPoints,
}

impl From<Error> for SessionError {
    fn from(error: Error) -> Self {
        SessionError::Transport(error)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SessionError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            SessionError::Transport(e) => defmt::write!(f, "Transport({})", e),
            SessionError::Incomplete => defmt::write!(f, "Incomplete"),
            SessionError::NoAccessPoints => defmt::write!(f, "NoAccessPoints"),
        }
    }
}

/// The three round trips of the acquisition sequence.
pub trait LookupService {
    /// Link status; lookups are only attempted while connected.
    fn is_connected(&self) -> bool;

    fn fix(&mut self) -> Result<GeoFix, SessionError>;

    fn timezone(&mut self, fix: &GeoFix) -> Result<TimezoneInfo, SessionError>;

    fn place(&mut self, fix: &GeoFix) -> Result<PlaceName, SessionError>;
}

/// Source of visible WiFi access points.
pub trait WifiScan {
    /// Replaces `out` with the access points currently in range.
    fn scan(&mut self, out: &mut Vec<AccessPoint, MAX_ACCESS_POINTS>);
}

/// [`LookupService`] over HTTP.
#[derive(Debug)]
pub struct HttpLookup<N, D, W> {
    network: N,
    delay: D,
    wifi: W,
    config: Config,
}

impl<N, D, W> HttpLookup<N, D, W>
where
    N: Connect + Link,
    D: Delay,
    W: WifiScan,
{
    pub fn new(network: N, delay: D, wifi: W, config: Config) -> Self {
        Self {
            network,
            delay,
            wifi,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn network_mut(&mut self) -> &mut N {
        &mut self.network
    }

    pub fn into_parts(self) -> (N, D, W) {
        (self.network, self.delay, self.wifi)
    }
}

fn session<L, N, D>(network: &mut N, delay: &mut D, config: &Config, host: &str, path: &str) -> Result<L::Output, SessionError>
where
    L: Lookup,
    N: Connect,
    D: Delay,
{
    let mut reply = FieldMapped::<L>::new();
    get_json(network, delay, host, path, &config.user_agent, &config.retry, &mut reply)?;
    if !reply.has_ended() {
        log::debug!("{}: reply ended without a document", host);
    }
    reply.finish().ok_or(SessionError::Incomplete)
}

impl<N, D, W> LookupService for HttpLookup<N, D, W>
where
    N: Connect + Link,
    D: Delay,
    W: WifiScan,
{
    fn is_connected(&self) -> bool {
        self.network.is_connected()
    }

    fn fix(&mut self) -> Result<GeoFix, SessionError> {
        let mut access_points = Vec::new();
        self.wifi.scan(&mut access_points);
        if access_points.is_empty() {
            return Err(SessionError::NoAccessPoints);
        }
        log::debug!("locating with {} access points", access_points.len());

        let path = fix_path(&access_points)?;
        session::<FixReply, _, _>(&mut self.network, &mut self.delay, &self.config, &self.config.fix_host, &path)
    }

    fn timezone(&mut self, fix: &GeoFix) -> Result<TimezoneInfo, SessionError> {
        let path = timezone_path(fix, &self.config.timezone_key)?;
        session::<TimezoneReply, _, _>(
            &mut self.network,
            &mut self.delay,
            &self.config,
            &self.config.timezone_host,
            &path,
        )
    }

    fn place(&mut self, fix: &GeoFix) -> Result<PlaceName, SessionError> {
        let path = place_path(fix, &self.config.place_user)?;
        session::<PlaceReply, _, _>(
            &mut self.network,
            &mut self.delay,
            &self.config,
            &self.config.place_host,
            &path,
        )
    }
}
