//! Traffic feed requests.

use core::fmt::Write;
use heapless::String;

use super::TrafficTable;
use crate::config::Config;
use crate::network::Connect;
use crate::network::application::http::get_json;
use crate::network::error::Error;
use crate::system::Delay;

/// Longest rendered feed path.
pub const QUERY_LEN: usize = 192;

/// Area and altitude band of a feed request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficQuery {
    pub lat: f64,
    pub lon: f64,
    /// Search radius around the center (km).
    pub max_distance_km: u32,
    /// Altitude band (feet).
    pub min_altitude_ft: i32,
    pub max_altitude_ft: i32,
}

impl TrafficQuery {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            max_distance_km: 20,
            min_altitude_ft: 1_500,
            max_altitude_ft: 45_000,
        }
    }

    /// Request path, including the trail format switch.
    pub fn path(&self) -> Result<String<QUERY_LEN>, Error> {
        let mut path = String::new();
        write!(
            path,
            "/VirtualRadar/AircraftList.json?lat={:.6}&lng={:.6}&fDstL=0&fDstU={}&fAltL={}&fAltU={}&trFmt=sa",
            self.lat, self.lon, self.max_distance_km, self.min_altitude_ft, self.max_altitude_ft
        )
        .map_err(|_| Error::RequestTooLarge)?;
        Ok(path)
    }
}

/// Fetches the feed for `query` into `table`, replacing its contents.
///
/// Returns the number of committed records. On failure the table holds
/// whatever the partial document produced.
pub fn refresh<N, D, const MAX: usize, const TEMP: usize, const TRAIL: usize>(
    network: &mut N,
    delay: &mut D,
    config: &Config,
    query: &TrafficQuery,
    table: &mut TrafficTable<MAX, TEMP, TRAIL>,
) -> Result<usize, Error>
where
    N: Connect,
    D: Delay,
{
    let path = query.path()?;
    get_json(
        network,
        delay,
        &config.traffic_host,
        &path,
        &config.user_agent,
        &config.retry,
        table,
    )?;
    log::info!("traffic: {} aircraft", table.record_count());
    Ok(table.record_count())
}
