//! Device geolocation: coordinates, timezone and place name.
//!
//! The device learns where it is in three network round trips, each against
//! a different service:
//!
//! 1. **fix**: WiFi access points → coordinates ([`GeoFix`])
//! 2. **timezone**: coordinates → UTC offset and DST ([`TimezoneInfo`])
//! 3. **place**: coordinates → locality and country ([`PlaceName`])
//!
//! Each reply is read by a [`lookup::FieldMapped`] consumer driven by a
//! static field table. [`acquisition::Acquisition`] runs the three steps as a
//! resumable state machine under the cooperative scheduler and publishes the
//! results into a [`GeoContext`] owned by the caller.

use heapless::String;

pub mod acquisition;
pub mod lookup;
pub mod service;

pub use acquisition::{Acquisition, AcquisitionState, Step, StepFailure};
pub use lookup::{AccessPoint, FieldMapped, FixReply, Lookup, PlaceReply, TimezoneReply};
pub use service::{HttpLookup, LookupService, SessionError, WifiScan};

/// Capacity of the short timezone strings.
pub const ZONE_LEN: usize = 32;
/// Capacity of place strings.
pub const PLACE_LEN: usize = 32;

/// Coordinates of the device.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoFix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// A coordinate of exactly zero means the service returned nothing.
    pub fn is_valid(&self) -> bool {
        self.latitude != 0.0 && self.longitude != 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimezoneInfo {
    /// Current offset from UTC in seconds, DST included.
    pub utc_offset: i32,
    pub dst: bool,
    /// e.g. `CEST`
    pub abbreviation: String<ZONE_LEN>,
    /// e.g. `Europe/Zurich`
    pub zone_name: String<ZONE_LEN>,
}

impl TimezoneInfo {
    /// Offset from UTC without the daylight saving hour.
    pub fn standard_offset_seconds(&self) -> i32 {
        if self.dst {
            self.utc_offset - 3_600
        } else {
            self.utc_offset
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceName {
    pub locality: String<PLACE_LEN>,
    pub country: String<PLACE_LEN>,
    /// ISO 3166 alpha-2.
    pub country_code: String<4>,
}

/// Location knowledge shared with the rest of the firmware.
///
/// Written only by [`Acquisition`]; everything else reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoContext {
    pub(crate) fix: Option<GeoFix>,
    pub(crate) timezone: Option<TimezoneInfo>,
    pub(crate) place: Option<PlaceName>,
    pub(crate) valid: bool,
}

impl GeoContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fix(&self) -> Option<&GeoFix> {
        self.fix.as_ref()
    }

    pub fn timezone(&self) -> Option<&TimezoneInfo> {
        self.timezone.as_ref()
    }

    pub fn place(&self) -> Option<&PlaceName> {
        self.place.as_ref()
    }

    /// `true` once all three steps completed since the last disconnect.
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}
