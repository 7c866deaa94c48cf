//! Single-record lookups and their request paths.
//!
//! A lookup reply is a small JSON document of which only a handful of fields
//! matter. Each reply type lists them in a static [`FieldRule`] table keyed
//! by `(parent, key)`; [`FieldMapped`] applies the table while the document
//! streams in and [`Lookup::complete`] decides afterwards whether the
//! mandatory fields were filled. There is no other success signal: a reply
//! that never sets them is a failed lookup, not an error.

use core::fmt::Write;

use base64ct::{Base64, Encoding};
use heapless::String;

use super::{GeoFix, PlaceName, TimezoneInfo};
use crate::config::MAX_ACCESS_POINTS;
use crate::json::{FieldRule, Handler, Path, RawValue, apply_rules, set_truncated};
use crate::network::error::Error;

/// A reply record filled from a static field table.
pub trait Lookup: Default + Sized + 'static {
    /// Result handed to the caller on success.
    type Output;

    /// Fields this reply reads.
    const FIELDS: &'static [FieldRule<Self>];

    /// The result, if every mandatory field was set.
    fn complete(self) -> Option<Self::Output>;
}

/// [`Handler`] that fills one [`Lookup`] record.
#[derive(Debug, Default)]
pub struct FieldMapped<L: Lookup> {
    record: L,
    matched: usize,
    ended: bool,
}

impl<L: Lookup> FieldMapped<L> {
    pub fn new() -> Self {
        Self {
            record: L::default(),
            matched: 0,
            ended: false,
        }
    }

    /// Values that matched a field rule so far.
    pub fn matched(&self) -> usize {
        self.matched
    }

    /// `true` once the document ended, completely or not.
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn record(&self) -> &L {
        &self.record
    }

    pub fn finish(self) -> Option<L::Output> {
        self.record.complete()
    }
}

impl<L: Lookup> Handler for FieldMapped<L> {
    fn document_start(&mut self) {
        self.record = L::default();
        self.matched = 0;
        self.ended = false;
    }

    fn key_value(&mut self, path: &Path<'_>, value: RawValue<'_>) {
        if apply_rules(L::FIELDS, &mut self.record, path, &value) {
            self.matched += 1;
        }
    }

    fn document_end(&mut self) {
        self.ended = true;
    }
}

/// Reply of the WiFi geolocation service: `{"data":{"lat":..,"lon":..}}`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixReply {
    pub fix: GeoFix,
}

impl Lookup for FixReply {
    type Output = GeoFix;

    const FIELDS: &'static [FieldRule<Self>] = &[
        FieldRule {
            parent: Some("data"),
            key: "lat",
            apply: |r, v| r.fix.latitude = v.to_f64(),
        },
        FieldRule {
            parent: Some("data"),
            key: "lon",
            apply: |r, v| r.fix.longitude = v.to_f64(),
        },
    ];

    fn complete(self) -> Option<GeoFix> {
        self.fix.is_valid().then_some(self.fix)
    }
}

/// Reply of the timezone service (root level fields).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimezoneReply {
    pub status: String<16>,
    pub info: TimezoneInfo,
    /// A zero offset is valid, so its presence is tracked separately.
    pub offset_seen: bool,
}

impl Lookup for TimezoneReply {
    type Output = TimezoneInfo;

    const FIELDS: &'static [FieldRule<Self>] = &[
        FieldRule {
            parent: Some(""),
            key: "status",
            apply: |r, v| set_truncated(&mut r.status, v.as_str()),
        },
        FieldRule {
            parent: Some(""),
            key: "gmtOffset",
            apply: |r, v| {
                r.info.utc_offset = v.to_i32();
                r.offset_seen = true;
            },
        },
        FieldRule {
            parent: Some(""),
            key: "dst",
            apply: |r, v| r.info.dst = v.to_bool(),
        },
        FieldRule {
            parent: Some(""),
            key: "abbreviation",
            apply: |r, v| set_truncated(&mut r.info.abbreviation, v.as_str()),
        },
        FieldRule {
            parent: Some(""),
            key: "zoneName",
            apply: |r, v| set_truncated(&mut r.info.zone_name, v.as_str()),
        },
    ];

    fn complete(self) -> Option<TimezoneInfo> {
        (self.offset_seen && self.status != "FAILED").then_some(self.info)
    }
}

/// Reply of the place-name service: `{"geonames":[{"name":..,"countryCode":..}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceReply {
    pub place: PlaceName,
}

impl Lookup for PlaceReply {
    type Output = PlaceName;

    const FIELDS: &'static [FieldRule<Self>] = &[
        FieldRule {
            parent: Some("geonames"),
            key: "name",
            apply: |r, v| set_truncated(&mut r.place.locality, v.as_str()),
        },
        FieldRule {
            parent: Some("geonames"),
            key: "countryName",
            apply: |r, v| set_truncated(&mut r.place.country, v.as_str()),
        },
        FieldRule {
            parent: Some("geonames"),
            key: "countryCode",
            apply: |r, v| set_truncated(&mut r.place.country_code, v.as_str()),
        },
    ];

    fn complete(self) -> Option<PlaceName> {
        let place = self.place;
        (!place.locality.is_empty() && !place.country_code.is_empty()).then_some(place)
    }
}

/// A WiFi network seen by the last scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPoint {
    pub bssid: [u8; 6],
    /// Signal strength (dBm).
    pub rssi: i8,
}

const AP_LIST_LEN: usize = MAX_ACCESS_POINTS * 24;
const AP_LIST_B64_LEN: usize = AP_LIST_LEN.div_ceil(3) * 4;

/// Longest fix request path.
pub const FIX_PATH_LEN: usize = AP_LIST_B64_LEN + 32;
/// Longest timezone or place request path.
pub const LOOKUP_PATH_LEN: usize = 192;

/// Fix request for up to [`MAX_ACCESS_POINTS`] access points, sent as
/// base64 of `AA:BB:CC:DD:EE:FF,-70;...`.
pub fn fix_path(access_points: &[AccessPoint]) -> Result<String<FIX_PATH_LEN>, Error> {
    let mut list: String<AP_LIST_LEN> = String::new();
    for (i, ap) in access_points.iter().take(MAX_ACCESS_POINTS).enumerate() {
        if i > 0 {
            list.push(';').map_err(|_| Error::RequestTooLarge)?;
        }
        let [a, b, c, d, e, f] = ap.bssid;
        write!(
            list,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X},{}",
            a, b, c, d, e, f, ap.rssi
        )
        .map_err(|_| Error::RequestTooLarge)?;
    }

    let mut encoded = [0u8; AP_LIST_B64_LEN];
    let search =
        Base64::encode(list.as_bytes(), &mut encoded).map_err(|_| Error::RequestTooLarge)?;

    let mut path = String::new();
    write!(path, "/geolocation/wifi?v=1.2&search={}", search).map_err(|_| Error::RequestTooLarge)?;
    Ok(path)
}

pub fn timezone_path(fix: &GeoFix, key: &str) -> Result<String<LOOKUP_PATH_LEN>, Error> {
    let mut path = String::new();
    write!(
        path,
        "/v2/get-time-zone?format=json&by=position&lat={:.6}&lng={:.6}&key={}",
        fix.latitude, fix.longitude, key
    )
    .map_err(|_| Error::RequestTooLarge)?;
    Ok(path)
}

pub fn place_path(fix: &GeoFix, user: &str) -> Result<String<LOOKUP_PATH_LEN>, Error> {
    let mut path = String::new();
    write!(
        path,
        "/findNearbyPlaceNameJSON?lat={:.8}&lng={:.8}&username={}",
        fix.latitude, fix.longitude, user
    )
    .map_err(|_| Error::RequestTooLarge)?;
    Ok(path)
}
