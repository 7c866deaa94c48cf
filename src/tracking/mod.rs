//! Live traffic feed ingestion.
//!
//! The feed is one large JSON document listing every aircraft around a
//! position, each with a flattened trail array. [`TrafficTable`] consumes it
//! as a [`Handler`](crate::json::Handler) and keeps a fixed number of
//! [`TrackedEntity`] records plus one bounded [`Trail`] per record.
//!
//! ```text
//! {"acList":[{"Id":4195, "Call":"SWR123", "Lat":47.4, ..., "Cos":[lat,lon,t,alt, ...]}, ...]}
//!             │           └─ ENTITY_FIELDS ─┘                └─ trail decoder ─┘
//!             └─ opens a record
//! ```
//!
//! Every record field is mapped through the static [`ENTITY_FIELDS`] table.
//! Three keys are structural and handled by the table itself: `Id` opens a
//! record, `Cos` feeds its trail and `Trt` rolls back a record flagged stale.

use heapless::{String, Vec};

use crate::json::{FieldRule, RawValue, set_truncated};

pub mod client;
mod table;

pub use client::{TrafficQuery, refresh};
pub use table::TrafficTable;

/// Short display label (call sign) capacity.
pub const LABEL_LEN: usize = 12;
/// Model description capacity.
pub const MODEL_LEN: usize = 24;
/// Route endpoint label capacity.
pub const ENDPOINT_LEN: usize = 16;

/// One tracked aircraft.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedEntity {
    pub id: u32,
    /// Call sign.
    pub label: String<LABEL_LEN>,
    pub model: String<MODEL_LEN>,
    pub lat: f32,
    pub lon: f32,
    /// Feet.
    pub altitude: i32,
    /// Degrees from north.
    pub heading: f32,
    /// Knots.
    pub speed: f32,
    /// Distance from the query center as computed by the feed (km).
    pub distance: f32,
    pub origin: String<ENDPOINT_LEN>,
    pub destination: String<ENDPOINT_LEN>,
    /// Position not refreshed recently.
    pub stale: bool,
}

/// One historical position of a trail.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrailPoint {
    pub lat: f32,
    pub lon: f32,
    pub altitude: i32,
}

/// Position history of one entity, newest point first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trail<const TRAIL: usize> {
    /// Label of the entity when the trail was decoded.
    pub label: String<LABEL_LEN>,
    pub points: Vec<TrailPoint, TRAIL>,
}

impl<const TRAIL: usize> Trail<TRAIL> {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// `"LSZH Zurich, Switzerland"` → `"Zurich"`: drops the 4-letter airport
/// code and keeps the text up to the first comma.
fn endpoint_label<const N: usize>(dst: &mut String<N>, raw: &str) {
    let rest = raw.get(4..).unwrap_or("");
    let rest = rest.split(',').next().unwrap_or(rest);
    set_truncated(dst, rest.trim_start());
}

/// Field table applied to the record currently receiving values.
pub static ENTITY_FIELDS: &[FieldRule<TrackedEntity>] = &[
    FieldRule {
        parent: None,
        key: "Call",
        apply: |e, v| set_truncated(&mut e.label, v.as_str()),
    },
    FieldRule {
        parent: None,
        key: "Mdl",
        apply: |e, v| set_truncated(&mut e.model, v.as_str()),
    },
    FieldRule {
        parent: None,
        key: "From",
        apply: |e, v| endpoint_label(&mut e.origin, v.as_str()),
    },
    FieldRule {
        parent: None,
        key: "To",
        apply: |e, v| endpoint_label(&mut e.destination, v.as_str()),
    },
    FieldRule {
        parent: None,
        key: "Dst",
        apply: |e, v| e.distance = v.to_f32(),
    },
    FieldRule {
        parent: None,
        key: "Trak",
        apply: |e, v| e.heading = v.to_f32(),
    },
    FieldRule {
        parent: None,
        key: "Alt",
        apply: |e, v| e.altitude = v.to_i32(),
    },
    FieldRule {
        parent: None,
        key: "Lat",
        apply: |e, v| e.lat = v.to_f32(),
    },
    FieldRule {
        parent: None,
        key: "Long",
        apply: |e, v| e.lon = v.to_f32(),
    },
    FieldRule {
        parent: None,
        key: "Spd",
        apply: |e, v| e.speed = v.to_f32(),
    },
    FieldRule {
        parent: None,
        key: "PosStale",
        apply: |e, v| e.stale = v.as_str() == "true",
    },
];

/// Reads the identifier of an `Id` value; anything unparsable is `0`.
fn entity_id(value: &RawValue<'_>) -> u32 {
    u32::try_from(value.to_i32()).unwrap_or(0)
}
