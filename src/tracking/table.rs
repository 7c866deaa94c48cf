use heapless::Vec;

use super::{ENTITY_FIELDS, TrackedEntity, Trail, TrailPoint, entity_id};
use crate::config::{MAX_ENTITIES, TRAIL_LEN, TRAIL_SCRATCH};
use crate::json::{Handler, Path, RawValue, apply_rules, set_truncated};

/// Values per trail group: latitude, longitude, timestamp, altitude.
const GROUP_WIDTH: usize = 4;

const ID_KEY: &str = "Id";
const TRAIL_KEY: &str = "Cos";
const CONFIRM_KEY: &str = "Trt";

/// Fixed-capacity table of tracked entities built from one feed document.
///
/// - `N`: record slots. One is kept free, so at most `N - 1` records are
///   committed and further `Id`s are ignored for the rest of the document.
/// - `TEMP`: trail groups buffered while a trail array streams in. Groups
///   arriving after it is full are dropped.
/// - `TRAIL`: points kept per finished trail (`TRAIL <= TEMP`).
///
/// Each document replaces the previous contents.
#[derive(Debug)]
pub struct TrafficTable<
    const N: usize = MAX_ENTITIES,
    const TEMP: usize = TRAIL_SCRATCH,
    const TRAIL: usize = TRAIL_LEN,
> {
    records: Vec<TrackedEntity, N>,
    trails: Vec<Trail<TRAIL>, N>,
    /// Index of the record receiving fields; `None` while detached.
    cursor: Option<usize>,
    scratch: [TrailPoint; TEMP],
    /// Trail values consumed for the current record.
    trail_cursor: usize,
    saturated: bool,
}

impl<const N: usize, const TEMP: usize, const TRAIL: usize> Default for TrafficTable<N, TEMP, TRAIL> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, const TEMP: usize, const TRAIL: usize> TrafficTable<N, TEMP, TRAIL> {
    const TRAIL_FITS_SCRATCH: () = assert!(TRAIL <= TEMP, "trail longer than its scratch buffer");

    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::TRAIL_FITS_SCRATCH;
        Self {
            records: Vec::new(),
            trails: Vec::new(),
            cursor: None,
            scratch: [TrailPoint::default(); TEMP],
            trail_cursor: 0,
            saturated: false,
        }
    }

    /// Committed records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn record_at(&self, index: usize) -> Option<&TrackedEntity> {
        self.records.get(index)
    }

    /// Trail of record `index`; empty when the feed sent none.
    pub fn trail_at(&self, index: usize) -> Option<&Trail<TRAIL>> {
        self.trails.get(index)
    }

    pub fn records(&self) -> &[TrackedEntity] {
        &self.records
    }

    /// Record with the smallest feed-supplied distance.
    ///
    /// The position arguments are not used for the comparison: the feed
    /// already reports each distance from the query center.
    pub fn closest_to(&self, _lat: f64, _lon: f64) -> Option<&TrackedEntity> {
        self.records
            .iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.trails.clear();
        self.cursor = None;
        self.reset_scratch();
        self.saturated = false;
    }

    fn reset_scratch(&mut self) {
        self.scratch = [TrailPoint::default(); TEMP];
        self.trail_cursor = 0;
    }

    fn open_record(&mut self, value: &RawValue<'_>) {
        if self.records.len() + 1 >= N {
            if !self.saturated {
                log::debug!("traffic table full at {} records", self.records.len());
                self.saturated = true;
            }
            self.cursor = None;
            return;
        }

        let record = TrackedEntity {
            id: entity_id(value),
            ..TrackedEntity::default()
        };
        // Both pushes fit: the guard above keeps a slot free.
        if self.records.push(record).is_err() || self.trails.push(Trail::default()).is_err() {
            self.cursor = None;
            return;
        }
        self.cursor = Some(self.records.len() - 1);
        self.reset_scratch();
    }

    /// Drops the current record if the feed flagged it stale.
    ///
    /// The cursor detaches instead of moving back to the previous record.
    /// Fields and `Cos` groups that follow in the dropped object are
    /// ignored, so they cannot overwrite the previous record's values or
    /// its trail.
    fn confirm_record(&mut self) {
        let Some(index) = self.cursor else {
            return;
        };
        if !self.records[index].stale {
            return;
        }
        log::debug!("dropping stale record {}", self.records[index].id);
        self.records.truncate(index);
        self.trails.truncate(index);
        self.cursor = None;
    }

    fn push_trail_value(&mut self, value: &RawValue<'_>) {
        if self.cursor.is_none() {
            return;
        }
        let group = self.trail_cursor / GROUP_WIDTH;
        let Some(point) = self.scratch.get_mut(group) else {
            return;
        };
        match self.trail_cursor % GROUP_WIDTH {
            0 => point.lat = value.to_f32(),
            1 => point.lon = value.to_f32(),
            3 => point.altitude = value.to_i32(),
            _ => {}
        }
        self.trail_cursor += 1;
    }

    /// Copies the buffered groups into the record's trail, newest first.
    fn finish_trail(&mut self) {
        let Some(index) = self.cursor else {
            return;
        };
        if self.trail_cursor == 0 {
            return;
        }

        let groups = self.trail_cursor / GROUP_WIDTH;
        let mut trail = Trail::default();
        set_truncated(&mut trail.label, &self.records[index].label);
        for point in self.scratch[..groups].iter().rev().take(TRAIL) {
            let _ = trail.points.push(*point);
        }
        self.trails[index] = trail;
        self.reset_scratch();
    }
}

impl<const N: usize, const TEMP: usize, const TRAIL: usize> Handler for TrafficTable<N, TEMP, TRAIL> {
    fn document_start(&mut self) {
        self.clear();
    }

    fn key_value(&mut self, path: &Path<'_>, value: RawValue<'_>) {
        match path.key {
            ID_KEY => self.open_record(&value),
            TRAIL_KEY => self.push_trail_value(&value),
            CONFIRM_KEY => self.confirm_record(),
            _ => {
                if let Some(index) = self.cursor {
                    apply_rules(ENTITY_FIELDS, &mut self.records[index], path, &value);
                }
            }
        }
    }

    fn array_end(&mut self, path: &Path<'_>) {
        if path.key == TRAIL_KEY {
            self.finish_trail();
        }
    }

    fn document_end(&mut self) {
        log::debug!("traffic document: {} records", self.records.len());
    }
}
