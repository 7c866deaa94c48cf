//! Rolling sample store for the scrolling linear/log chart.
//!
//! The chart is `N` pixel columns wide, one sample per column, the oldest
//! on the left. The bottom decade is linear (0..10), every decade above it
//! logarithmic. Samples are stored already mapped to a plot height so a
//! redraw never recomputes them; when the store is full, pushing a sample
//! evicts the leftmost column and the caller scrolls the rest one column
//! left.

use crate::collections::RingBuffer;
use crate::config::CHART_DEPTH;

/// `log10(0..=10)`; the entry for 0 is never used.
const LOG10: [f32; 11] = [
    -1.0,
    0.0,
    0.301_03,
    0.477_121_25,
    0.602_06,
    0.698_97,
    0.778_151_25,
    0.845_098_04,
    0.903_09,
    0.954_242_5,
    1.0,
];

/// What a [`LogChart::push`] changed on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartUpdate {
    /// Height of the new rightmost sample, `None` when off-chart.
    pub plotted: Option<i16>,
    /// Height of the sample that left the chart, if one did.
    pub evicted: Option<i16>,
    /// The chart was full, every column moved one step left.
    pub scrolled: bool,
}

#[derive(Debug)]
pub struct LogChart<const N: usize = CHART_DEPTH> {
    height: i16,
    decades: u8,
    decade_height: f32,
    samples: RingBuffer<Option<i16>, N>,
}

impl<const N: usize> LogChart<N> {
    /// A chart `height` pixels tall spanning `decades` decades (at least 1).
    pub fn new(height: i16, decades: u8) -> Self {
        let decades = decades.max(1);
        Self {
            height,
            decades,
            decade_height: f32::from(height) / f32::from(decades),
            samples: RingBuffer::new(),
        }
    }

    pub fn height(&self) -> i16 {
        self.height
    }

    pub fn decades(&self) -> u8 {
        self.decades
    }

    /// Pixels per decade.
    pub fn decade_height(&self) -> f32 {
        self.decade_height
    }

    /// Plot height of `value`, `None` when below zero or above the top.
    pub fn plot_value(&self, value: i32) -> Option<i16> {
        if value < 0 {
            return None;
        }
        let scaled = if value >= 10 {
            log10(value) * self.decade_height
        } else {
            value as f32 * self.decade_height / 10.0
        };
        let y = scaled as i32;
        if y > i32::from(self.height) {
            return None;
        }
        i16::try_from(y).ok()
    }

    /// Appends a sample as the rightmost column.
    pub fn push(&mut self, value: i32) -> ChartUpdate {
        let plotted = self.plot_value(value);
        let mut update = ChartUpdate {
            plotted,
            evicted: None,
            scrolled: false,
        };
        if self.samples.is_full() {
            update.scrolled = true;
            update.evicted = self.samples.pull().ok().flatten();
        }
        self.samples.add(plotted);
        update
    }

    /// Plot height of column `x` (0 is the leftmost, oldest sample).
    pub fn column(&self, x: usize) -> Option<i16> {
        let count = self.samples.count();
        if x >= count {
            return None;
        }
        self.samples.peek(count - 1 - x).ok().copied().flatten()
    }

    /// `(x, height)` of every plotted column, left to right.
    pub fn points(&self) -> impl Iterator<Item = (usize, i16)> + '_ {
        (0..self.samples.count()).filter_map(move |x| self.column(x).map(|y| (x, y)))
    }

    pub fn count(&self) -> usize {
        self.samples.count()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// `log10` for `value >= 1`, interpolated within each decade.
fn log10(value: i32) -> f32 {
    let mut decade = 0u8;
    let mut scale = 1i64;
    while i64::from(value) >= scale * 10 {
        scale *= 10;
        decade += 1;
    }
    let mantissa = value as f32 / scale as f32;
    let index = (mantissa as usize).clamp(1, 9);
    let fraction = mantissa - index as f32;
    f32::from(decade) + LOG10[index] + fraction * (LOG10[index + 1] - LOG10[index])
}
