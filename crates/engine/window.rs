use crate::error::{EngineError, Result};
use crate::record::{Dataset, Record};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Closed date interval, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl TimeWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(EngineError::InvalidWindow { start, end });
        }
        Ok(TimeWindow { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", self.start, self.end)
    }
}

/// What to do with a window reaching past the dataset's first or last date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WindowPolicy {
    #[default]
    Clamp,
    Reject,
}

impl WindowPolicy {
    /// Fits `window` into `bounds`. A clamped window must still overlap the bounds.
    pub fn resolve(
        &self,
        window: TimeWindow,
        bounds: (NaiveDate, NaiveDate),
    ) -> Result<TimeWindow> {
        let (min, max) = bounds;
        let out_of_range = EngineError::WindowOutOfRange {
            start: window.start,
            end: window.end,
            min,
            max,
        };
        if window.start >= min && window.end <= max {
            return Ok(window);
        }
        match self {
            WindowPolicy::Reject => Err(out_of_range),
            WindowPolicy::Clamp => {
                if window.end < min || window.start > max {
                    return Err(out_of_range);
                }
                TimeWindow::new(window.start.max(min), window.end.min(max))
            }
        }
    }
}

/// Contiguous, date-ordered run of records inside a window.
#[derive(Debug, Clone, Copy)]
pub struct Subset<'a> {
    records: &'a [Record],
}

impl<'a> Subset<'a> {
    pub fn new(records: &'a [Record]) -> Self {
        Subset { records }
    }

    pub fn records(&self) -> &'a [Record] {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'a, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Records with `date` in `window`, in dataset order.
pub fn filter<'a>(dataset: &'a Dataset, window: &TimeWindow) -> Subset<'a> {
    let records = dataset.records();
    // records are date-sorted, so the window is one contiguous slice
    let lo = records.partition_point(|r| r.date < window.start);
    let hi = records.partition_point(|r| r.date <= window.end);
    Subset::new(&records[lo..hi])
}
