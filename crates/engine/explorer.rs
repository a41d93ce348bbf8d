use crate::error::{EngineError, Result};
use crate::record::Dataset;
use crate::views::Views;
use crate::window::{filter, TimeWindow, WindowPolicy};
use chrono::{Duration, NaiveDate};
use log::{debug, warn};
use std::sync::Arc;

/// Current window over a shared dataset and the views computed for it.
///
/// A rejected window change leaves both the window and the views untouched.
#[derive(Debug, Clone)]
pub struct Explorer {
    dataset: Arc<Dataset>,
    bounds: (NaiveDate, NaiveDate),
    policy: WindowPolicy,
    top_n: usize,
    views: Views,
}

impl Explorer {
    /// Starts on the dataset's full date range.
    pub fn new(dataset: Arc<Dataset>, policy: WindowPolicy, top_n: usize) -> Result<Self> {
        let bounds = dataset.bounds().ok_or(EngineError::EmptyDataset)?;
        let window = TimeWindow::new(bounds.0, bounds.1)?;
        let views = Views::compute(window, filter(&dataset, &window), top_n);
        Ok(Explorer {
            dataset,
            bounds,
            policy,
            top_n,
            views,
        })
    }

    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        self.bounds
    }

    pub fn window(&self) -> TimeWindow {
        self.views.window
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    pub fn set_window(&mut self, start: NaiveDate, end: NaiveDate) -> Result<&Views> {
        let window = TimeWindow::new(start, end)
            .and_then(|w| self.policy.resolve(w, self.bounds))
            .map_err(|e| {
                warn!("window change rejected, keeping {}: {}", self.views.window, e);
                e
            })?;
        debug!("window changed: {} -> {}", self.views.window, window);
        self.views = Views::compute(window, filter(&self.dataset, &window), self.top_n);
        Ok(&self.views)
    }

    pub fn shift_start(&mut self, days: i64) -> Result<&Views> {
        let w = self.window();
        self.set_window(w.start() + Duration::days(days), w.end())
    }

    pub fn shift_end(&mut self, days: i64) -> Result<&Views> {
        let w = self.window();
        self.set_window(w.start(), w.end() + Duration::days(days))
    }

    pub fn reset(&mut self) -> Result<&Views> {
        let (min, max) = self.bounds;
        self.set_window(min, max)
    }
}
