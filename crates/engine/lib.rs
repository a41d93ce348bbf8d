pub mod error;
pub mod explorer;
pub mod record;
pub mod views;
pub mod window;

pub use error::{EngineError, Result};
pub use explorer::Explorer;
pub use record::{Dataset, Record, Schema};
pub use views::{CategoryField, CountMode, Views};
pub use window::{filter, Subset, TimeWindow, WindowPolicy};
