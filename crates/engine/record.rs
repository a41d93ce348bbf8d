use crate::error::{EngineError, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y-%m-%d %H:%M:%S"];

/// One rental row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub id: u64,
    pub date: NaiveDate,
    pub season: String,
    pub holiday: String,
    pub weekday: String,
    pub casual: u64,
    pub registered: u64,
    /// Primary total count, summed into revenue and monetary.
    pub total: u64,
    /// Registered plus casual total, summed into monthly totals and frequency.
    pub secondary_total: u64,
}

/// Header names the loader looks up for each record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub id: String,
    pub date: String,
    pub season: String,
    pub holiday: String,
    pub weekday: String,
    pub casual: String,
    pub registered: String,
    pub total: String,
    pub secondary_total: String,
}

impl Default for Schema {
    fn default() -> Self {
        Schema {
            id: "instant".to_string(),
            date: "dteday_x".to_string(),
            season: "season_x".to_string(),
            holiday: "holiday_x".to_string(),
            weekday: "weekday_x".to_string(),
            casual: "casual_y".to_string(),
            registered: "registered_y".to_string(),
            total: "cnt_x".to_string(),
            secondary_total: "cnt_y".to_string(),
        }
    }
}

/// Column positions resolved from the header line.
struct Positions {
    id: usize,
    date: usize,
    season: usize,
    holiday: usize,
    weekday: usize,
    casual: usize,
    registered: usize,
    total: usize,
    secondary_total: usize,
}

impl Positions {
    fn resolve(headers: &StringRecord, schema: &Schema) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| EngineError::schema(name, 1, "is missing from the header"))
        };
        Ok(Positions {
            id: find(&schema.id)?,
            date: find(&schema.date)?,
            season: find(&schema.season)?,
            holiday: find(&schema.holiday)?,
            weekday: find(&schema.weekday)?,
            casual: find(&schema.casual)?,
            registered: find(&schema.registered)?,
            total: find(&schema.total)?,
            secondary_total: find(&schema.secondary_total)?,
        })
    }
}

/// A row being parsed, carrying its line number for error reporting.
struct Row<'a> {
    record: &'a StringRecord,
    line: u64,
}

impl<'a> Row<'a> {
    fn text(&self, pos: usize, field: &str) -> Result<&'a str> {
        match self.record.get(pos) {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(EngineError::schema(field, self.line, "has a missing value")),
        }
    }

    fn count(&self, pos: usize, field: &str) -> Result<u64> {
        let s = self.text(pos, field)?;
        s.parse::<u64>().map_err(|_| {
            EngineError::schema(
                field,
                self.line,
                format!("is not a non-negative integer: {:?}", s),
            )
        })
    }

    fn date(&self, pos: usize, field: &str) -> Result<NaiveDate> {
        let s = self.text(pos, field)?;
        DATE_FORMATS
            .iter()
            .find_map(|fmt| {
                NaiveDate::parse_from_str(s, fmt).ok().or_else(|| {
                    chrono::NaiveDateTime::parse_from_str(s, fmt)
                        .ok()
                        .map(|dt| dt.date())
                })
            })
            .ok_or_else(|| {
                EngineError::schema(field, self.line, format!("is not a date: {:?}", s))
            })
    }
}

/// The full, date-sorted table. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Sorts `records` by date, keeping the relative order of same-day rows.
    pub fn new(mut records: Vec<Record>) -> Self {
        records.sort_by_key(|r| r.date);
        let mut seen = HashSet::with_capacity(records.len());
        let duplicates = records.iter().filter(|r| !seen.insert(r.id)).count();
        if duplicates > 0 {
            warn!("dataset has {} rows with a duplicate id", duplicates);
        }
        Dataset { records }
    }

    pub fn from_path<P: AsRef<Path>>(path: P, schema: &Schema) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| EngineError::Io(path.to_path_buf(), e))?;
        let dataset = Self::from_reader(file, schema)?;
        info!("dataset loaded: {:?}, {} records", path, dataset.len());
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R, schema: &Schema) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        let pos = Positions::resolve(rdr.headers()?, schema)?;

        let mut records = vec![];
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let row = Row {
                record: &record,
                line,
            };
            records.push(Record {
                id: row.count(pos.id, &schema.id)?,
                date: row.date(pos.date, &schema.date)?,
                season: row.text(pos.season, &schema.season)?.to_string(),
                holiday: row.text(pos.holiday, &schema.holiday)?.to_string(),
                weekday: row.text(pos.weekday, &schema.weekday)?.to_string(),
                casual: row.count(pos.casual, &schema.casual)?,
                registered: row.count(pos.registered, &schema.registered)?,
                total: row.count(pos.total, &schema.total)?,
                secondary_total: row.count(pos.secondary_total, &schema.secondary_total)?,
            });
        }
        debug!("parsed {} csv rows", records.len());
        Ok(Dataset::new(records))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last date, or `None` for an empty dataset.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}
