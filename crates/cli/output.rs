use crate::source::ExplorerSource;
use crate::view::ViewKind;
use engine::{Explorer, Views};
use log::info;
use polars::prelude::*;
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    CSV,
    JSON,
    TABLE,
    POLAR,
}

impl OutputType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "csv" => Some(OutputType::CSV),
            "json" => Some(OutputType::JSON),
            "table" => Some(OutputType::TABLE),
            "polar" => Some(OutputType::POLAR),
            _ => None,
        }
    }
}

pub trait Output {
    fn output(&self) -> Result<(), Box<dyn Error>>;
}

fn frames(views: &Views, kinds: &[ViewKind]) -> PolarsResult<Vec<(ViewKind, DataFrame)>> {
    kinds
        .iter()
        .map(|kind| Ok((*kind, kind.frame(views)?)))
        .collect()
}

pub struct PolarOutput {
    frames: Vec<(ViewKind, DataFrame)>,
}

impl PolarOutput {
    pub fn new(views: &Views, kinds: &[ViewKind]) -> PolarsResult<Self> {
        Ok(PolarOutput {
            frames: frames(views, kinds)?,
        })
    }
}

impl Output for PolarOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        for (kind, df) in &self.frames {
            println!("{}", kind.name());
            println!("{}", df);
        }
        Ok(())
    }
}

pub struct CsvOutput {
    dir: PathBuf,
    frames: Vec<(ViewKind, DataFrame)>,
}

impl CsvOutput {
    pub fn new(dir: PathBuf, views: &Views, kinds: &[ViewKind]) -> PolarsResult<Self> {
        Ok(CsvOutput {
            dir,
            frames: frames(views, kinds)?,
        })
    }
}

impl Output for CsvOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        std::fs::create_dir_all(&self.dir)?;
        for (kind, df) in &self.frames {
            let filename = self.dir.join(format!("{}.csv", kind.name()));
            let mut file = File::create(&filename)?;
            let mut m_df = df.clone();
            CsvWriter::new(&mut file).finish(&mut m_df)?;
            info!("CSV file written successfully: {:?}", filename);
        }
        Ok(())
    }
}

pub struct JsonOutput {
    value: serde_json::Value,
}

impl JsonOutput {
    pub fn new(views: &Views, kinds: &[ViewKind]) -> serde_json::Result<Self> {
        let mut map = serde_json::Map::new();
        for kind in kinds {
            map.insert(kind.name().to_string(), kind.json(views)?);
        }
        Ok(JsonOutput {
            value: serde_json::Value::Object(map),
        })
    }
}

impl Output for JsonOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        println!("{}", serde_json::to_string_pretty(&self.value)?);
        Ok(())
    }
}

pub struct TableOutput {
    explorer: Explorer,
    kinds: Vec<ViewKind>,
}

impl TableOutput {
    pub fn new(explorer: Explorer, kinds: Vec<ViewKind>) -> Self {
        TableOutput { explorer, kinds }
    }
}

impl Output for TableOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        let source = ExplorerSource::new(self.explorer.clone(), self.kinds.clone());
        ui::tui::run(source)
    }
}

pub fn get_output(
    output_type: OutputType,
    explorer: Explorer,
    kinds: Vec<ViewKind>,
    out_dir: PathBuf,
) -> Result<Box<dyn Output>, Box<dyn Error>> {
    Ok(match output_type {
        OutputType::TABLE => Box::new(TableOutput::new(explorer, kinds)),
        OutputType::CSV => Box::new(CsvOutput::new(out_dir, explorer.views(), &kinds)?),
        OutputType::JSON => Box::new(JsonOutput::new(explorer.views(), &kinds)?),
        OutputType::POLAR => Box::new(PolarOutput::new(explorer.views(), &kinds)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use engine::{Record, Subset, TimeWindow};

    fn views() -> Views {
        let records: Vec<Record> = [(1, "2011-01-01", 4), (2, "2011-01-02", 6)]
            .iter()
            .map(|&(id, date, total)| Record {
                id,
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                season: "1".to_string(),
                holiday: "0".to_string(),
                weekday: "6".to_string(),
                casual: 1,
                registered: total - 1,
                total,
                secondary_total: total,
            })
            .collect();
        let window = TimeWindow::new(records[0].date, records[1].date).unwrap();
        Views::compute(window, Subset::new(&records), 5)
    }

    #[test]
    fn test_csv_output_writes_one_file_per_view() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let kinds = ViewKind::all();
        CsvOutput::new(out.clone(), &views(), &kinds)
            .unwrap()
            .output()
            .unwrap();
        for kind in &kinds {
            let path = out.join(format!("{}.csv", kind.name()));
            assert!(path.is_file(), "{:?} not written", path);
        }
        let daily = std::fs::read_to_string(out.join("daily.csv")).unwrap();
        assert!(daily.starts_with("date,order_count,revenue"), "{}", daily);
    }

    #[test]
    fn test_json_output_keys() {
        let output = JsonOutput::new(&views(), &[ViewKind::Daily, ViewKind::Rfm]).unwrap();
        let mut keys: Vec<&str> = output
            .value
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        keys.sort();
        assert_eq!(keys, vec!["daily", "rfm"]);
        assert_eq!(output.value["daily"].as_array().unwrap().len(), 2);
    }
}
