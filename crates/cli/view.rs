use clap::ValueEnum;
use engine::views::{BreakdownRow, RankedRow};
use engine::Views;
use polars::prelude::*;
use serde_json::Value;
use std::error::Error;
use ui::data::Panel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewKind {
    Summary,
    Daily,
    Monthly,
    Season,
    Holiday,
    Weekday,
    Rfm,
    DayTypes,
    TopCasual,
    TopRegistered,
    TopTotal,
}

impl ViewKind {
    pub fn name(&self) -> &'static str {
        match self {
            ViewKind::Summary => "summary",
            ViewKind::Daily => "daily",
            ViewKind::Monthly => "monthly",
            ViewKind::Season => "season",
            ViewKind::Holiday => "holiday",
            ViewKind::Weekday => "weekday",
            ViewKind::Rfm => "rfm",
            ViewKind::DayTypes => "day_types",
            ViewKind::TopCasual => "top_casual",
            ViewKind::TopRegistered => "top_registered",
            ViewKind::TopTotal => "top_total",
        }
    }

    pub fn all() -> Vec<ViewKind> {
        ViewKind::value_variants().to_vec()
    }

    /// The view as a dataframe, breakdowns sorted by count for display.
    pub fn frame(&self, views: &Views) -> PolarsResult<DataFrame> {
        match self {
            ViewKind::Summary => DataFrame::new(vec![
                Series::new("start", [views.window.start().to_string()]),
                Series::new("end", [views.window.end().to_string()]),
                Series::new("records", [views.records as u64]),
                Series::new("total_rentals", [views.total_rentals]),
            ]),
            ViewKind::Daily => DataFrame::new(vec![
                Series::new(
                    "date",
                    views.daily.iter().map(|r| r.date.to_string()).collect::<Vec<_>>(),
                ),
                Series::new(
                    "order_count",
                    views.daily.iter().map(|r| r.order_count).collect::<Vec<_>>(),
                ),
                Series::new(
                    "revenue",
                    views.daily.iter().map(|r| r.revenue).collect::<Vec<_>>(),
                ),
            ]),
            ViewKind::Monthly => DataFrame::new(vec![
                Series::new(
                    "month",
                    views.monthly.iter().map(|r| r.month).collect::<Vec<_>>(),
                ),
                Series::new(
                    "total",
                    views.monthly.iter().map(|r| r.total).collect::<Vec<_>>(),
                ),
            ]),
            ViewKind::Season => breakdown_frame("season", &views.by_season),
            ViewKind::Holiday => breakdown_frame("holiday", &views.by_holiday),
            ViewKind::Weekday => breakdown_frame("weekday", &views.by_weekday),
            ViewKind::Rfm => DataFrame::new(vec![
                Series::new("id", views.rfm.iter().map(|r| r.id).collect::<Vec<_>>()),
                Series::new(
                    "recency",
                    views.rfm.iter().map(|r| r.recency).collect::<Vec<_>>(),
                ),
                Series::new(
                    "frequency",
                    views.rfm.iter().map(|r| r.frequency).collect::<Vec<_>>(),
                ),
                Series::new(
                    "monetary",
                    views.rfm.iter().map(|r| r.monetary).collect::<Vec<_>>(),
                ),
            ]),
            ViewKind::DayTypes => DataFrame::new(vec![
                Series::new(
                    "day_type",
                    views.day_types.iter().map(|m| m.day_type).collect::<Vec<_>>(),
                ),
                Series::new(
                    "avg_casual",
                    views.day_types.iter().map(|m| m.avg_casual).collect::<Vec<_>>(),
                ),
                Series::new(
                    "avg_registered",
                    views.day_types.iter().map(|m| m.avg_registered).collect::<Vec<_>>(),
                ),
                Series::new(
                    "avg_total",
                    views.day_types.iter().map(|m| m.avg_total).collect::<Vec<_>>(),
                ),
            ]),
            ViewKind::TopCasual => ranked_frame("casual", &views.top.casual),
            ViewKind::TopRegistered => ranked_frame("registered", &views.top.registered),
            ViewKind::TopTotal => ranked_frame("total", &views.top.total),
        }
    }

    pub fn json(&self, views: &Views) -> serde_json::Result<Value> {
        match self {
            ViewKind::Summary => Ok(serde_json::json!({
                "start": views.window.start(),
                "end": views.window.end(),
                "records": views.records,
                "total_rentals": views.total_rentals,
            })),
            ViewKind::Daily => serde_json::to_value(&views.daily),
            ViewKind::Monthly => serde_json::to_value(&views.monthly),
            ViewKind::Season => serde_json::to_value(&views.by_season),
            ViewKind::Holiday => serde_json::to_value(&views.by_holiday),
            ViewKind::Weekday => serde_json::to_value(&views.by_weekday),
            ViewKind::Rfm => serde_json::to_value(&views.rfm),
            ViewKind::DayTypes => serde_json::to_value(&views.day_types),
            ViewKind::TopCasual => serde_json::to_value(&views.top.casual),
            ViewKind::TopRegistered => serde_json::to_value(&views.top.registered),
            ViewKind::TopTotal => serde_json::to_value(&views.top.total),
        }
    }

    pub fn panel(&self, views: &Views) -> Result<Panel, Box<dyn Error>> {
        let df = self.frame(views)?;
        convert_df_to_panel(self.name(), df)
    }
}

fn breakdown_frame(field: &str, rows: &[BreakdownRow]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Series::new(field, rows.iter().map(|r| r.value.as_str()).collect::<Vec<_>>()),
        Series::new(
            "customer_count",
            rows.iter().map(|r| r.customer_count).collect::<Vec<_>>(),
        ),
    ])?
    .lazy()
    .sort(
        ["customer_count"],
        SortMultipleOptions::default()
            .with_order_descending(true)
            .with_maintain_order(true),
    )
    .collect()
}

fn ranked_frame(measure: &str, rows: &[RankedRow]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Series::new("id", rows.iter().map(|r| r.id).collect::<Vec<_>>()),
        Series::new(measure, rows.iter().map(|r| r.value).collect::<Vec<_>>()),
    ])
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Renders every cell of `df` as text, going through the frame's JSON rows.
pub fn convert_df_to_panel(title: &str, mut df: DataFrame) -> Result<Panel, Box<dyn Error>> {
    let header: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut j = Vec::<u8>::new();
    JsonWriter::new(&mut j)
        .with_json_format(JsonFormat::Json)
        .finish(&mut df)?;
    let objects = serde_json::from_slice::<Vec<serde_json::Map<String, Value>>>(&j)?;
    let rows = objects
        .iter()
        .map(|obj| {
            header
                .iter()
                .map(|name| obj.get(name).map(cell).unwrap_or_default())
                .collect()
        })
        .collect();
    Ok(Panel::new(title, header, rows))
}
