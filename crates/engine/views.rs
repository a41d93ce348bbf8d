//! Derived views over a window's subset.
//!
//! Every function here is a pure function of its subset: no view keeps state
//! between window changes, and an empty subset yields empty (or zero) views.

use crate::record::Record;
use crate::window::{Subset, TimeWindow};
use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

const NON_HOLIDAY: &str = "0";
const HOLIDAY: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub order_count: u64,
    pub revenue: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRow {
    /// Calendar month, 1..=12, shared by every year in the window.
    pub month: u32,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownRow {
    pub value: String,
    pub customer_count: u64,
}

/// One output row per input record; `frequency` and `monetary` are the
/// per-id sums joined back onto each of that id's rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RfmRow {
    pub id: u64,
    /// Days between this row's date and the latest date of the subset.
    pub recency: i64,
    pub frequency: u64,
    pub monetary: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTypeMetrics {
    pub day_type: &'static str,
    pub avg_casual: Option<f64>,
    pub avg_registered: Option<f64>,
    pub avg_total: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedRow {
    pub id: u64,
    pub value: u64,
}

/// Top non-holiday records per user kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopRecords {
    /// Fewest casual users first.
    pub casual: Vec<RankedRow>,
    pub registered: Vec<RankedRow>,
    pub total: Vec<RankedRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountMode {
    DistinctEntities,
    RowCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Season,
    Holiday,
    Weekday,
}

impl CategoryField {
    /// Seasons count rows, the other breakdowns count distinct ids.
    pub fn count_mode(&self) -> CountMode {
        match self {
            CategoryField::Season => CountMode::RowCount,
            CategoryField::Holiday | CategoryField::Weekday => CountMode::DistinctEntities,
        }
    }

    fn value<'r>(&self, record: &'r Record) -> &'r str {
        match self {
            CategoryField::Season => &record.season,
            CategoryField::Holiday => &record.holiday,
            CategoryField::Weekday => &record.weekday,
        }
    }
}

pub fn daily_rollup(subset: Subset) -> Vec<DailyRow> {
    let mut grouped: BTreeMap<NaiveDate, (HashSet<u64>, u64)> = BTreeMap::new();
    for record in subset.iter() {
        let (ids, revenue) = grouped.entry(record.date).or_default();
        ids.insert(record.id);
        *revenue += record.total;
    }
    grouped
        .into_iter()
        .map(|(date, (ids, revenue))| DailyRow {
            date,
            order_count: ids.len() as u64,
            revenue,
        })
        .collect()
}

pub fn monthly_rollup(subset: Subset) -> Vec<MonthlyRow> {
    let mut grouped: BTreeMap<u32, u64> = BTreeMap::new();
    for record in subset.iter() {
        *grouped.entry(record.date.month()).or_default() += record.secondary_total;
    }
    grouped
        .into_iter()
        .map(|(month, total)| MonthlyRow { month, total })
        .collect()
}

pub fn breakdown(subset: Subset, field: CategoryField, mode: CountMode) -> Vec<BreakdownRow> {
    let mut grouped: BTreeMap<&str, (HashSet<u64>, u64)> = BTreeMap::new();
    for record in subset.iter() {
        let (ids, rows) = grouped.entry(field.value(record)).or_default();
        ids.insert(record.id);
        *rows += 1;
    }
    grouped
        .into_iter()
        .map(|(value, (ids, rows))| BreakdownRow {
            value: value.to_string(),
            customer_count: match mode {
                CountMode::DistinctEntities => ids.len() as u64,
                CountMode::RowCount => rows,
            },
        })
        .collect()
}

pub fn rfm_summary(subset: Subset) -> Vec<RfmRow> {
    let Some(recent) = subset.iter().map(|r| r.date).max() else {
        return vec![];
    };
    let mut sums: HashMap<u64, (u64, u64)> = HashMap::new();
    for record in subset.iter() {
        let (frequency, monetary) = sums.entry(record.id).or_default();
        *frequency += record.secondary_total;
        *monetary += record.total;
    }
    subset
        .iter()
        .map(|record| {
            let (frequency, monetary) = sums[&record.id];
            RfmRow {
                id: record.id,
                recency: (recent - record.date).num_days(),
                frequency,
                monetary,
            }
        })
        .collect()
}

pub fn total_rentals(daily: &[DailyRow]) -> u64 {
    daily.iter().map(|row| row.revenue).sum()
}

fn mean(values: impl Iterator<Item = u64>, places: i32) -> Option<f64> {
    let (sum, n) = values.fold((0u64, 0u64), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        return None;
    }
    let scale = 10f64.powi(places);
    Some((sum as f64 / n as f64 * scale).round() / scale)
}

/// Average user counts on non-holidays and on holidays.
pub fn day_type_metrics(subset: Subset) -> Vec<DayTypeMetrics> {
    [("weekday", NON_HOLIDAY), ("holiday", HOLIDAY)]
        .into_iter()
        .map(|(day_type, flag)| {
            let rows = || subset.iter().filter(move |r| r.holiday == flag);
            DayTypeMetrics {
                day_type,
                avg_casual: mean(rows().map(|r| r.casual), 1),
                avg_registered: mean(rows().map(|r| r.registered), 2),
                avg_total: mean(rows().map(|r| r.secondary_total), 2),
            }
        })
        .collect()
}

fn ranked<F>(rows: &[&Record], n: usize, value: F, descending: bool) -> Vec<RankedRow>
where
    F: Fn(&Record) -> u64,
{
    let mut sorted = rows.to_vec();
    // stable, so equal values keep subset order
    if descending {
        sorted.sort_by(|a, b| value(*b).cmp(&value(*a)));
    } else {
        sorted.sort_by_key(|r| value(*r));
    }
    sorted
        .into_iter()
        .take(n)
        .map(|r| RankedRow {
            id: r.id,
            value: value(r),
        })
        .collect()
}

pub fn top_records(subset: Subset, n: usize) -> TopRecords {
    let rows: Vec<&Record> = subset.iter().filter(|r| r.holiday == NON_HOLIDAY).collect();
    TopRecords {
        casual: ranked(&rows, n, |r| r.casual, false),
        registered: ranked(&rows, n, |r| r.registered, true),
        total: ranked(&rows, n, |r| r.secondary_total, true),
    }
}

/// Every view of one window, computed together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Views {
    pub window: TimeWindow,
    pub records: usize,
    pub total_rentals: u64,
    pub daily: Vec<DailyRow>,
    pub monthly: Vec<MonthlyRow>,
    pub by_season: Vec<BreakdownRow>,
    pub by_holiday: Vec<BreakdownRow>,
    pub by_weekday: Vec<BreakdownRow>,
    pub rfm: Vec<RfmRow>,
    pub day_types: Vec<DayTypeMetrics>,
    pub top: TopRecords,
}

impl Views {
    pub fn compute(window: TimeWindow, subset: Subset, top_n: usize) -> Self {
        let by = |field: CategoryField| breakdown(subset, field, field.count_mode());
        let daily = daily_rollup(subset);
        let views = Views {
            window,
            records: subset.len(),
            total_rentals: total_rentals(&daily),
            daily,
            monthly: monthly_rollup(subset),
            by_season: by(CategoryField::Season),
            by_holiday: by(CategoryField::Holiday),
            by_weekday: by(CategoryField::Weekday),
            rfm: rfm_summary(subset),
            day_types: day_type_metrics(subset),
            top: top_records(subset, top_n),
        };
        debug!(
            "views computed for {}: {} records, {} days",
            window,
            views.records,
            views.daily.len()
        );
        views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::record;

    fn with(id: u64, date: &str, total: u64, f: impl FnOnce(&mut Record)) -> Record {
        let mut r = record(id, date, total);
        f(&mut r);
        r
    }

    fn distinct_ids(records: &[Record]) -> usize {
        records.iter().map(|r| r.id).collect::<HashSet<_>>().len()
    }

    #[test]
    fn test_daily_and_monthly_example() {
        let records = vec![record(1, "2024-01-01", 5), record(1, "2024-01-02", 3)];
        let subset = Subset::new(&records);

        let monthly = monthly_rollup(subset);
        assert_eq!(monthly, vec![MonthlyRow { month: 1, total: 8 }]);

        let daily = daily_rollup(subset);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date.to_string(), "2024-01-01");
        assert_eq!((daily[0].order_count, daily[0].revenue), (1, 5));
        assert_eq!(daily[1].date.to_string(), "2024-01-02");
        assert_eq!((daily[1].order_count, daily[1].revenue), (1, 3));
        assert_eq!(total_rentals(&daily), 8);
    }

    #[test]
    fn test_daily_counts_distinct_ids_and_keeps_gaps() {
        let records = vec![
            record(1, "2011-01-01", 2),
            record(1, "2011-01-01", 4),
            record(2, "2011-01-01", 1),
            record(3, "2011-01-05", 7),
        ];
        let daily = daily_rollup(Subset::new(&records));
        assert_eq!(daily.len(), 2);
        assert_eq!((daily[0].order_count, daily[0].revenue), (2, 7));
        assert_eq!(daily[1].date.to_string(), "2011-01-05");
        assert!(daily.windows(2).all(|w| w[0].date < w[1].date));
        // ids may repeat across days, so only the row count bounds the sum
        let orders: u64 = daily.iter().map(|d| d.order_count).sum();
        assert!(orders as usize <= records.len());
    }

    #[test]
    fn test_monthly_merges_years() {
        let records = vec![
            with(1, "2011-01-10", 0, |r| r.secondary_total = 10),
            with(2, "2011-02-10", 0, |r| r.secondary_total = 1),
            with(3, "2012-01-10", 0, |r| r.secondary_total = 5),
        ];
        let monthly = monthly_rollup(Subset::new(&records));
        assert_eq!(
            monthly,
            vec![
                MonthlyRow { month: 1, total: 15 },
                MonthlyRow { month: 2, total: 1 },
            ]
        );
    }

    #[test]
    fn test_breakdown_row_count() {
        let records: Vec<Record> = ["A", "B", "A", "A", "B"]
            .iter()
            .map(|value| with(1, "2011-01-01", 1, |r| r.season = value.to_string()))
            .collect();
        let rows = breakdown(Subset::new(&records), CategoryField::Season, CountMode::RowCount);
        assert_eq!(
            rows,
            vec![
                BreakdownRow {
                    value: "A".to_string(),
                    customer_count: 3,
                },
                BreakdownRow {
                    value: "B".to_string(),
                    customer_count: 2,
                },
            ]
        );
        let sum: u64 = rows.iter().map(|r| r.customer_count).sum();
        assert_eq!(sum as usize, records.len());
    }

    #[test]
    fn test_breakdown_distinct_entities() {
        let records = vec![
            with(1, "2011-01-01", 1, |r| r.weekday = "6".to_string()),
            with(1, "2011-01-02", 1, |r| r.weekday = "6".to_string()),
            with(2, "2011-01-03", 1, |r| r.weekday = "0".to_string()),
            with(3, "2011-01-04", 1, |r| r.weekday = "6".to_string()),
        ];
        let rows = breakdown(
            Subset::new(&records),
            CategoryField::Weekday,
            CountMode::DistinctEntities,
        );
        assert_eq!(
            rows[0],
            BreakdownRow {
                value: "0".to_string(),
                customer_count: 1,
            }
        );
        assert_eq!(
            rows[1],
            BreakdownRow {
                value: "6".to_string(),
                customer_count: 2,
            }
        );
        let sum: u64 = rows.iter().map(|r| r.customer_count).sum();
        assert!(sum as usize <= distinct_ids(&records));
    }

    #[test]
    fn test_count_modes_per_field() {
        assert_eq!(CategoryField::Season.count_mode(), CountMode::RowCount);
        assert_eq!(CategoryField::Holiday.count_mode(), CountMode::DistinctEntities);
        assert_eq!(CategoryField::Weekday.count_mode(), CountMode::DistinctEntities);
    }

    #[test]
    fn test_rfm_is_a_join() {
        let records = vec![
            with(1, "2011-01-01", 5, |r| r.secondary_total = 6),
            with(2, "2011-01-02", 1, |r| r.secondary_total = 2),
            with(1, "2011-01-04", 3, |r| r.secondary_total = 4),
        ];
        let rfm = rfm_summary(Subset::new(&records));
        assert_eq!(rfm.len(), records.len());
        assert_eq!(
            rfm[0],
            RfmRow {
                id: 1,
                recency: 3,
                frequency: 10,
                monetary: 8,
            }
        );
        assert_eq!(
            rfm[1],
            RfmRow {
                id: 2,
                recency: 2,
                frequency: 2,
                monetary: 1,
            }
        );
        assert_eq!(
            rfm[2],
            RfmRow {
                id: 1,
                recency: 0,
                frequency: 10,
                monetary: 8,
            }
        );
    }

    #[test]
    fn test_day_type_metrics() {
        let records = vec![
            with(1, "2011-01-01", 0, |r| {
                r.casual = 1;
                r.registered = 2;
                r.secondary_total = 3;
            }),
            with(2, "2011-01-02", 0, |r| {
                r.casual = 2;
                r.registered = 3;
                r.secondary_total = 5;
            }),
            with(3, "2011-01-03", 0, |r| {
                r.casual = 1;
                r.registered = 1;
                r.secondary_total = 1;
            }),
        ];
        let metrics = day_type_metrics(Subset::new(&records));
        assert_eq!(metrics[0].day_type, "weekday");
        assert_eq!(metrics[0].avg_casual, Some(1.3));
        assert_eq!(metrics[0].avg_registered, Some(2.0));
        assert_eq!(metrics[0].avg_total, Some(3.0));
        // no holiday rows at all
        assert_eq!(metrics[1].day_type, "holiday");
        assert_eq!(metrics[1].avg_casual, None);
        assert_eq!(metrics[1].avg_total, None);
    }

    #[test]
    fn test_day_type_mean_rounds_half_away_from_zero() {
        let records = vec![
            with(1, "2011-01-01", 0, |r| r.casual = 1),
            with(2, "2011-01-02", 0, |r| r.casual = 0),
            with(3, "2011-01-03", 0, |r| r.casual = 0),
            with(4, "2011-01-04", 0, |r| r.casual = 0),
        ];
        let metrics = day_type_metrics(Subset::new(&records));
        // 0.25 to one decimal: half-to-even would give 0.2
        assert_eq!(metrics[0].avg_casual, Some(0.3));
    }

    #[test]
    fn test_top_records() {
        let records = vec![
            with(1, "2011-01-01", 0, |r| {
                r.casual = 5;
                r.registered = 10;
            }),
            with(2, "2011-01-02", 0, |r| {
                r.casual = 1;
                r.registered = 30;
                r.holiday = "1".to_string();
            }),
            with(3, "2011-01-03", 0, |r| {
                r.casual = 2;
                r.registered = 20;
            }),
            with(4, "2011-01-04", 0, |r| {
                r.casual = 2;
                r.registered = 20;
            }),
        ];
        let top = top_records(Subset::new(&records), 2);
        let ids = |rows: &[RankedRow]| rows.iter().map(|r| r.id).collect::<Vec<_>>();
        // holiday row 2 never ranks
        assert_eq!(ids(&top.casual), vec![3, 4]);
        assert_eq!(ids(&top.registered), vec![3, 4]);
        assert_eq!(top.registered[0].value, 20);
        assert_eq!(top_records(Subset::new(&records), 10).total.len(), 3);
    }

    #[test]
    fn test_empty_subset() {
        let subset = Subset::new(&[]);
        assert!(daily_rollup(subset).is_empty());
        assert!(monthly_rollup(subset).is_empty());
        assert!(breakdown(subset, CategoryField::Season, CountMode::RowCount).is_empty());
        assert!(breakdown(subset, CategoryField::Holiday, CountMode::DistinctEntities).is_empty());
        assert!(rfm_summary(subset).is_empty());
        assert_eq!(top_records(subset, 5), TopRecords::default());
        assert!(day_type_metrics(subset).iter().all(|m| m.avg_casual.is_none()));
    }

    #[test]
    fn test_compute_all_views() {
        let records = vec![
            with(1, "2011-01-01", 5, |r| r.season = "1".to_string()),
            with(2, "2011-01-01", 4, |r| r.season = "2".to_string()),
            with(2, "2011-03-01", 2, |r| r.holiday = "1".to_string()),
        ];
        let window = TimeWindow::new(records[0].date, records[2].date).unwrap();
        let views = Views::compute(window, Subset::new(&records), 5);
        assert_eq!(views.records, 3);
        assert_eq!(views.total_rentals, 11);
        assert_eq!(views.daily.len(), 2);
        assert_eq!(views.monthly.len(), 2);
        let season: u64 = views.by_season.iter().map(|r| r.customer_count).sum();
        assert_eq!(season, 3);
        assert_eq!(views.by_holiday.len(), 2);
        assert_eq!(views.rfm.len(), 3);
        assert_eq!(views.top.total.len(), 2);
    }
}
