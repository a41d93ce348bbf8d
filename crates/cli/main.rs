mod output;
mod source;
mod view;

use output::{get_output, OutputType};
use view::ViewKind;

use chrono::NaiveDate;
use clap::builder::PossibleValuesParser;
use clap::Parser;
use engine::{Dataset, Explorer, Schema, WindowPolicy};
use env_logger::Env;
use log::{debug, error, info};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

/// Explore the bike sharing dataset over a date window
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(
        short = 'c',
        long = "config",
        default_value = ".rental-stat.yml",
        help = "config file"
    )]
    config: String,

    #[arg(
        short = 'F',
        long = "format",
        value_parser = PossibleValuesParser::new(["csv", "json", "table", "polar"]),
        default_value = "polar",
        help = "output format"
    )]
    format: String,

    #[arg(long = "source", help = "dataset csv file, overrides the config source")]
    source: Option<String>,

    /// since date
    #[arg(long = "since", value_parser = parse_date, help = "since date, 2011-01-01")]
    since: Option<NaiveDate>,

    /// until date
    #[arg(long = "until", value_parser = parse_date, help = "until date, 2012-12-31")]
    until: Option<NaiveDate>,

    #[arg(
        long = "out-dir",
        default_value = ".",
        help = "directory for csv output, one file per view"
    )]
    out_dir: PathBuf,

    #[arg(long = "view", value_enum, help = "views to output, repeatable, default all")]
    views: Vec<ViewKind>,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        error!("parse date err: {}", e);
        format!("invalid date {:?}, expected YYYY-MM-DD", s)
    })
}

fn schema(columns: &config::Columns) -> Schema {
    Schema {
        id: columns.id.clone(),
        date: columns.date.clone(),
        season: columns.season.clone(),
        holiday: columns.holiday.clone(),
        weekday: columns.weekday.clone(),
        casual: columns.casual.clone(),
        registered: columns.registered.clone(),
        total: columns.total.clone(),
        secondary_total: columns.secondary_total.clone(),
    }
}

fn policy(policy: config::Policy) -> WindowPolicy {
    match policy {
        config::Policy::Clamp => WindowPolicy::Clamp,
        config::Policy::Reject => WindowPolicy::Reject,
    }
}

/// Window bounds asked for on the command line or in the config, if any.
fn requested_window(
    args: &Args,
    conf: &config::Window,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), String> {
    let since = match (args.since, &conf.since) {
        (Some(d), _) => Some(d),
        (None, Some(s)) => Some(parse_date(s)?),
        (None, None) => None,
    };
    let until = match (args.until, &conf.until) {
        (Some(d), _) => Some(d),
        (None, Some(s)) => Some(parse_date(s)?),
        (None, None) => None,
    };
    Ok((since, until))
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let conf = config::Config::new(&args.config)?;
    debug!("config: {:?}", conf);

    let source = args.source.clone().unwrap_or(conf.source.clone());
    let dataset = Dataset::from_path(&source, &schema(&conf.columns))?;
    let mut explorer = Explorer::new(Arc::new(dataset), policy(conf.window.policy), conf.top_n)?;
    let (min, max) = explorer.bounds();
    info!("dataset range: {} ~ {}", min, max);

    let (since, until) = requested_window(&args, &conf.window)?;
    if since.is_some() || until.is_some() {
        explorer.set_window(since.unwrap_or(min), until.unwrap_or(max))?;
    }
    info!("window: {}", explorer.window());

    let kinds = if args.views.is_empty() {
        ViewKind::all()
    } else {
        args.views.clone()
    };
    let out_type = OutputType::from_str(args.format.as_str())
        .ok_or_else(|| format!("unknown output format {}", args.format))?;
    get_output(out_type, explorer, kinds, args.out_dir)?.output()
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
