use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use clap::ValueEnum;
use csv::ReaderBuilder;
use csv::Trim;
use frontier_rs::quant::portfolio::AlignmentMode;
use frontier_rs::quant::portfolio::AssetHistory;
use frontier_rs::quant::portfolio::OptimizationReport;
use frontier_rs::quant::portfolio::PortfolioEngine;
use frontier_rs::quant::portfolio::PortfolioEngineConfig;
use frontier_rs::quant::portfolio::PortfolioPoint;
use frontier_rs::quant::portfolio::PriceBar;
use frontier_rs::quant::portfolio::WeightPolicy;
use frontier_rs::quant::portfolio::DEFAULT_FRONTIER_POINTS;
use frontier_rs::quant::portfolio::DEFAULT_MAX_ASSETS;
use frontier_rs::quant::portfolio::DEFAULT_NEGATIVE_TOLERANCE;
use frontier_rs::quant::portfolio::DEFAULT_RISK_FREE;
use frontier_rs::quant::portfolio::TRADING_DAYS;
use prettytable::row;
use prettytable::Table;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
  /// Drop the max-Sharpe allocation if a weight is below the tolerance
  Reject,
  /// Clip short positions to zero and renormalize
  LongOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AlignmentArg {
  /// Most recent common number of observations
  Trailing,
  /// Dates traded by every symbol
  Calendar,
}

#[derive(Parser, Debug)]
#[command(name = "frontier")]
#[command(about = "Efficient frontier and max-Sharpe portfolio from a wide price table")]
struct Cli {
  /// CSV with a `date,SYM1,SYM2,...` header and one row per date
  prices: PathBuf,

  /// Annualized risk-free rate
  #[arg(long, default_value_t = DEFAULT_RISK_FREE)]
  risk_free: f64,

  /// Frontier sweep intervals
  #[arg(long, default_value_t = DEFAULT_FRONTIER_POINTS)]
  frontier_points: usize,

  /// Keep at most this many symbols, longest histories first
  #[arg(long, default_value_t = DEFAULT_MAX_ASSETS)]
  max_assets: usize,

  /// Post-processing of the max-Sharpe weights
  #[arg(long, value_enum, default_value = "reject")]
  policy: PolicyArg,

  /// Most negative weight tolerated by the reject policy
  #[arg(long, default_value_t = DEFAULT_NEGATIVE_TOLERANCE, allow_negative_numbers = true)]
  tolerance: f64,

  /// How price histories are lined up
  #[arg(long, value_enum, default_value = "trailing")]
  alignment: AlignmentArg,
}

impl Cli {
  fn config(&self) -> PortfolioEngineConfig {
    PortfolioEngineConfig {
      risk_free: self.risk_free,
      periods_per_year: TRADING_DAYS,
      frontier_points: self.frontier_points,
      max_assets: self.max_assets,
      weight_policy: match self.policy {
        PolicyArg::Reject => WeightPolicy::Reject {
          tolerance: self.tolerance,
        },
        PolicyArg::LongOnly => WeightPolicy::ClipRenormalize,
      },
      alignment: match self.alignment {
        AlignmentArg::Trailing => AlignmentMode::Trailing,
        AlignmentArg::Calendar => AlignmentMode::Calendar,
      },
    }
  }
}

/// Read a wide price table: a `date,SYM1,SYM2,...` header followed by one row
/// per date. Empty cells mark days a symbol did not trade; cells beyond the
/// header are ignored.
fn read_price_table<P: AsRef<Path>>(path: P) -> Result<Vec<AssetHistory>> {
  let path = path.as_ref();
  let mut reader = ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .trim(Trim::All)
    .from_path(path)
    .with_context(|| format!("cannot open {}", path.display()))?;

  let symbols: Vec<String> = reader
    .headers()
    .with_context(|| format!("cannot read header of {}", path.display()))?
    .iter()
    .skip(1)
    .map(str::to_string)
    .collect();
  if symbols.is_empty() {
    bail!("{} has no symbol columns", path.display());
  }

  let mut bars: Vec<Vec<PriceBar>> = vec![Vec::new(); symbols.len()];
  for record in reader.records() {
    let record = record.with_context(|| format!("cannot read {}", path.display()))?;
    let line = record.position().map_or(0, |p| p.line());

    let raw_date = record.get(0).unwrap_or_default();
    let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
      .with_context(|| format!("line {line}: bad date {raw_date:?}"))?;

    for (series, cell) in bars.iter_mut().zip(record.iter().skip(1)) {
      if cell.is_empty() {
        continue;
      }
      let close: f64 = cell
        .parse()
        .with_context(|| format!("line {line}: bad price {cell:?}"))?;
      series.push(PriceBar::new(date, close, close, close, close, 0.0));
    }
  }

  Ok(
    symbols
      .into_iter()
      .zip(bars)
      .map(|(symbol, bars)| AssetHistory::new(symbol, bars))
      .collect(),
  )
}

fn weights_table(title: &str, point: &PortfolioPoint, symbols: &[String]) -> Table {
  let mut table = Table::new();
  table.add_row(row![title, "weight"]);
  if let Some(weights) = &point.weights {
    for (symbol, w) in symbols.iter().zip(weights) {
      table.add_row(row![symbol, format!("{w:.4}")]);
    }
  }
  table.add_row(row!["return", format!("{:.4}", point.expected_return)]);
  table.add_row(row!["risk", format!("{:.4}", point.risk)]);
  table.add_row(row!["sharpe", format!("{:.4}", point.sharpe)]);
  table
}

fn print_report(report: &OptimizationReport) {
  let mut frontier = Table::new();
  frontier.add_row(row!["risk", "return", "sharpe"]);
  for p in &report.frontier {
    frontier.add_row(row![
      format!("{:.4}", p.risk),
      format!("{:.4}", p.expected_return),
      format!("{:.3}", p.sharpe)
    ]);
  }
  frontier.printstd();

  match &report.tangency {
    Some(point) => weights_table("max-sharpe", point, &report.symbols).printstd(),
    None => println!("no feasible max-Sharpe portfolio"),
  }
  match &report.min_variance {
    Some(point) => weights_table("min-variance", point, &report.symbols).printstd(),
    None => println!("no feasible minimum-variance portfolio"),
  }
}

fn main() -> Result<()> {
  tracing_subscriber::registry()
    .with(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "frontier_rs=info,frontier=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let cli = Cli::parse();
  let histories = read_price_table(&cli.prices)?;
  info!(path = %cli.prices.display(), symbols = histories.len(), "loaded price table");

  let report = PortfolioEngine::new(cli.config())
    .optimize(&histories)
    .context("cannot optimize portfolio")?;
  print_report(&report);

  Ok(())
}
