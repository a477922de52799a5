pub mod aggregation;
pub mod data_loader;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod ranking;
pub mod ranking_context;
pub mod report;

pub use aggregation::{KillAggregator, OperatorAggregate, PlayerAggregate};
pub use data_loader::{DailyLogNaming, LoadStats, LogNaming, MatchRecord};
pub use error::{ConfigError, ParseError, ReportError};
pub use pipeline::{run_reports, RunSummary};
pub use ranking::{MetricValue, RankedEntry};
pub use ranking_context::RankingContext;
