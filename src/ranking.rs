use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::aggregation::{OperatorAggregate, PlayerAggregate};

// Averages always print with this many decimals so reports diff cleanly day to day
pub const AVERAGE_PRECISION: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    AverageKills(f64),
    TotalKills(u64),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::AverageKills(avg) => write!(f, "{avg:.prec$}", prec = AVERAGE_PRECISION),
            MetricValue::TotalKills(total) => write!(f, "{total}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub rank: usize,
    pub id: String,
    pub value: MetricValue,
}

impl RankedEntry {
    // rank, id, metric. The writer turns these into one report line.
    pub fn fields(&self) -> [String; 3] {
        [self.rank.to_string(), self.id.clone(), self.value.to_string()]
    }
}

// Compares a/b against c/d without going through floats, so equal averages really tie.
fn cmp_average(a: &OperatorAggregate, b: &OperatorAggregate) -> Ordering {
    let lhs = u128::from(a.total_kills) * u128::from(b.match_count);
    let rhs = u128::from(b.total_kills) * u128::from(a.match_count);
    lhs.cmp(&rhs)
}

// Sorts descending by `compare`, ties broken by ascending id, then cuts to top_n.
fn rank_by<'a, A, C, V>(
    items: impl Iterator<Item = (&'a String, &'a A)>,
    top_n: usize,
    compare: C,
    value: V,
) -> Vec<RankedEntry>
where
    A: 'a,
    C: Fn(&A, &A) -> Ordering,
    V: Fn(&A) -> MetricValue,
{
    let mut sorted: Vec<(&String, &A)> = items.collect();
    sorted.sort_unstable_by(|a, b| compare(b.1, a.1).then_with(|| a.0.cmp(b.0)));
    sorted.truncate(top_n);

    sorted
        .into_iter()
        .enumerate()
        .map(|(idx, (id, agg))| RankedEntry {
            rank: idx + 1,
            id: id.clone(),
            value: value(agg),
        })
        .collect()
}

pub fn rank_operators(
    operators: &HashMap<String, OperatorAggregate>,
    top_n: usize,
) -> Vec<RankedEntry> {
    rank_by(
        operators.iter().filter(|(_, agg)| agg.match_count > 0),
        top_n,
        cmp_average,
        |agg| MetricValue::AverageKills(agg.average_kills().unwrap_or_default()),
    )
}

pub fn rank_players(players: &HashMap<String, PlayerAggregate>, top_n: usize) -> Vec<RankedEntry> {
    rank_by(
        players.iter(),
        top_n,
        |a, b| a.total_kills.cmp(&b.total_kills),
        |agg| MetricValue::TotalKills(agg.total_kills),
    )
}
