use std::collections::HashMap;

use crate::data_loader::MatchRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatorAggregate {
    pub total_kills: u64,
    pub match_count: u64,
}

impl OperatorAggregate {
    // No matches means no average, not zero
    pub fn average_kills(&self) -> Option<f64> {
        (self.match_count > 0).then(|| self.total_kills as f64 / self.match_count as f64)
    }

    fn merge(&mut self, other: OperatorAggregate) {
        self.total_kills += other.total_kills;
        self.match_count += other.match_count;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerAggregate {
    pub total_kills: u64,
}

/// Running kill totals for one window, keyed by operator and by player.
///
/// Every update is a plain `+=`, so the result does not depend on the order records
/// arrive in, and two aggregators built over disjoint days can be [`merge`]d.
///
/// [`merge`]: KillAggregator::merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KillAggregator {
    operators: HashMap<String, OperatorAggregate>,
    players: HashMap<String, PlayerAggregate>,
    records_seen: u64,
}

impl KillAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: MatchRecord) {
        let kills = u64::from(record.kill_count);

        let operator = self.operators.entry(record.operator_id).or_default();
        operator.total_kills += kills;
        operator.match_count += 1;

        self.players.entry(record.player_id).or_default().total_kills += kills;

        self.records_seen += 1;
    }

    pub fn consume<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = MatchRecord>,
    {
        for record in records {
            self.push(record);
        }
    }

    pub fn merge(&mut self, other: KillAggregator) {
        for (id, agg) in other.operators {
            self.operators.entry(id).or_default().merge(agg);
        }
        for (id, agg) in other.players {
            self.players.entry(id).or_default().total_kills += agg.total_kills;
        }
        self.records_seen += other.records_seen;
    }

    pub fn operators(&self) -> &HashMap<String, OperatorAggregate> {
        &self.operators
    }

    pub fn players(&self) -> &HashMap<String, PlayerAggregate> {
        &self.players
    }

    pub fn records_seen(&self) -> u64 {
        self.records_seen
    }
}
