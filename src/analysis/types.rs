//! Core data types for ledger results analysis.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of a simulated peer as recorded in the results file
pub type PeerId = String;

/// Seconds elapsed since the earliest ledger update in the results file
pub type RelTime = f64;

/// Which kind of debt ratio plot to configure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    /// Every peerwise series on one shared axis
    All,
    /// One axis per peer taking part in an observed pair
    Pairs,
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotKind::All => write!(f, "all"),
            PlotKind::Pairs => write!(f, "pairs"),
        }
    }
}

/// Scalar experiment parameters of one peer (strategy, bandwidth, ...)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerParams {
    pub id: PeerId,
    pub fields: BTreeMap<String, Value>,
}

impl PeerParams {
    /// Human-readable rendering of a parameter value, if the peer has it
    pub fn display(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(display_value)
    }
}

/// Render a JSON scalar without quoting strings
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parameter table, one row per peer in file order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParamsTable {
    rows: Vec<PeerParams>,
}

impl ParamsTable {
    pub fn new(rows: Vec<PeerParams>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeerParams> {
        self.rows.iter()
    }

    /// Values of one parameter across all peers that define it, in row order
    pub fn values(&self, name: &str) -> Vec<String> {
        self.rows.iter().filter_map(|row| row.display(name)).collect()
    }
}

/// A block uploaded (seeded) by a peer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadRecord {
    pub peer: PeerId,
    pub block: Option<String>,
    pub meta: BTreeMap<String, Value>,
}

/// Time a peer took to fetch one block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadTimeRecord {
    pub peer: PeerId,
    pub block: String,
    pub meta: BTreeMap<String, Value>,
}

/// One debt ratio update, from the observer's point of view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub time: RelTime,
    pub value: f64,
    pub sent: f64,
    pub recv: f64,
}

/// Summary statistics of every debt ratio value in a ledger table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DebtRatioStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Debt ratio history indexed by (observer, observed peer, relative time).
///
/// Each (observer, observed) series is sorted by time; entries sharing a
/// timestamp keep their file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerTable {
    series: BTreeMap<PeerId, BTreeMap<PeerId, Vec<LedgerEntry>>>,
}

impl LedgerTable {
    /// Build the table from flat (observer, observed, entry) rows
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (PeerId, PeerId, LedgerEntry)>,
    {
        let mut series: BTreeMap<PeerId, BTreeMap<PeerId, Vec<LedgerEntry>>> = BTreeMap::new();
        for (user, peer, entry) in rows {
            series.entry(user).or_default().entry(peer).or_default().push(entry);
        }
        for peers in series.values_mut() {
            for entries in peers.values_mut() {
                entries.sort_by(|a, b| a.time.total_cmp(&b.time));
            }
        }
        Self { series }
    }

    /// Total number of ledger updates
    pub fn len(&self) -> usize {
        self.series
            .values()
            .flat_map(|peers| peers.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Observing peers in sorted order
    pub fn users(&self) -> impl Iterator<Item = &PeerId> {
        self.series.keys()
    }

    /// Series recorded by `user`, sorted by observed peer
    pub fn peers_of<'a>(
        &'a self,
        user: &str,
    ) -> impl Iterator<Item = (&'a PeerId, &'a [LedgerEntry])> {
        self.series
            .get(user)
            .into_iter()
            .flat_map(|peers| peers.iter().map(|(peer, entries)| (peer, entries.as_slice())))
    }

    pub fn series(&self, user: &str, peer: &str) -> Option<&[LedgerEntry]> {
        self.series
            .get(user)
            .and_then(|peers| peers.get(peer))
            .map(Vec::as_slice)
    }

    /// Every (observer, observed, series) triple in index order
    pub fn iter_series(&self) -> impl Iterator<Item = (&PeerId, &PeerId, &[LedgerEntry])> {
        self.series.iter().flat_map(|(user, peers)| {
            peers
                .iter()
                .map(move |(peer, entries)| (user, peer, entries.as_slice()))
        })
    }

    /// Every peer id seen on either side of a ledger
    pub fn peer_ids(&self) -> BTreeSet<&PeerId> {
        let mut ids = BTreeSet::new();
        for (user, peer, _) in self.iter_series() {
            ids.insert(user);
            ids.insert(peer);
        }
        ids
    }

    /// Sorted distinct relative timestamps across the whole table
    pub fn times(&self) -> Vec<RelTime> {
        let mut times: Vec<RelTime> = self
            .iter_series()
            .flat_map(|(_, _, entries)| entries.iter().map(|e| e.time))
            .collect();
        times.sort_by(f64::total_cmp);
        times.dedup();
        times
    }

    pub fn value_stats(&self) -> Option<DebtRatioStats> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for (_, _, entries) in self.iter_series() {
            for entry in entries {
                count += 1;
                sum += entry.value;
                min = min.min(entry.value);
                max = max.max(entry.value);
            }
        }
        if count == 0 {
            return None;
        }
        Some(DebtRatioStats {
            min,
            max,
            mean: sum / count as f64,
        })
    }
}

/// Everything loaded from one results file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Results {
    pub params: ParamsTable,
    pub uploads: Vec<UploadRecord>,
    pub dl_times: Vec<DownloadTimeRecord>,
    pub ledgers: LedgerTable,
    /// Absolute time of the earliest ledger update
    pub t0: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(time: f64, value: f64) -> LedgerEntry {
        LedgerEntry {
            time,
            value,
            sent: 0.0,
            recv: 0.0,
        }
    }

    #[test]
    fn test_ledger_table_sorts_series() {
        let table = LedgerTable::from_rows(vec![
            ("b".to_string(), "a".to_string(), entry(5.0, 1.0)),
            ("a".to_string(), "b".to_string(), entry(3.0, 2.0)),
            ("a".to_string(), "b".to_string(), entry(1.0, 3.0)),
        ]);

        assert_eq!(table.len(), 3);
        assert_eq!(table.users().collect::<Vec<_>>(), vec!["a", "b"]);
        let series = table.series("a", "b").unwrap();
        assert_eq!(series[0].time, 1.0);
        assert_eq!(series[1].time, 3.0);
        assert_eq!(table.times(), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_value_stats() {
        let table = LedgerTable::from_rows(vec![
            ("a".to_string(), "b".to_string(), entry(0.0, 0.5)),
            ("a".to_string(), "b".to_string(), entry(1.0, 1.5)),
        ]);
        let stats = table.value_stats().unwrap();
        assert_eq!(stats.min, 0.5);
        assert_eq!(stats.max, 1.5);
        assert!((stats.mean - 1.0).abs() < 1e-12);
        assert!(LedgerTable::default().value_stats().is_none());
    }

    #[test]
    fn test_params_values_skip_missing() {
        let mut fields = BTreeMap::new();
        fields.insert("strategy".to_string(), Value::String("ratio".into()));
        fields.insert("round_burst".to_string(), Value::from(3));
        let params = ParamsTable::new(vec![
            PeerParams {
                id: "p0".into(),
                fields,
            },
            PeerParams {
                id: "p1".into(),
                fields: BTreeMap::new(),
            },
        ]);

        assert_eq!(params.values("strategy"), vec!["ratio"]);
        assert_eq!(params.values("round_burst"), vec!["3"]);
        assert!(params.values("upload_bandwidth").is_empty());
    }
}
