//! Results file loading.
//!
//! A JSON results file is an array with one object per peer. Besides its
//! scalar experiment parameters each object carries three lists (`uploads`,
//! `dl_times` and `history`) which are flattened here into tables tagged
//! with the owning peer's id.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::csv_loader;
use super::timestamp::{parse_timestamp_value, seconds_since};
use super::types::*;
use crate::error::{LoadError, LoadResult};

/// On-disk results format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultFormat {
    Json,
    Csv,
}

impl ResultFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ResultFormat::Csv,
            _ => ResultFormat::Json,
        }
    }
}

/// Extra inputs some results formats need
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Peer ids that CSV `id`/`peer` cells index into
    pub peer_ids: Option<Vec<PeerId>>,
}

#[derive(Deserialize)]
struct RawPeer {
    id: Value,
    uploads: Vec<Value>,
    dl_times: Vec<Value>,
    history: Vec<RawHistory>,
    #[serde(flatten)]
    params: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct RawHistory {
    peer: Value,
    time: Value,
    value: f64,
    sent: f64,
    recv: f64,
}

/// A ledger update before time normalization
pub(crate) struct AbsoluteUpdate {
    pub user: PeerId,
    pub peer: PeerId,
    pub time: DateTime<Utc>,
    pub value: f64,
    pub sent: f64,
    pub recv: f64,
}

/// Load a results file with default options
pub fn load(path: &Path) -> LoadResult<Results> {
    load_with(path, &LoadOptions::default())
}

/// Load a results file, picking the parser from the file extension
pub fn load_with(path: &Path, options: &LoadOptions) -> LoadResult<Results> {
    log::info!("Loading results from {}", path.display());

    let results = match ResultFormat::from_path(path) {
        ResultFormat::Json => load_json(path)?,
        ResultFormat::Csv => csv_loader::load_csv(path, options.peer_ids.as_deref())?,
    };

    log::info!(
        "Loaded {} peers, {} uploads, {} download times, {} ledger entries",
        results.params.len(),
        results.uploads.len(),
        results.dl_times.len(),
        results.ledgers.len()
    );
    Ok(results)
}

/// Read a peer id list: one id per line, blank lines ignored
pub fn load_peer_list(path: &Path) -> LoadResult<Vec<PeerId>> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

fn load_json(path: &Path) -> LoadResult<Results> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: Vec<RawPeer> = serde_json::from_str(&content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let mut seen: HashSet<PeerId> = HashSet::new();
    let mut params = Vec::with_capacity(raw.len());
    let mut uploads = Vec::new();
    let mut dl_times = Vec::new();
    let mut updates = Vec::new();

    for record in raw {
        let id = peer_id(&record.id)?;
        if !seen.insert(id.clone()) {
            return Err(LoadError::DuplicatePeer { id });
        }

        for (index, upload) in record.uploads.into_iter().enumerate() {
            uploads.push(upload_record(&id, index, upload)?);
        }
        for (index, download) in record.dl_times.into_iter().enumerate() {
            dl_times.push(download_record(&id, index, download)?);
        }
        for (index, update) in record.history.into_iter().enumerate() {
            let time = parse_timestamp_value(&update.time).ok_or_else(|| LoadError::Timestamp {
                peer: id.clone(),
                index,
                value: update.time.to_string(),
            })?;
            updates.push(AbsoluteUpdate {
                user: id.clone(),
                peer: peer_id(&update.peer)?,
                time,
                value: update.value,
                sent: update.sent,
                recv: update.recv,
            });
        }

        params.push(PeerParams {
            id,
            fields: record.params,
        });
    }

    let (ledgers, t0) = normalize_history(updates);
    Ok(Results {
        params: ParamsTable::new(params),
        uploads,
        dl_times,
        ledgers,
        t0,
    })
}

/// Rewrite absolute update times as offsets from the earliest one
pub(crate) fn normalize_history(
    updates: Vec<AbsoluteUpdate>,
) -> (LedgerTable, Option<DateTime<Utc>>) {
    let t0 = updates.iter().map(|u| u.time).min();
    let Some(start) = t0 else {
        return (LedgerTable::default(), None);
    };

    let rows = updates.into_iter().map(|u| {
        let entry = LedgerEntry {
            time: seconds_since(start, u.time),
            value: u.value,
            sent: u.sent,
            recv: u.recv,
        };
        (u.user, u.peer, entry)
    });
    (LedgerTable::from_rows(rows), t0)
}

pub(crate) fn peer_id(value: &Value) -> LoadResult<PeerId> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        other => Err(LoadError::InvalidPeerId {
            value: other.to_string(),
        }),
    }
}

fn upload_record(peer: &str, index: usize, value: Value) -> LoadResult<UploadRecord> {
    match value {
        Value::String(block) => Ok(UploadRecord {
            peer: peer.to_string(),
            block: Some(block),
            meta: BTreeMap::new(),
        }),
        Value::Object(map) => {
            let mut meta: BTreeMap<String, Value> = map.into_iter().collect();
            let block = meta.remove("block").map(|b| display_value(&b));
            Ok(UploadRecord {
                peer: peer.to_string(),
                block,
                meta,
            })
        }
        other => Err(LoadError::Record {
            peer: peer.to_string(),
            field: "uploads",
            index,
            reason: format!("expected a block id or an object, got {}", other),
        }),
    }
}

fn download_record(peer: &str, index: usize, value: Value) -> LoadResult<DownloadTimeRecord> {
    let shape_error = |reason: &str| LoadError::Record {
        peer: peer.to_string(),
        field: "dl_times",
        index,
        reason: reason.to_string(),
    };

    let Value::Object(map) = value else {
        return Err(shape_error("expected an object"));
    };
    let mut meta: BTreeMap<String, Value> = map.into_iter().collect();
    let block = match meta.remove("block") {
        Some(Value::Null) | None => return Err(shape_error("missing field `block`")),
        Some(block) => display_value(&block),
    };
    Ok(DownloadTimeRecord {
        peer: peer.to_string(),
        block,
        meta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const RESULTS: &str = r#"[
        {
            "id": "QmA",
            "strategy": "ratio",
            "upload_bandwidth": 100,
            "round_burst": 8,
            "uploads": ["blk1", {"block": "blk2", "size": 256}],
            "dl_times": [{"block": "blk3", "time": 1.5}],
            "history": [
                {"peer": "QmB", "time": "2019-05-01T10:00:02Z", "value": 1.5, "sent": 2048, "recv": 1024},
                {"peer": "QmB", "time": "2019-05-01T10:00:01Z", "value": 0.5, "sent": 1024, "recv": 0}
            ]
        },
        {
            "id": "QmB",
            "strategy": "ratio",
            "upload_bandwidth": 200,
            "round_burst": 8,
            "uploads": [],
            "dl_times": [],
            "history": [
                {"peer": "QmA", "time": "2019-05-01T10:00:00Z", "value": 1.0, "sent": 0, "recv": 0, "extra": true}
            ]
        }
    ]"#;

    fn write_json(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_json_tables() {
        let file = write_json(RESULTS);
        let results = load(file.path()).unwrap();

        assert_eq!(results.params.len(), 2);
        assert_eq!(results.params.values("strategy"), vec!["ratio", "ratio"]);
        assert_eq!(results.uploads.len(), 2);
        assert_eq!(results.uploads[0].block.as_deref(), Some("blk1"));
        assert_eq!(results.uploads[1].block.as_deref(), Some("blk2"));
        assert_eq!(results.uploads[1].meta.get("size"), Some(&Value::from(256)));
        assert_eq!(results.dl_times.len(), 1);
        assert_eq!(results.dl_times[0].block, "blk3");

        assert_eq!(results.ledgers.len(), 3);
        let a_b = results.ledgers.series("QmA", "QmB").unwrap();
        assert_eq!(a_b[0].time, 1.0);
        assert_eq!(a_b[1].time, 2.0);
        assert_eq!(results.ledgers.series("QmB", "QmA").unwrap()[0].time, 0.0);
        assert_eq!(results.ledgers.times()[0], 0.0);
    }

    #[test]
    fn test_missing_history_field() {
        let file = write_json(r#"[{"id": "QmA", "uploads": [], "dl_times": []}]"#);
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
        let cause = std::error::Error::source(&err).unwrap().to_string();
        assert!(cause.contains("history"), "cause was: {}", cause);
        assert!(cause.contains("line"), "cause was: {}", cause);
    }

    #[test]
    fn test_malformed_json() {
        let file = write_json("[{\"id\": ");
        assert!(matches!(load(file.path()), Err(LoadError::Json { .. })));
    }

    #[test]
    fn test_missing_file() {
        let err = load(Path::new("/nonexistent/results.json")).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn test_bad_timestamp() {
        let file = write_json(
            r#"[{"id": "QmA", "uploads": [], "dl_times": [],
                 "history": [{"peer": "QmB", "time": "soon", "value": 1, "sent": 0, "recv": 0}]}]"#,
        );
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Timestamp { index: 0, .. }));
    }

    #[test]
    fn test_duplicate_peer() {
        let file = write_json(
            r#"[{"id": 1, "uploads": [], "dl_times": [], "history": []},
                {"id": 1, "uploads": [], "dl_times": [], "history": []}]"#,
        );
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::DuplicatePeer { ref id } if id == "1"));
    }

    #[test]
    fn test_download_without_block() {
        let file = write_json(
            r#"[{"id": "QmA", "uploads": [], "dl_times": [{"time": 2}], "history": []}]"#,
        );
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Record { field: "dl_times", .. }));
    }

    #[test]
    fn test_load_peer_list() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "QmA\n\n  QmB  \n").unwrap();
        assert_eq!(load_peer_list(file.path()).unwrap(), vec!["QmA", "QmB"]);
    }

    #[test]
    fn test_result_format_from_path() {
        assert_eq!(ResultFormat::from_path(Path::new("run.CSV")), ResultFormat::Csv);
        assert_eq!(ResultFormat::from_path(Path::new("run.json")), ResultFormat::Json);
        assert_eq!(ResultFormat::from_path(Path::new("run")), ResultFormat::Json);
    }
}
