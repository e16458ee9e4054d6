//! CSV results loading.
//!
//! Some harness versions dump ledger updates as CSV, one row per update:
//! `id,peer,time,value,sent,recv`. When a peer id list is supplied the `id`
//! and `peer` cells are integer indices into it.

use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use super::loader::{normalize_history, AbsoluteUpdate};
use super::timestamp::parse_timestamp;
use super::types::*;
use crate::error::{LoadError, LoadResult};

#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    peer: String,
    time: String,
    value: f64,
    sent: f64,
    recv: f64,
}

/// Load ledger updates from a CSV results file
pub fn load_csv(path: &Path, peer_ids: Option<&[PeerId]>) -> LoadResult<Results> {
    let csv_error = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error)?;

    let mut updates = Vec::new();
    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(csv_error)?;
        let user = resolve_peer(&row.id, peer_ids)?;
        let peer = resolve_peer(&row.peer, peer_ids)?;
        let time = parse_time_cell(&row.time).ok_or_else(|| LoadError::Timestamp {
            peer: user.clone(),
            index,
            value: row.time.clone(),
        })?;
        updates.push(AbsoluteUpdate {
            user,
            peer,
            time,
            value: row.value,
            sent: row.sent,
            recv: row.recv,
        });
    }

    let (ledgers, t0) = normalize_history(updates);
    Ok(Results {
        ledgers,
        t0,
        ..Results::default()
    })
}

fn resolve_peer(cell: &str, peer_ids: Option<&[PeerId]>) -> LoadResult<PeerId> {
    let Some(ids) = peer_ids else {
        return Ok(cell.to_string());
    };
    cell.parse::<usize>()
        .ok()
        .and_then(|i| ids.get(i))
        .cloned()
        .ok_or_else(|| LoadError::PeerIndex {
            index: cell.to_string(),
            count: ids.len(),
        })
}

/// Timestamp strings, or bare numbers as epoch nanoseconds
fn parse_time_cell(cell: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    if let Ok(nanos) = cell.parse::<i64>() {
        return Some(chrono::DateTime::from_timestamp_nanos(nanos));
    }
    parse_timestamp(cell)
}

#[derive(Debug, Serialize)]
struct CsvOutRow<'a> {
    id: &'a str,
    peer: &'a str,
    time: i64,
    value: f64,
    sent: f64,
    recv: f64,
}

/// Write the ledger table back out in the CSV results format.
///
/// Times are written as epoch nanoseconds, so the file reloads to the same
/// table. Returns the number of rows written.
pub fn write_csv(results: &Results, path: &Path) -> LoadResult<usize> {
    let csv_error = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let base = results
        .t0
        .and_then(|t0| t0.timestamp_nanos_opt())
        .unwrap_or(0);
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(csv_error)?;

    let mut rows = 0;
    for (user, peer, entries) in results.ledgers.iter_series() {
        for entry in entries {
            writer
                .serialize(CsvOutRow {
                    id: user,
                    peer,
                    time: base + (entry.time * 1e9).round() as i64,
                    value: entry.value,
                    sent: entry.sent,
                    recv: entry.recv,
                })
                .map_err(csv_error)?;
            rows += 1;
        }
    }
    writer
        .flush()
        .map_err(|source| csv_error(csv::Error::from(source)))?;

    log::info!("Wrote {} ledger rows to {}", rows, path.display());
    Ok(rows)
}
