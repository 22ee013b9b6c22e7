//! Streaming, sharded ingestion of one call-log source.
//!
//! A single reader streams lines, skips an optional header and enforces the
//! record limit. Lines travel in chunks, round-robin, to worker tasks that each
//! own a [`FriendShard`]; the shards are merged once the source is exhausted
//! and the result is frozen.

use crdts::CvRDT;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::RunSettings;
use crate::friends::{FriendGraph, FriendShard};
use crate::persons::{is_header, parse_record, IngestStats};

/// chunks buffered per worker before the reader waits
const CHANNEL_DEPTH: usize = 4;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// returned Error for a source that cannot be processed; other sources are unaffected
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source could not be opened or read
    #[error("cannot read {}: {err}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// The source holds more records than a single run accepts
    #[error("{} has more than {limit} records", path.display())]
    CapacityExceeded { path: PathBuf, limit: usize },

    /// An ingest or aggregation worker died
    #[error("worker failed on {}: {reason}", path.display())]
    WorkerFailed { path: PathBuf, reason: String },
}

impl SourceError {
    pub fn path(&self) -> &Path {
        match self {
            SourceError::SourceUnreadable { path, .. }
            | SourceError::CapacityExceeded { path, .. }
            | SourceError::WorkerFailed { path, .. } => path,
        }
    }

    pub(crate) fn worker(path: &Path, reason: impl ToString) -> Self {
        SourceError::WorkerFailed {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// the frozen graph of one source and what it took to build it
#[derive(Debug)]
pub struct Ingested {
    pub graph: FriendGraph,
    pub stats: IngestStats,
}

/// open and ingest one source file
pub async fn ingest_source(path: &Path, settings: &RunSettings) -> Result<Ingested, SourceError> {
    let file = File::open(path)
        .await
        .map_err(|err| SourceError::SourceUnreadable {
            path: path.to_path_buf(),
            err,
        })?;
    ingest_reader(BufReader::new(file), path, settings).await
}

/// ingest any buffered reader; `path` only names the source in errors
pub async fn ingest_reader<R>(
    mut reader: R,
    path: &Path,
    settings: &RunSettings,
) -> Result<Ingested, SourceError>
where
    R: AsyncBufRead + Unpin,
{
    let workers = settings.workers.max(1);
    let chunk_size = settings.chunk_size.max(1);

    let mut senders = Vec::with_capacity(workers);
    let mut join_handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let (tx, rx) = mpsc::channel::<Vec<String>>(CHANNEL_DEPTH);
        senders.push(tx);
        join_handles.push(shard_worker(worker_id, rx, settings.delimiter));
    }

    let mut stats = IngestStats::default();
    let mut buf = Vec::new();
    let mut chunk = Vec::with_capacity(chunk_size);
    let mut records = 0usize;
    let mut next_worker = 0usize;
    let mut first_line = true;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|err| SourceError::SourceUnreadable {
                path: path.to_path_buf(),
                err,
            })?;
        if read == 0 {
            break;
        }

        let first = std::mem::take(&mut first_line);
        let bytes = if first {
            buf.strip_prefix(UTF8_BOM).unwrap_or(&buf[..])
        } else {
            &buf[..]
        };
        let line = decode_line(bytes);
        if first && is_header(&line, settings.delimiter) {
            tracing::debug!("{}: skipping header {:?}", path.display(), line);
            stats.header_skipped = true;
            continue;
        }

        records += 1;
        if records > settings.max_records {
            return Err(SourceError::CapacityExceeded {
                path: path.to_path_buf(),
                limit: settings.max_records,
            });
        }

        chunk.push(line);
        if chunk.len() == chunk_size {
            let full = std::mem::replace(&mut chunk, Vec::with_capacity(chunk_size));
            senders[next_worker]
                .send(full)
                .await
                .map_err(|_| SourceError::worker(path, "ingest worker stopped"))?;
            next_worker = (next_worker + 1) % workers;
        }
    }
    if !chunk.is_empty() {
        senders[next_worker]
            .send(chunk)
            .await
            .map_err(|_| SourceError::worker(path, "ingest worker stopped"))?;
    }
    drop(senders);

    let mut shard = FriendShard::new();
    for join_handle in join_handles {
        let (part, part_stats) = join_handle
            .await
            .map_err(|e| SourceError::worker(path, e))?;
        shard.merge(part);
        stats.merge(part_stats);
    }

    let graph = shard.freeze();
    stats.duplicates = stats.accepted - graph.friendship_count();
    tracing::debug!(
        "{}: {} persons, {} friendships from {} records",
        path.display(),
        graph.len(),
        graph.friendship_count(),
        stats.records
    );
    Ok(Ingested { graph, stats })
}

/// Strip the line terminator. Invalid UTF-8 is replaced rather than
/// rejected here, so the record fails to parse and is counted as malformed.
fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// parse chunks into a private shard until the reader hangs up
fn shard_worker(
    worker_id: usize,
    mut rx: mpsc::Receiver<Vec<String>>,
    delimiter: char,
) -> JoinHandle<(FriendShard, IngestStats)> {
    tokio::task::spawn_blocking(move || {
        let mut shard = FriendShard::new();
        let mut stats = IngestStats::default();
        while let Some(chunk) = rx.blocking_recv() {
            for line in chunk {
                let outcome = parse_record(&line, delimiter);
                stats.record(&outcome);
                match outcome {
                    Ok(contact) => {
                        if let Err(e) = shard.insert(contact) {
                            tracing::debug!("worker {}: {}", worker_id, e);
                        }
                    }
                    Err(e) => tracing::debug!("worker {}: skipping record: {}", worker_id, e),
                }
            }
        }
        (shard, stats)
    })
}
