// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Line-stream runners wiring a stage to an input and an output channel.
//!
//! A runner reads one line, writes the records it yields, and moves on. Lines
//! that yield nothing are dropped without a log event. The stages report no
//! skips; the runner only tallies lines in and records out, and `RunStats` is
//! handed to the operator that invoked it. Only a failure of the channels
//! themselves ends a run early.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::aggregator::Aggregator;
use crate::errors::StreamError;
use crate::projector::Projector;
use crate::ranking::rank;
use crate::record::KeyedPartial;

/// Counters of one stage run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub lines_read: u64,
    pub records_emitted: u64,
    /// Lines that produced no record: blank, malformed, or ignored events.
    pub lines_skipped: u64,
}

struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(1024),
        }
    }

    /// Next raw line, `None` at end of input. Non UTF-8 lines come back as `Some(None)`.
    async fn next_line(&mut self) -> std::io::Result<Option<Option<&str>>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
            return Ok(None);
        }
        Ok(Some(std::str::from_utf8(&self.buf).ok()))
    }
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await
}

/// Projects every event line of `reader` into `username\tplayed,won,time_ms` lines.
pub async fn run_projector<R, W>(reader: R, mut writer: W) -> Result<RunStats, StreamError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    debug!("Projector started");
    let projector = Projector::new();
    let mut lines = LineReader::new(reader);
    let mut stats = RunStats::default();

    while let Some(line) = lines.next_line().await? {
        stats.lines_read += 1;
        let pairs = line.map(|l| projector.process(l)).unwrap_or_default();
        if pairs.is_empty() {
            stats.lines_skipped += 1;
            continue;
        }
        for pair in &pairs {
            write_line(&mut writer, &pair.encode()).await?;
            stats.records_emitted += 1;
        }
    }
    writer.flush().await?;

    debug!(
        lines_read = stats.lines_read,
        records_emitted = stats.records_emitted,
        lines_skipped = stats.lines_skipped,
        "Projector finished"
    );
    Ok(stats)
}

/// Folds grouped `username\tplayed,won,time_ms` lines into summary lines.
pub async fn run_aggregator<R, W>(reader: R, mut writer: W) -> Result<RunStats, StreamError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    debug!("Aggregator started");
    let mut aggregator = Aggregator::new();
    let mut lines = LineReader::new(reader);
    let mut stats = RunStats::default();

    while let Some(line) = lines.next_line().await? {
        stats.lines_read += 1;
        let Some(Ok(pair)) = line.map(KeyedPartial::decode) else {
            stats.lines_skipped += 1;
            continue;
        };
        if let Some(summary) = aggregator.push(pair) {
            write_line(&mut writer, &summary.encode()).await?;
            stats.records_emitted += 1;
        }
    }
    if let Some(summary) = aggregator.finish() {
        write_line(&mut writer, &summary.encode()).await?;
        stats.records_emitted += 1;
    }
    writer.flush().await?;

    debug!(
        lines_read = stats.lines_read,
        records_emitted = stats.records_emitted,
        lines_skipped = stats.lines_skipped,
        "Aggregator finished"
    );
    Ok(stats)
}

/// Runs projection, an in-memory sort by key, and aggregation in one process.
///
/// The sort is stable, so partials of a key keep their input order. With
/// `ranked` the summaries are written in leaderboard order with a rank column.
pub async fn run_local<R, W>(reader: R, mut writer: W, ranked: bool) -> Result<RunStats, StreamError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    debug!(ranked, "Local pipeline started");
    let projector = Projector::new();
    let mut lines = LineReader::new(reader);
    let mut stats = RunStats::default();
    let mut pairs: Vec<KeyedPartial> = Vec::new();

    while let Some(line) = lines.next_line().await? {
        stats.lines_read += 1;
        let projected = line.map(|l| projector.process(l)).unwrap_or_default();
        if projected.is_empty() {
            stats.lines_skipped += 1;
        }
        pairs.extend(projected);
    }

    debug!("Sorting {} partial records by username", pairs.len());
    pairs.sort_by(|a, b| a.username.cmp(&b.username));
    let summaries = Aggregator::aggregate(pairs);

    if ranked {
        for entry in rank(summaries) {
            write_line(&mut writer, &entry.encode()).await?;
            stats.records_emitted += 1;
        }
    } else {
        for summary in &summaries {
            write_line(&mut writer, &summary.encode()).await?;
            stats.records_emitted += 1;
        }
    }
    writer.flush().await?;

    debug!(
        lines_read = stats.lines_read,
        records_emitted = stats.records_emitted,
        lines_skipped = stats.lines_skipped,
        "Local pipeline finished"
    );
    Ok(stats)
}
