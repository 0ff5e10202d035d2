// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types for the leaderboard stages.
//!
//! `ParseError` describes a malformed record. Stage operations recover from it by
//! skipping the offending unit, so it never escapes a run. `StreamError` is the only
//! error a runner hands back to its caller.

/// A record that could not be turned into a raw event or a keyed partial.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty line")]
    EmptyLine,

    #[error("invalid event payload: {0}")]
    InvalidJson(String),

    #[error("missing tab between key and payload")]
    MissingKeySeparator,

    #[error("expected 3 comma separated fields, got {0}")]
    FieldCount(usize),

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("invalid username: {0:?}")]
    InvalidKey(String),
}

/// Failure of the input or output channel of a stage run.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("stream i/o failed: {0}")]
    Io(#[from] std::io::Error),
}
