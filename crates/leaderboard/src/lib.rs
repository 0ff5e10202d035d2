// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-player leaderboard statistics from game-completion events.
//!
//! Two stages run on either side of an external sort-by-key transport:
//!
//! ```text
//! raw events ─▶ Projector ─▶ (sort / group by username) ─▶ Aggregator ─▶ summaries
//! ```
//!
//! The [`projector`] turns each event line into `username\tplayed,won,time_ms`
//! pairs. The [`aggregator`] folds contiguous pairs of a username into one
//! `username,played,won,average_win_time_seconds` line.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod aggregator;
pub mod errors;
pub mod event;
pub mod projector;
pub mod ranking;
pub mod record;
pub mod streaming;
pub mod util;
