// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Partial and summary records, and their line formats.
//!
//! Projector output and aggregator input share one line shape:
//!
//! ```text
//! username\tgames_played,games_won,time_ms
//! ```
//!
//! Aggregator output is one CSV line per player:
//!
//! ```text
//! username,games_played,games_won,average_win_time_seconds
//! ```

use serde::Serialize;

use crate::errors::ParseError;
use crate::util::is_valid_key;

const KEY_SEPARATOR: char = '\t';
const FIELD_SEPARATOR: char = ',';

/// One event's contribution to a player's totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialRecord {
    pub games_played: u64,
    pub games_won: u64,
    pub time_ms: u64,
}

impl PartialRecord {
    /// Only a winner accrues game time; a loss contributes zero time.
    pub fn for_player(won: bool, duration_ms: u64) -> Self {
        Self {
            games_played: 1,
            games_won: u64::from(won),
            time_ms: if won { duration_ms } else { 0 },
        }
    }
}

/// A partial record tagged with the username it is grouped by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedPartial {
    pub username: String,
    pub partial: PartialRecord,
}

impl KeyedPartial {
    pub fn new(username: impl Into<String>, partial: PartialRecord) -> Self {
        Self {
            username: username.into(),
            partial,
        }
    }

    pub fn encode(&self) -> String {
        format!(
            "{}{KEY_SEPARATOR}{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
            self.username, self.partial.games_played, self.partial.games_won, self.partial.time_ms
        )
    }

    pub fn decode(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::EmptyLine);
        }
        let (username, payload) = line
            .split_once(KEY_SEPARATOR)
            .ok_or(ParseError::MissingKeySeparator)?;
        if !is_valid_key(username) {
            return Err(ParseError::InvalidKey(username.to_string()));
        }

        let fields: Vec<&str> = payload.split(FIELD_SEPARATOR).collect();
        let [played, won, time_ms] = fields.as_slice() else {
            return Err(ParseError::FieldCount(fields.len()));
        };

        Ok(Self::new(
            username,
            PartialRecord {
                games_played: parse_count(played)?,
                games_won: parse_count(won)?,
                time_ms: parse_count(time_ms)?,
            },
        ))
    }
}

fn parse_count(field: &str) -> Result<u64, ParseError> {
    let field = field.trim();
    field
        .parse::<u64>()
        .map_err(|_| ParseError::InvalidNumber(field.to_string()))
}

/// Final statistics for one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub username: String,
    pub total_games_played: u64,
    pub total_games_won: u64,
    pub total_time_ms: u64,
}

impl Summary {
    /// Mean winning game time in seconds, `0.0` for a player without wins.
    pub fn average_win_time_seconds(&self) -> f64 {
        if self.total_games_won == 0 {
            return 0.0;
        }
        self.total_time_ms as f64 / self.total_games_won as f64 / 1000.0
    }

    pub fn encode(&self) -> String {
        format!(
            "{},{},{},{:.3}",
            self.username,
            self.total_games_played,
            self.total_games_won,
            self.average_win_time_seconds()
        )
    }
}

// Serialized with the derived average in place of the raw time total.
impl Serialize for Summary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Summary", 4)?;
        state.serialize_field("username", &self.username)?;
        state.serialize_field("total_games_played", &self.total_games_played)?;
        state.serialize_field("total_games_won", &self.total_games_won)?;
        state.serialize_field("average_win_time_seconds", &self.average_win_time_seconds())?;
        state.end()
    }
}
