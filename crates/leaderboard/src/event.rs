// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Schema of the game-completion events consumed by the projector.
//!
//! Events are semi-structured. Every field is optional and every read has a fixed
//! fallback, so a wrongly typed field degrades to its default instead of rejecting
//! the whole event:
//!
//! | field                | fallback                                          |
//! |----------------------|---------------------------------------------------|
//! | `event_type`         | `None` when absent or not a string                |
//! | `duration_ms`        | `0` when absent, negative or non-numeric          |
//! | `players`            | empty when absent or not an array                 |
//! | `players[].username` | `None` when absent or not a string                |
//! | `players[].username` | no key when empty or holding `\t` `\n` `\r` `,`   |
//! | `players[].won`      | JSON truthiness, `false` when absent              |
//!
//! A player entry that is not an object decodes to an entry without a username.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::util::{is_truthy, is_valid_key, lenient_u64};

/// Event type carrying a finished game. Every other type is ignored.
pub const GAME_FINISHED: &str = "GAME_FINISHED";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    #[serde(deserialize_with = "string_or_none")]
    pub event_type: Option<String>,
    #[serde(deserialize_with = "lenient_duration")]
    pub duration_ms: u64,
    #[serde(deserialize_with = "lenient_players")]
    pub players: Vec<PlayerEntry>,
    /// Informational; the projector derives wins from `players[].won`.
    #[serde(deserialize_with = "string_or_none")]
    pub winner: Option<String>,
    #[serde(deserialize_with = "i64_or_none")]
    pub timestamp: Option<i64>,
}

impl RawEvent {
    pub fn is_game_finished(&self) -> bool {
        self.event_type.as_deref() == Some(GAME_FINISHED)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlayerEntry {
    #[serde(deserialize_with = "string_or_none")]
    pub username: Option<String>,
    #[serde(deserialize_with = "truthy")]
    pub won: bool,
}

impl PlayerEntry {
    /// The username, if present and usable as a record key.
    pub fn key(&self) -> Option<&str> {
        self.username.as_deref().filter(|name| is_valid_key(name))
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn i64_or_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_i64())
}

fn lenient_duration<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_u64(&Value::deserialize(deserializer)?))
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(is_truthy(&Value::deserialize(deserializer)?))
}

fn lenient_players<'de, D>(deserializer: D) -> Result<Vec<PlayerEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| PlayerEntry::deserialize(item).unwrap_or_default())
        .collect())
}
