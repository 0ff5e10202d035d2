// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Map stage: turns one raw event line into keyed partial records.
//!
//! Each line is handled on its own, so any number of projectors can run over
//! disjoint shards of the event stream. Malformed lines, non `GAME_FINISHED`
//! events and player entries without a username produce no output.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::ParseError;
use crate::event::RawEvent;
use crate::record::{KeyedPartial, PartialRecord};
use crate::util::strip_transport_key;

#[derive(Debug, Clone, Copy, Default)]
pub struct Projector;

impl Projector {
    pub fn new() -> Self {
        Self
    }

    /// Projects one input line. Never fails; unusable input yields nothing.
    pub fn process(&self, raw_line: &str) -> Vec<KeyedPartial> {
        let line = raw_line.trim();
        if line.is_empty() {
            return Vec::new();
        }
        match Self::parse_event(strip_transport_key(line)) {
            Ok(event) => self.project(&event),
            Err(_) => Vec::new(),
        }
    }

    /// Decodes a payload that must be a JSON object.
    pub fn parse_event(payload: &str) -> Result<RawEvent, ParseError> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| ParseError::InvalidJson(e.to_string()))?;
        if !value.is_object() {
            return Err(ParseError::InvalidJson("payload is not an object".to_string()));
        }
        RawEvent::deserialize(value).map_err(|e| ParseError::InvalidJson(e.to_string()))
    }

    /// Emits one partial per named player of a finished game, in player order.
    pub fn project(&self, event: &RawEvent) -> Vec<KeyedPartial> {
        if !event.is_game_finished() {
            return Vec::new();
        }
        event
            .players
            .iter()
            .filter_map(|player| {
                player.key().map(|username| {
                    KeyedPartial::new(
                        username,
                        PartialRecord::for_player(player.won, event.duration_ms),
                    )
                })
            })
            .collect()
    }
}
