// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Reduce stage: folds grouped partial records into one summary per player.
//!
//! Input must arrive grouped by username, all pairs of a key contiguous. The
//! aggregator keeps a single open group and emits its summary when the key
//! changes. `finish` closes the last group; a run that skips it loses that
//! player's summary.
//!
//! ```text
//!            push(k)                 push(k' != k)
//!   Idle ─────────────▶ Open(k) ───────────────────▶ Open(k')  emits summary(k)
//!     ▲                    │
//!     └────── finish ──────┘                                   emits summary(k)
//! ```

use crate::record::{KeyedPartial, PartialRecord, Summary};

/// Running totals of the group currently being folded.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Group {
    username: String,
    played: u64,
    won: u64,
    time_ms: u64,
}

impl Group {
    fn open(username: String) -> Self {
        Self {
            username,
            played: 0,
            won: 0,
            time_ms: 0,
        }
    }

    fn add(&mut self, partial: &PartialRecord) {
        self.played = self.played.saturating_add(partial.games_played);
        self.won = self.won.saturating_add(partial.games_won);
        self.time_ms = self.time_ms.saturating_add(partial.time_ms);
    }

    fn into_summary(self) -> Summary {
        Summary {
            username: self.username,
            total_games_played: self.played,
            total_games_won: self.won,
            total_time_ms: self.time_ms,
        }
    }
}

#[derive(Debug, Default)]
pub struct Aggregator {
    current: Option<Group>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one pair. Returns the previous group's summary when the key changes.
    pub fn push(&mut self, pair: KeyedPartial) -> Option<Summary> {
        let KeyedPartial { username, partial } = pair;
        let flushed = match self.current.take() {
            Some(group) if group.username == username => {
                self.current = Some(group);
                None
            }
            Some(group) => {
                self.current = Some(Group::open(username));
                Some(group.into_summary())
            }
            None => {
                self.current = Some(Group::open(username));
                None
            }
        };
        if let Some(group) = self.current.as_mut() {
            group.add(&partial);
        }
        flushed
    }

    /// Decodes and folds one grouped line. Blank and malformed lines are
    /// skipped and leave the open group untouched.
    pub fn push_line(&mut self, line: &str) -> Option<Summary> {
        KeyedPartial::decode(line)
            .ok()
            .and_then(|pair| self.push(pair))
    }

    /// Closes the open group, if any, and returns the aggregator to idle.
    pub fn finish(&mut self) -> Option<Summary> {
        self.current.take().map(Group::into_summary)
    }

    /// Username of the open group.
    pub fn current_key(&self) -> Option<&str> {
        self.current.as_ref().map(|group| group.username.as_str())
    }

    /// Folds a complete grouped sequence, final flush included.
    pub fn aggregate<I>(pairs: I) -> Vec<Summary>
    where
        I: IntoIterator<Item = KeyedPartial>,
    {
        let mut aggregator = Self::new();
        let mut summaries: Vec<Summary> = pairs
            .into_iter()
            .filter_map(|pair| aggregator.push(pair))
            .collect();
        summaries.extend(aggregator.finish());
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pair(username: &str, played: u64, won: u64, time_ms: u64) -> KeyedPartial {
        KeyedPartial::new(
            username,
            PartialRecord {
                games_played: played,
                games_won: won,
                time_ms,
            },
        )
    }

    fn encoded(summaries: &[Summary]) -> Vec<String> {
        summaries.iter().map(Summary::encode).collect()
    }

    #[test]
    fn test_aggregate_grouped_input() {
        let summaries = Aggregator::aggregate(vec![
            pair("ali", 1, 1, 42000),
            pair("ali", 1, 0, 0),
            pair("bo", 1, 0, 0),
        ]);
        assert_eq!(encoded(&summaries), vec!["ali,2,1,42.000", "bo,1,0,0.000"]);
    }

    #[test]
    fn test_empty_input_emits_nothing() {
        assert!(Aggregator::aggregate(Vec::new()).is_empty());
        assert_eq!(Aggregator::new().finish(), None);
    }

    #[test]
    fn test_push_flushes_on_key_change_only() {
        let mut aggregator = Aggregator::new();
        assert_eq!(aggregator.current_key(), None);
        assert_eq!(aggregator.push(pair("ali", 1, 1, 10)), None);
        assert_eq!(aggregator.push(pair("ali", 1, 1, 20)), None);
        assert_eq!(aggregator.current_key(), Some("ali"));

        let flushed = aggregator.push(pair("bo", 1, 0, 0)).expect("ali should flush");
        assert_eq!(flushed.username, "ali");
        assert_eq!(flushed.total_games_played, 2);
        assert_eq!(flushed.total_time_ms, 30);
        assert_eq!(aggregator.current_key(), Some("bo"));
    }

    #[test]
    fn test_finish_flushes_last_group_and_resets() {
        let mut aggregator = Aggregator::new();
        aggregator.push(pair("ali", 1, 1, 10));
        let last = aggregator.finish().expect("last group should flush");
        assert_eq!(last.encode(), "ali,1,1,0.010");
        assert_eq!(aggregator.current_key(), None);
        assert_eq!(aggregator.finish(), None);

        // reusable for a new run
        aggregator.push(pair("ali", 1, 0, 0));
        assert_eq!(
            aggregator.finish().map(|s| s.encode()),
            Some("ali,1,0,0.000".to_string())
        );
    }

    #[test]
    fn test_emission_follows_first_appearance() {
        let summaries = Aggregator::aggregate(vec![
            pair("zed", 1, 0, 0),
            pair("ali", 1, 0, 0),
            pair("mo", 1, 0, 0),
        ]);
        let keys: Vec<&str> = summaries.iter().map(|s| s.username.as_str()).collect();
        assert_eq!(keys, vec!["zed", "ali", "mo"]);
    }

    #[test]
    fn test_ungrouped_key_is_emitted_per_run() {
        // grouping is the transport's job; a split key yields two summaries
        let summaries = Aggregator::aggregate(vec![
            pair("ali", 1, 0, 0),
            pair("bo", 1, 0, 0),
            pair("ali", 1, 0, 0),
        ]);
        assert_eq!(summaries.len(), 3);
    }

    #[test]
    fn test_push_line_skips_malformed_without_touching_state() {
        let mut aggregator = Aggregator::new();
        assert_eq!(aggregator.push_line("ali\t1,1,4000"), None);
        assert_eq!(aggregator.push_line("bo\tnot,a,number"), None);
        assert_eq!(aggregator.push_line("bo 1,1,1"), None);
        assert_eq!(aggregator.push_line("bo\t1,1"), None);
        assert_eq!(aggregator.push_line(""), None);
        assert_eq!(aggregator.current_key(), Some("ali"));
        assert_eq!(aggregator.push_line("ali\t1,1,2000"), None);

        let flushed = aggregator.push_line("bo\t1,0,0").expect("ali should flush");
        assert_eq!(flushed.encode(), "ali,2,2,3.000");
        assert_eq!(
            aggregator.finish().map(|s| s.encode()),
            Some("bo,1,0,0.000".to_string())
        );
    }

    #[test]
    fn test_totals_saturate() {
        let summaries =
            Aggregator::aggregate(vec![pair("ali", 1, 1, u64::MAX), pair("ali", 1, 1, 5)]);
        assert_eq!(summaries[0].total_time_ms, u64::MAX);
    }

    fn partials() -> impl Strategy<Value = Vec<(bool, u64)>> {
        prop::collection::vec((any::<bool>(), 0u64..10_000_000), 1..50)
    }

    proptest! {
        #[test]
        fn prop_intra_group_order_does_not_matter(games in partials()) {
            let forward: Vec<KeyedPartial> = games
                .iter()
                .map(|(won, duration)| KeyedPartial::new("ali", PartialRecord::for_player(*won, *duration)))
                .collect();
            let mut backward = forward.clone();
            backward.reverse();

            prop_assert_eq!(Aggregator::aggregate(forward), Aggregator::aggregate(backward));
        }

        #[test]
        fn prop_won_never_exceeds_played(games in partials()) {
            let pairs = games
                .iter()
                .map(|(won, duration)| KeyedPartial::new("ali", PartialRecord::for_player(*won, *duration)));
            let summaries = Aggregator::aggregate(pairs);

            prop_assert_eq!(summaries.len(), 1);
            prop_assert!(summaries[0].total_games_won <= summaries[0].total_games_played);
            prop_assert_eq!(summaries[0].total_games_played, games.len() as u64);
        }
    }
}
