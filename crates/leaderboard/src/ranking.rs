// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Leaderboard ordering of finished summaries.
//!
//! Players are ordered by games won (most first), then by average win time
//! (fastest first). Ties keep their input order. Ranks start at 1 and are never
//! shared.

use std::cmp::Ordering;

use serde::Serialize;

use crate::record::Summary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSummary {
    pub rank: usize,
    #[serde(flatten)]
    pub summary: Summary,
}

impl RankedSummary {
    pub fn encode(&self) -> String {
        format!("{},{}", self.rank, self.summary.encode())
    }
}

pub fn rank(mut summaries: Vec<Summary>) -> Vec<RankedSummary> {
    summaries.sort_by(leaderboard_order);
    summaries
        .into_iter()
        .enumerate()
        .map(|(index, summary)| RankedSummary {
            rank: index + 1,
            summary,
        })
        .collect()
}

fn leaderboard_order(a: &Summary, b: &Summary) -> Ordering {
    b.total_games_won.cmp(&a.total_games_won).then_with(|| {
        a.average_win_time_seconds()
            .total_cmp(&b.average_win_time_seconds())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(username: &str, won: u64, time_ms: u64) -> Summary {
        Summary {
            username: username.to_string(),
            total_games_played: won + 1,
            total_games_won: won,
            total_time_ms: time_ms,
        }
    }

    #[test]
    fn test_most_wins_first_then_fastest() {
        let ranked = rank(vec![
            summary("slow", 2, 80_000),
            summary("none", 0, 0),
            summary("fast", 2, 20_000),
            summary("many", 5, 500_000),
        ]);
        let order: Vec<(usize, &str)> = ranked
            .iter()
            .map(|r| (r.rank, r.summary.username.as_str()))
            .collect();
        assert_eq!(order, vec![(1, "many"), (2, "fast"), (3, "slow"), (4, "none")]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = rank(vec![summary("bo", 1, 1000), summary("ali", 1, 1000)]);
        assert_eq!(ranked[0].summary.username, "bo");
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn test_encode_ranked() {
        let ranked = rank(vec![summary("ali", 1, 42000)]);
        assert_eq!(ranked[0].encode(), "1,ali,2,1,42.000");
    }

    #[test]
    fn test_serialize_ranked() {
        let ranked = rank(vec![summary("ali", 2, 30000)]);
        let json = serde_json::to_value(&ranked[0]).expect("ranked summary should serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "rank": 1,
                "username": "ali",
                "total_games_played": 3,
                "total_games_won": 2,
                "average_win_time_seconds": 15.0
            })
        );
    }

    #[test]
    fn test_empty() {
        assert!(rank(Vec::new()).is_empty());
    }
}
