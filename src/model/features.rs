use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::model::types::{ProfileCounters, RawUserRecord, TechTagMultiset, UserFeatures};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Pure transformation from a raw per-user record to the canonical feature
/// set. Tolerates empty commit history, repositories with missing
/// language/topic fields, and timestamps outside the observation window.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    observation_window_days: i64,
}

impl FeatureExtractor {
    pub fn new(observation_window_days: i64) -> Self {
        Self {
            observation_window_days,
        }
    }

    pub fn extract(&self, record: &RawUserRecord, evaluated_at: DateTime<Utc>) -> UserFeatures {
        UserFeatures {
            intervals: self.extract_intervals(&record.commit_times, evaluated_at),
            tags: extract_tags(record),
            primary_language: extract_primary_language(record),
            counters: ProfileCounters {
                project_count: record.repositories.len() as u32,
                public_repos: record.public_repos,
                followers: record.followers,
                following: record.following,
            },
        }
    }

    /// Gaps in days between consecutive in-window commits. Timestamps outside
    /// the trailing window (including future ones) are filtered out, not
    /// rejected. Duplicate timestamps yield zero-length gaps, which are kept;
    /// the activity model clamps them before fitting.
    fn extract_intervals(
        &self,
        commit_times: &[DateTime<Utc>],
        evaluated_at: DateTime<Utc>,
    ) -> Vec<f64> {
        let window_start = evaluated_at - Duration::days(self.observation_window_days);

        let mut in_window: Vec<DateTime<Utc>> = commit_times
            .iter()
            .copied()
            .filter(|ts| *ts > window_start && *ts <= evaluated_at)
            .collect();
        in_window.sort_unstable();

        in_window
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY)
            .collect()
    }
}

fn extract_tags(record: &RawUserRecord) -> TechTagMultiset {
    let mut tags = TechTagMultiset::new();
    for repo in &record.repositories {
        if let Some(language) = &repo.language {
            tags.add(language);
        }
        for topic in &repo.topics {
            tags.add(topic);
        }
    }
    tags
}

/// Most frequent repository language; ties break alphabetically so the result
/// is deterministic.
fn extract_primary_language(record: &RawUserRecord) -> Option<String> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for repo in &record.repositories {
        if let Some(language) = repo.language.as_deref() {
            let language = language.trim();
            if !language.is_empty() {
                *counts.entry(language).or_insert(0) += 1;
            }
        }
    }

    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(language, _)| language.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::RepositoryRecord;
    use chrono::TimeZone;

    fn ts(days_ago: i64) -> DateTime<Utc> {
        now() - Duration::days(days_ago)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn repo(language: Option<&str>, topics: &[&str]) -> RepositoryRecord {
        RepositoryRecord {
            language: language.map(|s| s.to_string()),
            topics: topics.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn empty_history_yields_empty_intervals() {
        let extractor = FeatureExtractor::new(365);
        let features = extractor.extract(&RawUserRecord::default(), now());
        assert!(features.intervals.is_empty());
        assert!(features.tags.is_empty());
        assert_eq!(features.primary_language, None);
    }

    #[test]
    fn timestamps_outside_window_are_filtered() {
        let extractor = FeatureExtractor::new(365);
        let record = RawUserRecord {
            // One commit two years back and one in the future; only the two
            // in-window commits should produce an interval.
            commit_times: vec![ts(730), ts(10), ts(3), ts(-5)],
            ..Default::default()
        };
        let features = extractor.extract(&record, now());
        assert_eq!(features.intervals.len(), 1);
        assert!((features.intervals[0] - 7.0).abs() < 1e-9);
    }

    #[test]
    fn unsorted_input_is_handled() {
        let extractor = FeatureExtractor::new(365);
        let record = RawUserRecord {
            commit_times: vec![ts(1), ts(9), ts(4)],
            ..Default::default()
        };
        let features = extractor.extract(&record, now());
        assert_eq!(features.intervals.len(), 2);
        assert!((features.intervals[0] - 5.0).abs() < 1e-9);
        assert!((features.intervals[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn duplicate_timestamps_yield_zero_gap_not_error() {
        let extractor = FeatureExtractor::new(365);
        let record = RawUserRecord {
            commit_times: vec![ts(5), ts(5), ts(2)],
            ..Default::default()
        };
        let features = extractor.extract(&record, now());
        assert_eq!(features.intervals.len(), 2);
        assert_eq!(features.intervals[0], 0.0);
    }

    #[test]
    fn repositories_with_missing_fields_are_skipped() {
        let extractor = FeatureExtractor::new(365);
        let record = RawUserRecord {
            repositories: vec![
                repo(Some("Python"), &["ml", "data"]),
                repo(None, &[]),
                repo(Some("Python"), &[]),
                repo(Some("Go"), &["cli"]),
            ],
            ..Default::default()
        };
        let features = extractor.extract(&record, now());
        assert_eq!(features.tags.count("python"), 2);
        assert_eq!(features.tags.count("ml"), 1);
        assert_eq!(features.tags.count("cli"), 1);
        assert_eq!(features.primary_language.as_deref(), Some("Python"));
        assert_eq!(features.counters.project_count, 4);
    }

    #[test]
    fn primary_language_ties_break_alphabetically() {
        let extractor = FeatureExtractor::new(365);
        let record = RawUserRecord {
            repositories: vec![repo(Some("Rust"), &[]), repo(Some("Go"), &[])],
            ..Default::default()
        };
        let features = extractor.extract(&record, now());
        assert_eq!(features.primary_language.as_deref(), Some("Go"));
    }
}
