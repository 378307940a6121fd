//! Metrics and scoring
//!
//! Everything here is a pure function of already-fetched data. Time enters
//! only through explicit `now` arguments.

use chrono::{DateTime, Utc};
use repolens_core::{
    CodeAnalysisSummary, CommitActivity, CommitFrequency, ContributorRecord, IssueRecord,
    IssueResponseTime, IssueState, RepositoryMetrics, ResponseTimeBasis,
};
use serde::{Deserialize, Serialize};

/// Reported when no response time can be measured
pub const PLACEHOLDER_RESPONSE_DAYS: i64 = 7;

/// Contributors above this many contributions count as active
pub const ACTIVE_CONTRIBUTION_THRESHOLD: u64 = 10;

const SECONDS_PER_DAY: i64 = 86_400;

const README_SECTIONS: &[&str] = &[
    "installation",
    "usage",
    "contributing",
    "license",
    "description",
    "features",
    "requirements",
];

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn calculate_metrics(
    contributors: &[ContributorRecord],
    issues: &[IssueRecord],
    total_code: usize,
    now: DateTime<Utc>,
) -> RepositoryMetrics {
    let avg_contributions = if contributors.is_empty() {
        0.0
    } else {
        let sum: u64 = contributors.iter().map(|c| c.contributions).sum();
        round2(sum as f64 / contributors.len() as f64)
    };

    RepositoryMetrics {
        avg_contributions,
        active_contributors: contributors
            .iter()
            .filter(|c| c.contributions > ACTIVE_CONTRIBUTION_THRESHOLD)
            .count(),
        open_issues: issues
            .iter()
            .filter(|i| i.state == IssueState::Open)
            .count(),
        issue_response_time: issue_response_time(issues, now),
        total_code,
    }
}

/// Mean issue age in whole days (floored).
///
/// Falls back to [`PLACEHOLDER_RESPONSE_DAYS`] when there are no issues, no
/// issue carries a timestamp, or any present timestamp fails to parse.
pub fn issue_response_time(issues: &[IssueRecord], now: DateTime<Utc>) -> IssueResponseTime {
    let placeholder = IssueResponseTime {
        days: PLACEHOLDER_RESPONSE_DAYS,
        basis: ResponseTimeBasis::Placeholder,
    };

    let parsed: Result<Vec<DateTime<Utc>>, _> = issues
        .iter()
        .filter_map(|issue| issue.created_at.as_deref())
        .filter(|raw| !raw.is_empty())
        .map(|raw| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)))
        .collect();

    let created = match parsed {
        Ok(created) if !created.is_empty() => created,
        _ => return placeholder,
    };

    let total_seconds: i64 = created
        .iter()
        .map(|at| now.signed_duration_since(*at).num_seconds())
        .fold(0i64, |acc, secs| acc.saturating_add(secs));

    IssueResponseTime {
        days: total_seconds.div_euclid(created.len() as i64 * SECONDS_PER_DAY),
        basis: ResponseTimeBasis::Measured,
    }
}

/// `100 - 2*open_issues - 3*response_days + 5*active_contributors`, clamped to `[0, 100]`.
///
/// A placeholder response time is scored like a measured one.
pub fn maintenance_score(metrics: &RepositoryMetrics) -> u32 {
    let open = i64::try_from(metrics.open_issues).unwrap_or(i64::MAX);
    let active = i64::try_from(metrics.active_contributors).unwrap_or(i64::MAX);

    let score = 100i64
        .saturating_sub(open.saturating_mul(2))
        .saturating_sub(metrics.issue_response_time.days.saturating_mul(3))
        .saturating_add(active.saturating_mul(5));

    score.clamp(0, 100) as u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeQuality {
    pub complexity: String,
    pub language_diversity: usize,
    pub main_language_ratio: f64,
    pub quality_score: u32,
}

pub fn code_quality(summary: &CodeAnalysisSummary) -> CodeQuality {
    let total = summary.languages.total();
    let diversity = summary.languages.len();

    let main_language_ratio = if total > 0 {
        summary.languages.max_count() as f64 / total as f64
    } else {
        0.0
    };

    let raw = total as f64 / 10_000.0 * 50.0 + diversity as f64 * 10.0;

    CodeQuality {
        complexity: if total > 10_000 { "Medium" } else { "Simple" }.to_string(),
        language_diversity: diversity,
        main_language_ratio,
        quality_score: raw.min(100.0) as u32,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadmeQuality {
    pub score: u32,
    pub suggestions: Vec<String>,
}

/// Documentation score: 10 points per essential section, code example, badge and link
pub fn readme_quality(readme: Option<&str>) -> ReadmeQuality {
    let readme = match readme {
        Some(text) if !text.is_empty() => text,
        _ => {
            return ReadmeQuality {
                score: 0,
                suggestions: vec![
                    "No README found. Consider adding a comprehensive README file.".to_string(),
                ],
            }
        }
    };

    let lower = readme.to_lowercase();
    let mut score = 0u32;
    let mut suggestions = Vec::new();

    for section in README_SECTIONS {
        if lower.contains(section) {
            score += 10;
        } else {
            suggestions.push(format!("Consider adding a {} section to your README", section));
        }
    }

    if readme.contains("```") {
        score += 10;
    } else {
        suggestions.push("Consider adding code examples to your README".to_string());
    }

    if lower.contains("badge") || readme.contains("shields.io") {
        score += 10;
    } else {
        suggestions.push("Consider adding badges to show project status".to_string());
    }

    if readme.contains("http") {
        score += 10;
    } else {
        suggestions.push("Consider adding relevant links to your README".to_string());
    }

    ReadmeQuality {
        score: score.min(100),
        suggestions,
    }
}

pub fn commit_frequency(activity: &CommitActivity) -> CommitFrequency {
    if activity.is_empty() {
        return CommitFrequency::default();
    }

    let total_commits = activity.total_commits();
    let total_weeks = activity.weeks.len();
    let weekly = total_commits as f64 / total_weeks as f64;

    // First week with the highest total
    let busiest = activity
        .weeks
        .iter()
        .skip(1)
        .fold(&activity.weeks[0], |best, week| {
            if week.total > best.total {
                week
            } else {
                best
            }
        });

    CommitFrequency {
        daily_average: round2(total_commits as f64 / (total_weeks * 7) as f64),
        weekly_average: round2(weekly),
        monthly_average: round2(weekly * 4.0),
        busiest_day: busiest.days.iter().copied().max(),
        busiest_week: Some(busiest.week),
        total_commits,
        total_weeks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use repolens_core::{LanguageHistogram, Provenance, WeekActivity};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn contributor(login: &str, contributions: u64) -> ContributorRecord {
        ContributorRecord {
            login: login.to_string(),
            contributions,
        }
    }

    fn issue(state: IssueState, created_at: Option<&str>) -> IssueRecord {
        IssueRecord {
            title: "issue".to_string(),
            state,
            created_at: created_at.map(String::from),
        }
    }

    #[test]
    fn test_contributor_and_issue_counts() {
        let contributors = [contributor("a", 20), contributor("b", 5), contributor("c", 2)];
        let issues = [
            issue(IssueState::Open, None),
            issue(IssueState::Open, None),
            issue(IssueState::Closed, None),
            issue(IssueState::Closed, None),
        ];
        let metrics = calculate_metrics(&contributors, &issues, 12, now());

        assert_eq!(metrics.avg_contributions, 9.0);
        assert_eq!(metrics.active_contributors, 1);
        assert_eq!(metrics.open_issues, 2);
        assert_eq!(metrics.total_code, 12);
        assert_eq!(metrics.issue_response_time.basis, ResponseTimeBasis::Placeholder);
    }

    #[test]
    fn test_average_is_rounded() {
        let contributors = [contributor("a", 1), contributor("b", 1), contributor("c", 2)];
        let metrics = calculate_metrics(&contributors, &[], 0, now());
        assert_eq!(metrics.avg_contributions, 1.33);
    }

    #[test]
    fn test_empty_inputs_use_baselines() {
        let metrics = calculate_metrics(&[], &[], 0, now());
        assert_eq!(metrics.avg_contributions, 0.0);
        assert_eq!(metrics.active_contributors, 0);
        assert_eq!(metrics.open_issues, 0);
        assert_eq!(
            metrics.issue_response_time,
            IssueResponseTime {
                days: PLACEHOLDER_RESPONSE_DAYS,
                basis: ResponseTimeBasis::Placeholder
            }
        );
        // 100 - 3 * 7
        assert_eq!(maintenance_score(&metrics), 79);
    }

    #[test]
    fn test_response_time_is_floored_mean_age() {
        let issues = [
            issue(IssueState::Open, Some("2024-05-30T12:00:00Z")),
            issue(IssueState::Closed, Some("2024-05-27T00:00:00Z")),
            issue(IssueState::Closed, None),
        ];
        // ages 2.0 and 5.5 days, mean 3.75
        let measured = issue_response_time(&issues, now());
        assert_eq!(
            measured,
            IssueResponseTime {
                days: 3,
                basis: ResponseTimeBasis::Measured
            }
        );
    }

    #[test]
    fn test_unparseable_timestamp_falls_back() {
        let issues = [
            issue(IssueState::Open, Some("2024-05-30T12:00:00Z")),
            issue(IssueState::Open, Some("yesterday")),
        ];
        let time = issue_response_time(&issues, now());
        assert_eq!(time.days, PLACEHOLDER_RESPONSE_DAYS);
        assert_eq!(time.basis, ResponseTimeBasis::Placeholder);
    }

    #[test]
    fn test_future_timestamp_floors_below_zero() {
        let created = (now() + Duration::hours(12)).to_rfc3339();
        let issues = [issue(IssueState::Open, Some(&created))];
        assert_eq!(issue_response_time(&issues, now()).days, -1);
    }

    fn metrics(open_issues: usize, days: i64, active: usize) -> RepositoryMetrics {
        RepositoryMetrics {
            avg_contributions: 0.0,
            active_contributors: active,
            open_issues,
            issue_response_time: IssueResponseTime {
                days,
                basis: ResponseTimeBasis::Measured,
            },
            total_code: 0,
        }
    }

    #[test]
    fn test_maintenance_score() {
        assert_eq!(maintenance_score(&metrics(2, 3, 1)), 100 - 4 - 9 + 5);
        assert_eq!(maintenance_score(&metrics(10_000, 7, 0)), 0);
        assert_eq!(maintenance_score(&metrics(0, 0, 40)), 100);
    }

    #[test]
    fn test_code_quality() {
        let mut summary = CodeAnalysisSummary::default();
        summary.languages = LanguageHistogram::from_iter([("Python", 6), ("Markdown", 2)]);

        let quality = code_quality(&summary);
        assert_eq!(quality.complexity, "Simple");
        assert_eq!(quality.language_diversity, 2);
        assert_eq!(quality.main_language_ratio, 0.75);
        assert_eq!(quality.quality_score, 20);

        let empty = code_quality(&CodeAnalysisSummary::default());
        assert_eq!(empty.main_language_ratio, 0.0);
        assert_eq!(empty.quality_score, 0);
    }

    #[test]
    fn test_readme_quality_full_marks() {
        let readme = "# Tool\n\n![badge](https://img.shields.io/x)\n\n## Description\n## Features\n\
                      ## Requirements\n## Installation\n```sh\ncargo install tool\n```\n## Usage\n\
                      ## Contributing\n## License\n";
        let quality = readme_quality(Some(readme));
        assert_eq!(quality.score, 100);
        assert!(quality.suggestions.is_empty());
    }

    #[test]
    fn test_readme_quality_suggestions() {
        let quality = readme_quality(Some("# Tool\n\nUsage: run it.\n"));
        assert_eq!(quality.score, 10);
        assert_eq!(quality.suggestions.len(), 9);
        assert_eq!(
            quality.suggestions[0],
            "Consider adding a installation section to your README"
        );
        assert!(quality
            .suggestions
            .contains(&"Consider adding relevant links to your README".to_string()));
    }

    #[test]
    fn test_missing_readme() {
        for readme in [None, Some("")] {
            let quality = readme_quality(readme);
            assert_eq!(quality.score, 0);
            assert_eq!(
                quality.suggestions,
                vec!["No README found. Consider adding a comprehensive README file."]
            );
        }
    }

    #[test]
    fn test_commit_frequency() {
        let activity = CommitActivity::new(
            vec![
                WeekActivity::new(100, 10, [0, 1, 2, 3, 4, 0, 0]),
                WeekActivity::new(200, 5, [5, 0, 0, 0, 0, 0, 0]),
                WeekActivity::new(300, 10, [0, 0, 0, 0, 0, 0, 10]),
            ],
            Provenance::Api,
        );
        let frequency = commit_frequency(&activity);

        assert_eq!(frequency.total_commits, 25);
        assert_eq!(frequency.total_weeks, 3);
        assert_eq!(frequency.daily_average, 1.19);
        assert_eq!(frequency.weekly_average, 8.33);
        assert_eq!(frequency.monthly_average, 33.33);
        // ties go to the earliest week
        assert_eq!(frequency.busiest_week, Some(100));
        assert_eq!(frequency.busiest_day, Some(4));
    }

    #[test]
    fn test_commit_frequency_without_weeks() {
        let frequency = commit_frequency(&CommitActivity::default());
        assert_eq!(frequency, CommitFrequency::default());
        assert_eq!(frequency.busiest_week, None);
    }

    proptest! {
        #[test]
        fn prop_maintenance_score_is_clamped(
            open in 0usize..1_000_000,
            days in -100_000i64..100_000,
            active in 0usize..1_000_000,
        ) {
            let score = maintenance_score(&metrics(open, days, active));
            prop_assert!(score <= 100);
        }

        #[test]
        fn prop_extreme_inputs_do_not_overflow(days in any::<i64>()) {
            let score = maintenance_score(&metrics(usize::MAX, days, usize::MAX));
            prop_assert!(score <= 100);
        }

        #[test]
        fn prop_active_contributors_bounded(counts in prop::collection::vec(0u64..100, 0..50)) {
            let contributors: Vec<_> = counts.iter().map(|c| contributor("x", *c)).collect();
            let metrics = calculate_metrics(&contributors, &[], 0, now());
            prop_assert!(metrics.active_contributors <= contributors.len());
        }

        #[test]
        fn prop_quality_scores_are_clamped(
            langs in prop::collection::vec(("[A-Z][a-z]{0,6}", 1usize..100_000), 0..30),
            readme in ".{0,400}",
        ) {
            let mut summary = CodeAnalysisSummary::default();
            for (name, count) in &langs {
                for _ in 0..(*count).min(3) {
                    summary.languages.increment(name);
                }
            }
            prop_assert!(code_quality(&summary).quality_score <= 100);
            prop_assert!(readme_quality(Some(readme.as_str())).score <= 100);
        }

        #[test]
        fn prop_week_percentages_sum_to_100(totals in prop::collection::vec(0u64..10_000, 1..60)) {
            let weeks = totals
                .iter()
                .enumerate()
                .map(|(i, total)| WeekActivity::new(i as i64 * 604_800, *total, [0; 7]))
                .collect();
            let activity = CommitActivity::new(weeks, Provenance::Api);
            let sum: f64 = activity.weeks.iter().map(|w| w.percentage_of_total).sum();

            if activity.total_commits() == 0 {
                prop_assert_eq!(sum, 0.0);
            } else {
                prop_assert!((sum - 100.0).abs() < 1e-6);
            }
            let frequency = commit_frequency(&activity);
            prop_assert_eq!(frequency.total_commits, activity.total_commits());
            prop_assert_eq!(frequency.total_weeks, totals.len());
        }
    }
}
