use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One run's worth of profile statistics.
///
/// Field names (camelCase) double as the template placeholder names, so every
/// value a template shows must already be computed here. Dates are already
/// calendar-date strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub username: String,
    pub issues: u64,
    pub pull_requests: u64,
    pub merged_pull_requests: u64,
    pub comments: u64,
    pub public_repos: u64,
    pub stars: u64,
    pub commits: u64,
    pub followers: u64,
    pub sponsoring: u64,
    pub registered_at: String,
    pub first_pull_request_date: Option<String>,
    pub first_pull_request_url: Option<String>,
    pub latest_pull_request_date: Option<String>,
    pub latest_pull_request_url: Option<String>,
    pub stat_updated: String,
}

/// The head item of a sorted pull request search.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestRef {
    pub created: String,
    pub url: String,
}

/// Reduce a GitHub timestamp (`2019-03-01T12:34:56Z`) or a plain
/// `YYYY-MM-DD` to its UTC calendar date.
pub fn normalize_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc).date_naive());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .with_context(|| format!("Unrecognised date {raw:?}"))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `normalize_date` in string form, e.g. `2019-03-01T12:34:56Z` to `2019-03-01`.
pub fn calendar_date(raw: &str) -> Result<String> {
    Ok(format_date(normalize_date(raw)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_drop_time_of_day() {
        assert_eq!(calendar_date("2019-03-01T12:34:56Z").unwrap(), "2019-03-01");
    }

    #[test]
    fn offsets_are_converted_to_utc_first() {
        assert_eq!(calendar_date("2019-03-01T23:30:00-02:00").unwrap(), "2019-03-02");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in [
            "2011-01-25T18:44:36Z",
            "2024-02-29T00:00:00Z",
            "2024-02-29",
            "1999-12-31T23:59:59+00:00",
        ] {
            let once = calendar_date(raw).unwrap();
            let twice = calendar_date(&once).unwrap();
            assert_eq!(once, twice, "input {raw}");
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(calendar_date("yesterday").is_err());
        assert!(calendar_date("").is_err());
    }

    #[test]
    fn format_pads_month_and_day() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(format_date(date), "2024-06-01");
    }

    #[test]
    fn summary_serializes_with_placeholder_names() {
        let summary = StatsSummary {
            username: "octocat".into(),
            issues: 1,
            pull_requests: 2,
            merged_pull_requests: 1,
            comments: 3,
            public_repos: 4,
            stars: 5,
            commits: 6,
            followers: 7,
            sponsoring: 0,
            registered_at: "2011-01-25".into(),
            first_pull_request_date: None,
            first_pull_request_url: None,
            latest_pull_request_date: Some("2024-01-02".into()),
            latest_pull_request_url: Some("https://github.com/o/r/pull/1".into()),
            stat_updated: "2024-01-25".into(),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["mergedPullRequests"], 1);
        assert_eq!(json["registeredAt"], "2011-01-25");
        assert_eq!(json["latestPullRequestDate"], "2024-01-02");
        assert!(json["firstPullRequestDate"].is_null());
        assert_eq!(json["statUpdated"], "2024-01-25");
    }
}
