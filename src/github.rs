use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

const FEED_BASE: &str = "https://github-contributions-api.deno.dev";

#[derive(Debug, Deserialize)]
struct ApiDay {
    date: String,
    #[serde(rename = "contributionCount")]
    contribution_count: u32,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    contributions: Vec<Vec<ApiDay>>,
    #[serde(rename = "totalContributions")]
    total_contributions: u64,
}

/// A flattened contribution feed. Level assignment happens downstream; this
/// carries raw counts only.
pub struct ContributionFeed {
    pub days: Vec<(NaiveDate, u32)>,
    pub total: u64,
}

/// Fetch a user's contribution history. Any network, HTTP, or parse failure
/// collapses to None; the caller renders nothing.
pub fn fetch(user: &str) -> Option<ContributionFeed> {
    let url = format!("{}/{}.json", FEED_BASE, urlencoding::encode(user));
    let response = ureq::get(&url)
        .timeout(Duration::from_secs(10))
        .call()
        .ok()?;
    let api: ApiResponse = response.into_json().ok()?;
    flatten(api)
}

/// Read a feed from a JSON file with the same shape as the public endpoint.
pub fn load_file(path: &Path) -> Option<ContributionFeed> {
    let content = fs::read_to_string(path).ok()?;
    parse(&content)
}

fn parse(json: &str) -> Option<ContributionFeed> {
    let api: ApiResponse = serde_json::from_str(json).ok()?;
    flatten(api)
}

fn flatten(api: ApiResponse) -> Option<ContributionFeed> {
    let mut days = Vec::new();
    for week in api.contributions {
        for day in week {
            let date = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d").ok()?;
            days.push((date, day.contribution_count));
        }
    }
    Some(ContributionFeed {
        days,
        total: api.total_contributions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
        "totalContributions": 42,
        "contributions": [
            [
                {"date": "2024-01-01", "contributionCount": 5, "color": "#216e39"},
                {"date": "2024-01-02", "contributionCount": 0}
            ],
            [
                {"date": "2024-01-08", "contributionCount": 11}
            ]
        ]
    }"##;

    #[test]
    fn feed_parses_and_flattens() {
        let feed = parse(SAMPLE).unwrap();
        assert_eq!(feed.total, 42);
        assert_eq!(feed.days.len(), 3);
        assert_eq!(
            feed.days[0],
            (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 5)
        );
        assert_eq!(feed.days[2].1, 11);
    }

    #[test]
    fn malformed_feed_fails_closed() {
        assert!(parse("not json").is_none());
        assert!(parse(r#"{"contributions": [], "totalContributions": "many"}"#).is_none());
        assert!(parse(
            r#"{"contributions": [[{"date": "yesterday", "contributionCount": 1}]], "totalContributions": 1}"#
        )
        .is_none());
    }

    #[test]
    fn missing_file_fails_closed() {
        assert!(load_file(Path::new("/nonexistent/feed.json")).is_none());
    }
}
