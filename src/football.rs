//! Football schedule from football-data.org
//!
//! Live scores come from the public v4 API; the schedule status shown in the
//! app is derived from the API status and the kick-off time.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::Match;

/// Poll interval while a match is in play
pub const LIVE_REFRESH: Duration = Duration::from_secs(5);
pub const IDLE_REFRESH: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Team {
    pub id: u64,
    pub name: String,
    #[serde(default, rename = "shortName")]
    pub short_name: Option<String>,
    #[serde(default)]
    pub tla: Option<String>,
    #[serde(default)]
    pub crest: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Competition {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl Competition {
    /// Premier League is shown by its short name
    pub fn label(&self) -> &str {
        match self.code.as_deref() {
            Some("PL") => "EPL",
            _ => self.name.as_str(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FullTime {
    #[serde(default)]
    pub home: Option<u32>,
    #[serde(default)]
    pub away: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Score {
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default, rename = "fullTime")]
    pub full_time: FullTime,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FixtureMatch {
    pub id: u64,
    #[serde(rename = "utcDate")]
    pub utc_date: DateTime<Utc>,
    pub status: String,
    #[serde(default)]
    pub competition: Option<Competition>,
    #[serde(rename = "homeTeam")]
    pub home_team: Team,
    #[serde(rename = "awayTeam")]
    pub away_team: Team,
    #[serde(default)]
    pub score: Option<Score>,
}

impl FixtureMatch {
    /// API reports the match as in progress right now
    pub fn is_in_play(&self) -> bool {
        matches!(self.status.as_str(), "LIVE" | "IN_PLAY")
    }

    pub fn score_line(&self) -> Option<String> {
        let ft = &self.score.as_ref()?.full_time;
        Some(format!("{} - {}", ft.home?, ft.away?))
    }
}

#[derive(Debug, Deserialize)]
struct MatchesResponse {
    #[serde(default)]
    matches: Vec<FixtureMatch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleStatus {
    Upcoming,
    Live,
    Finished,
}

impl ScheduleStatus {
    pub fn label_key(&self) -> &'static str {
        match self {
            ScheduleStatus::Upcoming => "upcoming",
            ScheduleStatus::Live => "live",
            ScheduleStatus::Finished => "finished",
        }
    }
}

/// Status from the API, falling back to the kick-off window
pub fn classify(
    status: &str,
    start: DateTime<Utc>,
    now: DateTime<Utc>,
    duration_minutes: i64,
) -> ScheduleStatus {
    match status {
        "LIVE" | "IN_PLAY" | "PAUSED" => ScheduleStatus::Live,
        "FINISHED" | "POSTPONED" => ScheduleStatus::Finished,
        _ => {
            let end = start + chrono::Duration::minutes(duration_minutes);
            if now >= end {
                ScheduleStatus::Finished
            } else if now >= start {
                ScheduleStatus::Live
            } else {
                ScheduleStatus::Upcoming
            }
        }
    }
}

/// How long until the next schedule refresh
pub fn refresh_interval(matches: &[FixtureMatch]) -> Duration {
    if matches.iter().any(FixtureMatch::is_in_play) {
        LIVE_REFRESH
    } else {
        IDLE_REFRESH
    }
}

/// `HH:MM:SS`, clamped at zero
pub fn format_time_left(left: chrono::Duration) -> String {
    let total = left.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Filter pills on the matches screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchFilter {
    #[default]
    All,
    Live,
    Upcoming,
}

impl MatchFilter {
    pub fn accepts(&self, m: &Match) -> bool {
        match self {
            MatchFilter::All => true,
            MatchFilter::Live => m.is_live,
            MatchFilter::Upcoming => !m.is_live,
        }
    }
}

pub struct FootballClient {
    matches_url: String,
    api_key: String,
    agent: ureq::Agent,
}

impl FootballClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(20)))
            .timeout_connect(Some(Duration::from_secs(10)))
            .http_status_as_error(false)
            .build()
            .new_agent();

        let base = base_url.trim_end_matches('/');
        let matches_url = if base.ends_with("/matches") {
            base.to_string()
        } else {
            format!("{}/matches", base)
        };

        Self {
            matches_url,
            api_key: api_key.to_string(),
            agent,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        if config.football_api_key.is_empty() {
            return Err(ApiError::NotConfigured);
        }
        Ok(Self::new(&config.football_api_url, &config.football_api_key))
    }

    pub fn matches_url(&self) -> &str {
        &self.matches_url
    }

    /// Fetch matches, optionally filtered by API status (`LIVE`, `SCHEDULED`, ...)
    pub fn fetch_matches(&self, status: Option<&str>) -> Result<Vec<FixtureMatch>, ApiError> {
        let mut request = self
            .agent
            .get(&self.matches_url)
            .header("X-Auth-Token", &self.api_key);
        if let Some(status) = status {
            request = request.query("status", status);
        }

        let mut response = request.call()?;
        let code = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        if code != 200 {
            return Err(ApiError::Status { status: code, body });
        }

        let parsed = parse_matches(&body)?;
        debug!(count = parsed.len(), "football matches fetched");
        Ok(parsed)
    }
}

pub fn parse_matches(body: &str) -> Result<Vec<FixtureMatch>, ApiError> {
    let response: MatchesResponse = serde_json::from_str(body)?;
    Ok(response.matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    const SAMPLE: &str = r#"{
        "count": 2,
        "filters": {},
        "matches": [
            {
                "id": 1,
                "utcDate": "2024-08-17T14:00:00Z",
                "status": "IN_PLAY",
                "competition": {"id": 2021, "name": "Premier League", "code": "PL"},
                "homeTeam": {"id": 57, "name": "Arsenal FC", "shortName": "Arsenal", "tla": "ARS", "crest": "https://crests/57.png"},
                "awayTeam": {"id": 65, "name": "Manchester City FC"},
                "score": {"winner": null, "fullTime": {"home": 1, "away": 0}}
            },
            {
                "id": 2,
                "utcDate": "2024-08-18T16:30:00Z",
                "status": "TIMED",
                "competition": {"id": 2014, "name": "Primera Division", "code": "PD"},
                "homeTeam": {"id": 86, "name": "Real Madrid CF"},
                "awayTeam": {"id": 81, "name": "FC Barcelona"}
            }
        ]
    }"#;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 17, h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_matches() {
        let matches = parse_matches(SAMPLE).unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches[0].is_in_play());
        assert_eq!(matches[0].home_team.short_name.as_deref(), Some("Arsenal"));
        assert_eq!(matches[0].score_line().as_deref(), Some("1 - 0"));
        assert_eq!(matches[0].competition.as_ref().unwrap().label(), "EPL");
        assert_eq!(matches[1].competition.as_ref().unwrap().label(), "Primera Division");
        assert_eq!(matches[1].score_line(), None);
    }

    #[test]
    fn test_missing_matches_key_is_empty() {
        assert!(parse_matches(r#"{"count": 0}"#).unwrap().is_empty());
    }

    #[rstest]
    #[case("LIVE", at(10, 0), ScheduleStatus::Live)]
    #[case("IN_PLAY", at(10, 0), ScheduleStatus::Live)]
    #[case("PAUSED", at(20, 0), ScheduleStatus::Live)]
    #[case("FINISHED", at(14, 30), ScheduleStatus::Finished)]
    #[case("POSTPONED", at(10, 0), ScheduleStatus::Finished)]
    #[case("SCHEDULED", at(13, 59), ScheduleStatus::Upcoming)]
    #[case("TIMED", at(14, 0), ScheduleStatus::Live)]
    #[case("TIMED", at(15, 29), ScheduleStatus::Live)]
    #[case("TIMED", at(15, 30), ScheduleStatus::Finished)]
    fn test_classify(#[case] status: &str, #[case] now: DateTime<Utc>, #[case] expected: ScheduleStatus) {
        assert_eq!(classify(status, at(14, 0), now, 90), expected);
    }

    #[test]
    fn test_refresh_interval() {
        let mut matches = parse_matches(SAMPLE).unwrap();
        assert_eq!(refresh_interval(&matches), LIVE_REFRESH);

        // PAUSED counts as live for display but not for fast polling
        matches[0].status = "PAUSED".to_string();
        assert_eq!(refresh_interval(&matches), IDLE_REFRESH);
        assert_eq!(refresh_interval(&[]), IDLE_REFRESH);
    }

    #[test]
    fn test_format_time_left() {
        assert_eq!(format_time_left(chrono::Duration::seconds(3 * 3600 + 5 * 60 + 9)), "03:05:09");
        assert_eq!(format_time_left(chrono::Duration::seconds(59)), "00:00:59");
        assert_eq!(format_time_left(chrono::Duration::seconds(-10)), "00:00:00");
    }

    #[test]
    fn test_matches_url() {
        assert_eq!(
            FootballClient::new("https://api.football-data.org/v4/", "k").matches_url(),
            "https://api.football-data.org/v4/matches"
        );
        assert_eq!(
            FootballClient::new("http://proxy/api/v4/matches", "k").matches_url(),
            "http://proxy/api/v4/matches"
        );
    }
}
