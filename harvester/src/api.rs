use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

pub const API_BASE: &str = "https://codeforces.com/api";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("codeforces rejected the call: {0}")]
    Rejected(String),
}

/// Standard Codeforces response envelope. `result` is absent whenever
/// `status` is not "OK"; `comment` then explains why.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    comment: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfContest {
    pub id: i32,
    pub name: String,
    pub phase: String,
    #[serde(default)]
    pub start_time_seconds: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfMember {
    pub handle: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfParty {
    #[serde(default)]
    pub participant_type: Option<String>,
    #[serde(default)]
    pub members: Vec<CfMember>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfRanklistRow {
    pub party: CfParty,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfStandings {
    pub contest: CfContest,
    #[serde(default)]
    pub rows: Vec<CfRanklistRow>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfUser {
    pub handle: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub max_rating: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfProblem {
    #[serde(default)]
    pub contest_id: Option<i32>,
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfSubmission {
    pub id: i64,
    #[serde(default)]
    pub contest_id: Option<i32>,
    #[serde(default)]
    pub verdict: Option<String>,
    pub problem: CfProblem,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfRatingChange {
    pub handle: String,
    pub old_rating: i32,
    pub new_rating: i32,
}

/// Thin client over the Codeforces public API. One method per endpoint
/// the ingestion passes need; no retries, callers pace themselves.
pub struct CfClient {
    http: reqwest::Client,
    base: String,
}

impl CfClient {
    pub fn new() -> CfClient {
        CfClient::with_base(API_BASE)
    }

    pub fn with_base(base: &str) -> CfClient {
        CfClient {
            http: reqwest::Client::new(),
            base: base.into(),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.base, method);
        let envelope: Envelope<T> = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await?
            .json()
            .await?;
        if envelope.status != "OK" {
            return Err(ApiError::Rejected(
                envelope.comment.unwrap_or_else(|| "no comment".into()),
            ));
        }
        envelope
            .result
            .ok_or_else(|| ApiError::Rejected("OK status with an empty result".into()))
    }

    pub async fn contest_list(&self) -> Result<Vec<CfContest>, ApiError> {
        self.call("contest.list", &[]).await
    }

    pub async fn contest_standings(
        &self,
        contest_id: i32,
        count: u32,
    ) -> Result<CfStandings, ApiError> {
        self.call(
            "contest.standings",
            &[
                ("contestId", contest_id.to_string()),
                ("from", "1".to_string()),
                ("count", count.to_string()),
            ],
        )
        .await
    }

    pub async fn user_info(&self, handles: &[String]) -> Result<Vec<CfUser>, ApiError> {
        self.call("user.info", &[("handles", handles.join(";"))])
            .await
    }

    pub async fn user_status(&self, handle: &str) -> Result<Vec<CfSubmission>, ApiError> {
        self.call("user.status", &[("handle", handle.to_string())])
            .await
    }

    pub async fn contest_rating_changes(
        &self,
        contest_id: i32,
    ) -> Result<Vec<CfRatingChange>, ApiError> {
        self.call(
            "contest.ratingChanges",
            &[("contestId", contest_id.to_string())],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_carries_the_comment() {
        let envelope: Envelope<Vec<CfContest>> = serde_json::from_str(
            r#"{"status":"FAILED","comment":"contestId: Contest with id 1 has not started"}"#,
        )
        .unwrap();
        assert_eq!(envelope.status, "FAILED");
        assert_eq!(
            envelope.comment.as_deref(),
            Some("contestId: Contest with id 1 has not started")
        );
        assert!(envelope.result.is_none());
    }

    #[test]
    fn absent_optional_fields_deserialize_without_error() {
        let submission: CfSubmission = serde_json::from_str(
            r#"{"id":42,"problem":{"index":"A","tags":[]}}"#,
        )
        .unwrap();
        assert_eq!(submission.contest_id, None);
        assert_eq!(submission.verdict, None);
        assert_eq!(submission.problem.contest_id, None);

        let user: CfUser = serde_json::from_str(r#"{"handle":"tourist"}"#).unwrap();
        assert_eq!(user.organization, None);
        assert_eq!(user.rating, None);
    }

    #[test]
    fn camel_case_fields_map_onto_the_models() {
        let contest: CfContest = serde_json::from_str(
            r#"{"id":1922,"name":"Round (Div. 2)","phase":"FINISHED","startTimeSeconds":1700000000}"#,
        )
        .unwrap();
        assert_eq!(contest.start_time_seconds, Some(1_700_000_000));

        let change: CfRatingChange = serde_json::from_str(
            r#"{"handle":"tourist","oldRating":3700,"newRating":3750}"#,
        )
        .unwrap();
        assert_eq!(change.old_rating, 3700);
        assert_eq!(change.new_rating, 3750);
    }
}
