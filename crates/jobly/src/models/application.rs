use crate::client::GenericClient;
use crate::error::{StoreError, StoreResult};
use crate::qb::{self, SqlQb};
use crate::row::{FromRow, RowExt};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio_postgres::Row;

const TABLE: &str = "applications";

/// Where a user stands with a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationState {
    Interested,
    Applied,
    Accepted,
    Rejected,
}

impl ApplicationState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Interested => "interested",
            Self::Applied => "applied",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationState {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interested" => Ok(Self::Interested),
            "applied" => Ok(Self::Applied),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(StoreError::validation(format!(
                "invalid application state: {}",
                other
            ))),
        }
    }
}

/// A user's application to a job, keyed by (username, job_id).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub username: String,
    pub job_id: i32,
    pub state: ApplicationState,
    pub created_at: NaiveDateTime,
}

impl FromRow for Application {
    fn from_row(row: &Row) -> StoreResult<Self> {
        let state: String = row.try_get_column("state")?;
        Ok(Self {
            username: row.try_get_column("username")?,
            job_id: row.try_get_column("job_id")?,
            state: state
                .parse()
                .map_err(|e: StoreError| StoreError::decode("state", e.to_string()))?,
            created_at: row.try_get_column("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewApplication {
    pub username: String,
    pub job_id: i32,
    pub state: ApplicationState,
}

impl Application {
    /// Applications filed by `username`, ordered by job id.
    pub async fn for_user(conn: &impl GenericClient, username: &str) -> StoreResult<Vec<Self>> {
        qb::select(TABLE)
            .eq("username", username.to_string())
            .order_by("job_id")
            .fetch_all(conn)
            .await
    }

    /// Record an application. Applying twice to one job is a unique
    /// violation; an unknown user or job is a foreign-key violation.
    pub async fn create(conn: &impl GenericClient, input: &NewApplication) -> StoreResult<Self> {
        qb::insert(TABLE)
            .set("username", input.username.clone())
            .set("job_id", input.job_id)
            .set("state", input.state.as_str())
            .returning("*")
            .fetch_one(conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips_through_text() {
        for state in [
            ApplicationState::Interested,
            ApplicationState::Applied,
            ApplicationState::Accepted,
            ApplicationState::Rejected,
        ] {
            assert_eq!(state.as_str().parse::<ApplicationState>().unwrap(), state);
        }
        assert!("pending".parse::<ApplicationState>().is_err());
    }

    #[test]
    fn state_deserializes_lowercase() {
        let input: NewApplication = serde_json::from_str(
            r#"{"username":"joe","job_id":3,"state":"applied"}"#,
        )
        .unwrap();
        assert_eq!(input.state, ApplicationState::Applied);
        assert!(serde_json::from_str::<ApplicationState>(r#""Applied""#).is_err());
    }
}
