use super::{RepositoryError, StoriesRepository, HTTP_CLIENT};
use crate::config::Config;
use crate::data::{SprintId, Status, StatusId, Story};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Stories fetched per request. Taiga caps page_size at 100.
const PAGE_SIZE: u32 = 20;

// Type-safe response structures for the Taiga v1 REST API

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
    pub order: i64,
    pub is_closed: bool,
}

#[derive(Debug, Deserialize)]
pub struct StoryPayload {
    pub id: i64,
    #[serde(rename = "ref")]
    pub reference: i64,
    pub subject: String,
    pub status: i64,
    pub is_closed: bool,
    pub created_date: DateTime<Utc>,
    pub assigned_to_extra_info: Option<AssigneePayload>,
}

#[derive(Debug, Deserialize)]
pub struct AssigneePayload {
    pub full_name_display: Option<String>,
}

impl From<StatusPayload> for Status {
    fn from(payload: StatusPayload) -> Self {
        Status {
            id: payload.id,
            name: payload.name,
            color: payload.color.unwrap_or_else(|| "#999999".to_string()),
            order: payload.order,
            is_closed: payload.is_closed,
        }
    }
}

impl From<StoryPayload> for Story {
    fn from(payload: StoryPayload) -> Self {
        Story {
            id: payload.id,
            reference: payload.reference,
            subject: payload.subject,
            status_id: payload.status,
            assignee: payload
                .assigned_to_extra_info
                .and_then(|a| a.full_name_display),
            is_closed: payload.is_closed,
            created_at: payload.created_date,
        }
    }
}

/// Repository implementation backed by a Taiga server.
pub struct TaigaRemote {
    server: String,
    token: String,
    project: i64,
    page_size: u32,
}

impl TaigaRemote {
    pub fn new(server: impl Into<String>, token: impl Into<String>, project: i64) -> Self {
        Self {
            server: server.into().trim_end_matches('/').to_string(),
            token: token.into(),
            project,
            page_size: PAGE_SIZE,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut remote = Self::new(
            &config.server.url,
            &config.server.token,
            config.server.project,
        );
        remote.page_size = config.board.page_size;
        remote
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.server, path)
    }
}

#[async_trait]
impl StoriesRepository for TaigaRemote {
    async fn get_statuses(
        &self,
        _sprint: Option<SprintId>,
    ) -> Result<Vec<Status>, RepositoryError> {
        // Statuses are defined per project; the sprint scope only affects
        // which stories are fetched.
        let response = HTTP_CLIENT
            .get(self.api_url("userstory-statuses"))
            .bearer_auth(&self.token)
            .query(&[("project", self.project)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RepositoryError::Server {
                status: response.status().as_u16(),
            });
        }

        let payload: Vec<StatusPayload> = response.json().await?;
        let mut statuses: Vec<Status> = payload.into_iter().map(Status::from).collect();
        statuses.sort_by_key(|s| s.order);
        Ok(statuses)
    }

    async fn get_stories(
        &self,
        status: StatusId,
        page: u32,
        sprint: Option<SprintId>,
    ) -> Result<Vec<Story>, RepositoryError> {
        // milestone=null selects backlog stories (not assigned to a sprint)
        let milestone = sprint.map_or_else(|| "null".to_string(), |id| id.to_string());

        let response = HTTP_CLIENT
            .get(self.api_url("userstories"))
            .bearer_auth(&self.token)
            .query(&[
                ("project", self.project.to_string()),
                ("status", status.to_string()),
                ("milestone", milestone),
                ("page", page.to_string()),
                ("page_size", self.page_size.to_string()),
            ])
            .send()
            .await?;

        // Taiga answers 404 for a page past the last one. That is the
        // "no further pages" signal, not an error.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(RepositoryError::Server {
                status: response.status().as_u16(),
            });
        }

        let payload: Vec<StoryPayload> = response.json().await?;
        Ok(payload.into_iter().map(Story::from).collect())
    }
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    auth_token: String,
}

/// Exchange credentials for an auth token (`POST /api/v1/auth`).
pub async fn login(
    server: &str,
    username: &str,
    password: &str,
) -> Result<String, RepositoryError> {
    let server = server.trim_end_matches('/');

    let response = HTTP_CLIENT
        .post(format!("{}/api/v1/auth", server))
        .json(&serde_json::json!({
            "username": username,
            "password": password,
            "type": "normal",
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(RepositoryError::Server {
            status: response.status().as_u16(),
        });
    }

    let payload: LoginPayload = response.json().await?;
    Ok(payload.auth_token)
}
