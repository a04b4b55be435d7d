//! Test utilities and fixtures for taigazer tests

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use taigazer::data::{SprintId, Status, StatusId, Story};
use taigazer::remote::{RepositoryError, StoriesRepository};

pub fn make_status(id: StatusId, name: &str) -> Status {
    Status {
        id,
        name: name.to_string(),
        color: "#70728F".to_string(),
        order: id,
        is_closed: false,
    }
}

pub fn make_story(id: i64, status: StatusId) -> Story {
    Story {
        id,
        reference: id * 10,
        subject: format!("Story {}", id),
        status_id: status,
        assignee: None,
        is_closed: false,
        created_at: Utc::now(),
    }
}

/// In-memory repository with scripted pages and failures. Records every
/// story-page request so tests can assert what was (not) fetched.
#[derive(Default)]
pub struct FakeRepository {
    statuses: Vec<Status>,
    pages: HashMap<(StatusId, u32), Vec<Story>>,
    fail_statuses: bool,
    fail_pages: HashSet<(StatusId, u32)>,
    calls: Arc<Mutex<Vec<(StatusId, u32)>>>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(mut self, statuses: Vec<Status>) -> Self {
        self.statuses = statuses;
        self
    }

    /// Script one page of stories. Unscripted pages resolve empty.
    pub fn with_page(mut self, status: StatusId, page: u32, stories: Vec<Story>) -> Self {
        self.pages.insert((status, page), stories);
        self
    }

    pub fn failing_statuses(mut self) -> Self {
        self.fail_statuses = true;
        self
    }

    pub fn failing_page(mut self, status: StatusId, page: u32) -> Self {
        self.fail_pages.insert((status, page));
        self
    }

    /// Handle onto the request log, valid after the fake moves into a
    /// loader.
    pub fn call_log(&self) -> Arc<Mutex<Vec<(StatusId, u32)>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl StoriesRepository for FakeRepository {
    async fn get_statuses(
        &self,
        _sprint: Option<SprintId>,
    ) -> Result<Vec<Status>, RepositoryError> {
        if self.fail_statuses {
            return Err(RepositoryError::Server { status: 503 });
        }
        Ok(self.statuses.clone())
    }

    async fn get_stories(
        &self,
        status: StatusId,
        page: u32,
        _sprint: Option<SprintId>,
    ) -> Result<Vec<Story>, RepositoryError> {
        self.calls.lock().unwrap().push((status, page));
        if self.fail_pages.contains(&(status, page)) {
            return Err(RepositoryError::Server { status: 500 });
        }
        Ok(self.pages.get(&(status, page)).cloned().unwrap_or_default())
    }
}
