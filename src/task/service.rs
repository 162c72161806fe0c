use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use welt_service::pagination::{Page, Params};

use crate::integration::storage;
use crate::{project, user};

use super::model::{Assignee, Card, Column, Draft, NewTask, Priority, Status, Task};
use super::{Id, Repository, StatusId};

#[async_trait]
pub trait TaskService {
    async fn create(&self, draft: &Draft) -> super::Result<Task>;

    /// Every status with the tasks of the project currently in it.
    async fn board(&self, project_id: &project::Id) -> super::Result<Vec<Column>>;

    async fn update_status(&self, id: &Id, status_id: &StatusId) -> super::Result<Task>;

    async fn create_status(&self, title: &str) -> super::Result<Status>;

    async fn create_priority(&self, title: &str) -> super::Result<Priority>;

    async fn find_statuses(&self) -> super::Result<Vec<Status>>;

    async fn find_priorities(&self) -> super::Result<Vec<Priority>>;

    async fn find_page(&self, params: &Params) -> super::Result<Page<Task>>;
}

#[derive(Clone)]
pub struct TaskServiceImpl {
    repo: Repository,
    user_service: user::Service,
    project_service: project::Service,
    storage: storage::Config,
}

impl TaskServiceImpl {
    pub fn new(
        repo: Repository,
        user_service: user::Service,
        project_service: project::Service,
        storage: storage::Config,
    ) -> Self {
        Self {
            repo,
            user_service,
            project_service,
            storage,
        }
    }
}

fn checked_title(title: &str) -> super::Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(super::Error::EmptyTitle);
    }

    Ok(title)
}

#[async_trait]
impl TaskService for TaskServiceImpl {
    async fn create(&self, draft: &Draft) -> super::Result<Task> {
        let title = checked_title(draft.title())?;

        if !self.project_service.exists(draft.project_id()).await? {
            return Err(project::Error::NotFound(draft.project_id().clone()).into());
        }

        if !self.repo.status_exists(draft.status_id())? {
            return Err(super::Error::UnknownStatus(draft.status_id().clone()));
        }

        if !self.repo.priority_exists(draft.priority_id())? {
            return Err(super::Error::UnknownPriority(draft.priority_id().clone()));
        }

        let mut assignees = draft.assignee_ids().to_vec();
        assignees.sort();
        assignees.dedup();

        let found = self.user_service.find_by_ids(&assignees).await?;
        if let Some(missing) = assignees
            .iter()
            .find(|id| !found.iter().any(|u| u.id() == *id))
        {
            return Err(user::Error::NotFound(missing.clone()).into());
        }

        let id = Id::random();
        let task = self
            .repo
            .insert(&NewTask::new(&id, title, draft), &assignees)?;

        debug!("Task {id} created with {} assignee(s)", assignees.len());
        Ok(task)
    }

    async fn board(&self, project_id: &project::Id) -> super::Result<Vec<Column>> {
        if !self.project_service.exists(project_id).await? {
            return Err(project::Error::NotFound(project_id.clone()).into());
        }

        let tasks = self.repo.find_by_project(project_id)?;
        let ids = tasks.iter().map(|t| t.id().clone()).collect::<Vec<_>>();

        let mut assignees: HashMap<Id, Vec<Assignee>> = HashMap::new();
        for (task_id, u) in self.repo.find_assignees(&ids)? {
            let avatar = self.storage.resolve_opt(u.avatar());
            assignees
                .entry(task_id)
                .or_default()
                .push(Assignee::new(&u, avatar));
        }

        let priorities = self
            .repo
            .find_priorities()?
            .into_iter()
            .map(|p| (p.id().clone(), p))
            .collect::<HashMap<_, _>>();

        let columns = self
            .repo
            .find_statuses()?
            .into_iter()
            .map(|status| {
                let cards = tasks
                    .iter()
                    .filter(|t| t.status_id() == status.id())
                    .map(|t| {
                        Card::new(
                            t,
                            priorities.get(t.priority_id()).cloned(),
                            assignees.get(t.id()).cloned().unwrap_or_default(),
                        )
                    })
                    .collect();

                Column::new(status, cards)
            })
            .collect();

        Ok(columns)
    }

    async fn update_status(&self, id: &Id, status_id: &StatusId) -> super::Result<Task> {
        self.repo.find_by_id(id)?;

        if !self.repo.status_exists(status_id)? {
            return Err(super::Error::UnknownStatus(status_id.clone()));
        }

        let task = self.repo.update_status(id, status_id)?;
        debug!("Task {id} moved to status {status_id}");

        Ok(task)
    }

    async fn create_status(&self, title: &str) -> super::Result<Status> {
        self.repo.insert_status(checked_title(title)?)
    }

    async fn create_priority(&self, title: &str) -> super::Result<Priority> {
        self.repo.insert_priority(checked_title(title)?)
    }

    async fn find_statuses(&self) -> super::Result<Vec<Status>> {
        self.repo.find_statuses()
    }

    async fn find_priorities(&self) -> super::Result<Vec<Priority>> {
        self.repo.find_priorities()
    }

    async fn find_page(&self, params: &Params) -> super::Result<Page<Task>> {
        let total = self.repo.count()?;
        let tasks = self.repo.find_page(params.offset(), params.limit())?;

        Ok(Page::new(params, total, tasks))
    }
}
