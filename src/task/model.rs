use chrono::{DateTime, Utc};
use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::user::model::User;
use crate::{project, user};

use super::{Id, PriorityId, StatusId};

#[derive(Queryable, Selectable, Serialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = crate::schema::task_statuses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Status {
    id: StatusId,
    title: String,
}

impl Status {
    pub const fn id(&self) -> &StatusId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

#[cfg(test)]
impl Status {
    pub fn new(id: StatusId, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::task_statuses)]
pub struct NewStatus<'a> {
    id: &'a StatusId,
    title: &'a str,
}

impl<'a> NewStatus<'a> {
    pub fn new(id: &'a StatusId, title: &'a str) -> Self {
        Self { id, title }
    }
}

#[derive(Queryable, Selectable, Serialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = crate::schema::task_priorities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Priority {
    id: PriorityId,
    title: String,
}

impl Priority {
    pub const fn id(&self) -> &PriorityId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

#[cfg(test)]
impl Priority {
    pub fn new(id: PriorityId, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::task_priorities)]
pub struct NewPriority<'a> {
    id: &'a PriorityId,
    title: &'a str,
}

impl<'a> NewPriority<'a> {
    pub fn new(id: &'a PriorityId, title: &'a str) -> Self {
        Self { id, title }
    }
}

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Task {
    id: Id,
    title: String,
    description: Option<String>,
    project_id: project::Id,
    status_id: StatusId,
    priority_id: PriorityId,
    deadline: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn project_id(&self) -> &project::Id {
        &self.project_id
    }

    pub const fn status_id(&self) -> &StatusId {
        &self.status_id
    }

    pub const fn priority_id(&self) -> &PriorityId {
        &self.priority_id
    }

    pub const fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }
}

#[cfg(test)]
impl Task {
    pub fn set_status(&mut self, status_id: &StatusId) {
        self.status_id = status_id.clone();
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
impl From<&NewTask<'_>> for Task {
    fn from(t: &NewTask<'_>) -> Self {
        let now = Utc::now();
        Self {
            id: t.id.clone(),
            title: t.title.to_string(),
            description: t.description.map(String::from),
            project_id: t.project_id.clone(),
            status_id: t.status_id.clone(),
            priority_id: t.priority_id.clone(),
            deadline: t.deadline,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tasks)]
pub struct NewTask<'a> {
    id: &'a Id,
    title: &'a str,
    description: Option<&'a str>,
    project_id: &'a project::Id,
    status_id: &'a StatusId,
    priority_id: &'a PriorityId,
    deadline: Option<DateTime<Utc>>,
}

impl<'a> NewTask<'a> {
    pub fn new(id: &'a Id, title: &'a str, draft: &'a Draft) -> Self {
        Self {
            id,
            title,
            description: draft.description.as_deref(),
            project_id: &draft.project_id,
            status_id: &draft.status_id,
            priority_id: &draft.priority_id,
            deadline: draft.deadline,
        }
    }

    pub const fn id(&self) -> &Id {
        self.id
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::task_assignments)]
pub struct NewAssignment<'a> {
    task_id: &'a Id,
    user_id: &'a user::Id,
}

impl<'a> NewAssignment<'a> {
    pub fn new(task_id: &'a Id, user_id: &'a user::Id) -> Self {
        Self { task_id, user_id }
    }
}

/// Task as submitted by a client.
#[derive(Deserialize, Clone, Debug)]
pub struct Draft {
    title: String,
    description: Option<String>,
    project_id: project::Id,
    status_id: StatusId,
    priority_id: PriorityId,
    deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    assignee_ids: Vec<user::Id>,
}

impl Draft {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn project_id(&self) -> &project::Id {
        &self.project_id
    }

    pub const fn status_id(&self) -> &StatusId {
        &self.status_id
    }

    pub const fn priority_id(&self) -> &PriorityId {
        &self.priority_id
    }

    pub fn assignee_ids(&self) -> &[user::Id] {
        &self.assignee_ids
    }
}

#[cfg(test)]
impl Draft {
    pub fn new(
        title: &str,
        project_id: &project::Id,
        status_id: &StatusId,
        priority_id: &PriorityId,
        assignee_ids: &[user::Id],
    ) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            project_id: project_id.clone(),
            status_id: status_id.clone(),
            priority_id: priority_id.clone(),
            deadline: None,
            assignee_ids: assignee_ids.to_vec(),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct Assignee {
    id: user::Id,
    name: String,
    avatar: Option<String>,
}

impl Assignee {
    pub fn new(u: &User, avatar: Option<String>) -> Self {
        Self {
            id: u.id().clone(),
            name: u.name(),
            avatar,
        }
    }

    pub const fn id(&self) -> &user::Id {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A task as shown on the board.
#[derive(Serialize, Clone, Debug)]
pub struct Card {
    id: Id,
    title: String,
    description: Option<String>,
    priority: Option<Priority>,
    deadline: Option<DateTime<Utc>>,
    assignees: Vec<Assignee>,
}

impl Card {
    pub fn new(t: &Task, priority: Option<Priority>, assignees: Vec<Assignee>) -> Self {
        Self {
            id: t.id.clone(),
            title: t.title.clone(),
            description: t.description.clone(),
            priority,
            deadline: t.deadline,
            assignees,
        }
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub const fn priority(&self) -> Option<&Priority> {
        self.priority.as_ref()
    }

    pub fn assignees(&self) -> &[Assignee] {
        &self.assignees
    }
}

/// One status of the board with the tasks currently in it.
#[derive(Serialize, Clone, Debug)]
pub struct Column {
    status: Status,
    tasks: Vec<Card>,
}

impl Column {
    pub fn new(status: Status, tasks: Vec<Card>) -> Self {
        Self { status, tasks }
    }

    pub const fn status(&self) -> &Status {
        &self.status
    }

    pub fn tasks(&self) -> &[Card] {
        &self.tasks
    }
}
