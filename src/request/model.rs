use chrono::{DateTime, Utc};
use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::user::model::User;
use crate::{chat, project, user};

use super::{Id, StatusId};

#[derive(Queryable, Selectable, Serialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = crate::schema::request_statuses)]
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
impl From<&NewStatus<'_>> for Status {
    fn from(s: &NewStatus<'_>) -> Self {
        Self {
            id: s.id.clone(),
            title: s.title.to_string(),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::request_statuses)]
pub struct NewStatus<'a> {
    id: &'a StatusId,
    title: &'a str,
}

impl<'a> NewStatus<'a> {
    pub fn new(id: &'a StatusId, title: &'a str) -> Self {
        Self { id, title }
    }
}

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::schema::requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Request {
    id: Id,
    project_id: project::Id,
    status_id: StatusId,
    subject: String,
    description: String,
    sender_id: user::Id,
    receiver_id: user::Id,
    created_at: DateTime<Utc>,
}

impl Request {
    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub const fn status_id(&self) -> &StatusId {
        &self.status_id
    }

    pub const fn sender_id(&self) -> &user::Id {
        &self.sender_id
    }

    pub const fn receiver_id(&self) -> &user::Id {
        &self.receiver_id
    }

    pub const fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn is_party(&self, user_id: &user::Id) -> bool {
        self.sender_id.eq(user_id) || self.receiver_id.eq(user_id)
    }
}

#[cfg(test)]
impl Request {
    pub fn stored(id: Id, r: &NewRequest<'_>) -> Self {
        Self {
            id,
            project_id: r.project_id.clone(),
            status_id: r.status_id.clone(),
            subject: r.subject.to_string(),
            description: r.description.to_string(),
            sender_id: r.sender_id.clone(),
            receiver_id: r.receiver_id.clone(),
            created_at: Utc::now(),
        }
    }

    pub fn set_status(&mut self, status_id: &StatusId) {
        self.status_id = status_id.clone();
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::requests)]
pub struct NewRequest<'a> {
    project_id: &'a project::Id,
    status_id: &'a StatusId,
    subject: &'a str,
    description: &'a str,
    sender_id: &'a user::Id,
    receiver_id: &'a user::Id,
}

impl<'a> NewRequest<'a> {
    pub fn new(
        draft: &'a Draft,
        subject: &'a str,
        status_id: &'a StatusId,
        sender_id: &'a user::Id,
    ) -> Self {
        Self {
            project_id: &draft.project_id,
            status_id,
            subject,
            description: &draft.description,
            sender_id,
            receiver_id: &draft.receiver_id,
        }
    }

    pub fn subject(&self) -> &str {
        self.subject
    }

    pub fn participants(&self) -> [user::Id; 2] {
        [self.sender_id.clone(), self.receiver_id.clone()]
    }
}

/// Request as submitted by its sender.
#[derive(Deserialize, Clone, Debug)]
pub struct Draft {
    project_id: project::Id,
    subject: String,
    #[serde(default)]
    description: String,
    receiver_id: user::Id,
}

impl Draft {
    pub const fn project_id(&self) -> &project::Id {
        &self.project_id
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub const fn receiver_id(&self) -> &user::Id {
        &self.receiver_id
    }
}

#[cfg(test)]
impl Draft {
    pub fn new(project_id: &project::Id, subject: &str, receiver_id: &user::Id) -> Self {
        Self {
            project_id: project_id.clone(),
            subject: subject.to_string(),
            description: String::new(),
            receiver_id: receiver_id.clone(),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct Party {
    id: user::Id,
    first_name: String,
    last_name: Option<String>,
    email: String,
    avatar: Option<String>,
}

impl Party {
    pub fn new(u: &User, avatar: Option<String>) -> Self {
        Self {
            id: u.id().clone(),
            first_name: u.first_name().to_string(),
            last_name: u.last_name().map(String::from),
            email: u.email().to_string(),
            avatar,
        }
    }

    pub const fn id(&self) -> &user::Id {
        &self.id
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct RequestDto {
    id: Id,
    project_id: project::Id,
    subject: String,
    description: String,
    status: Option<Status>,
    chat_id: Option<chat::Id>,
    sender: Option<Party>,
    receiver: Option<Party>,
    created_at: DateTime<Utc>,
}

impl RequestDto {
    pub fn new(
        r: &Request,
        status: Option<Status>,
        chat_id: Option<chat::Id>,
        sender: Option<Party>,
        receiver: Option<Party>,
    ) -> Self {
        Self {
            id: r.id,
            project_id: r.project_id.clone(),
            subject: r.subject.clone(),
            description: r.description.clone(),
            status,
            chat_id,
            sender,
            receiver,
            created_at: r.created_at,
        }
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub const fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub const fn chat_id(&self) -> Option<&chat::Id> {
        self.chat_id.as_ref()
    }

    pub const fn sender(&self) -> Option<&Party> {
        self.sender.as_ref()
    }

    pub const fn receiver(&self) -> Option<&Party> {
        self.receiver.as_ref()
    }
}
