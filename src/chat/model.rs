use chrono::{DateTime, Utc};
use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::Serialize;

use crate::message::model::Message;
use crate::user::model::User;
use crate::{message, project, request, user};

use super::{Id, Origin};

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::schema::chats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Chat {
    id: Id,
    name: String,
    is_group_chat: bool,
    project_id: Option<project::Id>,
    request_id: Option<request::Id>,
    pair_key: Option<String>,
    created_at: DateTime<Utc>,
}

impl Chat {
    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn is_group_chat(&self) -> bool {
        self.is_group_chat
    }

    pub fn origin(&self) -> Origin {
        Origin::new(self.project_id.clone(), self.request_id.clone())
    }

    pub fn pair_key(&self) -> Option<&str> {
        self.pair_key.as_deref()
    }

    pub const fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    /// Group chats keep their stored name. A private chat is named after the other
    /// participant, or after the requester when nobody else is left.
    pub fn display_name(&self, others: &[&User], requester_name: impl FnOnce() -> String) -> String {
        if self.is_group_chat {
            return self.name.clone();
        }

        match others.first() {
            Some(other) => other.name(),
            None => requester_name(),
        }
    }

    pub const fn icon_limit(&self) -> usize {
        if self.is_group_chat { 3 } else { 1 }
    }
}

#[cfg(test)]
impl From<&NewChat<'_>> for Chat {
    fn from(c: &NewChat<'_>) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.to_string(),
            is_group_chat: c.is_group_chat,
            project_id: c.project_id.cloned(),
            request_id: c.request_id.cloned(),
            pair_key: c.pair_key.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Unordered participant pair identifying the single private chat between two users.
pub fn pair_key(a: &user::Id, b: &user::Id) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{lo}:{hi}")
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::chats)]
pub struct NewChat<'a> {
    id: &'a Id,
    name: &'a str,
    is_group_chat: bool,
    project_id: Option<&'a project::Id>,
    request_id: Option<&'a request::Id>,
    pair_key: Option<String>,
}

impl<'a> NewChat<'a> {
    pub fn new(
        id: &'a Id,
        name: &'a str,
        is_group_chat: bool,
        origin: &'a Origin,
        participants: &[user::Id],
    ) -> Self {
        let pair_key = match participants {
            [a, b] if !is_group_chat && !origin.is_request() => Some(pair_key(a, b)),
            _ => None,
        };

        Self {
            id,
            name,
            is_group_chat,
            project_id: origin.project_id(),
            request_id: origin.request_id(),
            pair_key,
        }
    }

    pub const fn id(&self) -> &Id {
        self.id
    }

    pub fn pair_key(&self) -> Option<&str> {
        self.pair_key.as_deref()
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::chats_users)]
pub struct NewParticipant<'a> {
    chat_id: &'a Id,
    user_id: &'a user::Id,
}

impl<'a> NewParticipant<'a> {
    pub fn new(chat_id: &'a Id, user_id: &'a user::Id) -> Self {
        Self { chat_id, user_id }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct ChatDto {
    id: Id,
    name: String,
    is_group_chat: bool,
    origin: Origin,
    created_at: DateTime<Utc>,
}

impl From<&Chat> for ChatDto {
    fn from(c: &Chat) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            is_group_chat: c.is_group_chat,
            origin: c.origin(),
            created_at: c.created_at,
        }
    }
}

impl ChatDto {
    pub const fn id(&self) -> &Id {
        &self.id
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct LastMessage {
    id: message::Id,
    text: String,
    sender_id: user::Id,
    sent_at: DateTime<Utc>,
}

impl From<&Message> for LastMessage {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id().clone(),
            text: m.text().to_string(),
            sender_id: m.sender_id().clone(),
            sent_at: *m.sent_at(),
        }
    }
}

impl LastMessage {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn sent_at(&self) -> &DateTime<Utc> {
        &self.sent_at
    }
}

/// A chat as listed in the requester's directory.
#[derive(Serialize, Clone, Debug)]
pub struct Entry {
    id: Id,
    name: String,
    is_group_chat: bool,
    icons: Vec<String>,
    last_message: Option<LastMessage>,
    #[serde(skip)]
    last_activity: DateTime<Utc>,
}

impl Entry {
    pub fn new(
        chat: &Chat,
        name: String,
        icons: Vec<String>,
        last_message: Option<LastMessage>,
    ) -> Self {
        let last_activity = last_message
            .as_ref()
            .map(|m| m.sent_at)
            .unwrap_or(chat.created_at);

        Self {
            id: chat.id.clone(),
            name,
            is_group_chat: chat.is_group_chat,
            icons,
            last_message,
            last_activity,
        }
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icons(&self) -> &[String] {
        &self.icons
    }

    pub const fn last_message(&self) -> Option<&LastMessage> {
        self.last_message.as_ref()
    }

    pub const fn last_activity(&self) -> &DateTime<Utc> {
        &self.last_activity
    }
}

/// Somebody the requester could start a private chat with.
#[derive(Serialize, Clone, Debug)]
pub struct Candidate {
    id: user::Id,
    name: String,
    icons: Option<String>,
    has_chat: bool,
}

impl Candidate {
    pub fn new(u: &User, avatar: Option<String>) -> Self {
        Self {
            id: u.id().clone(),
            name: u.name(),
            icons: avatar,
            has_chat: false,
        }
    }

    pub const fn id(&self) -> &user::Id {
        &self.id
    }
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct Directory {
    chats: Vec<Entry>,
    users_without_chats: Vec<Candidate>,
}

impl Directory {
    pub fn new(chats: Vec<Entry>, users_without_chats: Vec<Candidate>) -> Self {
        Self {
            chats,
            users_without_chats,
        }
    }

    pub fn chats(&self) -> &[Entry] {
        &self.chats
    }

    pub fn users_without_chats(&self) -> &[Candidate] {
        &self.users_without_chats
    }
}
