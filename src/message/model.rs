use chrono::{DateTime, Utc};
use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::Serialize;

use crate::{chat, user};

use super::Id;

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::schema::messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Message {
    id: Id,
    seq: i64,
    chat_id: chat::Id,
    sender_id: user::Id,
    text: String,
    sent_at: DateTime<Utc>,
}

impl Message {
    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub const fn seq(&self) -> i64 {
        self.seq
    }

    pub const fn chat_id(&self) -> &chat::Id {
        &self.chat_id
    }

    pub const fn sender_id(&self) -> &user::Id {
        &self.sender_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn sent_at(&self) -> &DateTime<Utc> {
        &self.sent_at
    }

    pub fn direction(&self, requester: &user::Id) -> Direction {
        if self.sender_id.eq(requester) {
            Direction::Outgoing
        } else {
            Direction::Incoming
        }
    }
}

#[cfg(test)]
impl Message {
    pub fn stored(m: &NewMessage<'_>, seq: i64, sent_at: DateTime<Utc>) -> Self {
        Self {
            id: m.id.clone(),
            seq,
            chat_id: m.chat_id.clone(),
            sender_id: m.sender_id.clone(),
            text: m.text.to_string(),
            sent_at,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::messages)]
pub struct NewMessage<'a> {
    id: &'a Id,
    chat_id: &'a chat::Id,
    sender_id: &'a user::Id,
    text: &'a str,
}

impl<'a> NewMessage<'a> {
    pub fn new(id: &'a Id, chat_id: &'a chat::Id, sender_id: &'a user::Id, text: &'a str) -> Self {
        Self {
            id,
            chat_id,
            sender_id,
            text,
        }
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

#[derive(Serialize, Clone, Debug)]
pub struct MessageDto {
    id: Id,
    text: String,
    sent_at: DateTime<Utc>,
    sender_id: user::Id,
    sender_name: String,
    direction: Direction,
}

impl MessageDto {
    pub fn new(m: &Message, sender_name: String, requester: &user::Id) -> Self {
        Self {
            id: m.id.clone(),
            text: m.text.clone(),
            sent_at: m.sent_at,
            sender_id: m.sender_id.clone(),
            sender_name,
            direction: m.direction(requester),
        }
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn sender_id(&self) -> &user::Id {
        &self.sender_id
    }

    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct ChatMessages {
    chat_id: chat::Id,
    chat_name: String,
    messages: Vec<MessageDto>,
}

impl ChatMessages {
    pub fn new(chat_id: chat::Id, chat_name: String, messages: Vec<MessageDto>) -> Self {
        Self {
            chat_id,
            chat_name,
            messages,
        }
    }

    pub fn chat_name(&self) -> &str {
        &self.chat_name
    }

    pub fn messages(&self) -> &[MessageDto] {
        &self.messages
    }
}

/// A message as echoed back to its sender.
#[derive(Serialize, Clone, Debug)]
pub struct SentMessage {
    id: Id,
    text: String,
    sender_id: user::Id,
    chat_id: chat::Id,
    sent_at: DateTime<Utc>,
    direction: Direction,
}

impl From<&Message> for SentMessage {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id.clone(),
            text: m.text.clone(),
            sender_id: m.sender_id.clone(),
            chat_id: m.chat_id.clone(),
            sent_at: m.sent_at,
            direction: Direction::Outgoing,
        }
    }
}

impl SentMessage {
    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }
}
