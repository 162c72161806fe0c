use serde_json::json;

use crate::message;

/// What a live listener is told about its chat. Listeners re-fetch content
/// themselves; only deletions carry an id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    NewMessage,
    Deleted { message_id: message::Id },
}

impl Signal {
    pub fn payload(&self) -> String {
        match self {
            Self::NewMessage => String::from("New message received"),
            Self::Deleted { message_id } => json!({
                "action": "delete",
                "message_id": message_id,
            })
            .to_string(),
        }
    }
}
