use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;

use crate::event::Hub;
use crate::{auth, chat, user};

use super::model::{ChatMessages, MessageDto, NewMessage, SentMessage};
use super::{Id, Repository};

const UNKNOWN_SENDER: &str = "Unknown user";

#[async_trait]
pub trait MessageService {
    async fn find_by_chat(
        &self,
        chat_id: &chat::Id,
        auth_user: &auth::User,
    ) -> super::Result<ChatMessages>;

    async fn create(
        &self,
        chat_id: &chat::Id,
        auth_user: &auth::User,
        text: &str,
    ) -> super::Result<SentMessage>;

    async fn delete(&self, id: &Id, auth_user: &auth::User) -> super::Result<()>;
}

#[derive(Clone)]
pub struct MessageServiceImpl {
    repo: Repository,
    chat_service: chat::Service,
    user_service: user::Service,
    hub: Hub,
}

impl MessageServiceImpl {
    pub fn new(
        repo: Repository,
        chat_service: chat::Service,
        user_service: user::Service,
        hub: Hub,
    ) -> Self {
        Self {
            repo,
            chat_service,
            user_service,
            hub,
        }
    }
}

#[async_trait]
impl MessageService for MessageServiceImpl {
    async fn find_by_chat(
        &self,
        chat_id: &chat::Id,
        auth_user: &auth::User,
    ) -> super::Result<ChatMessages> {
        let chat = self.chat_service.check_member(chat_id, auth_user.id()).await?;
        let messages = self.repo.find_by_chat(chat_id)?;

        let mut sender_ids = messages
            .iter()
            .map(|m| m.sender_id().clone())
            .collect::<Vec<_>>();
        sender_ids.sort();
        sender_ids.dedup();
        let senders = self
            .user_service
            .find_by_ids(&sender_ids)
            .await?
            .into_iter()
            .map(|u| (u.id().clone(), u.name()))
            .collect::<HashMap<_, _>>();

        let messages = messages
            .iter()
            .map(|m| {
                let sender_name = senders
                    .get(m.sender_id())
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_SENDER.to_string());
                MessageDto::new(m, sender_name, auth_user.id())
            })
            .collect();
        let chat_name = self.chat_service.display_name(&chat, auth_user).await?;

        Ok(ChatMessages::new(chat_id.clone(), chat_name, messages))
    }

    async fn create(
        &self,
        chat_id: &chat::Id,
        auth_user: &auth::User,
        text: &str,
    ) -> super::Result<SentMessage> {
        if text.trim().is_empty() {
            return Err(super::Error::EmptyText);
        }

        self.chat_service.check_member(chat_id, auth_user.id()).await?;

        let id = Id::random();
        let message = self
            .repo
            .insert(&NewMessage::new(&id, chat_id, auth_user.id(), text))?;

        let delivered = self.hub.publish_new_message(chat_id).await;
        debug!("Message {id:?} stored, {delivered} listener(s) signaled");

        Ok(SentMessage::from(&message))
    }

    async fn delete(&self, id: &Id, auth_user: &auth::User) -> super::Result<()> {
        let message = self.repo.find_by_id(id)?;

        if message.sender_id().ne(auth_user.id()) {
            return Err(super::Error::NotOwner);
        }

        if !self.repo.delete(id)? {
            return Err(super::Error::NotFound(id.clone()));
        }

        let delivered = self
            .hub
            .publish_message_deleted(message.chat_id(), id)
            .await;
        debug!("Message {id:?} deleted, {delivered} listener(s) signaled");

        Ok(())
    }
}
