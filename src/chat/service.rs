use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use log::debug;
use welt_service::pagination::{Page, Params};

use crate::event::Hub;
use crate::integration::storage;
use crate::message::model::Message;
use crate::user::model::{User, UserDto};
use crate::{auth, message, user};

use super::model::{Candidate, Chat, ChatDto, Directory, Entry, LastMessage, NewChat};
use super::{Id, Origin, Repository};

#[async_trait]
pub trait ChatService {
    /// Chats of the requester with previews, plus users they have no private chat with.
    async fn directory(
        &self,
        auth_user: &auth::User,
        search: Option<&str>,
    ) -> super::Result<Directory>;

    async fn find_by_id(&self, id: &Id) -> super::Result<Chat>;

    /// Fails unless the chat exists and the user takes part in it.
    async fn check_member(&self, id: &Id, user_id: &user::Id) -> super::Result<Chat>;

    async fn display_name(&self, chat: &Chat, auth_user: &auth::User) -> super::Result<String>;

    async fn create(
        &self,
        auth_user: &auth::User,
        name: &str,
        is_group_chat: bool,
        origin: &Origin,
        participants: &[user::Id],
    ) -> super::Result<ChatDto>;

    async fn create_private(
        &self,
        auth_user: &auth::User,
        user_id: &user::Id,
    ) -> super::Result<ChatDto>;

    async fn add_participant(
        &self,
        id: &Id,
        auth_user: &auth::User,
        user_id: &user::Id,
    ) -> super::Result<()>;

    async fn delete(&self, id: &Id) -> super::Result<()>;

    async fn find_page(&self, params: &Params) -> super::Result<Page<ChatDto>>;

    async fn find_participants_page(
        &self,
        id: &Id,
        params: &Params,
    ) -> super::Result<Page<UserDto>>;
}

#[derive(Clone)]
pub struct ChatServiceImpl {
    repo: Repository,
    message_repo: message::Repository,
    user_service: user::Service,
    hub: Hub,
    storage: storage::Config,
}

impl ChatServiceImpl {
    pub fn new(
        repo: Repository,
        message_repo: message::Repository,
        user_service: user::Service,
        hub: Hub,
        storage: storage::Config,
    ) -> Self {
        Self {
            repo,
            message_repo,
            user_service,
            hub,
            storage,
        }
    }
}

#[async_trait]
impl ChatService for ChatServiceImpl {
    async fn directory(
        &self,
        auth_user: &auth::User,
        search: Option<&str>,
    ) -> super::Result<Directory> {
        let me = auth_user.id();
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let chats = self
            .repo
            .find_by_participant(me)?
            .into_iter()
            .filter(|c| !c.origin().is_request())
            .collect::<Vec<_>>();
        let chat_ids = chats.iter().map(|c| c.id().clone()).collect::<Vec<_>>();

        let mut members: HashMap<Id, Vec<user::Id>> = HashMap::new();
        for (chat_id, user_id) in self.repo.find_participants_of(&chat_ids)? {
            members.entry(chat_id).or_default().push(user_id);
        }

        let user_ids = members
            .values()
            .flatten()
            .filter(|id| *id != me)
            .cloned()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        let users = self
            .user_service
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id().clone(), u))
            .collect::<HashMap<_, _>>();

        let last_messages = self
            .message_repo
            .find_last_by_chats(&chat_ids)
            .map_err(Box::new)?
            .into_iter()
            .map(|m| (m.chat_id().clone(), m))
            .collect::<HashMap<_, Message>>();

        let mut entries = chats
            .iter()
            .map(|chat| {
                let others = members
                    .get(chat.id())
                    .into_iter()
                    .flatten()
                    .filter_map(|id| users.get(id))
                    .collect::<Vec<_>>();

                let name = chat.display_name(&others, || auth_user.name());
                let icons = others
                    .iter()
                    .filter_map(|u| u.avatar())
                    .take(chat.icon_limit())
                    .map(|a| self.storage.resolve(a))
                    .collect();
                let last_message = last_messages.get(chat.id()).map(LastMessage::from);

                Entry::new(chat, name, icons, last_message)
            })
            .filter(|e| {
                search
                    .as_deref()
                    .is_none_or(|q| e.name().to_lowercase().contains(q))
            })
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| b.last_activity().cmp(a.last_activity()));

        let mut exclude = self.repo.find_private_partners(me)?;
        exclude.push(me.clone());
        let candidates = self
            .user_service
            .find_all_except(&exclude)
            .await?
            .iter()
            .filter(|u| search.as_deref().is_none_or(|q| u.matches(q)))
            .map(|u| Candidate::new(u, self.storage.resolve_opt(u.avatar())))
            .collect();

        Ok(Directory::new(entries, candidates))
    }

    async fn find_by_id(&self, id: &Id) -> super::Result<Chat> {
        self.repo.find_by_id(id)
    }

    async fn check_member(&self, id: &Id, user_id: &user::Id) -> super::Result<Chat> {
        let chat = self.repo.find_by_id(id)?;

        if !self.repo.is_participant(id, user_id)? {
            debug!("{user_id:?} is not a member of {id:?}");
            return Err(super::Error::NotMember(id.clone()));
        }

        Ok(chat)
    }

    async fn display_name(&self, chat: &Chat, auth_user: &auth::User) -> super::Result<String> {
        if chat.is_group_chat() {
            return Ok(chat.name().to_string());
        }

        let others = self
            .repo
            .find_participants_of(std::slice::from_ref(chat.id()))?
            .into_iter()
            .map(|(_, user_id)| user_id)
            .filter(|id| auth_user.id().ne(id))
            .collect::<Vec<_>>();
        let users = self.user_service.find_by_ids(&others).await?;

        Ok(chat.display_name(&users.iter().collect::<Vec<_>>(), || {
            auth_user.name()
        }))
    }

    async fn create(
        &self,
        auth_user: &auth::User,
        name: &str,
        is_group_chat: bool,
        origin: &Origin,
        participants: &[user::Id],
    ) -> super::Result<ChatDto> {
        if origin.is_request() {
            return Err(super::Error::UnsupportedOrigin);
        }

        let mut members = vec![auth_user.id().clone()];
        for id in participants {
            if !members.contains(id) {
                members.push(id.clone());
            }
        }

        let found = self.user_service.find_by_ids(&members).await?;
        if let Some(missing) = members
            .iter()
            .find(|id| !found.iter().any(|u| u.id() == *id))
        {
            return Err(super::Error::NonExistingUser(missing.clone()));
        }

        let name = name.trim();
        if is_group_chat {
            if name.is_empty() {
                return Err(super::Error::MissingName);
            }
        } else {
            if members.len() != 2 {
                return Err(super::Error::InvalidParticipants(members.len()));
            }
            if self
                .repo
                .find_private_between(&members[0], &members[1])?
                .is_some()
            {
                return Err(super::Error::AlreadyExists);
            }
        }

        let id = Id::random();
        let chat = self
            .repo
            .insert(&NewChat::new(&id, name, is_group_chat, origin, &members), &members)?;

        debug!("Chat {id:?} created by {:?}", auth_user.id());
        Ok(ChatDto::from(&chat))
    }

    async fn create_private(
        &self,
        auth_user: &auth::User,
        user_id: &user::Id,
    ) -> super::Result<ChatDto> {
        if auth_user.id().eq(user_id) {
            return Err(super::Error::SelfChat);
        }

        self.create(auth_user, "", false, &Origin::Direct, std::slice::from_ref(user_id))
            .await
    }

    async fn add_participant(
        &self,
        id: &Id,
        auth_user: &auth::User,
        user_id: &user::Id,
    ) -> super::Result<()> {
        let chat = self.repo.find_by_id(id)?;

        if !self.user_service.exists(user_id).await? {
            return Err(super::Error::NonExistingUser(user_id.clone()));
        }

        if !self.repo.is_participant(id, auth_user.id())? {
            return Err(super::Error::NotMember(id.clone()));
        }

        if !chat.is_group_chat() {
            return Err(super::Error::PrivateChat);
        }

        self.repo.insert_participant(id, user_id)?;
        debug!("{user_id:?} added to chat {id:?}");

        Ok(())
    }

    async fn delete(&self, id: &Id) -> super::Result<()> {
        if !self.repo.delete(id)? {
            return Err(super::Error::NotFound(id.clone()));
        }

        self.hub.close(id).await;
        Ok(())
    }

    async fn find_page(&self, params: &Params) -> super::Result<Page<ChatDto>> {
        let total = self.repo.count()?;
        let chats = self.repo.find_page(params.offset(), params.limit())?;

        Ok(Page::new(params, total, chats).map(|c| ChatDto::from(&c)))
    }

    async fn find_participants_page(
        &self,
        id: &Id,
        params: &Params,
    ) -> super::Result<Page<UserDto>> {
        self.repo.find_by_id(id)?;

        let total = self.repo.count_participants(id)?;
        let users = self
            .repo
            .find_participants_page(id, params.offset(), params.limit())?;

        Ok(Page::new(params, total, users).map(|u: User| self.user_service.to_dto(&u)))
    }
}
