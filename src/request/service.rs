use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use welt_service::pagination::{Page, Params};

use crate::integration::storage;
use crate::{auth, chat, project, user};

use super::model::{Draft, NewRequest, Party, Request, RequestDto, Status};
use super::{Id, INITIAL_STATUS, Repository, StatusId};

#[async_trait]
pub trait RequestService {
    /// Files the request and opens a chat between its sender and receiver.
    async fn create(&self, auth_user: &auth::User, draft: &Draft) -> super::Result<RequestDto>;

    /// Requests addressed to the requester, optionally narrowed to one status.
    async fn find_received(
        &self,
        auth_user: &auth::User,
        status_title: Option<&str>,
    ) -> super::Result<Vec<RequestDto>>;

    async fn find_sent(&self, auth_user: &auth::User) -> super::Result<Vec<RequestDto>>;

    async fn find_by_id(&self, id: &Id, auth_user: &auth::User) -> super::Result<RequestDto>;

    async fn update_status(
        &self,
        id: &Id,
        auth_user: &auth::User,
        status_title: &str,
    ) -> super::Result<RequestDto>;

    async fn create_status(&self, title: &str) -> super::Result<Status>;

    async fn delete_status(&self, id: &StatusId) -> super::Result<()>;

    async fn find_statuses(&self) -> super::Result<Vec<Status>>;

    async fn find_page(&self, params: &Params) -> super::Result<Page<RequestDto>>;
}

#[derive(Clone)]
pub struct RequestServiceImpl {
    repo: Repository,
    user_service: user::Service,
    project_service: project::Service,
    storage: storage::Config,
}

impl RequestServiceImpl {
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

    /// Request visible to the given user, parties only.
    fn find_own(&self, id: &Id, user_id: &user::Id) -> super::Result<Request> {
        let request = self.repo.find_by_id(id)?;

        if !request.is_party(user_id) {
            debug!("{user_id:?} is not a party of request {id}");
            return Err(super::Error::NotFound(*id));
        }

        Ok(request)
    }

    async fn render(&self, requests: &[Request]) -> super::Result<Vec<RequestDto>> {
        if requests.is_empty() {
            return Ok(vec![]);
        }

        let mut user_ids = requests
            .iter()
            .flat_map(|r| [r.sender_id().clone(), r.receiver_id().clone()])
            .collect::<Vec<_>>();
        user_ids.sort();
        user_ids.dedup();
        let parties = self
            .user_service
            .find_by_ids(&user_ids)
            .await?
            .iter()
            .map(|u| {
                let party = Party::new(u, self.storage.resolve_opt(u.avatar()));
                (u.id().clone(), party)
            })
            .collect::<HashMap<_, _>>();

        let statuses = self
            .repo
            .find_statuses()?
            .into_iter()
            .map(|s| (s.id().clone(), s))
            .collect::<HashMap<_, _>>();

        let ids = requests.iter().map(|r| *r.id()).collect::<Vec<_>>();
        let chats = self
            .repo
            .find_chats(&ids)?
            .into_iter()
            .collect::<HashMap<Id, chat::Id>>();

        Ok(requests
            .iter()
            .map(|r| {
                RequestDto::new(
                    r,
                    statuses.get(r.status_id()).cloned(),
                    chats.get(r.id()).cloned(),
                    parties.get(r.sender_id()).cloned(),
                    parties.get(r.receiver_id()).cloned(),
                )
            })
            .collect())
    }

    async fn render_one(&self, request: &Request) -> super::Result<RequestDto> {
        let mut rendered = self.render(std::slice::from_ref(request)).await?;

        rendered.pop().ok_or(super::Error::NotFound(*request.id()))
    }
}

#[async_trait]
impl RequestService for RequestServiceImpl {
    async fn create(&self, auth_user: &auth::User, draft: &Draft) -> super::Result<RequestDto> {
        let subject = draft.subject().trim();
        if subject.is_empty() {
            return Err(super::Error::EmptySubject);
        }

        if auth_user.id().eq(draft.receiver_id()) {
            return Err(super::Error::SelfRequest);
        }

        if !self.user_service.exists(draft.receiver_id()).await? {
            return Err(user::Error::NotFound(draft.receiver_id().clone()).into());
        }

        if !self.project_service.exists(draft.project_id()).await? {
            return Err(project::Error::NotFound(draft.project_id().clone()).into());
        }

        let status = self
            .repo
            .find_status_by_title(INITIAL_STATUS)?
            .ok_or(super::Error::UnknownStatus(INITIAL_STATUS.to_string()))?;

        let chat_id = chat::Id::random();
        let request = self.repo.insert(
            &NewRequest::new(draft, subject, status.id(), auth_user.id()),
            &chat_id,
        )?;

        debug!(
            "Request {} filed by {:?} with chat {chat_id}",
            request.id(),
            auth_user.id()
        );
        self.render_one(&request).await
    }

    async fn find_received(
        &self,
        auth_user: &auth::User,
        status_title: Option<&str>,
    ) -> super::Result<Vec<RequestDto>> {
        let status = match status_title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) => match self.repo.find_status_by_title(title)? {
                Some(status) => Some(status),
                // nothing can be in a status that does not exist
                None => return Ok(vec![]),
            },
            None => None,
        };

        let requests = self
            .repo
            .find_received(auth_user.id(), status.as_ref().map(Status::id))?;

        self.render(&requests).await
    }

    async fn find_sent(&self, auth_user: &auth::User) -> super::Result<Vec<RequestDto>> {
        let requests = self.repo.find_sent(auth_user.id())?;

        self.render(&requests).await
    }

    async fn find_by_id(&self, id: &Id, auth_user: &auth::User) -> super::Result<RequestDto> {
        let request = self.find_own(id, auth_user.id())?;

        self.render_one(&request).await
    }

    async fn update_status(
        &self,
        id: &Id,
        auth_user: &auth::User,
        status_title: &str,
    ) -> super::Result<RequestDto> {
        self.find_own(id, auth_user.id())?;

        let status = self
            .repo
            .find_status_by_title(status_title.trim())?
            .ok_or(super::Error::UnknownStatus(status_title.to_string()))?;

        let request = self.repo.update_status(id, status.id())?;
        debug!("Request {id} moved to '{}'", status.title());

        self.render_one(&request).await
    }

    async fn create_status(&self, title: &str) -> super::Result<Status> {
        let title = title.trim();
        if title.is_empty() {
            return Err(super::Error::EmptyTitle);
        }

        self.repo.insert_status(title)
    }

    async fn delete_status(&self, id: &StatusId) -> super::Result<()> {
        if !self.repo.delete_status(id)? {
            return Err(super::Error::StatusNotFound(id.clone()));
        }

        Ok(())
    }

    async fn find_statuses(&self) -> super::Result<Vec<Status>> {
        self.repo.find_statuses()
    }

    async fn find_page(&self, params: &Params) -> super::Result<Page<RequestDto>> {
        let total = self.repo.count()?;
        let requests = self.repo.find_page(params.offset(), params.limit())?;
        let rendered = self.render(&requests).await?;

        Ok(Page::new(params, total, rendered))
    }
}
