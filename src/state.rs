use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::service::AuthServiceImpl;
use crate::chat::repository::PgChatRepository;
use crate::chat::service::ChatServiceImpl;
use crate::event::Hub;
use crate::integration::{self, storage, ws};
use crate::message::repository::PgMessageRepository;
use crate::message::service::MessageServiceImpl;
use crate::project::repository::PgProjectRepository;
use crate::project::service::ProjectServiceImpl;
use crate::request::repository::PgRequestRepository;
use crate::request::service::RequestServiceImpl;
use crate::role::repository::PgRoleRepository;
use crate::role::service::RoleServiceImpl;
use crate::task::repository::PgTaskRepository;
use crate::task::service::TaskServiceImpl;
use crate::user::repository::PgUserRepository;
use crate::user::service::UserServiceImpl;
use crate::{auth, chat, message, project, request, role, task, user};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub auth_service: auth::Service,
    pub user_service: user::Service,
    pub role_service: role::Service,
    pub project_service: project::Service,
    pub request_service: request::Service,
    pub task_service: task::Service,
    pub chat_service: chat::Service,
    pub message_service: message::Service,

    pub hub: Hub,
    pub storage: storage::Config,
    pub ws: ws::Config,
}

/// Repositories behind the services, one set per backing store.
pub struct Repositories {
    pub user: user::Repository,
    pub role: role::Repository,
    pub project: project::Repository,
    pub request: request::Repository,
    pub task: task::Repository,
    pub chat: chat::Repository,
    pub message: message::Repository,
}

impl Repositories {
    pub fn postgres(cfg: &integration::db::Config) -> Self {
        let pool = cfg.connect();

        Self {
            user: Arc::new(PgUserRepository::new(pool.clone())),
            role: Arc::new(PgRoleRepository::new(pool.clone())),
            project: Arc::new(PgProjectRepository::new(pool.clone())),
            request: Arc::new(PgRequestRepository::new(pool.clone())),
            task: Arc::new(PgTaskRepository::new(pool.clone())),
            chat: Arc::new(PgChatRepository::new(pool.clone())),
            message: Arc::new(PgMessageRepository::new(pool)),
        }
    }
}

impl AppState {
    pub fn init(cfg: &integration::Config) -> Self {
        Self::wire(cfg, Repositories::postgres(&cfg.db))
    }

    pub fn wire(cfg: &integration::Config, repos: Repositories) -> Self {
        let hub = Hub::new(cfg.ws.send_timeout());
        let storage = cfg.storage.clone();

        let user_service: user::Service =
            Arc::new(UserServiceImpl::new(repos.user, storage.clone()));
        let role_service: role::Service = Arc::new(RoleServiceImpl::new(repos.role));
        let auth_service: auth::Service = Arc::new(AuthServiceImpl::new(
            cfg.idp.clone(),
            storage.clone(),
            user_service.clone(),
            role_service.clone(),
        ));
        let project_service: project::Service = Arc::new(ProjectServiceImpl::new(
            repos.project,
            user_service.clone(),
            storage.clone(),
        ));
        let request_service: request::Service = Arc::new(RequestServiceImpl::new(
            repos.request,
            user_service.clone(),
            project_service.clone(),
            storage.clone(),
        ));
        let task_service: task::Service = Arc::new(TaskServiceImpl::new(
            repos.task,
            user_service.clone(),
            project_service.clone(),
            storage.clone(),
        ));
        let chat_service: chat::Service = Arc::new(ChatServiceImpl::new(
            repos.chat,
            repos.message.clone(),
            user_service.clone(),
            hub.clone(),
            storage.clone(),
        ));
        let message_service: message::Service = Arc::new(MessageServiceImpl::new(
            repos.message,
            chat_service.clone(),
            user_service.clone(),
            hub.clone(),
        ));

        Self {
            auth_service,
            user_service,
            role_service,
            project_service,
            request_service,
            task_service,
            chat_service,
            message_service,
            hub,
            storage,
            ws: cfg.ws.clone(),
        }
    }
}

#[cfg(test)]
impl Repositories {
    pub fn fake(store: &crate::fake::Store) -> Self {
        Self {
            user: Arc::new(store.clone()),
            role: Arc::new(store.clone()),
            project: Arc::new(store.clone()),
            request: Arc::new(store.clone()),
            task: Arc::new(store.clone()),
            chat: Arc::new(store.clone()),
            message: Arc::new(store.clone()),
        }
    }
}
