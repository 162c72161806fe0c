use async_trait::async_trait;
use log::debug;
use welt_service::pagination::{Page, Params};

use crate::integration::storage;
use crate::{auth, user};

use super::model::{NewProject, Project, ProjectDto};
use super::{Id, Repository};

#[async_trait]
pub trait ProjectService {
    async fn create(&self, auth_user: &auth::User, title: &str) -> super::Result<ProjectDto>;

    async fn find_by_id(&self, id: &Id) -> super::Result<Project>;

    async fn exists(&self, id: &Id) -> super::Result<bool>;

    async fn add_member(&self, id: &Id, user_id: &user::Id) -> super::Result<()>;

    /// Projects the requester belongs to.
    async fn find_my(&self, auth_user: &auth::User) -> super::Result<Vec<ProjectDto>>;

    async fn delete(&self, id: &Id) -> super::Result<()>;

    async fn find_page(&self, params: &Params) -> super::Result<Page<ProjectDto>>;
}

#[derive(Clone)]
pub struct ProjectServiceImpl {
    repo: Repository,
    user_service: user::Service,
    storage: storage::Config,
}

impl ProjectServiceImpl {
    pub fn new(repo: Repository, user_service: user::Service, storage: storage::Config) -> Self {
        Self {
            repo,
            user_service,
            storage,
        }
    }

    fn to_dto(&self, p: &Project) -> ProjectDto {
        ProjectDto::new(p, self.storage.resolve_opt(p.icon()))
    }
}

#[async_trait]
impl ProjectService for ProjectServiceImpl {
    async fn create(&self, auth_user: &auth::User, title: &str) -> super::Result<ProjectDto> {
        let title = title.trim();
        if title.is_empty() {
            return Err(super::Error::EmptyTitle);
        }

        let id = Id::random();
        let project = self
            .repo
            .insert(&NewProject::new(&id, title, None), auth_user.id())?;

        debug!("Project '{title}' created by {:?}", auth_user.id());
        Ok(self.to_dto(&project))
    }

    async fn find_by_id(&self, id: &Id) -> super::Result<Project> {
        self.repo.find_by_id(id)
    }

    async fn exists(&self, id: &Id) -> super::Result<bool> {
        self.repo.exists(id)
    }

    async fn add_member(&self, id: &Id, user_id: &user::Id) -> super::Result<()> {
        if !self.repo.exists(id)? {
            return Err(super::Error::NotFound(id.clone()));
        }

        if !self.user_service.exists(user_id).await? {
            return Err(user::Error::NotFound(user_id.clone()).into());
        }

        self.repo.insert_member(id, user_id)
    }

    async fn find_my(&self, auth_user: &auth::User) -> super::Result<Vec<ProjectDto>> {
        let projects = self.repo.find_by_member(auth_user.id())?;

        Ok(projects.iter().map(|p| self.to_dto(p)).collect())
    }

    async fn delete(&self, id: &Id) -> super::Result<()> {
        if !self.repo.delete(id)? {
            return Err(super::Error::NotFound(id.clone()));
        }

        Ok(())
    }

    async fn find_page(&self, params: &Params) -> super::Result<Page<ProjectDto>> {
        let total = self.repo.count()?;
        let projects = self.repo.find_page(params.offset(), params.limit())?;

        Ok(Page::new(params, total, projects).map(|p| self.to_dto(&p)))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::fake;
    use crate::user::service::UserServiceImpl;

    use super::*;

    fn service(store: &fake::Store) -> ProjectServiceImpl {
        let storage = storage::Config::default();
        let user_service = Arc::new(UserServiceImpl::new(Arc::new(store.clone()), storage.clone()));

        ProjectServiceImpl::new(Arc::new(store.clone()), user_service, storage)
    }

    #[tokio::test]
    async fn should_list_created_project_for_creator_only() {
        let store = fake::Store::default();
        let service = service(&store);
        let jora = store.auth_user("Jora");
        let valera = store.auth_user("Valera");

        let created = service.create(&jora, " Welt ").await.unwrap();

        let mine = service.find_my(&jora).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id(), created.id());
        assert_eq!(mine[0].title(), "Welt");
        assert!(service.find_my(&valera).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_reject_duplicate_title() {
        let store = fake::Store::default();
        let service = service(&store);
        let jora = store.auth_user("Jora");

        service.create(&jora, "Welt").await.unwrap();
        let duplicate = service.create(&jora, "Welt").await;

        assert!(matches!(duplicate, Err(super::super::Error::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn should_add_member_once() {
        let store = fake::Store::default();
        let service = service(&store);
        let jora = store.auth_user("Jora");
        let valera = store.auth_user("Valera");
        let project = service.create(&jora, "Welt").await.unwrap();

        service.add_member(project.id(), valera.id()).await.unwrap();
        let again = service.add_member(project.id(), valera.id()).await;

        assert!(matches!(again, Err(super::super::Error::AlreadyMember(_))));
        assert_eq!(service.find_my(&valera).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_not_add_unknown_user() {
        let store = fake::Store::default();
        let service = service(&store);
        let jora = store.auth_user("Jora");
        let project = service.create(&jora, "Welt").await.unwrap();

        let res = service.add_member(project.id(), &user::Id::random()).await;

        assert!(matches!(
            res,
            Err(super::super::Error::_User(user::Error::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn should_not_add_member_to_unknown_project() {
        let store = fake::Store::default();
        let service = service(&store);
        let jora = store.auth_user("Jora");

        let res = service.add_member(&Id::random(), jora.id()).await;

        assert!(matches!(res, Err(super::super::Error::NotFound(_))));
    }

    #[tokio::test]
    async fn should_page_projects() {
        let store = fake::Store::default();
        let service = service(&store);
        let jora = store.auth_user("Jora");
        for title in ["A", "B", "C"] {
            service.create(&jora, title).await.unwrap();
        }

        let page = service
            .find_page(&Params::new(1, 2).unwrap())
            .await
            .unwrap();

        assert_eq!(page.total_items(), 3);
        assert_eq!(page.total_pages(), 2);
        assert_eq!(page.data().len(), 1);
        assert_eq!(page.data()[0].title(), "C");
    }
}
