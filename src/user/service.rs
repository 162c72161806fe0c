use async_trait::async_trait;
use welt_service::pagination::{Page, Params};

use crate::integration::storage;

use super::model::{NewUser, User, UserDto};
use super::{Id, Repository};

#[async_trait]
pub trait UserService {
    async fn create(&self, u: &NewUser<'_>) -> super::Result<User>;

    async fn find_by_id(&self, id: &Id) -> super::Result<User>;

    async fn find_by_email(&self, email: &str) -> super::Result<Option<User>>;

    async fn find_by_ids(&self, ids: &[Id]) -> super::Result<Vec<User>>;

    async fn find_all_except(&self, exclude: &[Id]) -> super::Result<Vec<User>>;

    async fn exists(&self, id: &Id) -> super::Result<bool>;

    async fn find_page(
        &self,
        exclude: Option<&Id>,
        params: &Params,
    ) -> super::Result<Page<UserDto>>;

    fn to_dto(&self, u: &User) -> UserDto;
}

#[derive(Clone)]
pub struct UserServiceImpl {
    repo: Repository,
    storage: storage::Config,
}

impl UserServiceImpl {
    pub fn new(repo: Repository, storage: storage::Config) -> Self {
        Self { repo, storage }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn create(&self, u: &NewUser<'_>) -> super::Result<User> {
        self.repo.insert(u)
    }

    async fn find_by_id(&self, id: &Id) -> super::Result<User> {
        self.repo.find_by_id(id)
    }

    async fn find_by_email(&self, email: &str) -> super::Result<Option<User>> {
        self.repo.find_by_email(email)
    }

    async fn find_by_ids(&self, ids: &[Id]) -> super::Result<Vec<User>> {
        self.repo.find_by_ids(ids)
    }

    async fn find_all_except(&self, exclude: &[Id]) -> super::Result<Vec<User>> {
        self.repo.find_all_excluding(exclude)
    }

    async fn exists(&self, id: &Id) -> super::Result<bool> {
        self.repo.exists(id)
    }

    async fn find_page(
        &self,
        exclude: Option<&Id>,
        params: &Params,
    ) -> super::Result<Page<UserDto>> {
        let total = self.repo.count(exclude)?;
        let users = self
            .repo
            .find_page(exclude, params.offset(), params.limit())?;

        Ok(Page::new(params, total, users).map(|u| self.to_dto(&u)))
    }

    fn to_dto(&self, u: &User) -> UserDto {
        UserDto::new(u, self.storage.resolve_opt(u.avatar()))
    }
}
