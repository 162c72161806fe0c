use async_trait::async_trait;
use welt_service::pagination::{Page, Params};

use super::model::Role;
use super::{Id, Repository};

#[async_trait]
pub trait RoleService {
    async fn create(&self, title: &str) -> super::Result<Role>;

    async fn find_by_id(&self, id: &Id) -> super::Result<Role>;

    async fn delete(&self, id: &Id) -> super::Result<()>;

    async fn find_page(&self, params: &Params) -> super::Result<Page<Role>>;
}

#[derive(Clone)]
pub struct RoleServiceImpl {
    repo: Repository,
}

impl RoleServiceImpl {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl RoleService for RoleServiceImpl {
    async fn create(&self, title: &str) -> super::Result<Role> {
        let title = title.trim();
        if title.is_empty() {
            return Err(super::Error::EmptyTitle);
        }

        self.repo.insert(title)
    }

    async fn find_by_id(&self, id: &Id) -> super::Result<Role> {
        self.repo.find_by_id(id)
    }

    async fn delete(&self, id: &Id) -> super::Result<()> {
        if !self.repo.delete(id)? {
            return Err(super::Error::NotFound(id.clone()));
        }

        Ok(())
    }

    async fn find_page(&self, params: &Params) -> super::Result<Page<Role>> {
        let total = self.repo.count()?;
        let roles = self.repo.find_page(params.offset(), params.limit())?;

        Ok(Page::new(params, total, roles))
    }
}
