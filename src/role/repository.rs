use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper};

use crate::integration::db::Pool;
use crate::schema::roles;

use super::Id;
use super::model::{NewRole, Role};

pub trait RoleRepository {
    fn insert(&self, title: &str) -> super::Result<Role>;

    fn find_by_id(&self, id: &Id) -> super::Result<Role>;

    fn delete(&self, id: &Id) -> super::Result<bool>;

    fn count(&self) -> super::Result<i64>;

    fn find_page(&self, offset: i64, limit: i64) -> super::Result<Vec<Role>>;
}

pub struct PgRoleRepository {
    pool: Pool,
}

impl PgRoleRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl RoleRepository for PgRoleRepository {
    fn insert(&self, title: &str) -> super::Result<Role> {
        let mut conn = self.pool.get()?;

        let id = Id::random();
        diesel::insert_into(roles::table)
            .values(NewRole::new(&id, title))
            .returning(Role::as_returning())
            .get_result(&mut conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    super::Error::AlreadyExists(title.to_string())
                }
                e => e.into(),
            })
    }

    fn find_by_id(&self, id: &Id) -> super::Result<Role> {
        let mut conn = self.pool.get()?;

        roles::table
            .find(id)
            .select(Role::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(super::Error::NotFound(id.clone()))
    }

    fn delete(&self, id: &Id) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(roles::table.find(id))
            .execute(&mut conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    super::Error::InUse(id.clone())
                }
                e => e.into(),
            })?;

        Ok(deleted > 0)
    }

    fn count(&self) -> super::Result<i64> {
        let mut conn = self.pool.get()?;

        let count = roles::table.count().get_result(&mut conn)?;

        Ok(count)
    }

    fn find_page(&self, offset: i64, limit: i64) -> super::Result<Vec<Role>> {
        let mut conn = self.pool.get()?;

        let roles = roles::table
            .order(roles::title)
            .offset(offset)
            .limit(limit)
            .select(Role::as_select())
            .load(&mut conn)?;

        Ok(roles)
    }
}

#[cfg(test)]
mod test {
    use testcontainers_modules::{postgres::Postgres, testcontainers::runners::AsyncRunner};

    use crate::integration::db;
    use crate::user;
    use crate::user::model::NewUser;
    use crate::user::repository::{PgUserRepository, UserRepository};

    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn should_insert_and_find() {
        let node = Postgres::default().start().await.unwrap();
        let repo = PgRoleRepository::new(db::test::pool(&node).await);

        let expected = repo.insert("ADMIN").unwrap();
        let actual = repo.find_by_id(expected.id()).unwrap();

        assert_eq!(actual.title(), "ADMIN");
        assert_eq!(actual.kind(), super::super::Kind::Admin);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn should_reject_duplicate_title() {
        let node = Postgres::default().start().await.unwrap();
        let repo = PgRoleRepository::new(db::test::pool(&node).await);

        repo.insert("ADMIN").unwrap();
        let duplicate = repo.insert("ADMIN");

        assert!(matches!(duplicate, Err(super::super::Error::AlreadyExists(t)) if t == "ADMIN"));
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn should_delete() {
        let node = Postgres::default().start().await.unwrap();
        let repo = PgRoleRepository::new(db::test::pool(&node).await);

        let role = repo.insert("USER").unwrap();

        assert!(repo.delete(role.id()).unwrap());
        assert!(!repo.delete(role.id()).unwrap());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn should_keep_role_held_by_users() {
        let node = Postgres::default().start().await.unwrap();
        let pool = db::test::pool(&node).await;
        let repo = PgRoleRepository::new(pool.clone());

        let role = repo.insert("USER").unwrap();
        let id = user::Id::random();
        PgUserRepository::new(pool)
            .insert(&NewUser::new(&id, "Jora", None, "jora@welt.io", "hash", None, role.id()))
            .unwrap();

        let res = repo.delete(role.id());

        assert!(matches!(res, Err(super::super::Error::InUse(held)) if &held == role.id()));
        assert_eq!(repo.count().unwrap(), 1);
    }
}
