use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{
    ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper, dsl::exists,
    select,
};

use crate::integration::db::Pool;
use crate::schema::users;

use super::Id;
use super::model::{NewUser, User};

pub trait UserRepository {
    fn insert(&self, u: &NewUser) -> super::Result<User>;

    fn find_by_id(&self, id: &Id) -> super::Result<User>;

    fn find_by_email(&self, email: &str) -> super::Result<Option<User>>;

    fn find_by_ids(&self, ids: &[Id]) -> super::Result<Vec<User>>;

    fn find_all_excluding(&self, exclude: &[Id]) -> super::Result<Vec<User>>;

    fn exists(&self, id: &Id) -> super::Result<bool>;

    fn count(&self, exclude: Option<&Id>) -> super::Result<i64>;

    fn find_page(&self, exclude: Option<&Id>, offset: i64, limit: i64)
    -> super::Result<Vec<User>>;
}

pub struct PgUserRepository {
    pool: Pool,
}

impl PgUserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    fn insert(&self, u: &NewUser) -> super::Result<User> {
        let mut conn = self.pool.get()?;

        diesel::insert_into(users::table)
            .values(u)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    super::Error::AlreadyExists
                }
                e => e.into(),
            })
    }

    fn find_by_id(&self, id: &Id) -> super::Result<User> {
        let mut conn = self.pool.get()?;

        users::table
            .find(id)
            .select(User::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(super::Error::NotFound(id.clone()))
    }

    fn find_by_email(&self, email: &str) -> super::Result<Option<User>> {
        let mut conn = self.pool.get()?;

        let u = users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(u)
    }

    fn find_by_ids(&self, ids: &[Id]) -> super::Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.pool.get()?;

        let users = users::table
            .filter(users::id.eq_any(ids))
            .select(User::as_select())
            .load(&mut conn)?;

        Ok(users)
    }

    fn find_all_excluding(&self, exclude: &[Id]) -> super::Result<Vec<User>> {
        let mut conn = self.pool.get()?;

        let users = users::table
            .filter(users::id.ne_all(exclude))
            .order((users::first_name.asc(), users::id.asc()))
            .select(User::as_select())
            .load(&mut conn)?;

        Ok(users)
    }

    fn exists(&self, id: &Id) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let exists = select(exists(users::table.find(id))).get_result(&mut conn)?;

        Ok(exists)
    }

    fn count(&self, exclude: Option<&Id>) -> super::Result<i64> {
        let mut conn = self.pool.get()?;

        let mut query = users::table.into_boxed();
        if let Some(id) = exclude {
            query = query.filter(users::id.ne(id));
        }

        let count = query.count().get_result(&mut conn)?;

        Ok(count)
    }

    fn find_page(
        &self,
        exclude: Option<&Id>,
        offset: i64,
        limit: i64,
    ) -> super::Result<Vec<User>> {
        let mut conn = self.pool.get()?;

        let mut query = users::table.into_boxed();
        if let Some(id) = exclude {
            query = query.filter(users::id.ne(id));
        }

        let users = query
            .order((users::created_at.asc(), users::id.asc()))
            .offset(offset)
            .limit(limit)
            .select(User::as_select())
            .load(&mut conn)?;

        Ok(users)
    }
}
