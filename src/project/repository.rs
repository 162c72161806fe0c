use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{
    Connection, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper,
    dsl::exists, select,
};

use crate::integration::db::Pool;
use crate::schema::{projects, projects_users};
use crate::user;

use super::Id;
use super::model::{NewMember, NewProject, Project};

pub trait ProjectRepository {
    /// Inserts the project with its creator as the first member.
    fn insert(&self, p: &NewProject, creator: &user::Id) -> super::Result<Project>;

    fn find_by_id(&self, id: &Id) -> super::Result<Project>;

    fn exists(&self, id: &Id) -> super::Result<bool>;

    fn insert_member(&self, id: &Id, user_id: &user::Id) -> super::Result<()>;

    fn find_by_member(&self, user_id: &user::Id) -> super::Result<Vec<Project>>;

    fn delete(&self, id: &Id) -> super::Result<bool>;

    fn count(&self) -> super::Result<i64>;

    fn find_page(&self, offset: i64, limit: i64) -> super::Result<Vec<Project>>;
}

pub struct PgProjectRepository {
    pool: Pool,
}

impl PgProjectRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl ProjectRepository for PgProjectRepository {
    fn insert(&self, p: &NewProject, creator: &user::Id) -> super::Result<Project> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DieselError, _>(|conn| {
            let project = diesel::insert_into(projects::table)
                .values(p)
                .returning(Project::as_returning())
                .get_result(conn)?;

            diesel::insert_into(projects_users::table)
                .values(NewMember::new(project.id(), creator))
                .execute(conn)?;

            Ok(project)
        })
        .map_err(|e| match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                super::Error::AlreadyExists(p.title().to_string())
            }
            e => e.into(),
        })
    }

    fn find_by_id(&self, id: &Id) -> super::Result<Project> {
        let mut conn = self.pool.get()?;

        projects::table
            .find(id)
            .select(Project::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(super::Error::NotFound(id.clone()))
    }

    fn exists(&self, id: &Id) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let exists = select(exists(projects::table.find(id))).get_result(&mut conn)?;

        Ok(exists)
    }

    fn insert_member(&self, id: &Id, user_id: &user::Id) -> super::Result<()> {
        let mut conn = self.pool.get()?;

        diesel::insert_into(projects_users::table)
            .values(NewMember::new(id, user_id))
            .execute(&mut conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    super::Error::AlreadyMember(user_id.clone())
                }
                e => e.into(),
            })?;

        Ok(())
    }

    fn find_by_member(&self, user_id: &user::Id) -> super::Result<Vec<Project>> {
        let mut conn = self.pool.get()?;

        let projects = projects_users::table
            .inner_join(projects::table)
            .filter(projects_users::user_id.eq(user_id))
            .order(projects::title.asc())
            .select(Project::as_select())
            .load(&mut conn)?;

        Ok(projects)
    }

    fn delete(&self, id: &Id) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(projects::table.find(id)).execute(&mut conn)?;

        Ok(deleted > 0)
    }

    fn count(&self) -> super::Result<i64> {
        let mut conn = self.pool.get()?;

        let count = projects::table.count().get_result(&mut conn)?;

        Ok(count)
    }

    fn find_page(&self, offset: i64, limit: i64) -> super::Result<Vec<Project>> {
        let mut conn = self.pool.get()?;

        let projects = projects::table
            .order((projects::title.asc(), projects::id.asc()))
            .offset(offset)
            .limit(limit)
            .select(Project::as_select())
            .load(&mut conn)?;

        Ok(projects)
    }
}
