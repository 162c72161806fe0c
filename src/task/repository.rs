use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{
    Connection, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper,
    dsl::{exists, now},
    select,
};

use crate::integration::db::Pool;
use crate::schema::{task_assignments, task_priorities, task_statuses, tasks, users};
use crate::user::model::User;
use crate::{project, user};

use super::model::{NewAssignment, NewPriority, NewStatus, NewTask, Priority, Status, Task};
use super::{Id, PriorityId, StatusId};

pub trait TaskRepository {
    fn insert_status(&self, title: &str) -> super::Result<Status>;

    fn insert_priority(&self, title: &str) -> super::Result<Priority>;

    fn find_statuses(&self) -> super::Result<Vec<Status>>;

    fn find_priorities(&self) -> super::Result<Vec<Priority>>;

    fn status_exists(&self, id: &StatusId) -> super::Result<bool>;

    fn priority_exists(&self, id: &PriorityId) -> super::Result<bool>;

    /// Inserts the task together with its assignments.
    fn insert(&self, t: &NewTask, assignees: &[user::Id]) -> super::Result<Task>;

    fn find_by_id(&self, id: &Id) -> super::Result<Task>;

    /// Oldest first.
    fn find_by_project(&self, project_id: &project::Id) -> super::Result<Vec<Task>>;

    /// `(task, assignee)` pairs for the given tasks.
    fn find_assignees(&self, ids: &[Id]) -> super::Result<Vec<(Id, User)>>;

    fn update_status(&self, id: &Id, status_id: &StatusId) -> super::Result<Task>;

    fn count(&self) -> super::Result<i64>;

    fn find_page(&self, offset: i64, limit: i64) -> super::Result<Vec<Task>>;
}

pub struct PgTaskRepository {
    pool: Pool,
}

impl PgTaskRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl TaskRepository for PgTaskRepository {
    fn insert_status(&self, title: &str) -> super::Result<Status> {
        let mut conn = self.pool.get()?;

        let id = StatusId::random();
        diesel::insert_into(task_statuses::table)
            .values(NewStatus::new(&id, title))
            .returning(Status::as_returning())
            .get_result(&mut conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    super::Error::StatusExists(title.to_string())
                }
                e => e.into(),
            })
    }

    fn insert_priority(&self, title: &str) -> super::Result<Priority> {
        let mut conn = self.pool.get()?;

        let id = PriorityId::random();
        diesel::insert_into(task_priorities::table)
            .values(NewPriority::new(&id, title))
            .returning(Priority::as_returning())
            .get_result(&mut conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    super::Error::PriorityExists(title.to_string())
                }
                e => e.into(),
            })
    }

    fn find_statuses(&self) -> super::Result<Vec<Status>> {
        let mut conn = self.pool.get()?;

        let statuses = task_statuses::table
            .order(task_statuses::title.asc())
            .select(Status::as_select())
            .load(&mut conn)?;

        Ok(statuses)
    }

    fn find_priorities(&self) -> super::Result<Vec<Priority>> {
        let mut conn = self.pool.get()?;

        let priorities = task_priorities::table
            .order(task_priorities::title.asc())
            .select(Priority::as_select())
            .load(&mut conn)?;

        Ok(priorities)
    }

    fn status_exists(&self, id: &StatusId) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let exists = select(exists(task_statuses::table.find(id))).get_result(&mut conn)?;

        Ok(exists)
    }

    fn priority_exists(&self, id: &PriorityId) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let exists = select(exists(task_priorities::table.find(id))).get_result(&mut conn)?;

        Ok(exists)
    }

    fn insert(&self, t: &NewTask, assignees: &[user::Id]) -> super::Result<Task> {
        let mut conn = self.pool.get()?;

        let task = conn.transaction::<_, DieselError, _>(|conn| {
            let task = diesel::insert_into(tasks::table)
                .values(t)
                .returning(Task::as_returning())
                .get_result(conn)?;

            let rows = assignees
                .iter()
                .map(|user_id| NewAssignment::new(t.id(), user_id))
                .collect::<Vec<_>>();
            diesel::insert_into(task_assignments::table)
                .values(&rows)
                .execute(conn)?;

            Ok(task)
        })?;

        Ok(task)
    }

    fn find_by_id(&self, id: &Id) -> super::Result<Task> {
        let mut conn = self.pool.get()?;

        tasks::table
            .find(id)
            .select(Task::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(super::Error::NotFound(id.clone()))
    }

    fn find_by_project(&self, project_id: &project::Id) -> super::Result<Vec<Task>> {
        let mut conn = self.pool.get()?;

        let tasks = tasks::table
            .filter(tasks::project_id.eq(project_id))
            .order((tasks::created_at.asc(), tasks::id.asc()))
            .select(Task::as_select())
            .load(&mut conn)?;

        Ok(tasks)
    }

    fn find_assignees(&self, ids: &[Id]) -> super::Result<Vec<(Id, User)>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.pool.get()?;

        let assignees = task_assignments::table
            .inner_join(users::table)
            .filter(task_assignments::task_id.eq_any(ids))
            .order((task_assignments::task_id.asc(), users::first_name.asc()))
            .select((task_assignments::task_id, User::as_select()))
            .load(&mut conn)?;

        Ok(assignees)
    }

    fn update_status(&self, id: &Id, status_id: &StatusId) -> super::Result<Task> {
        let mut conn = self.pool.get()?;

        diesel::update(tasks::table.find(id))
            .set((tasks::status_id.eq(status_id), tasks::updated_at.eq(now)))
            .returning(Task::as_returning())
            .get_result(&mut conn)
            .optional()?
            .ok_or(super::Error::NotFound(id.clone()))
    }

    fn count(&self) -> super::Result<i64> {
        let mut conn = self.pool.get()?;

        let count = tasks::table.count().get_result(&mut conn)?;

        Ok(count)
    }

    fn find_page(&self, offset: i64, limit: i64) -> super::Result<Vec<Task>> {
        let mut conn = self.pool.get()?;

        let tasks = tasks::table
            .order((tasks::created_at.asc(), tasks::id.asc()))
            .offset(offset)
            .limit(limit)
            .select(Task::as_select())
            .load(&mut conn)?;

        Ok(tasks)
    }
}
