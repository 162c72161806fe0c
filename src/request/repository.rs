use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{
    Connection, ExpressionMethods, NullableExpressionMethods, OptionalExtension, QueryDsl,
    RunQueryDsl, SelectableHelper,
};

use crate::chat::{self, Origin, model::NewChat, repository::insert_with_participants};
use crate::integration::db::Pool;
use crate::schema::{chats, request_statuses, requests};
use crate::user;

use super::model::{NewRequest, NewStatus, Request, Status};
use super::{Id, StatusId};

pub trait RequestRepository {
    fn insert_status(&self, title: &str) -> super::Result<Status>;

    fn find_status_by_title(&self, title: &str) -> super::Result<Option<Status>>;

    fn find_statuses(&self) -> super::Result<Vec<Status>>;

    fn delete_status(&self, id: &StatusId) -> super::Result<bool>;

    /// Inserts the request together with the private chat of its two parties.
    fn insert(&self, r: &NewRequest, chat_id: &chat::Id) -> super::Result<Request>;

    fn find_by_id(&self, id: &Id) -> super::Result<Request>;

    /// Newest first.
    fn find_received(
        &self,
        user_id: &user::Id,
        status_id: Option<&StatusId>,
    ) -> super::Result<Vec<Request>>;

    /// Newest first.
    fn find_sent(&self, user_id: &user::Id) -> super::Result<Vec<Request>>;

    fn update_status(&self, id: &Id, status_id: &StatusId) -> super::Result<Request>;

    /// `(request, chat)` pairs for chats opened by the given requests.
    fn find_chats(&self, ids: &[Id]) -> super::Result<Vec<(Id, chat::Id)>>;

    fn count(&self) -> super::Result<i64>;

    fn find_page(&self, offset: i64, limit: i64) -> super::Result<Vec<Request>>;
}

pub struct PgRequestRepository {
    pool: Pool,
}

impl PgRequestRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl RequestRepository for PgRequestRepository {
    fn insert_status(&self, title: &str) -> super::Result<Status> {
        let mut conn = self.pool.get()?;

        let id = StatusId::random();
        diesel::insert_into(request_statuses::table)
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

    fn find_status_by_title(&self, title: &str) -> super::Result<Option<Status>> {
        let mut conn = self.pool.get()?;

        let status = request_statuses::table
            .filter(request_statuses::title.eq(title))
            .select(Status::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(status)
    }

    fn find_statuses(&self) -> super::Result<Vec<Status>> {
        let mut conn = self.pool.get()?;

        let statuses = request_statuses::table
            .order(request_statuses::title.asc())
            .select(Status::as_select())
            .load(&mut conn)?;

        Ok(statuses)
    }

    fn delete_status(&self, id: &StatusId) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(request_statuses::table.find(id))
            .execute(&mut conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    super::Error::StatusInUse(id.clone())
                }
                e => e.into(),
            })?;

        Ok(deleted > 0)
    }

    fn insert(&self, r: &NewRequest, chat_id: &chat::Id) -> super::Result<Request> {
        let mut conn = self.pool.get()?;

        let request = conn.transaction::<_, DieselError, _>(|conn| {
            let request = diesel::insert_into(requests::table)
                .values(r)
                .returning(Request::as_returning())
                .get_result(conn)?;

            let origin = Origin::FromRequest(*request.id());
            let participants = r.participants();
            insert_with_participants(
                conn,
                &NewChat::new(chat_id, r.subject(), false, &origin, &participants),
                &participants,
            )?;

            Ok(request)
        })?;

        Ok(request)
    }

    fn find_by_id(&self, id: &Id) -> super::Result<Request> {
        let mut conn = self.pool.get()?;

        requests::table
            .find(id)
            .select(Request::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(super::Error::NotFound(*id))
    }

    fn find_received(
        &self,
        user_id: &user::Id,
        status_id: Option<&StatusId>,
    ) -> super::Result<Vec<Request>> {
        let mut conn = self.pool.get()?;

        let mut query = requests::table
            .filter(requests::receiver_id.eq(user_id))
            .select(Request::as_select())
            .into_boxed();
        if let Some(status_id) = status_id {
            query = query.filter(requests::status_id.eq(status_id));
        }

        let requests = query
            .order((requests::created_at.desc(), requests::id.desc()))
            .load(&mut conn)?;

        Ok(requests)
    }

    fn find_sent(&self, user_id: &user::Id) -> super::Result<Vec<Request>> {
        let mut conn = self.pool.get()?;

        let requests = requests::table
            .filter(requests::sender_id.eq(user_id))
            .order((requests::created_at.desc(), requests::id.desc()))
            .select(Request::as_select())
            .load(&mut conn)?;

        Ok(requests)
    }

    fn update_status(&self, id: &Id, status_id: &StatusId) -> super::Result<Request> {
        let mut conn = self.pool.get()?;

        diesel::update(requests::table.find(id))
            .set(requests::status_id.eq(status_id))
            .returning(Request::as_returning())
            .get_result(&mut conn)
            .optional()?
            .ok_or(super::Error::NotFound(*id))
    }

    fn find_chats(&self, ids: &[Id]) -> super::Result<Vec<(Id, chat::Id)>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.pool.get()?;

        let pairs = chats::table
            .filter(chats::request_id.assume_not_null().eq_any(ids))
            .select((chats::request_id.assume_not_null(), chats::id))
            .load(&mut conn)?;

        Ok(pairs)
    }

    fn count(&self) -> super::Result<i64> {
        let mut conn = self.pool.get()?;

        let count = requests::table.count().get_result(&mut conn)?;

        Ok(count)
    }

    fn find_page(&self, offset: i64, limit: i64) -> super::Result<Vec<Request>> {
        let mut conn = self.pool.get()?;

        let requests = requests::table
            .order(requests::id.asc())
            .offset(offset)
            .limit(limit)
            .select(Request::as_select())
            .load(&mut conn)?;

        Ok(requests)
    }
}
