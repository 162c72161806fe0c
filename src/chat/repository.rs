use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{
    Connection, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, QueryResult,
    RunQueryDsl, SelectableHelper, dsl::exists, select,
};

use crate::integration::db::Pool;
use crate::schema::{chats, chats_users, users};
use crate::user;
use crate::user::model::User;

use super::Id;
use super::model::{Chat, NewChat, NewParticipant, pair_key};

pub trait ChatRepository {
    fn find_by_id(&self, id: &Id) -> super::Result<Chat>;

    fn find_by_participant(&self, user_id: &user::Id) -> super::Result<Vec<Chat>>;

    /// `(chat, participant)` pairs for the given chats, ordered by chat then user.
    fn find_participants_of(&self, ids: &[Id]) -> super::Result<Vec<(Id, user::Id)>>;

    fn is_participant(&self, id: &Id, user_id: &user::Id) -> super::Result<bool>;

    fn insert(&self, c: &NewChat, participants: &[user::Id]) -> super::Result<Chat>;

    fn insert_participant(&self, id: &Id, user_id: &user::Id) -> super::Result<()>;

    fn find_private_between(&self, a: &user::Id, b: &user::Id) -> super::Result<Option<Chat>>;

    /// Users bound to the given one through a private chat.
    fn find_private_partners(&self, user_id: &user::Id) -> super::Result<Vec<user::Id>>;

    fn delete(&self, id: &Id) -> super::Result<bool>;

    fn count(&self) -> super::Result<i64>;

    fn find_page(&self, offset: i64, limit: i64) -> super::Result<Vec<Chat>>;

    fn count_participants(&self, id: &Id) -> super::Result<i64>;

    fn find_participants_page(&self, id: &Id, offset: i64, limit: i64)
    -> super::Result<Vec<User>>;
}

pub struct PgChatRepository {
    pool: Pool,
}

impl PgChatRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

/// Inserts a chat with its participants on an open connection, so callers can
/// make it part of a larger transaction.
pub fn insert_with_participants(
    conn: &mut PgConnection,
    c: &NewChat,
    participants: &[user::Id],
) -> QueryResult<Chat> {
    let chat = diesel::insert_into(chats::table)
        .values(c)
        .returning(Chat::as_returning())
        .get_result(conn)?;

    let rows = participants
        .iter()
        .map(|user_id| NewParticipant::new(chat.id(), user_id))
        .collect::<Vec<_>>();
    diesel::insert_into(chats_users::table)
        .values(&rows)
        .execute(conn)?;

    Ok(chat)
}

impl ChatRepository for PgChatRepository {
    fn find_by_id(&self, id: &Id) -> super::Result<Chat> {
        let mut conn = self.pool.get()?;

        chats::table
            .find(id)
            .select(Chat::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(super::Error::NotFound(id.clone()))
    }

    fn find_by_participant(&self, user_id: &user::Id) -> super::Result<Vec<Chat>> {
        let mut conn = self.pool.get()?;

        let chats = chats_users::table
            .inner_join(chats::table)
            .filter(chats_users::user_id.eq(user_id))
            .select(Chat::as_select())
            .load(&mut conn)?;

        Ok(chats)
    }

    fn find_participants_of(&self, ids: &[Id]) -> super::Result<Vec<(Id, user::Id)>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.pool.get()?;

        let pairs = chats_users::table
            .filter(chats_users::chat_id.eq_any(ids))
            .order((chats_users::chat_id.asc(), chats_users::user_id.asc()))
            .select((chats_users::chat_id, chats_users::user_id))
            .load(&mut conn)?;

        Ok(pairs)
    }

    fn is_participant(&self, id: &Id, user_id: &user::Id) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let exists = select(exists(chats_users::table.find((id, user_id)))).get_result(&mut conn)?;

        Ok(exists)
    }

    fn insert(&self, c: &NewChat, participants: &[user::Id]) -> super::Result<Chat> {
        let mut conn = self.pool.get()?;

        conn.transaction(|conn| insert_with_participants(conn, c, participants))
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    super::Error::AlreadyExists
                }
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    super::Error::UnknownOrigin
                }
                e => e.into(),
            })
    }

    fn insert_participant(&self, id: &Id, user_id: &user::Id) -> super::Result<()> {
        let mut conn = self.pool.get()?;

        diesel::insert_into(chats_users::table)
            .values(NewParticipant::new(id, user_id))
            .execute(&mut conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    super::Error::AlreadyParticipant(user_id.clone())
                }
                e => e.into(),
            })?;

        Ok(())
    }

    fn find_private_between(&self, a: &user::Id, b: &user::Id) -> super::Result<Option<Chat>> {
        let mut conn = self.pool.get()?;

        let chat = chats::table
            .filter(chats::pair_key.eq(pair_key(a, b)))
            .select(Chat::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(chat)
    }

    fn find_private_partners(&self, user_id: &user::Id) -> super::Result<Vec<user::Id>> {
        let mut conn = self.pool.get()?;

        let private_chats: Vec<Id> = chats_users::table
            .inner_join(chats::table)
            .filter(chats_users::user_id.eq(user_id))
            .filter(chats::pair_key.is_not_null())
            .select(chats_users::chat_id)
            .load(&mut conn)?;

        if private_chats.is_empty() {
            return Ok(vec![]);
        }

        let partners = chats_users::table
            .filter(chats_users::chat_id.eq_any(&private_chats))
            .filter(chats_users::user_id.ne(user_id))
            .select(chats_users::user_id)
            .distinct()
            .load(&mut conn)?;

        Ok(partners)
    }

    fn delete(&self, id: &Id) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(chats::table.find(id)).execute(&mut conn)?;

        Ok(deleted > 0)
    }

    fn count(&self) -> super::Result<i64> {
        let mut conn = self.pool.get()?;

        let count = chats::table.count().get_result(&mut conn)?;

        Ok(count)
    }

    fn find_page(&self, offset: i64, limit: i64) -> super::Result<Vec<Chat>> {
        let mut conn = self.pool.get()?;

        let chats = chats::table
            .order((chats::created_at.asc(), chats::id.asc()))
            .offset(offset)
            .limit(limit)
            .select(Chat::as_select())
            .load(&mut conn)?;

        Ok(chats)
    }

    fn count_participants(&self, id: &Id) -> super::Result<i64> {
        let mut conn = self.pool.get()?;

        let count = chats_users::table
            .filter(chats_users::chat_id.eq(id))
            .count()
            .get_result(&mut conn)?;

        Ok(count)
    }

    fn find_participants_page(
        &self,
        id: &Id,
        offset: i64,
        limit: i64,
    ) -> super::Result<Vec<User>> {
        let mut conn = self.pool.get()?;

        let users = chats_users::table
            .inner_join(users::table)
            .filter(chats_users::chat_id.eq(id))
            .order((users::first_name.asc(), users::id.asc()))
            .offset(offset)
            .limit(limit)
            .select(User::as_select())
            .load(&mut conn)?;

        Ok(users)
    }
}
