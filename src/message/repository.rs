use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper};

use crate::chat;
use crate::integration::db::Pool;
use crate::schema::messages;

use super::Id;
use super::model::{Message, NewMessage};

pub trait MessageRepository {
    fn insert(&self, m: &NewMessage) -> super::Result<Message>;

    fn find_by_id(&self, id: &Id) -> super::Result<Message>;

    /// Oldest first, ties in insertion order.
    fn find_by_chat(&self, chat_id: &chat::Id) -> super::Result<Vec<Message>>;

    /// Most recent message of each chat that has any.
    fn find_last_by_chats(&self, chat_ids: &[chat::Id]) -> super::Result<Vec<Message>>;

    fn delete(&self, id: &Id) -> super::Result<bool>;
}

pub struct PgMessageRepository {
    pool: Pool,
}

impl PgMessageRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl MessageRepository for PgMessageRepository {
    fn insert(&self, m: &NewMessage) -> super::Result<Message> {
        let mut conn = self.pool.get()?;

        let message = diesel::insert_into(messages::table)
            .values(m)
            .returning(Message::as_returning())
            .get_result(&mut conn)?;

        Ok(message)
    }

    fn find_by_id(&self, id: &Id) -> super::Result<Message> {
        let mut conn = self.pool.get()?;

        messages::table
            .find(id)
            .select(Message::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(super::Error::NotFound(id.clone()))
    }

    fn find_by_chat(&self, chat_id: &chat::Id) -> super::Result<Vec<Message>> {
        let mut conn = self.pool.get()?;

        let messages = messages::table
            .filter(messages::chat_id.eq(chat_id))
            .order((messages::sent_at.asc(), messages::seq.asc()))
            .select(Message::as_select())
            .load(&mut conn)?;

        Ok(messages)
    }

    fn find_last_by_chats(&self, chat_ids: &[chat::Id]) -> super::Result<Vec<Message>> {
        if chat_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.pool.get()?;

        let messages = messages::table
            .filter(messages::chat_id.eq_any(chat_ids))
            .distinct_on(messages::chat_id)
            .order((
                messages::chat_id,
                messages::sent_at.desc(),
                messages::seq.desc(),
            ))
            .select(Message::as_select())
            .load(&mut conn)?;

        Ok(messages)
    }

    fn delete(&self, id: &Id) -> super::Result<bool> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(messages::table.find(id)).execute(&mut conn)?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod test {
    use testcontainers_modules::{postgres::Postgres, testcontainers::runners::AsyncRunner};

    use crate::chat::Origin;
    use crate::chat::model::NewChat;
    use crate::chat::repository::{ChatRepository, PgChatRepository};
    use crate::integration::db;
    use crate::role::repository::{PgRoleRepository, RoleRepository};
    use crate::user;
    use crate::user::model::NewUser;
    use crate::user::repository::{PgUserRepository, UserRepository};

    use super::*;

    async fn setup(node: &testcontainers_modules::testcontainers::ContainerAsync<Postgres>)
    -> (PgMessageRepository, chat::Id, user::Id) {
        let pool = db::test::pool(node).await;
        let role = PgRoleRepository::new(pool.clone()).insert("USER").unwrap();

        let sender = user::Id::random();
        PgUserRepository::new(pool.clone())
            .insert(&NewUser::new(
                &sender,
                "Jora",
                None,
                "jora@welt.io",
                "hash",
                None,
                role.id(),
            ))
            .unwrap();

        let chat_id = chat::Id::random();
        let participants = [sender.clone()];
        PgChatRepository::new(pool.clone())
            .insert(
                &NewChat::new(&chat_id, "Notes", true, &Origin::Direct, &participants),
                &participants,
            )
            .unwrap();

        (PgMessageRepository::new(pool), chat_id, sender)
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn should_keep_insertion_order() {
        let node = Postgres::default().start().await.unwrap();
        let (repo, chat_id, sender) = setup(&node).await;

        for text in ["one", "two", "three"] {
            let id = Id::random();
            repo.insert(&NewMessage::new(&id, &chat_id, &sender, text))
                .unwrap();
        }

        let texts = repo
            .find_by_chat(&chat_id)
            .unwrap()
            .iter()
            .map(|m| m.text().to_string())
            .collect::<Vec<_>>();

        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn should_find_last_message_per_chat() {
        let node = Postgres::default().start().await.unwrap();
        let (repo, chat_id, sender) = setup(&node).await;

        for text in ["first", "last"] {
            let id = Id::random();
            repo.insert(&NewMessage::new(&id, &chat_id, &sender, text))
                .unwrap();
        }

        let last = repo.find_last_by_chats(&[chat_id]).unwrap();

        assert_eq!(last.len(), 1);
        assert_eq!(last[0].text(), "last");
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn should_delete() {
        let node = Postgres::default().start().await.unwrap();
        let (repo, chat_id, sender) = setup(&node).await;

        let id = Id::random();
        repo.insert(&NewMessage::new(&id, &chat_id, &sender, "bye"))
            .unwrap();

        assert!(repo.delete(&id).unwrap());
        assert!(matches!(
            repo.find_by_id(&id),
            Err(super::super::Error::NotFound(_))
        ));
    }
}
