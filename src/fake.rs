//! In-memory stand-ins for the Postgres repositories.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::chat::model::{Chat, NewChat, pair_key};
use crate::message::model::{Message, NewMessage};
use crate::project::model::{NewProject, Project};
use crate::request::model::{NewRequest, Request};
use crate::role::model::{NewRole, Role};
use crate::task::model::{NewTask, Priority, Task};
use crate::user::model::{NewUser, User};
use crate::{auth, chat, message, project, request, role, task, user};

use crate::chat::repository::ChatRepository;
use crate::message::repository::MessageRepository;
use crate::project::repository::ProjectRepository;
use crate::request::repository::RequestRepository;
use crate::role::repository::RoleRepository;
use crate::task::repository::TaskRepository;
use crate::user::repository::UserRepository;

#[derive(Default)]
struct State {
    roles: Vec<Role>,
    users: Vec<User>,
    projects: Vec<Project>,
    members: Vec<(project::Id, user::Id)>,
    request_statuses: Vec<request::model::Status>,
    requests: Vec<Request>,
    task_statuses: Vec<task::model::Status>,
    priorities: Vec<Priority>,
    tasks: Vec<Task>,
    assignments: Vec<(task::Id, user::Id)>,
    chats: Vec<Chat>,
    participants: Vec<(chat::Id, user::Id)>,
    messages: Vec<Message>,
    seq: i64,
}

#[derive(Clone, Default)]
pub struct Store {
    state: Arc<Mutex<State>>,
}

impl Store {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Role with the given title, created on first use.
    pub fn role(&self, title: &str) -> Role {
        let mut state = self.state();
        if let Some(role) = state.roles.iter().find(|r| r.title() == title) {
            return role.clone();
        }

        let id = role::Id::random();
        let role = Role::from(&NewRole::new(&id, title));
        state.roles.push(role.clone());
        role
    }

    /// Plain user with a `<name>@welt.io` email.
    pub fn user(&self, first_name: &str, avatar: Option<&str>) -> User {
        let role = self.role("USER");
        let id = user::Id::random();
        let email = format!("{}@welt.io", first_name.to_lowercase());

        let u = User::from(&NewUser::new(
            &id,
            first_name,
            None,
            &email,
            "hash",
            avatar,
            role.id(),
        ));
        self.state().users.push(u.clone());
        u
    }

    pub fn auth_user(&self, first_name: &str) -> auth::User {
        let u = self.user(first_name, None);
        auth::User::new(&u, None, role::Kind::User)
    }

    /// Stores a message with a fixed timestamp; `seq` still grows per insert.
    pub fn message_at(&self, m: &NewMessage, sent_at: DateTime<Utc>) -> Message {
        let mut state = self.state();
        state.seq += 1;

        let message = Message::stored(m, state.seq, sent_at);
        state.messages.push(message.clone());
        message
    }

    pub fn chat(&self, id: &chat::Id) -> Chat {
        self.state()
            .chats
            .iter()
            .find(|c| c.id() == id)
            .cloned()
            .unwrap()
    }
}

fn page<T: Clone>(items: &[T], offset: i64, limit: i64) -> Vec<T> {
    items
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect()
}

impl UserRepository for Store {
    fn insert(&self, u: &NewUser) -> user::Result<User> {
        let u = User::from(u);
        let mut state = self.state();

        if state.users.iter().any(|x| x.email() == u.email()) {
            return Err(user::Error::AlreadyExists);
        }

        state.users.push(u.clone());
        Ok(u)
    }

    fn find_by_id(&self, id: &user::Id) -> user::Result<User> {
        self.state()
            .users
            .iter()
            .find(|u| u.id() == id)
            .cloned()
            .ok_or(user::Error::NotFound(id.clone()))
    }

    fn find_by_email(&self, email: &str) -> user::Result<Option<User>> {
        Ok(self.state().users.iter().find(|u| u.email() == email).cloned())
    }

    fn find_by_ids(&self, ids: &[user::Id]) -> user::Result<Vec<User>> {
        Ok(self
            .state()
            .users
            .iter()
            .filter(|u| ids.contains(u.id()))
            .cloned()
            .collect())
    }

    fn find_all_excluding(&self, exclude: &[user::Id]) -> user::Result<Vec<User>> {
        let mut users = self
            .state()
            .users
            .iter()
            .filter(|u| !exclude.contains(u.id()))
            .cloned()
            .collect::<Vec<_>>();
        users.sort_by(|a, b| a.first_name().cmp(b.first_name()));
        Ok(users)
    }

    fn exists(&self, id: &user::Id) -> user::Result<bool> {
        Ok(self.state().users.iter().any(|u| u.id() == id))
    }

    fn count(&self, exclude: Option<&user::Id>) -> user::Result<i64> {
        let state = self.state();
        let count = state.users.iter().filter(|u| Some(u.id()) != exclude).count();
        Ok(count as i64)
    }

    fn find_page(
        &self,
        exclude: Option<&user::Id>,
        offset: i64,
        limit: i64,
    ) -> user::Result<Vec<User>> {
        let users = self
            .state()
            .users
            .iter()
            .filter(|u| Some(u.id()) != exclude)
            .cloned()
            .collect::<Vec<_>>();
        Ok(page(&users, offset, limit))
    }
}

impl RoleRepository for Store {
    fn insert(&self, title: &str) -> role::Result<Role> {
        let mut state = self.state();

        if state.roles.iter().any(|r| r.title() == title) {
            return Err(role::Error::AlreadyExists(title.to_string()));
        }

        let id = role::Id::random();
        let role = Role::from(&NewRole::new(&id, title));
        state.roles.push(role.clone());
        Ok(role)
    }

    fn find_by_id(&self, id: &role::Id) -> role::Result<Role> {
        self.state()
            .roles
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or(role::Error::NotFound(id.clone()))
    }

    fn delete(&self, id: &role::Id) -> role::Result<bool> {
        let mut state = self.state();

        if state.users.iter().any(|u| u.role_id() == id) {
            return Err(role::Error::InUse(id.clone()));
        }

        let before = state.roles.len();
        state.roles.retain(|r| r.id() != id);
        Ok(state.roles.len() < before)
    }

    fn count(&self) -> role::Result<i64> {
        Ok(self.state().roles.len() as i64)
    }

    fn find_page(&self, offset: i64, limit: i64) -> role::Result<Vec<Role>> {
        let mut roles = self.state().roles.clone();
        roles.sort_by(|a, b| a.title().cmp(b.title()));
        Ok(page(&roles, offset, limit))
    }
}

impl ProjectRepository for Store {
    fn insert(&self, p: &NewProject, creator: &user::Id) -> project::Result<Project> {
        let mut state = self.state();

        if state.projects.iter().any(|x| x.title() == p.title()) {
            return Err(project::Error::AlreadyExists(p.title().to_string()));
        }

        let project = Project::from(p);
        state.members.push((project.id().clone(), creator.clone()));
        state.projects.push(project.clone());
        Ok(project)
    }

    fn find_by_id(&self, id: &project::Id) -> project::Result<Project> {
        self.state()
            .projects
            .iter()
            .find(|p| p.id() == id)
            .cloned()
            .ok_or(project::Error::NotFound(id.clone()))
    }

    fn exists(&self, id: &project::Id) -> project::Result<bool> {
        Ok(self.state().projects.iter().any(|p| p.id() == id))
    }

    fn insert_member(&self, id: &project::Id, user_id: &user::Id) -> project::Result<()> {
        let mut state = self.state();
        let member = (id.clone(), user_id.clone());

        if state.members.contains(&member) {
            return Err(project::Error::AlreadyMember(user_id.clone()));
        }

        state.members.push(member);
        Ok(())
    }

    fn find_by_member(&self, user_id: &user::Id) -> project::Result<Vec<Project>> {
        let state = self.state();
        let mut projects = state
            .projects
            .iter()
            .filter(|p| state.members.contains(&(p.id().clone(), user_id.clone())))
            .cloned()
            .collect::<Vec<_>>();
        projects.sort_by(|a, b| a.title().cmp(b.title()));
        Ok(projects)
    }

    fn delete(&self, id: &project::Id) -> project::Result<bool> {
        let mut state = self.state();
        let before = state.projects.len();
        state.projects.retain(|p| p.id() != id);
        state.members.retain(|(p, _)| p != id);
        state.tasks.retain(|t| t.project_id() != id);
        Ok(state.projects.len() < before)
    }

    fn count(&self) -> project::Result<i64> {
        Ok(self.state().projects.len() as i64)
    }

    fn find_page(&self, offset: i64, limit: i64) -> project::Result<Vec<Project>> {
        let mut projects = self.state().projects.clone();
        projects.sort_by(|a, b| a.title().cmp(b.title()));
        Ok(page(&projects, offset, limit))
    }
}

impl RequestRepository for Store {
    fn insert_status(&self, title: &str) -> request::Result<request::model::Status> {
        let mut state = self.state();

        if state.request_statuses.iter().any(|s| s.title() == title) {
            return Err(request::Error::StatusExists(title.to_string()));
        }

        let id = request::StatusId::random();
        let status = request::model::Status::from(&request::model::NewStatus::new(&id, title));
        state.request_statuses.push(status.clone());
        Ok(status)
    }

    fn find_status_by_title(&self, title: &str) -> request::Result<Option<request::model::Status>> {
        Ok(self
            .state()
            .request_statuses
            .iter()
            .find(|s| s.title() == title)
            .cloned())
    }

    fn find_statuses(&self) -> request::Result<Vec<request::model::Status>> {
        let mut statuses = self.state().request_statuses.clone();
        statuses.sort_by(|a, b| a.title().cmp(b.title()));
        Ok(statuses)
    }

    fn delete_status(&self, id: &request::StatusId) -> request::Result<bool> {
        let mut state = self.state();

        if state.requests.iter().any(|r| r.status_id() == id) {
            return Err(request::Error::StatusInUse(id.clone()));
        }

        let before = state.request_statuses.len();
        state.request_statuses.retain(|s| s.id() != id);
        Ok(state.request_statuses.len() < before)
    }

    fn insert(&self, r: &NewRequest, chat_id: &chat::Id) -> request::Result<Request> {
        let mut state = self.state();

        let id = request::Id::from(state.requests.len() as i32 + 1);
        let request = Request::stored(id, r);

        let origin = chat::Origin::FromRequest(id);
        let participants = r.participants();
        let chat = Chat::from(&NewChat::new(
            chat_id,
            r.subject(),
            false,
            &origin,
            &participants,
        ));
        for user_id in participants {
            state.participants.push((chat_id.clone(), user_id));
        }
        state.chats.push(chat);
        state.requests.push(request.clone());

        Ok(request)
    }

    fn find_by_id(&self, id: &request::Id) -> request::Result<Request> {
        self.state()
            .requests
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or(request::Error::NotFound(*id))
    }

    fn find_received(
        &self,
        user_id: &user::Id,
        status_id: Option<&request::StatusId>,
    ) -> request::Result<Vec<Request>> {
        Ok(self
            .state()
            .requests
            .iter()
            .rev()
            .filter(|r| r.receiver_id() == user_id)
            .filter(|r| status_id.is_none_or(|s| r.status_id() == s))
            .cloned()
            .collect())
    }

    fn find_sent(&self, user_id: &user::Id) -> request::Result<Vec<Request>> {
        Ok(self
            .state()
            .requests
            .iter()
            .rev()
            .filter(|r| r.sender_id() == user_id)
            .cloned()
            .collect())
    }

    fn update_status(
        &self,
        id: &request::Id,
        status_id: &request::StatusId,
    ) -> request::Result<Request> {
        let mut state = self.state();
        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(request::Error::NotFound(*id))?;

        request.set_status(status_id);
        Ok(request.clone())
    }

    fn find_chats(&self, ids: &[request::Id]) -> request::Result<Vec<(request::Id, chat::Id)>> {
        Ok(self
            .state()
            .chats
            .iter()
            .filter_map(|c| {
                let origin = c.origin();
                let request_id = origin.request_id()?;
                ids.contains(request_id)
                    .then(|| (*request_id, c.id().clone()))
            })
            .collect())
    }

    fn count(&self) -> request::Result<i64> {
        Ok(self.state().requests.len() as i64)
    }

    fn find_page(&self, offset: i64, limit: i64) -> request::Result<Vec<Request>> {
        Ok(page(&self.state().requests, offset, limit))
    }
}

impl TaskRepository for Store {
    fn insert_status(&self, title: &str) -> task::Result<task::model::Status> {
        let mut state = self.state();

        if state.task_statuses.iter().any(|s| s.title() == title) {
            return Err(task::Error::StatusExists(title.to_string()));
        }

        let status = task::model::Status::new(task::StatusId::random(), title);
        state.task_statuses.push(status.clone());
        Ok(status)
    }

    fn insert_priority(&self, title: &str) -> task::Result<Priority> {
        let mut state = self.state();

        if state.priorities.iter().any(|p| p.title() == title) {
            return Err(task::Error::PriorityExists(title.to_string()));
        }

        let priority = Priority::new(task::PriorityId::random(), title);
        state.priorities.push(priority.clone());
        Ok(priority)
    }

    fn find_statuses(&self) -> task::Result<Vec<task::model::Status>> {
        let mut statuses = self.state().task_statuses.clone();
        statuses.sort_by(|a, b| a.title().cmp(b.title()));
        Ok(statuses)
    }

    fn find_priorities(&self) -> task::Result<Vec<Priority>> {
        let mut priorities = self.state().priorities.clone();
        priorities.sort_by(|a, b| a.title().cmp(b.title()));
        Ok(priorities)
    }

    fn status_exists(&self, id: &task::StatusId) -> task::Result<bool> {
        Ok(self.state().task_statuses.iter().any(|s| s.id() == id))
    }

    fn priority_exists(&self, id: &task::PriorityId) -> task::Result<bool> {
        Ok(self.state().priorities.iter().any(|p| p.id() == id))
    }

    fn insert(&self, t: &NewTask, assignees: &[user::Id]) -> task::Result<Task> {
        let mut state = self.state();

        let task = Task::from(t);
        for user_id in assignees {
            state.assignments.push((task.id().clone(), user_id.clone()));
        }
        state.tasks.push(task.clone());
        Ok(task)
    }

    fn find_by_id(&self, id: &task::Id) -> task::Result<Task> {
        self.state()
            .tasks
            .iter()
            .find(|t| t.id() == id)
            .cloned()
            .ok_or(task::Error::NotFound(id.clone()))
    }

    fn find_by_project(&self, project_id: &project::Id) -> task::Result<Vec<Task>> {
        Ok(self
            .state()
            .tasks
            .iter()
            .filter(|t| t.project_id() == project_id)
            .cloned()
            .collect())
    }

    fn find_assignees(&self, ids: &[task::Id]) -> task::Result<Vec<(task::Id, User)>> {
        let state = self.state();

        Ok(state
            .assignments
            .iter()
            .filter(|(task_id, _)| ids.contains(task_id))
            .filter_map(|(task_id, user_id)| {
                let u = state.users.iter().find(|u| u.id() == user_id)?;
                Some((task_id.clone(), u.clone()))
            })
            .collect())
    }

    fn update_status(&self, id: &task::Id, status_id: &task::StatusId) -> task::Result<Task> {
        let mut state = self.state();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or(task::Error::NotFound(id.clone()))?;

        task.set_status(status_id);
        Ok(task.clone())
    }

    fn count(&self) -> task::Result<i64> {
        Ok(self.state().tasks.len() as i64)
    }

    fn find_page(&self, offset: i64, limit: i64) -> task::Result<Vec<Task>> {
        Ok(page(&self.state().tasks, offset, limit))
    }
}

impl ChatRepository for Store {
    fn find_by_id(&self, id: &chat::Id) -> chat::Result<Chat> {
        self.state()
            .chats
            .iter()
            .find(|c| c.id() == id)
            .cloned()
            .ok_or(chat::Error::NotFound(id.clone()))
    }

    fn find_by_participant(&self, user_id: &user::Id) -> chat::Result<Vec<Chat>> {
        let state = self.state();

        Ok(state
            .chats
            .iter()
            .filter(|c| state.participants.contains(&(c.id().clone(), user_id.clone())))
            .cloned()
            .collect())
    }

    fn find_participants_of(&self, ids: &[chat::Id]) -> chat::Result<Vec<(chat::Id, user::Id)>> {
        let mut pairs = self
            .state()
            .participants
            .iter()
            .filter(|(chat_id, _)| ids.contains(chat_id))
            .cloned()
            .collect::<Vec<_>>();
        pairs.sort();
        Ok(pairs)
    }

    fn is_participant(&self, id: &chat::Id, user_id: &user::Id) -> chat::Result<bool> {
        Ok(self
            .state()
            .participants
            .contains(&(id.clone(), user_id.clone())))
    }

    fn insert(&self, c: &NewChat, participants: &[user::Id]) -> chat::Result<Chat> {
        let mut state = self.state();

        if c.pair_key().is_some() && state.chats.iter().any(|x| x.pair_key() == c.pair_key()) {
            return Err(chat::Error::AlreadyExists);
        }

        let chat = Chat::from(c);
        let origin = chat.origin();
        if let Some(project_id) = origin.project_id() {
            if !state.projects.iter().any(|p| p.id() == project_id) {
                return Err(chat::Error::UnknownOrigin);
            }
        }

        for user_id in participants {
            state.participants.push((chat.id().clone(), user_id.clone()));
        }
        state.chats.push(chat.clone());
        Ok(chat)
    }

    fn insert_participant(&self, id: &chat::Id, user_id: &user::Id) -> chat::Result<()> {
        let mut state = self.state();
        let pair = (id.clone(), user_id.clone());

        if state.participants.contains(&pair) {
            return Err(chat::Error::AlreadyParticipant(user_id.clone()));
        }

        state.participants.push(pair);
        Ok(())
    }

    fn find_private_between(&self, a: &user::Id, b: &user::Id) -> chat::Result<Option<Chat>> {
        let key = pair_key(a, b);

        Ok(self
            .state()
            .chats
            .iter()
            .find(|c| c.pair_key() == Some(key.as_str()))
            .cloned())
    }

    fn find_private_partners(&self, user_id: &user::Id) -> chat::Result<Vec<user::Id>> {
        let state = self.state();
        let private = state
            .chats
            .iter()
            .filter(|c| c.pair_key().is_some())
            .filter(|c| state.participants.contains(&(c.id().clone(), user_id.clone())))
            .map(|c| c.id().clone())
            .collect::<Vec<_>>();

        let mut partners = state
            .participants
            .iter()
            .filter(|(chat_id, u)| private.contains(chat_id) && u != user_id)
            .map(|(_, u)| u.clone())
            .collect::<Vec<_>>();
        partners.sort();
        partners.dedup();
        Ok(partners)
    }

    fn delete(&self, id: &chat::Id) -> chat::Result<bool> {
        let mut state = self.state();
        let before = state.chats.len();
        state.chats.retain(|c| c.id() != id);
        state.participants.retain(|(chat_id, _)| chat_id != id);
        state.messages.retain(|m| m.chat_id() != id);
        Ok(state.chats.len() < before)
    }

    fn count(&self) -> chat::Result<i64> {
        Ok(self.state().chats.len() as i64)
    }

    fn find_page(&self, offset: i64, limit: i64) -> chat::Result<Vec<Chat>> {
        Ok(page(&self.state().chats, offset, limit))
    }

    fn count_participants(&self, id: &chat::Id) -> chat::Result<i64> {
        let count = self
            .state()
            .participants
            .iter()
            .filter(|(chat_id, _)| chat_id == id)
            .count();
        Ok(count as i64)
    }

    fn find_participants_page(
        &self,
        id: &chat::Id,
        offset: i64,
        limit: i64,
    ) -> chat::Result<Vec<User>> {
        let state = self.state();
        let mut users = state
            .users
            .iter()
            .filter(|u| state.participants.contains(&(id.clone(), u.id().clone())))
            .cloned()
            .collect::<Vec<_>>();
        users.sort_by(|a, b| a.first_name().cmp(b.first_name()));
        Ok(page(&users, offset, limit))
    }
}

impl MessageRepository for Store {
    fn insert(&self, m: &NewMessage) -> message::Result<Message> {
        let mut state = self.state();
        state.seq += 1;

        let message = Message::stored(m, state.seq, Utc::now());
        state.messages.push(message.clone());
        Ok(message)
    }

    fn find_by_id(&self, id: &message::Id) -> message::Result<Message> {
        self.state()
            .messages
            .iter()
            .find(|m| m.id() == id)
            .cloned()
            .ok_or(message::Error::NotFound(id.clone()))
    }

    fn find_by_chat(&self, chat_id: &chat::Id) -> message::Result<Vec<Message>> {
        let mut messages = self
            .state()
            .messages
            .iter()
            .filter(|m| m.chat_id() == chat_id)
            .cloned()
            .collect::<Vec<_>>();
        messages.sort_by_key(|m| (*m.sent_at(), m.seq()));
        Ok(messages)
    }

    fn find_last_by_chats(&self, chat_ids: &[chat::Id]) -> message::Result<Vec<Message>> {
        let state = self.state();

        Ok(chat_ids
            .iter()
            .filter_map(|chat_id| {
                state
                    .messages
                    .iter()
                    .filter(|m| m.chat_id() == chat_id)
                    .max_by_key(|m| (*m.sent_at(), m.seq()))
                    .cloned()
            })
            .collect())
    }

    fn delete(&self, id: &message::Id) -> message::Result<bool> {
        let mut state = self.state();
        let before = state.messages.len();
        state.messages.retain(|m| m.id() != id);
        Ok(state.messages.len() < before)
    }
}
