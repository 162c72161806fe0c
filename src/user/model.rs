use chrono::{DateTime, Utc};
use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::Serialize;

use crate::role;

use super::Id;

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    id: Id,
    first_name: String,
    last_name: Option<String>,
    email: String,
    password: String,
    avatar: Option<String>,
    role_id: role::Id,
    created_at: DateTime<Utc>,
}

impl User {
    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    pub const fn role_id(&self) -> &role::Id {
        &self.role_id
    }

    pub const fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    /// Full display name, "first last" or just "first" when no last name is known.
    pub fn name(&self) -> String {
        full_name(&self.first_name, self.last_name.as_deref())
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.first_name.to_lowercase().contains(&query)
            || self
                .last_name
                .as_deref()
                .is_some_and(|l| l.to_lowercase().contains(&query))
    }
}

pub fn full_name(first_name: &str, last_name: Option<&str>) -> String {
    match last_name {
        Some(l) if !l.is_empty() => format!("{first_name} {l}"),
        _ => first_name.to_string(),
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    id: &'a Id,
    first_name: &'a str,
    last_name: Option<&'a str>,
    email: &'a str,
    password: &'a str,
    avatar: Option<&'a str>,
    role_id: &'a role::Id,
}

impl<'a> NewUser<'a> {
    pub fn new(
        id: &'a Id,
        first_name: &'a str,
        last_name: Option<&'a str>,
        email: &'a str,
        password: &'a str,
        avatar: Option<&'a str>,
        role_id: &'a role::Id,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            email,
            password,
            avatar,
            role_id,
        }
    }
}

#[cfg(test)]
impl From<&NewUser<'_>> for User {
    fn from(u: &NewUser<'_>) -> Self {
        Self {
            id: u.id.clone(),
            first_name: u.first_name.to_string(),
            last_name: u.last_name.map(String::from),
            email: u.email.to_string(),
            password: u.password.to_string(),
            avatar: u.avatar.map(String::from),
            role_id: u.role_id.clone(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct UserDto {
    id: Id,
    email: String,
    first_name: String,
    last_name: Option<String>,
    avatar: Option<String>,
    role_id: role::Id,
    created_at: DateTime<Utc>,
}

impl UserDto {
    pub fn new(u: &User, avatar: Option<String>) -> Self {
        Self {
            id: u.id.clone(),
            email: u.email.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            avatar,
            role_id: u.role_id.clone(),
            created_at: u.created_at,
        }
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }
}
