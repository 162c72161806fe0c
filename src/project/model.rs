use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::Serialize;

use crate::user;

use super::Id;

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::schema::projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Project {
    id: Id,
    title: String,
    icon: Option<String>,
}

impl Project {
    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }
}

#[cfg(test)]
impl From<&NewProject<'_>> for Project {
    fn from(p: &NewProject<'_>) -> Self {
        Self {
            id: p.id.clone(),
            title: p.title.to_string(),
            icon: p.icon.map(String::from),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::projects)]
pub struct NewProject<'a> {
    id: &'a Id,
    title: &'a str,
    icon: Option<&'a str>,
}

impl<'a> NewProject<'a> {
    pub fn new(id: &'a Id, title: &'a str, icon: Option<&'a str>) -> Self {
        Self { id, title, icon }
    }

    pub fn title(&self) -> &str {
        self.title
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::projects_users)]
pub struct NewMember<'a> {
    project_id: &'a Id,
    user_id: &'a user::Id,
}

impl<'a> NewMember<'a> {
    pub fn new(project_id: &'a Id, user_id: &'a user::Id) -> Self {
        Self {
            project_id,
            user_id,
        }
    }
}

/// Project as shown to clients, icon rendered as an absolute url.
#[derive(Serialize, Clone, Debug)]
pub struct ProjectDto {
    id: Id,
    title: String,
    icon: Option<String>,
}

impl ProjectDto {
    pub fn new(p: &Project, icon: Option<String>) -> Self {
        Self {
            id: p.id.clone(),
            title: p.title.clone(),
            icon,
        }
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }
}
