use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::Serialize;

use super::{Id, Kind};

#[derive(Queryable, Selectable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Role {
    id: Id,
    title: String,
}

impl Role {
    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> Kind {
        Kind::from(self.title.as_str())
    }
}

#[cfg(test)]
impl From<&NewRole<'_>> for Role {
    fn from(r: &NewRole<'_>) -> Self {
        Self {
            id: r.id.clone(),
            title: r.title.to_string(),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::roles)]
pub struct NewRole<'a> {
    id: &'a Id,
    title: &'a str,
}

impl<'a> NewRole<'a> {
    pub fn new(id: &'a Id, title: &'a str) -> Self {
        Self { id, title }
    }
}
