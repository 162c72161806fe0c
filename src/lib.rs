pub mod pagination {
    use serde::{Deserialize, Serialize};

    pub const DEFAULT_PER_PAGE: i64 = 10;
    pub const MAX_PER_PAGE: i64 = 100;

    #[derive(thiserror::Error, Debug, PartialEq, Eq)]
    pub enum Error {
        #[error("page must not be negative, got {0}")]
        InvalidPage(i64),
        #[error("per_page must be between 1 and {MAX_PER_PAGE}, got {0}")]
        InvalidPerPage(i64),
    }

    /// Zero-indexed page request as received from query parameters.
    #[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
    pub struct Params {
        #[serde(default)]
        page: i64,
        #[serde(default = "default_per_page")]
        per_page: i64,
    }

    fn default_per_page() -> i64 {
        DEFAULT_PER_PAGE
    }

    impl Default for Params {
        fn default() -> Self {
            Self {
                page: 0,
                per_page: DEFAULT_PER_PAGE,
            }
        }
    }

    impl Params {
        pub fn new(page: i64, per_page: i64) -> Result<Self, Error> {
            Self { page, per_page }.validate()
        }

        pub fn validate(self) -> Result<Self, Error> {
            if self.page < 0 {
                return Err(Error::InvalidPage(self.page));
            }

            if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
                return Err(Error::InvalidPerPage(self.per_page));
            }

            Ok(self)
        }

        pub const fn page(&self) -> i64 {
            self.page
        }

        pub const fn per_page(&self) -> i64 {
            self.per_page
        }

        pub const fn offset(&self) -> i64 {
            self.page.saturating_mul(self.per_page)
        }

        pub const fn limit(&self) -> i64 {
            self.per_page
        }
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    pub struct Page<T> {
        page: i64,
        per_page: i64,
        total_items: i64,
        total_pages: i64,
        data: Vec<T>,
    }

    impl<T> Page<T> {
        pub fn new(params: &Params, total_items: i64, data: Vec<T>) -> Self {
            Self {
                page: params.page(),
                per_page: params.per_page(),
                total_items,
                total_pages: total_pages(total_items, params.per_page()),
                data,
            }
        }

        pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
            Page {
                page: self.page,
                per_page: self.per_page,
                total_items: self.total_items,
                total_pages: self.total_pages,
                data: self.data.into_iter().map(f).collect(),
            }
        }

        pub const fn total_items(&self) -> i64 {
            self.total_items
        }

        pub const fn total_pages(&self) -> i64 {
            self.total_pages
        }

        pub fn data(&self) -> &[T] {
            &self.data
        }
    }

    pub const fn total_pages(total_items: i64, per_page: i64) -> i64 {
        if total_items <= 0 || per_page <= 0 {
            return 0;
        }

        (total_items + per_page - 1) / per_page
    }

}

pub trait Raw {
    fn raw(&self) -> &str;
}

pub trait Redact: Raw {
    fn redact(&self) -> String {
        let raw = self.raw();
        let count = raw.chars().count();

        if count <= 8 {
            return "*".repeat(count);
        }

        let head = raw.chars().take(3).collect::<String>();
        let tail = raw.chars().skip(count - 3).collect::<String>();
        format!("{head}***{tail}")
    }
}

/// Declares a UUID backed identifier usable as a diesel `Uuid` column.
#[macro_export]
macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(
            Clone,
            Debug,
            serde::Deserialize,
            serde::Serialize,
            Hash,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            diesel::deserialize::FromSqlRow,
            diesel::expression::AsExpression,
        )]
        #[diesel(sql_type = diesel::sql_types::Uuid)]
        pub struct $name(uuid::Uuid);

        impl $name {
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            pub const fn get(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl diesel::serialize::ToSql<diesel::sql_types::Uuid, diesel::pg::Pg> for $name {
            fn to_sql<'b>(
                &'b self,
                out: &mut diesel::serialize::Output<'b, '_, diesel::pg::Pg>,
            ) -> diesel::serialize::Result {
                <uuid::Uuid as diesel::serialize::ToSql<diesel::sql_types::Uuid, diesel::pg::Pg>>::to_sql(
                    &self.0, out,
                )
            }
        }

        impl diesel::deserialize::FromSql<diesel::sql_types::Uuid, diesel::pg::Pg> for $name {
            fn from_sql(bytes: diesel::pg::PgValue<'_>) -> diesel::deserialize::Result<Self> {
                <uuid::Uuid as diesel::deserialize::FromSql<
                    diesel::sql_types::Uuid,
                    diesel::pg::Pg,
                >>::from_sql(bytes)
                .map(Self)
            }
        }
    };
}
