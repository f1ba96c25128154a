use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

// --- Core Application Schemas (Mapped to Database) ---

/// Anime
///
/// The single persisted resource, one row of the `anime` table. The `id` is assigned
/// by the store on insert and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Anime {
    pub id: i64,
    #[schema(example = "Samurai")]
    pub name: String,
}

/// CustomUser
///
/// Credential record from the `custom_user` table, consumed only by authentication.
/// `password` holds an Argon2 PHC string and is never serialized.
#[derive(Debug, Clone, FromRow, Default)]
pub struct CustomUser {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub name: String,
    // Comma-separated, e.g. "ROLE_USER,ROLE_ADMIN".
    pub authorities: String,
}

/// NewCustomUser
///
/// Insert shape for `custom_user`; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewCustomUser {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub authorities: String,
}

// --- Request Payloads (Input Schemas) ---

/// AnimePostRequestBody
///
/// Input payload for POST /anime. A missing `name` deserializes to an empty string so
/// that it is reported through the same validation payload as `""`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct AnimePostRequestBody {
    #[serde(default)]
    #[validate(length(min = 1, message = "The anime name cannot be empty"))]
    #[schema(example = "Anime A1")]
    pub name: String,
}

/// AnimePutRequestBody
///
/// Input payload for PUT /anime. The `id` is only used to locate the existing row;
/// the persisted id always wins.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct AnimePutRequestBody {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    #[validate(length(min = 1, message = "The anime name cannot be empty"))]
    pub name: String,
}

// --- Paging ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortProperty {
    Id,
    Name,
}

impl SortProperty {
    /// Column name; only ever one of the two whitelisted identifiers.
    pub fn column(self) -> &'static str {
        match self {
            SortProperty::Id => "id",
            SortProperty::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Sort
///
/// Parsed form of the `sort` query parameter: `property[,direction]`,
/// e.g. `name,desc`. Direction is case-insensitive and defaults to ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub property: SortProperty,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortParseError(pub String);

impl fmt::Display for SortParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Sort {
    type Err = SortParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split(',').map(str::trim);
        let property = match parts.next().unwrap_or_default() {
            "id" => SortProperty::Id,
            "name" => SortProperty::Name,
            other => {
                return Err(SortParseError(format!(
                    "No property '{other}' found for type 'Anime'"
                )));
            }
        };
        let direction = match parts.next() {
            None | Some("") => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("asc") => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("desc") => Direction::Desc,
            Some(d) => {
                return Err(SortParseError(format!("Invalid sort direction '{d}'")));
            }
        };
        if parts.next().is_some() {
            return Err(SortParseError(format!("Invalid sort expression '{raw}'")));
        }
        Ok(Sort {
            property,
            direction,
        })
    }
}

/// PageRequest
///
/// A resolved, already-clamped request for one page of anime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    // Zero-based page index.
    pub page: i64,
    pub size: i64,
    pub sort: Option<Sort>,
}

impl PageRequest {
    pub fn of(page: i64, size: i64) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }
}

/// Page
///
/// One slice of an ordered result set plus the metadata clients need to walk it.
/// Serialized in camelCase to stay compatible with existing consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub number_of_elements: i64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        // Rounds up without `total + size - 1`, which can overflow.
        let total_pages = if request.size > 0 {
            total_elements / request.size + i64::from(total_elements % request.size != 0)
        } else {
            0
        };
        let number_of_elements = content.len() as i64;
        Self {
            number: request.page,
            size: request.size,
            total_elements,
            total_pages,
            number_of_elements,
            first: request.page == 0,
            last: request.page.saturating_add(1) >= total_pages,
            empty: content.is_empty(),
            content,
        }
    }
}
