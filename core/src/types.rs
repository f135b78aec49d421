//! Wire DTOs for the platform API.
//!
//! # Design
//! These are the request and response bodies exactly as they travel. The
//! repository types (`Account`, `Project`, ...) are built from them and add
//! the session plus hydrated parents. The mock-server crate defines its own
//! copies; the integration tests catch schema drift between the two.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// An access/refresh token pair. Always replaced as a unit.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Minimal account summary embedded as author/voter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: i64,
    pub first_name: String,
}

/// A parent reference that the server sends either as a bare id or as the
/// embedded object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Related<T> {
    Id(i64),
    Object(T),
}

impl<T: HasId> Related<T> {
    pub fn id(&self) -> i64 {
        match self {
            Related::Id(id) => *id,
            Related::Object(obj) => obj.id(),
        }
    }
}

pub trait HasId {
    fn id(&self) -> i64;
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub send_time: NaiveTime,
    pub number_of_words: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenPair>,
}

/// Request payload for `POST /accounts/`.
#[derive(Debug, Clone, Serialize)]
pub struct Signup {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub send_time: NaiveTime,
    pub number_of_words: u32,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Partial profile update. Unset fields are not sent and not altered.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_words: Option<u32>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.send_time.is_none()
            && self.number_of_words.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PasswordChange<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: i64,
    pub owner: Owner,
    pub name: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub id: i64,
    #[serde(default)]
    pub project: Option<Related<ProjectRecord>>,
    pub name: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub id: i64,
    #[serde(default)]
    pub section: Option<Related<SectionRecord>>,
    pub sentence: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub id: i64,
    #[serde(default)]
    pub translator: Option<Owner>,
    #[serde(default)]
    pub sentence: Option<Related<SentenceRecord>>,
    pub translation: String,
    #[serde(default)]
    pub voters: Option<Vec<Owner>>,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl HasId for ProjectRecord {
    fn id(&self) -> i64 {
        self.id
    }
}

impl HasId for SectionRecord {
    fn id(&self) -> i64 {
        self.id
    }
}

impl HasId for SentenceRecord {
    fn id(&self) -> i64 {
        self.id
    }
}

/// `GET /translations/{id}/voters` answers with either a bare list or an
/// object wrapping it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum VotersResponse {
    Bare(Vec<Owner>),
    Wrapped { voters: Vec<Owner> },
}

impl VotersResponse {
    pub fn into_voters(self) -> Vec<Owner> {
        match self {
            VotersResponse::Bare(v) | VotersResponse::Wrapped { voters: v } => v,
        }
    }
}

/// Partial project update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectUpdate {
    pub name: Option<String>,
}

/// Partial section update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionUpdate {
    pub name: Option<String>,
}

/// Partial sentence update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceUpdate {
    pub sentence: Option<String>,
}

/// Timestamps arrive as RFC 3339 or as naive ISO-8601 (taken as UTC).
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("invalid timestamp {raw:?}: {e}"))
    }
}
