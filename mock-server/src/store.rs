//! In-memory state behind the mock platform API.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone, Debug)]
pub struct AccountRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub send_time: NaiveTime,
    pub number_of_words: u32,
}

#[derive(Clone, Debug)]
pub struct ProjectRow {
    pub id: i64,
    pub owner: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct SectionRow {
    pub id: i64,
    pub project: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct SentenceRow {
    pub id: i64,
    pub section: i64,
    pub sentence: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct TranslationRow {
    pub id: i64,
    pub translator: i64,
    pub sentence: i64,
    pub translation: String,
    pub voters: Vec<i64>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Tokens {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Owner {
    pub id: i64,
    pub first_name: String,
}

/// Rows are kept in insertion order so list pages are stable.
#[derive(Default, Debug)]
pub struct Store {
    next_id: i64,
    pub accounts: Vec<AccountRow>,
    pub projects: Vec<ProjectRow>,
    pub sections: Vec<SectionRow>,
    pub sentences: Vec<SentenceRow>,
    pub translations: Vec<TranslationRow>,
    access: HashMap<String, i64>,
    refresh: HashMap<String, i64>,
}

impl Store {
    pub fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Mint a fresh token pair for `account`.
    pub fn issue(&mut self, account: i64) -> Tokens {
        let tokens = Tokens {
            access: Uuid::new_v4().simple().to_string(),
            refresh: Uuid::new_v4().simple().to_string(),
        };
        self.access.insert(tokens.access.clone(), account);
        self.refresh.insert(tokens.refresh.clone(), account);
        tokens
    }

    /// Revoke `access` and issue a new pair for its account.
    pub fn rotate_access(&mut self, access: &str) -> Option<Tokens> {
        let account = self.access.remove(access)?;
        Some(self.issue(account))
    }

    /// Spend a refresh token; every access token it was issued alongside
    /// stays valid until rotated itself.
    pub fn rotate_refresh(&mut self, refresh: &str) -> Option<Tokens> {
        let account = self.refresh.remove(refresh)?;
        Some(self.issue(account))
    }

    pub fn account_for_token(&self, access: &str) -> Option<i64> {
        self.access.get(access).copied()
    }

    /// Expire an access token, as the clock would.
    pub fn expire(&mut self, access: &str) {
        self.access.remove(access);
    }

    pub fn account(&self, id: i64) -> Option<&AccountRow> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn owner(&self, id: i64) -> Option<Owner> {
        self.account(id).map(|a| Owner {
            id: a.id,
            first_name: a.first_name.clone(),
        })
    }

    pub fn project(&self, id: i64) -> Option<&ProjectRow> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn section(&self, id: i64) -> Option<&SectionRow> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn sentence(&self, id: i64) -> Option<&SentenceRow> {
        self.sentences.iter().find(|s| s.id == id)
    }

    pub fn translation(&self, id: i64) -> Option<&TranslationRow> {
        self.translations.iter().find(|t| t.id == id)
    }

    /// Record a vote; voting twice is a no-op.
    pub fn vote(&mut self, translation: i64, voter: i64) -> bool {
        match self.translations.iter_mut().find(|t| t.id == translation) {
            Some(row) => {
                if !row.voters.contains(&voter) {
                    row.voters.push(voter);
                }
                true
            }
            None => false,
        }
    }
}

pub fn new_db() -> Db {
    Arc::new(RwLock::new(Store::default()))
}
