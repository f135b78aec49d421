//! Accounts: authentication entry points and profile management.

use chrono::NaiveTime;

use crate::client::{to_body, Client, Resource};
use crate::error::ApiError;
use crate::pagination::{ModelList, PageRequest};
use crate::project::Project;
use crate::session::Session;
use crate::types::{AccountRecord, AccountUpdate, PasswordChange, Signup, TokenPair};

/// The logged-in account, owning the `Session` it authenticated with.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub send_time: NaiveTime,
    pub number_of_words: u32,
    session: Session,
}

impl Account {
    fn from_record(session: Session, record: AccountRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            username: record.username,
            send_time: record.send_time,
            number_of_words: record.number_of_words,
            session,
        }
    }

    fn apply(&mut self, record: AccountRecord) {
        self.id = record.id;
        self.first_name = record.first_name;
        self.last_name = record.last_name;
        self.email = record.email;
        self.username = record.username;
        self.send_time = record.send_time;
        self.number_of_words = record.number_of_words;
    }

    pub async fn login(client: &Client, username: &str, password: &str) -> Result<Self, ApiError> {
        let (session, record) = Session::login(client, username, password).await?;
        Ok(Self::from_record(session, record))
    }

    pub async fn signup(client: &Client, profile: &Signup) -> Result<Self, ApiError> {
        let (session, record) = Session::signup(client, profile).await?;
        Ok(Self::from_record(session, record))
    }

    pub async fn restore(client: &Client, access_token: &str) -> Result<Self, ApiError> {
        let (session, record) = Session::restore(client, access_token).await?;
        Ok(Self::from_record(session, record))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Apply a partial profile update.
    ///
    /// The server answers with the full profile and a fresh token pair; all
    /// local fields and both tokens are replaced from it. An update with no
    /// fields set makes no call.
    pub async fn update(&mut self, changes: AccountUpdate) -> Result<(), ApiError> {
        if changes.is_empty() {
            return Ok(());
        }
        let body = to_body(&changes)?;
        let session = self.session.clone();
        let record = self
            .session
            .rotate(|_| async move {
                let mut record: AccountRecord = session.put(Resource::Accounts, "update", body).await?;
                let tokens = record.tokens.take().ok_or_else(|| {
                    ApiError::Deserialization("account update carries no tokens".to_string())
                })?;
                Ok((record, tokens))
            })
            .await?;
        self.apply(record);
        Ok(())
    }

    /// Rotate this account's session tokens.
    pub async fn refresh_token(&self) -> Result<(), ApiError> {
        self.session.refresh().await
    }

    /// `POST /accounts/change-password`; rotates the session tokens.
    ///
    /// A wrong `current_password` yields `IncorrectPassword`; an expired
    /// access token yields `TokenExpired`.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<(), ApiError> {
        let body = to_body(&PasswordChange {
            current_password,
            new_password,
        })?;
        let session = self.session.clone();
        self.session
            .rotate(|_| async move {
                let tokens: TokenPair = session.post(Resource::Accounts, "change-password", body).await?;
                Ok(((), tokens))
            })
            .await
    }

    pub async fn create_project(&self, name: &str) -> Result<Project, ApiError> {
        Project::create(&self.session, name).await
    }

    /// Projects owned by this account.
    pub async fn list_projects(&self, page: PageRequest) -> Result<ModelList<Project>, ApiError> {
        Project::list(&self.session, Some(&self.username), page).await
    }
}
