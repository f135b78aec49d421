//! Translations submitted for a sentence, and their voters.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::client::Resource;
use crate::error::ApiError;
use crate::http::Query;
use crate::pagination::{ModelList, Page, PageRequest};
use crate::sentence::Sentence;
use crate::session::Session;
use crate::types::{Owner, TranslationRecord, VotersResponse};

/// Field carrying the parent sentence id in `POST /translations/`.
pub const SENTENCE_FIELD: &str = "sentence_id";

#[derive(Debug, Clone)]
pub struct Translation {
    pub id: i64,
    pub translator: Option<Owner>,
    pub sentence: Sentence,
    pub translation: String,
    /// `None` until fetched; list responses never include voters.
    pub voters: Option<Vec<Owner>>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    session: Session,
}

impl Translation {
    fn from_record(session: &Session, sentence: Sentence, record: TranslationRecord) -> Self {
        Self {
            id: record.id,
            translator: record.translator,
            sentence,
            translation: record.translation,
            voters: record.voters,
            is_approved: record.is_approved,
            created_at: record.created_at,
            session: session.clone(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// `GET /translations/?sentence={id}`. Voters are left unfetched.
    pub async fn list(session: &Session, sentence: &Sentence, page: PageRequest) -> Result<ModelList<Self>, ApiError> {
        let query = Query::new()
            .param("sentence", sentence.id)
            .param("page", page.page)
            .param("page_size", page.page_size);
        let envelope: Page<TranslationRecord> = session.get(Resource::Translations, "", query).await?;
        ModelList::from_page(envelope, |record| {
            let mut translation = Self::from_record(session, sentence.clone(), record);
            translation.voters = None;
            translation
        })
    }

    /// `POST /translations/`.
    pub async fn create(session: &Session, sentence: &Sentence, translation: &str) -> Result<Self, ApiError> {
        let mut record: TranslationRecord = session
            .post(
                Resource::Translations,
                "",
                json!({ "translation": translation, SENTENCE_FIELD: sentence.id }),
            )
            .await?;
        record.voters.get_or_insert_with(Vec::new);
        Ok(Self::from_record(session, sentence.clone(), record))
    }

    /// `GET /translations/{id}` without credentials, then the sentence chain
    /// up to its project.
    pub async fn get(session: &Session, id: i64) -> Result<Self, ApiError> {
        let mut record: TranslationRecord = session
            .get_anonymous(Resource::Translations, &id.to_string())
            .await?;
        let sentence = Sentence::hydrate(session, record.sentence.take()).await?;
        record.voters.get_or_insert_with(Vec::new);
        Ok(Self::from_record(session, sentence, record))
    }

    /// `GET /translations/{id}/voters`; replaces `voters` on success only.
    pub async fn fetch_voters(&mut self) -> Result<&[Owner], ApiError> {
        let response: VotersResponse = self
            .session
            .get(Resource::Translations, &format!("{}/voters", self.id), Query::new())
            .await?;
        let voters = self.voters.insert(response.into_voters());
        Ok(voters.as_slice())
    }
}

impl Sentence {
    pub async fn create_translation(&self, translation: &str) -> Result<Translation, ApiError> {
        Translation::create(self.session(), self, translation).await
    }

    pub async fn list_translations(&self, page: PageRequest) -> Result<ModelList<Translation>, ApiError> {
        Translation::list(self.session(), self, page).await
    }
}
