//! Sentences: source text to be translated, owned by one section.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::client::Resource;
use crate::error::ApiError;
use crate::http::Query;
use crate::pagination::{ModelList, Page, PageRequest};
use crate::project::Project;
use crate::section::Section;
use crate::session::Session;
use crate::types::{Related, SentenceRecord, SentenceUpdate};

/// Field carrying the parent section id in `POST /sentences/`.
pub const SECTION_FIELD: &str = "section_id";

#[derive(Debug, Clone)]
pub struct Sentence {
    pub id: i64,
    pub section: Section,
    pub sentence: String,
    pub created_at: DateTime<Utc>,
    session: Session,
}

/// Filter for `GET /sentences/for-user`.
#[derive(Debug, Clone, Copy)]
pub enum SentenceScope<'a> {
    Project(&'a Project),
    Section(&'a Section),
}

impl Sentence {
    pub(crate) fn from_record(session: &Session, section: Section, record: SentenceRecord) -> Self {
        Self {
            id: record.id,
            section,
            sentence: record.sentence,
            created_at: record.created_at,
            session: session.clone(),
        }
    }

    pub(crate) async fn hydrate(session: &Session, related: Option<Related<SentenceRecord>>) -> Result<Self, ApiError> {
        match related {
            Some(Related::Object(record)) => {
                let section = Section::hydrate(session, record.section.clone()).await?;
                Ok(Self::from_record(session, section, record))
            }
            Some(Related::Id(id)) => Self::get(session, id).await,
            None => Err(ApiError::Deserialization("response carries no sentence".to_string())),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// `GET /sentences/?section={id}`.
    pub async fn list(session: &Session, section: &Section, page: PageRequest) -> Result<ModelList<Self>, ApiError> {
        let query = Query::new()
            .param("section", section.id)
            .param("page", page.page)
            .param("page_size", page.page_size);
        let envelope: Page<SentenceRecord> = session.get(Resource::Sentences, "", query).await?;
        ModelList::from_page(envelope, |record| Self::from_record(session, section.clone(), record))
    }

    /// `GET /sentences/for-user`: sentences the current account is expected
    /// to work on, scoped to a project or a section.
    ///
    /// With a project scope each result's section is resolved, fetching
    /// every distinct section id at most once.
    pub async fn list_for_user(
        session: &Session,
        scope: SentenceScope<'_>,
        page: PageRequest,
    ) -> Result<ModelList<Self>, ApiError> {
        let query = match scope {
            SentenceScope::Project(project) => Query::new().param("project", project.id),
            SentenceScope::Section(section) => Query::new().param("section", section.id),
        }
        .param("page", page.page)
        .param("page_size", page.page_size);
        let envelope: Page<SentenceRecord> = session.get(Resource::Sentences, "for-user", query).await?;

        let project = match scope {
            SentenceScope::Section(section) => {
                return ModelList::from_page(envelope, |record| Self::from_record(session, section.clone(), record));
            }
            SentenceScope::Project(project) => project,
        };

        let mut sections: HashMap<i64, Section> = HashMap::new();
        for record in &envelope.results {
            let Some(related) = &record.section else {
                return Err(ApiError::Deserialization("sentence carries no section".to_string()));
            };
            let id = related.id();
            if sections.contains_key(&id) {
                continue;
            }
            let section = match related {
                Related::Object(section) => Section::from_record(session, project.clone(), section.clone()),
                Related::Id(id) => Section::get_in(session, *id, project.clone()).await?,
            };
            sections.insert(id, section);
        }
        ModelList::try_from_page(envelope, |record| {
            let section = record
                .section
                .as_ref()
                .and_then(|related| sections.get(&related.id()))
                .cloned()
                .ok_or_else(|| ApiError::Deserialization("sentence carries no section".to_string()))?;
            Ok(Self::from_record(session, section, record))
        })
    }

    /// `POST /sentences/`.
    pub async fn create(session: &Session, section: &Section, sentence: &str) -> Result<Self, ApiError> {
        let record: SentenceRecord = session
            .post(
                Resource::Sentences,
                "",
                json!({ "sentence": sentence, SECTION_FIELD: section.id }),
            )
            .await?;
        Ok(Self::from_record(session, section.clone(), record))
    }

    /// `GET /sentences/{id}` without credentials, then its section and
    /// project.
    pub async fn get(session: &Session, id: i64) -> Result<Self, ApiError> {
        let record: SentenceRecord = session
            .get_anonymous(Resource::Sentences, &id.to_string())
            .await?;
        let section = Section::hydrate(session, record.section.clone()).await?;
        Ok(Self::from_record(session, section, record))
    }

    /// `PUT /sentences/update`.
    pub async fn update(&mut self, changes: SentenceUpdate) -> Result<(), ApiError> {
        let Some(new_sentence) = changes.sentence else {
            return Ok(());
        };
        let record: SentenceRecord = self
            .session
            .put(
                Resource::Sentences,
                "update",
                json!({ "id": self.id, "new_sentence": new_sentence }),
            )
            .await?;
        self.sentence = record.sentence;
        Ok(())
    }
}

impl Section {
    pub async fn create_sentence(&self, sentence: &str) -> Result<Sentence, ApiError> {
        Sentence::create(self.session(), self, sentence).await
    }

    pub async fn list_sentences(&self, page: PageRequest) -> Result<ModelList<Sentence>, ApiError> {
        Sentence::list(self.session(), self, page).await
    }
}
