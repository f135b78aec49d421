//! Sections: named subdivisions of exactly one project.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::client::Resource;
use crate::error::ApiError;
use crate::http::Query;
use crate::pagination::{ModelList, Page, PageRequest};
use crate::project::Project;
use crate::session::Session;
use crate::types::{Related, SectionRecord, SectionUpdate};

/// Field carrying the parent project id in `POST /sections/`.
pub const PROJECT_FIELD: &str = "project";

#[derive(Debug, Clone)]
pub struct Section {
    pub id: i64,
    pub project: Project,
    pub name: String,
    pub created_at: DateTime<Utc>,
    session: Session,
}

impl Section {
    pub(crate) fn from_record(session: &Session, project: Project, record: SectionRecord) -> Self {
        Self {
            id: record.id,
            project,
            name: record.name,
            created_at: record.created_at,
            session: session.clone(),
        }
    }

    pub(crate) async fn hydrate(session: &Session, related: Option<Related<SectionRecord>>) -> Result<Self, ApiError> {
        match related {
            Some(Related::Object(record)) => {
                let project = Project::hydrate(session, record.project.clone()).await?;
                Ok(Self::from_record(session, project, record))
            }
            Some(Related::Id(id)) => Self::get(session, id).await,
            None => Err(ApiError::Deserialization("response carries no section".to_string())),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// `GET /sections/?project={id}`.
    pub async fn list(session: &Session, project: &Project, page: PageRequest) -> Result<ModelList<Self>, ApiError> {
        let query = Query::new()
            .param("project", project.id)
            .param("page", page.page)
            .param("page_size", page.page_size);
        let envelope: Page<SectionRecord> = session.get(Resource::Sections, "", query).await?;
        ModelList::from_page(envelope, |record| Self::from_record(session, project.clone(), record))
    }

    /// `POST /sections/`. A duplicate name within the project yields
    /// `AlreadyExists`; an unknown project yields `NotFound`.
    pub async fn create(session: &Session, project: &Project, name: &str) -> Result<Self, ApiError> {
        let record: SectionRecord = session
            .post(Resource::Sections, "", json!({ "name": name, PROJECT_FIELD: project.id }))
            .await?;
        Ok(Self::from_record(session, project.clone(), record))
    }

    /// `GET /sections/{id}`, then the owning project.
    pub async fn get(session: &Session, id: i64) -> Result<Self, ApiError> {
        let record: SectionRecord = session
            .get(Resource::Sections, &id.to_string(), Query::new())
            .await?;
        let project = Project::hydrate(session, record.project.clone()).await?;
        Ok(Self::from_record(session, project, record))
    }

    /// `GET /sections/{id}` when the project is already known locally.
    pub(crate) async fn get_in(session: &Session, id: i64, project: Project) -> Result<Self, ApiError> {
        let record: SectionRecord = session
            .get(Resource::Sections, &id.to_string(), Query::new())
            .await?;
        Ok(Self::from_record(session, project, record))
    }

    /// `PUT /sections/update`.
    pub async fn update(&mut self, changes: SectionUpdate) -> Result<(), ApiError> {
        let Some(new_name) = changes.name else {
            return Ok(());
        };
        let record: SectionRecord = self
            .session
            .put(
                Resource::Sections,
                "update",
                json!({ "id": self.id, "new_name": new_name }),
            )
            .await?;
        self.name = record.name;
        Ok(())
    }
}

impl Project {
    pub async fn create_section(&self, name: &str) -> Result<Section, ApiError> {
        Section::create(self.session(), self, name).await
    }

    pub async fn list_sections(&self, page: PageRequest) -> Result<ModelList<Section>, ApiError> {
        Section::list(self.session(), self, page).await
    }
}
