//! Projects: the root of the Project → Section → Sentence → Translation chain.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::client::Resource;
use crate::error::ApiError;
use crate::http::Query;
use crate::pagination::{ModelList, Page, PageRequest};
use crate::session::Session;
use crate::types::{Owner, ProjectRecord, ProjectUpdate, Related};

#[derive(Debug, Clone)]
pub struct Project {
    pub id: i64,
    pub owner: Owner,
    pub name: String,
    pub created_at: DateTime<Utc>,
    session: Session,
}

impl Project {
    pub(crate) fn from_record(session: &Session, record: ProjectRecord) -> Self {
        Self {
            id: record.id,
            owner: record.owner,
            name: record.name,
            created_at: record.created_at,
            session: session.clone(),
        }
    }

    /// Resolve a wire parent reference, fetching the project when only its
    /// id was sent.
    pub(crate) async fn hydrate(session: &Session, related: Option<Related<ProjectRecord>>) -> Result<Self, ApiError> {
        match related {
            Some(Related::Object(record)) => Ok(Self::from_record(session, record)),
            Some(Related::Id(id)) => Self::get(session, id).await,
            None => Err(ApiError::Deserialization("response carries no project".to_string())),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// `GET /projects/`, optionally restricted to one owner's username.
    pub async fn list(session: &Session, username: Option<&str>, page: PageRequest) -> Result<ModelList<Self>, ApiError> {
        let query = Query::new()
            .opt_param("username", username)
            .param("page", page.page)
            .param("page_size", page.page_size);
        let envelope: Page<ProjectRecord> = session.get(Resource::Projects, "", query).await?;
        ModelList::from_page(envelope, |record| Self::from_record(session, record))
    }

    /// `POST /projects/`. A taken name yields `AlreadyExists`.
    pub async fn create(session: &Session, name: &str) -> Result<Self, ApiError> {
        let record: ProjectRecord = session
            .post(Resource::Projects, "", json!({ "name": name }))
            .await?;
        Ok(Self::from_record(session, record))
    }

    /// `GET /projects/{id}`, sent without credentials.
    pub async fn get(session: &Session, id: i64) -> Result<Self, ApiError> {
        let record: ProjectRecord = session
            .get_anonymous(Resource::Projects, &id.to_string())
            .await?;
        Ok(Self::from_record(session, record))
    }

    /// `PUT /projects/update`. Only the owner may rename (`NotAllowed`
    /// otherwise). No call is made when nothing is set.
    pub async fn update(&mut self, changes: ProjectUpdate) -> Result<(), ApiError> {
        let Some(new_name) = changes.name else {
            return Ok(());
        };
        let record: ProjectRecord = self
            .session
            .put(
                Resource::Projects,
                "update",
                json!({ "id": self.id, "new_name": new_name }),
            )
            .await?;
        self.name = record.name;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::HttpMethod;
    use crate::testing::{project_json, session, ScriptedTransport};

    #[tokio::test]
    async fn list_reads_page_cursors() {
        let (session, transport) = session(ScriptedTransport::new().on(
            HttpMethod::Get,
            "/api/v1/projects/",
            200,
            json!({
                "count": 51,
                "next": "http://platform.test/api/v1/projects/?page=3&page_size=25",
                "previous": "http://platform.test/api/v1/projects/?page=1&page_size=25",
                "results": [project_json(26, "Quran"), project_json(27, "Poems")]
            }),
        ));
        let list = Project::list(&session, None, PageRequest::new(2, 25)).await.unwrap();
        assert_eq!(list.count, 51);
        assert_eq!(list.next_page, Some(3));
        assert_eq!(list.previous_page, Some(1));
        assert_eq!(list.results[1].name, "Poems");
        assert!(list.results[0].session().same_as(&session));

        let req = transport.last();
        assert_eq!(req.bearer.as_deref(), Some("a1"));
        assert!(!req.query.iter().any(|(k, _)| k == "username"));
    }

    #[tokio::test]
    async fn create_conflict() {
        let (session, _) = session(ScriptedTransport::new().on(
            HttpMethod::Post,
            "/api/v1/projects/",
            409,
            json!({"detail": "exists"}),
        ));
        assert!(matches!(
            Project::create(&session, "Quran").await,
            Err(ApiError::AlreadyExists)
        ));
    }

    #[tokio::test]
    async fn get_is_unauthenticated() {
        let (session, transport) = session(ScriptedTransport::new().on(
            HttpMethod::Get,
            "/api/v1/projects/42",
            200,
            project_json(42, "Book"),
        ));
        let project = Project::get(&session, 42).await.unwrap();
        assert_eq!(project.id, 42);
        assert_eq!(project.owner.first_name, "Alice");
        assert!(transport.last().bearer.is_none());
    }

    #[tokio::test]
    async fn update_renames_from_response() {
        let (session, transport) = session(
            ScriptedTransport::new()
                .on(HttpMethod::Get, "/api/v1/projects/42", 200, project_json(42, "Book"))
                .on(HttpMethod::Put, "/api/v1/projects/update", 200, project_json(42, "Renamed"))
                .on(HttpMethod::Put, "/api/v1/projects/update", 403, json!({"detail": "Forbidden"})),
        );
        let mut project = Project::get(&session, 42).await.unwrap();

        project
            .update(ProjectUpdate {
                name: Some("Renamed".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(project.name, "Renamed");
        assert_eq!(transport.last().body, Some(json!({"id": 42, "new_name": "Renamed"})));

        let err = project
            .update(ProjectUpdate {
                name: Some("Stolen".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotAllowed));
        assert_eq!(project.name, "Renamed");

        let calls = transport.requests().len();
        project.update(ProjectUpdate::default()).await.unwrap();
        assert_eq!(transport.requests().len(), calls);
    }
}
