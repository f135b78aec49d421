//! In-memory stand-in for the Torjoman platform REST API.
//!
//! Implements the `/api/v1/` routes the client uses, with the same status
//! codes, error bodies and pagination envelopes as the real server. State
//! lives in a `Db` that tests can hold on to for seeding (e.g. votes) and
//! for expiring tokens.

pub mod store;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{debug, info};

pub use store::{new_db, Db, Store, Tokens};
use store::{AccountRow, Owner, ProjectRow, SectionRow, SentenceRow, TranslationRow};

const MAX_PAGE_SIZE: u32 = 100;

pub fn app() -> Router {
    app_with(new_db())
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/api/v1/accounts/", post(signup).get(current_account))
        .route("/api/v1/accounts/login", post(login))
        .route("/api/v1/accounts/update", put(update_account))
        .route("/api/v1/accounts/refresh/{token}", get(refresh))
        .route("/api/v1/accounts/change-password", post(change_password))
        .route("/api/v1/projects/", get(list_projects).post(create_project))
        .route("/api/v1/projects/update", put(update_project))
        .route("/api/v1/projects/{id}", get(get_project))
        .route("/api/v1/sections/", get(list_sections).post(create_section))
        .route("/api/v1/sections/update", put(update_section))
        .route("/api/v1/sections/{id}", get(get_section))
        .route("/api/v1/sentences/", get(list_sentences).post(create_sentence))
        .route("/api/v1/sentences/update", put(update_sentence))
        .route("/api/v1/sentences/for-user", get(sentences_for_user))
        .route("/api/v1/sentences/{id}", get(get_sentence))
        .route("/api/v1/translations/", get(list_translations).post(create_translation))
        .route("/api/v1/translations/{id}", get(get_translation))
        .route("/api/v1/translations/{id}/voters", get(translation_voters))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, new_db()).await
}

pub async fn run_with(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock platform listening");
    }
    axum::serve(listener, app_with(db)).await
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum Failure {
    Unauthorized,
    IncorrectPassword,
    Forbidden,
    NotFound(&'static str),
    Conflict(&'static str),
    Invalid { field: &'static str, msg: String },
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Failure::Unauthorized => (StatusCode::UNAUTHORIZED, json!({"detail": "Unauthorized"})),
            Failure::IncorrectPassword => (StatusCode::UNAUTHORIZED, json!({"detail": "incorrect_password"})),
            Failure::Forbidden => (StatusCode::FORBIDDEN, json!({"detail": "Forbidden"})),
            Failure::NotFound(what) => (StatusCode::NOT_FOUND, json!({"detail": format!("{what} not found")})),
            Failure::Conflict(what) => (StatusCode::CONFLICT, json!({"detail": format!("{what} already exists")})),
            Failure::Invalid { field, msg } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"detail": [{"loc": ["body", field], "msg": msg, "type": "value_error"}]}),
            ),
        };
        (status, Json(body)).into_response()
    }
}

type Reply<T> = Result<Json<T>, Failure>;

fn caller(store: &Store, headers: &HeaderMap) -> Result<i64, Failure> {
    bearer(headers)
        .and_then(|token| store.account_for_token(token))
        .ok_or(Failure::Unauthorized)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn require_text(field: &'static str, value: &str) -> Result<(), Failure> {
    if value.trim().is_empty() {
        return Err(Failure::Invalid {
            field,
            msg: "ensure this value has at least 1 characters".to_string(),
        });
    }
    Ok(())
}

fn require_password(field: &'static str, value: &str) -> Result<(), Failure> {
    if !(8..=50).contains(&value.chars().count()) {
        return Err(Failure::Invalid {
            field,
            msg: "password length must be between 8 and 50".to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct AccountOut {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub send_time: NaiveTime,
    pub number_of_words: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Tokens>,
}

impl AccountOut {
    fn new(row: &AccountRow, tokens: Option<Tokens>) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            email: row.email.clone(),
            username: row.username.clone(),
            send_time: row.send_time,
            number_of_words: row.number_of_words,
            tokens,
        }
    }
}

#[derive(Serialize)]
pub struct ProjectOut {
    pub id: i64,
    pub owner: Owner,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct SectionOut {
    pub id: i64,
    pub project: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct SentenceOut {
    pub id: i64,
    pub section: i64,
    pub sentence: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct TranslationOut {
    pub id: i64,
    pub translator: Option<Owner>,
    pub sentence: Value,
    pub translation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voters: Option<Vec<Owner>>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

fn project_out(store: &Store, row: &ProjectRow) -> ProjectOut {
    ProjectOut {
        id: row.id,
        owner: store.owner(row.owner).unwrap_or(Owner {
            id: row.owner,
            first_name: String::new(),
        }),
        name: row.name.clone(),
        created_at: row.created_at,
    }
}

fn section_out(row: &SectionRow) -> SectionOut {
    SectionOut {
        id: row.id,
        project: row.project,
        name: row.name.clone(),
        created_at: row.created_at,
    }
}

fn sentence_out(row: &SentenceRow) -> SentenceOut {
    SentenceOut {
        id: row.id,
        section: row.section,
        sentence: row.sentence.clone(),
        created_at: row.created_at,
    }
}

fn voters_out(store: &Store, row: &TranslationRow) -> Vec<Owner> {
    row.voters.iter().filter_map(|id| store.owner(*id)).collect()
}

/// List rows carry the sentence id only and no voters; single fetches embed
/// the sentence and include voters.
fn translation_out(store: &Store, row: &TranslationRow, detailed: bool) -> TranslationOut {
    let sentence = match (detailed, store.sentence(row.sentence)) {
        (true, Some(sentence)) => json!(sentence_out(sentence)),
        _ => json!(row.sentence),
    };
    TranslationOut {
        id: row.id,
        translator: store.owner(row.translator),
        sentence,
        translation: row.translation.clone(),
        voters: detailed.then(|| voters_out(store, row)),
        is_approved: row.is_approved,
        created_at: row.created_at,
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub username: Option<String>,
    pub project: Option<i64>,
    pub section: Option<i64>,
    pub sentence: Option<i64>,
}

#[derive(Serialize)]
pub struct PageOut<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Slice `rows` into the requested page and build absolute neighbour links
/// that repeat `filters`.
fn paginate<T>(
    rows: Vec<T>,
    query: &ListQuery,
    headers: &HeaderMap,
    path: &str,
    filters: &[(&str, String)],
) -> Result<PageOut<T>, Failure> {
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(25);
    if page == 0 {
        return Err(Failure::Invalid {
            field: "page",
            msg: "ensure this value is greater than 0".to_string(),
        });
    }
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(Failure::Invalid {
            field: "page_size",
            msg: format!("ensure this value is between 1 and {MAX_PAGE_SIZE}"),
        });
    }

    let count = rows.len();
    let start = (page as usize - 1) * page_size as usize;
    if start >= count && page > 1 {
        return Err(Failure::NotFound("page"));
    }
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let link = |target: u32| {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in filters {
            query.append_pair(key, value);
        }
        query.append_pair("page", &target.to_string());
        query.append_pair("page_size", &page_size.to_string());
        format!("http://{host}{path}?{}", query.finish())
    };

    let next = (start + (page_size as usize) < count).then(|| link(page + 1));
    let previous = (page > 1).then(|| link(page - 1));
    let results = rows.into_iter().skip(start).take(page_size as usize).collect();
    Ok(PageOut {
        count,
        next,
        previous,
        results,
    })
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct SignupIn {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub send_time: NaiveTime,
    pub number_of_words: u32,
}

#[derive(Deserialize)]
pub struct LoginIn {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct AccountUpdateIn {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub send_time: Option<NaiveTime>,
    pub number_of_words: Option<u32>,
}

#[derive(Deserialize)]
pub struct PasswordChangeIn {
    pub current_password: String,
    pub new_password: String,
}

async fn signup(State(db): State<Db>, Json(input): Json<SignupIn>) -> Reply<AccountOut> {
    require_text("username", &input.username)?;
    require_text("first_name", &input.first_name)?;
    require_password("password", &input.password)?;
    let mut store = db.write().await;
    if store
        .accounts
        .iter()
        .any(|a| a.username == input.username || a.email == input.email)
    {
        return Err(Failure::Conflict("account"));
    }
    let id = store.next_id();
    let row = AccountRow {
        id,
        first_name: input.first_name,
        last_name: input.last_name,
        email: input.email,
        username: input.username,
        password: input.password,
        send_time: input.send_time,
        number_of_words: input.number_of_words,
    };
    store.accounts.push(row.clone());
    let tokens = store.issue(id);
    debug!(username = %row.username, "account created");
    Ok(Json(AccountOut::new(&row, Some(tokens))))
}

async fn login(State(db): State<Db>, Json(input): Json<LoginIn>) -> Reply<AccountOut> {
    let mut store = db.write().await;
    let row = store
        .accounts
        .iter()
        .find(|a| a.username == input.username)
        .cloned()
        .ok_or(Failure::NotFound("account"))?;
    if row.password != input.password {
        return Err(Failure::IncorrectPassword);
    }
    let tokens = store.issue(row.id);
    Ok(Json(AccountOut::new(&row, Some(tokens))))
}

async fn current_account(State(db): State<Db>, headers: HeaderMap) -> Reply<AccountOut> {
    let store = db.read().await;
    let id = caller(&store, &headers)?;
    let row = store.account(id).ok_or(Failure::NotFound("account"))?;
    Ok(Json(AccountOut::new(row, None)))
}

async fn update_account(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<AccountUpdateIn>,
) -> Reply<AccountOut> {
    let mut store = db.write().await;
    let id = caller(&store, &headers)?;
    if let Some(first_name) = &input.first_name {
        require_text("first_name", first_name)?;
    }
    let row = store
        .accounts
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or(Failure::NotFound("account"))?;
    if let Some(v) = input.first_name {
        row.first_name = v;
    }
    if let Some(v) = input.last_name {
        row.last_name = v;
    }
    if let Some(v) = input.send_time {
        row.send_time = v;
    }
    if let Some(v) = input.number_of_words {
        row.number_of_words = v;
    }
    let row = row.clone();
    let token = bearer(&headers).unwrap_or_default().to_string();
    let tokens = store.rotate_access(&token).ok_or(Failure::Unauthorized)?;
    Ok(Json(AccountOut::new(&row, Some(tokens))))
}

async fn refresh(State(db): State<Db>, Path(token): Path<String>) -> Reply<Tokens> {
    let mut store = db.write().await;
    store.rotate_refresh(&token).map(Json).ok_or(Failure::Unauthorized)
}

async fn change_password(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<PasswordChangeIn>,
) -> Reply<Tokens> {
    let mut store = db.write().await;
    let id = caller(&store, &headers)?;
    let row = store
        .accounts
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or(Failure::NotFound("account"))?;
    if row.password != input.current_password {
        return Err(Failure::IncorrectPassword);
    }
    require_password("new_password", &input.new_password)?;
    row.password = input.new_password;
    let token = bearer(&headers).unwrap_or_default().to_string();
    store.rotate_access(&token).map(Json).ok_or(Failure::Unauthorized)
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct NameIn {
    pub name: String,
}

#[derive(Deserialize)]
pub struct RenameIn {
    pub id: i64,
    pub new_name: String,
}

async fn list_projects(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Reply<PageOut<ProjectOut>> {
    let store = db.read().await;
    caller(&store, &headers)?;
    let mut filters = Vec::new();
    let owner = match &query.username {
        Some(username) => {
            let account = store
                .accounts
                .iter()
                .find(|a| &a.username == username)
                .ok_or(Failure::NotFound("user"))?;
            filters.push(("username", username.clone()));
            Some(account.id)
        }
        None => None,
    };
    let rows = store
        .projects
        .iter()
        .filter(|p| owner.is_none_or(|o| p.owner == o))
        .map(|p| project_out(&store, p))
        .collect();
    paginate(rows, &query, &headers, "/api/v1/projects/", &filters).map(Json)
}

async fn create_project(State(db): State<Db>, headers: HeaderMap, Json(input): Json<NameIn>) -> Reply<ProjectOut> {
    require_text("name", &input.name)?;
    let mut store = db.write().await;
    let owner = caller(&store, &headers)?;
    if store.projects.iter().any(|p| p.name == input.name) {
        return Err(Failure::Conflict("project"));
    }
    let row = ProjectRow {
        id: store.next_id(),
        owner,
        name: input.name,
        created_at: Utc::now(),
    };
    store.projects.push(row.clone());
    Ok(Json(project_out(&store, &row)))
}

async fn get_project(State(db): State<Db>, Path(id): Path<i64>) -> Reply<ProjectOut> {
    let store = db.read().await;
    let row = store.project(id).ok_or(Failure::NotFound("project"))?;
    Ok(Json(project_out(&store, row)))
}

async fn update_project(State(db): State<Db>, headers: HeaderMap, Json(input): Json<RenameIn>) -> Reply<ProjectOut> {
    require_text("new_name", &input.new_name)?;
    let mut store = db.write().await;
    let account = caller(&store, &headers)?;
    let taken = store
        .projects
        .iter()
        .any(|p| p.id != input.id && p.name == input.new_name);
    let row = store
        .projects
        .iter_mut()
        .find(|p| p.id == input.id)
        .ok_or(Failure::NotFound("project"))?;
    if row.owner != account {
        return Err(Failure::Forbidden);
    }
    if taken {
        return Err(Failure::Conflict("project"));
    }
    row.name = input.new_name;
    let row = row.clone();
    Ok(Json(project_out(&store, &row)))
}

/// Only the project owner may add or change its content.
fn owned_project(store: &Store, project: i64, account: i64) -> Result<(), Failure> {
    let row = store.project(project).ok_or(Failure::NotFound("project"))?;
    if row.owner != account {
        return Err(Failure::Forbidden);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct SectionIn {
    pub name: String,
    pub project: i64,
}

async fn list_sections(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Reply<PageOut<SectionOut>> {
    let store = db.read().await;
    caller(&store, &headers)?;
    let project = query.project.ok_or(Failure::Invalid {
        field: "project",
        msg: "field required".to_string(),
    })?;
    store.project(project).ok_or(Failure::NotFound("project"))?;
    let rows = store
        .sections
        .iter()
        .filter(|s| s.project == project)
        .map(section_out)
        .collect();
    let filters = [("project", project.to_string())];
    paginate(rows, &query, &headers, "/api/v1/sections/", &filters).map(Json)
}

async fn create_section(State(db): State<Db>, headers: HeaderMap, Json(input): Json<SectionIn>) -> Reply<SectionOut> {
    require_text("name", &input.name)?;
    let mut store = db.write().await;
    let account = caller(&store, &headers)?;
    owned_project(&store, input.project, account)?;
    if store
        .sections
        .iter()
        .any(|s| s.project == input.project && s.name == input.name)
    {
        return Err(Failure::Conflict("section"));
    }
    let row = SectionRow {
        id: store.next_id(),
        project: input.project,
        name: input.name,
        created_at: Utc::now(),
    };
    store.sections.push(row.clone());
    Ok(Json(section_out(&row)))
}

async fn get_section(State(db): State<Db>, headers: HeaderMap, Path(id): Path<i64>) -> Reply<SectionOut> {
    let store = db.read().await;
    caller(&store, &headers)?;
    store
        .section(id)
        .map(|row| Json(section_out(row)))
        .ok_or(Failure::NotFound("section"))
}

async fn update_section(State(db): State<Db>, headers: HeaderMap, Json(input): Json<RenameIn>) -> Reply<SectionOut> {
    require_text("new_name", &input.new_name)?;
    let mut store = db.write().await;
    let account = caller(&store, &headers)?;
    let project = store.section(input.id).ok_or(Failure::NotFound("section"))?.project;
    owned_project(&store, project, account)?;
    if store
        .sections
        .iter()
        .any(|s| s.id != input.id && s.project == project && s.name == input.new_name)
    {
        return Err(Failure::Conflict("section"));
    }
    let row = store
        .sections
        .iter_mut()
        .find(|s| s.id == input.id)
        .ok_or(Failure::NotFound("section"))?;
    row.name = input.new_name;
    Ok(Json(section_out(row)))
}

// ---------------------------------------------------------------------------
// Sentences
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct SentenceIn {
    pub sentence: String,
    pub section_id: i64,
}

#[derive(Deserialize)]
pub struct SentenceRenameIn {
    pub id: i64,
    pub new_sentence: String,
}

async fn list_sentences(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Reply<PageOut<SentenceOut>> {
    let store = db.read().await;
    caller(&store, &headers)?;
    let section = query.section.ok_or(Failure::Invalid {
        field: "section",
        msg: "field required".to_string(),
    })?;
    store.section(section).ok_or(Failure::NotFound("section"))?;
    let rows = store
        .sentences
        .iter()
        .filter(|s| s.section == section)
        .map(sentence_out)
        .collect();
    let filters = [("section", section.to_string())];
    paginate(rows, &query, &headers, "/api/v1/sentences/", &filters).map(Json)
}

/// Sentences in the given project or section that the caller has not
/// translated yet.
async fn sentences_for_user(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Reply<PageOut<SentenceOut>> {
    let store = db.read().await;
    let account = caller(&store, &headers)?;
    let (sections, filters): (Vec<i64>, Vec<(&str, String)>) = match (query.project, query.section) {
        (Some(project), None) => {
            store.project(project).ok_or(Failure::NotFound("project"))?;
            let ids = store
                .sections
                .iter()
                .filter(|s| s.project == project)
                .map(|s| s.id)
                .collect();
            (ids, vec![("project", project.to_string())])
        }
        (None, Some(section)) => {
            store.section(section).ok_or(Failure::NotFound("section"))?;
            (vec![section], vec![("section", section.to_string())])
        }
        _ => {
            return Err(Failure::Invalid {
                field: "project",
                msg: "exactly one of project or section is required".to_string(),
            })
        }
    };
    let rows = store
        .sentences
        .iter()
        .filter(|s| sections.contains(&s.section))
        .filter(|s| {
            !store
                .translations
                .iter()
                .any(|t| t.sentence == s.id && t.translator == account)
        })
        .map(sentence_out)
        .collect();
    paginate(rows, &query, &headers, "/api/v1/sentences/for-user", &filters).map(Json)
}

async fn create_sentence(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<SentenceIn>,
) -> Reply<SentenceOut> {
    require_text("sentence", &input.sentence)?;
    let mut store = db.write().await;
    let account = caller(&store, &headers)?;
    let project = store
        .section(input.section_id)
        .ok_or(Failure::NotFound("section"))?
        .project;
    owned_project(&store, project, account)?;
    if store
        .sentences
        .iter()
        .any(|s| s.section == input.section_id && s.sentence == input.sentence)
    {
        return Err(Failure::Conflict("sentence"));
    }
    let row = SentenceRow {
        id: store.next_id(),
        section: input.section_id,
        sentence: input.sentence,
        created_at: Utc::now(),
    };
    store.sentences.push(row.clone());
    Ok(Json(sentence_out(&row)))
}

async fn get_sentence(State(db): State<Db>, Path(id): Path<i64>) -> Reply<SentenceOut> {
    let store = db.read().await;
    store
        .sentence(id)
        .map(|row| Json(sentence_out(row)))
        .ok_or(Failure::NotFound("sentence"))
}

async fn update_sentence(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<SentenceRenameIn>,
) -> Reply<SentenceOut> {
    require_text("new_sentence", &input.new_sentence)?;
    let mut store = db.write().await;
    let account = caller(&store, &headers)?;
    let section = store.sentence(input.id).ok_or(Failure::NotFound("sentence"))?.section;
    let project = store.section(section).ok_or(Failure::NotFound("section"))?.project;
    owned_project(&store, project, account)?;
    let row = store
        .sentences
        .iter_mut()
        .find(|s| s.id == input.id)
        .ok_or(Failure::NotFound("sentence"))?;
    row.sentence = input.new_sentence;
    Ok(Json(sentence_out(row)))
}

// ---------------------------------------------------------------------------
// Translations
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct TranslationIn {
    pub translation: String,
    pub sentence_id: i64,
}

#[derive(Serialize)]
pub struct VotersOut {
    pub voters: Vec<Owner>,
}

async fn list_translations(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Reply<PageOut<TranslationOut>> {
    let store = db.read().await;
    caller(&store, &headers)?;
    let sentence = query.sentence.ok_or(Failure::Invalid {
        field: "sentence",
        msg: "field required".to_string(),
    })?;
    store.sentence(sentence).ok_or(Failure::NotFound("sentence"))?;
    let rows = store
        .translations
        .iter()
        .filter(|t| t.sentence == sentence)
        .map(|t| translation_out(&store, t, false))
        .collect();
    let filters = [("sentence", sentence.to_string())];
    paginate(rows, &query, &headers, "/api/v1/translations/", &filters).map(Json)
}

async fn create_translation(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<TranslationIn>,
) -> Reply<TranslationOut> {
    require_text("translation", &input.translation)?;
    let mut store = db.write().await;
    let account = caller(&store, &headers)?;
    store
        .sentence(input.sentence_id)
        .ok_or(Failure::NotFound("sentence"))?;
    if store
        .translations
        .iter()
        .any(|t| t.sentence == input.sentence_id && t.translator == account)
    {
        return Err(Failure::Conflict("translation"));
    }
    let row = TranslationRow {
        id: store.next_id(),
        translator: account,
        sentence: input.sentence_id,
        translation: input.translation,
        voters: Vec::new(),
        is_approved: false,
        created_at: Utc::now(),
    };
    store.translations.push(row.clone());
    let mut out = translation_out(&store, &row, false);
    out.voters = Some(Vec::new());
    Ok(Json(out))
}

async fn get_translation(State(db): State<Db>, Path(id): Path<i64>) -> Reply<TranslationOut> {
    let store = db.read().await;
    let row = store.translation(id).ok_or(Failure::NotFound("translation"))?;
    Ok(Json(translation_out(&store, row, true)))
}

async fn translation_voters(State(db): State<Db>, headers: HeaderMap, Path(id): Path<i64>) -> Reply<VotersOut> {
    let store = db.read().await;
    caller(&store, &headers)?;
    let row = store.translation(id).ok_or(Failure::NotFound("translation"))?;
    Ok(Json(VotersOut {
        voters: voters_out(&store, row),
    }))
}
