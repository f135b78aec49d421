use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, app_with, new_db};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::HOST, "platform.test");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .unwrap(),
        None => builder.body(String::new()).unwrap(),
    }
}

async fn call(app: &Router, req: Request<String>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

fn signup_body(username: &str) -> Value {
    json!({
        "first_name": username,
        "last_name": "Tester",
        "email": format!("{username}@example.com"),
        "username": username,
        "password": "correct-horse",
        "send_time": "08:00:00",
        "number_of_words": 10,
    })
}

/// Sign up `username` and return its access token.
async fn signup(app: &Router, username: &str) -> String {
    let (status, body) = call(app, request("POST", "/api/v1/accounts/", None, Some(signup_body(username)))).await;
    assert_eq!(status, StatusCode::OK);
    body["tokens"]["access"].as_str().unwrap().to_string()
}

async fn create_project(app: &Router, token: &str, name: &str) -> i64 {
    let (status, body) = call(
        app,
        request("POST", "/api/v1/projects/", Some(token), Some(json!({"name": name}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_i64().unwrap()
}

async fn create_section(app: &Router, token: &str, project: i64, name: &str) -> i64 {
    let (status, body) = call(
        app,
        request(
            "POST",
            "/api/v1/sections/",
            Some(token),
            Some(json!({"name": name, "project": project})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_i64().unwrap()
}

async fn create_sentence(app: &Router, token: &str, section: i64, text: &str) -> i64 {
    let (status, body) = call(
        app,
        request(
            "POST",
            "/api/v1/sentences/",
            Some(token),
            Some(json!({"sentence": text, "section_id": section})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_i64().unwrap()
}

// --- accounts ---

#[tokio::test]
async fn signup_returns_profile_and_tokens() {
    let app = app();
    let (status, body) = call(&app, request("POST", "/api/v1/accounts/", None, Some(signup_body("alice")))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["send_time"], "08:00:00");
    assert!(body["tokens"]["refresh"].is_string());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let app = app();
    signup(&app, "alice").await;
    let (status, _) = call(&app, request("POST", "/api/v1/accounts/", None, Some(signup_body("alice")))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn short_password_is_a_validation_error() {
    let app = app();
    let mut body = signup_body("bob");
    body["password"] = json!("short");
    let (status, body) = call(&app, request("POST", "/api/v1/accounts/", None, Some(body))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body", "password"]));
}

#[tokio::test]
async fn login_distinguishes_unknown_user_and_bad_password() {
    let app = app();
    signup(&app, "alice").await;

    let (status, _) = call(
        &app,
        request("POST", "/api/v1/accounts/login", None, Some(json!({"username": "nobody", "password": "x"}))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(
        &app,
        request(
            "POST",
            "/api/v1/accounts/login",
            None,
            Some(json!({"username": "alice", "password": "wrong-password"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "incorrect_password");
}

#[tokio::test]
async fn current_account_requires_token() {
    let app = app();
    let token = signup(&app, "alice").await;

    let (status, body) = call(&app, request("GET", "/api/v1/accounts/", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Unauthorized");

    let (status, body) = call(&app, request("GET", "/api/v1/accounts/", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert!(body.get("tokens").is_none());
}

#[tokio::test]
async fn refresh_token_is_single_use() {
    let app = app();
    let (_, body) = call(&app, request("POST", "/api/v1/accounts/", None, Some(signup_body("alice")))).await;
    let refresh = body["tokens"]["refresh"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/accounts/refresh/{refresh}");

    let (status, fresh) = call(&app, request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(fresh["refresh"].as_str(), Some(refresh.as_str()));

    let (status, _) = call(&app, request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn update_rotates_access_token() {
    let app = app();
    let token = signup(&app, "alice").await;
    let (status, body) = call(
        &app,
        request("PUT", "/api/v1/accounts/update", Some(&token), Some(json!({"number_of_words": 20}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["number_of_words"], 20);
    let rotated = body["tokens"]["access"].as_str().unwrap();
    assert_ne!(rotated, token);

    let (status, _) = call(&app, request("GET", "/api/v1/accounts/", Some(&token), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// --- projects and sections ---

#[tokio::test]
async fn duplicate_project_name_conflicts() {
    let app = app();
    let token = signup(&app, "alice").await;
    create_project(&app, &token, "Book").await;
    let (status, _) = call(
        &app,
        request("POST", "/api/v1/projects/", Some(&token), Some(json!({"name": "Book"}))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn project_get_is_anonymous_and_embeds_owner() {
    let app = app();
    let token = signup(&app, "alice").await;
    let id = create_project(&app, &token, "Book").await;
    let (status, body) = call(&app, request("GET", &format!("/api/v1/projects/{id}"), None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["owner"]["first_name"], "alice");
}

#[tokio::test]
async fn only_owner_may_rename_project() {
    let app = app();
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;
    let id = create_project(&app, &alice, "Book").await;

    let (status, _) = call(
        &app,
        request("PUT", "/api/v1/projects/update", Some(&bob), Some(json!({"id": id, "new_name": "Mine"}))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &app,
        request("PUT", "/api/v1/projects/update", Some(&alice), Some(json!({"id": id, "new_name": "Novel"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Novel");
}

#[tokio::test]
async fn project_list_filters_by_username() {
    let app = app();
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;
    create_project(&app, &alice, "A").await;
    create_project(&app, &bob, "B").await;

    let (status, body) = call(&app, request("GET", "/api/v1/projects/?username=bob", Some(&alice), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["name"], "B");
}

#[tokio::test]
async fn duplicate_section_conflicts_within_project() {
    let app = app();
    let token = signup(&app, "alice").await;
    let project = create_project(&app, &token, "Book").await;
    create_section(&app, &token, project, "Intro").await;
    let (status, _) = call(
        &app,
        request(
            "POST",
            "/api/v1/sections/",
            Some(&token),
            Some(json!({"name": "Intro", "project": project})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn section_get_requires_token() {
    let app = app();
    let token = signup(&app, "alice").await;
    let project = create_project(&app, &token, "Book").await;
    let section = create_section(&app, &token, project, "Intro").await;
    let uri = format!("/api/v1/sections/{section}");

    let (status, _) = call(&app, request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = call(&app, request("GET", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project"], project);
}

// --- sentences ---

#[tokio::test]
async fn sentence_pages_carry_absolute_links() {
    let app = app();
    let token = signup(&app, "alice").await;
    let project = create_project(&app, &token, "Book").await;
    let section = create_section(&app, &token, project, "Intro").await;
    for n in 0..60 {
        create_sentence(&app, &token, section, &format!("line {n}")).await;
    }

    let uri = format!("/api/v1/sentences/?section={section}&page=2&page_size=25");
    let (status, body) = call(&app, request("GET", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 60);
    assert_eq!(body["results"].as_array().unwrap().len(), 25);
    assert_eq!(body["results"][0]["sentence"], "line 25");
    assert_eq!(
        body["next"],
        format!("http://platform.test/api/v1/sentences/?section={section}&page=3&page_size=25")
    );
    assert_eq!(
        body["previous"],
        format!("http://platform.test/api/v1/sentences/?section={section}&page=1&page_size=25")
    );

    let uri = format!("/api/v1/sentences/?section={section}&page=9&page_size=25");
    let (status, _) = call(&app, request("GET", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sentence_get_is_anonymous() {
    let app = app();
    let token = signup(&app, "alice").await;
    let project = create_project(&app, &token, "Book").await;
    let section = create_section(&app, &token, project, "Intro").await;
    let sentence = create_sentence(&app, &token, section, "Hello").await;

    let (status, body) = call(&app, request("GET", &format!("/api/v1/sentences/{sentence}"), None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["section"], section);
}

#[tokio::test]
async fn for_user_skips_translated_sentences() {
    let app = app();
    let token = signup(&app, "alice").await;
    let project = create_project(&app, &token, "Book").await;
    let section = create_section(&app, &token, project, "Intro").await;
    let done = create_sentence(&app, &token, section, "Hello").await;
    create_sentence(&app, &token, section, "Bye").await;
    call(
        &app,
        request(
            "POST",
            "/api/v1/translations/",
            Some(&token),
            Some(json!({"translation": "Bonjour", "sentence_id": done})),
        ),
    )
    .await;

    let uri = format!("/api/v1/sentences/for-user?project={project}");
    let (status, body) = call(&app, request("GET", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["sentence"], "Bye");
}

// --- translations ---

#[tokio::test]
async fn translation_shapes_differ_between_list_and_get() {
    let db = new_db();
    let app = app_with(db.clone());
    let alice = signup(&app, "alice").await;
    signup(&app, "bob").await;
    let project = create_project(&app, &alice, "Book").await;
    let section = create_section(&app, &alice, project, "Intro").await;
    let sentence = create_sentence(&app, &alice, section, "Hello").await;
    let (status, created) = call(
        &app,
        request(
            "POST",
            "/api/v1/translations/",
            Some(&alice),
            Some(json!({"translation": "Bonjour", "sentence_id": sentence})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_i64().unwrap();
    {
        let mut store = db.write().await;
        let bob = store.accounts.iter().find(|a| a.username == "bob").unwrap().id;
        assert!(store.vote(id, bob));
    }

    let uri = format!("/api/v1/translations/?sentence={sentence}");
    let (_, page) = call(&app, request("GET", &uri, Some(&alice), None)).await;
    assert_eq!(page["results"][0]["sentence"], sentence);
    assert!(page["results"][0].get("voters").is_none());

    let (status, single) = call(&app, request("GET", &format!("/api/v1/translations/{id}"), None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(single["sentence"]["sentence"], "Hello");
    assert_eq!(single["voters"][0]["first_name"], "bob");

    let (status, voters) = call(
        &app,
        request("GET", &format!("/api/v1/translations/{id}/voters"), Some(&alice), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(voters["voters"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_translation_is_not_found() {
    let app = app();
    let (status, body) = call(&app, request("GET", "/api/v1/translations/999", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].is_string());
}
