//! End-to-end tests against the full router on the in-memory backend.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use orgchart_rs::AppState;
use orgchart_rs::api::{RouterOptions, create_router};
use orgchart_rs::config::JwtConfig;

struct TestApp {
    router: Router,
}

struct TestResponse {
    status: StatusCode,
    request_id: Option<String>,
    body: Value,
}

impl TestApp {
    fn new() -> Self {
        let jwt = JwtConfig {
            secret: "integration-test-secret-with-32-chars".to_string(),
            access_token_expiration: 1,
            refresh_token_expiration: 24,
        };
        let state = AppState::in_memory(jwt);
        Self {
            router: create_router(state, RouterOptions::default()),
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status,
            request_id,
            body,
        }
    }

    /// Registers a fresh account and returns its access token.
    async fn token(&self) -> String {
        let response = self
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({"email": "admin@example.com", "password": "correct horse"})),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["access_token"].as_str().unwrap().to_string()
    }

    async fn create(&self, token: &str, uri: &str, body: Value) -> Value {
        let response = self.send(Method::POST, uri, Some(token), Some(body)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }
}

fn id(value: &Value) -> i64 {
    value["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_register_login_refresh_and_me() {
    let app = TestApp::new();
    let credentials = json!({"email": "Ada@Example.com", "password": "analytical-engine"});

    let registered = app
        .send(Method::POST, "/auth/register", None, Some(credentials.clone()))
        .await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.body["account"]["email"], "ada@example.com");
    assert_eq!(registered.body["token_type"], "Bearer");
    assert_eq!(registered.body["expires_in"], 3600);

    let duplicate = app
        .send(Method::POST, "/auth/register", None, Some(credentials))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.body["code"], "DUPLICATE_ENTRY");

    let login = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "analytical-engine"})),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let access = login.body["access_token"].as_str().unwrap();
    let refresh = login.body["refresh_token"].as_str().unwrap();

    let me = app.send(Method::GET, "/auth/me", Some(access), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "ada@example.com");

    let refreshed = app
        .send(
            Method::POST,
            "/auth/refresh",
            None,
            Some(json!({"refresh_token": refresh})),
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert_eq!(refreshed.body["account"]["id"], me.body["id"]);

    // an access token is not a refresh token
    let wrong_kind = app
        .send(
            Method::POST,
            "/auth/refresh",
            None,
            Some(json!({"refresh_token": access})),
        )
        .await;
    assert_eq!(wrong_kind.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_failures_look_identical() {
    let app = TestApp::new();
    app.token().await;

    let wrong_password = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "admin@example.com", "password": "incorrect"})),
        )
        .await;
    let unknown_email = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "nobody@example.com", "password": "incorrect"})),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body["message"], unknown_email.body["message"]);
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let app = TestApp::new();

    let response = app
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({"email": "not-an-email", "password": "short"})),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new();

    let missing = app.send(Method::GET, "/persons", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["code"], "UNAUTHORIZED");

    let garbage = app
        .send(Method::GET, "/departments", Some("not.a.token"), None)
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    // unknown paths stay 404 rather than demanding credentials
    let unknown = app.send(Method::GET, "/nowhere", None, None).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["code"], "NOT_FOUND");

    let health = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "healthy");
}

#[tokio::test]
async fn test_person_crud() {
    let app = TestApp::new();
    let token = app.token().await;

    let department = app
        .create(&token, "/departments", json!({"name": "Engineering"}))
        .await;
    let job = app.create(&token, "/jobs", json!({"title": "Engineer"})).await;
    let manager = app
        .create(
            &token,
            "/persons",
            json!({"name": "Grace", "department_id": id(&department)}),
        )
        .await;
    let report = app
        .create(
            &token,
            "/persons",
            json!({
                "name": "  Linus  ",
                "department_id": id(&department),
                "job_id": id(&job),
                "manager_id": id(&manager),
            }),
        )
        .await;
    assert_eq!(report["name"], "Linus");
    assert_eq!(report["manager_id"], id(&manager));

    let fetched = app
        .send(Method::GET, &format!("/persons/{}", id(&report)), Some(&token), None)
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, report);

    let reports = app
        .send(
            Method::GET,
            &format!("/persons/{}/reports", id(&manager)),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(reports.status, StatusCode::OK);
    assert_eq!(reports.body["pagination"]["total_items"], 1);
    assert_eq!(reports.body["data"][0]["id"], id(&report));

    let members = app
        .send(
            Method::GET,
            &format!("/jobs/{}/persons", id(&job)),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(members.body["pagination"]["total_items"], 1);

    // null clears a reference, omitted fields stay
    let updated = app
        .send(
            Method::PUT,
            &format!("/persons/{}", id(&report)),
            Some(&token),
            Some(json!({"name": "Linus T", "job_id": null})),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["name"], "Linus T");
    assert_eq!(updated.body["job_id"], Value::Null);
    assert_eq!(updated.body["manager_id"], id(&manager));

    let deleted = app
        .send(
            Method::DELETE,
            &format!("/persons/{}", id(&manager)),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app
        .send(
            Method::GET,
            &format!("/persons/{}", id(&manager)),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["details"]["entity"], "person");

    // deleting the manager detaches the report
    let orphan = app
        .send(Method::GET, &format!("/persons/{}", id(&report)), Some(&token), None)
        .await;
    assert_eq!(orphan.body["manager_id"], Value::Null);
}

#[tokio::test]
async fn test_paging_and_sorting() {
    let app = TestApp::new();
    let token = app.token().await;
    for name in ["Delta", "Alpha", "Echo", "Charlie", "Bravo"] {
        app.create(&token, "/departments", json!({"name": name})).await;
    }

    let first = app
        .send(Method::GET, "/departments?limit=2&offset=0", Some(&token), None)
        .await;
    assert_eq!(first.status, StatusCode::OK);
    let names: Vec<&str> = first.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Alpha", "Bravo"]);
    assert_eq!(first.body["pagination"]["total_items"], 5);
    assert_eq!(first.body["pagination"]["has_next"], true);
    assert_eq!(first.body["pagination"]["has_prev"], false);

    let last = app
        .send(Method::GET, "/departments?limit=2&offset=4", Some(&token), None)
        .await;
    assert_eq!(last.body["data"].as_array().unwrap().len(), 1);
    assert_eq!(last.body["pagination"]["has_next"], false);
    assert_eq!(last.body["pagination"]["has_prev"], true);

    let descending = app
        .send(
            Method::GET,
            "/departments?sort_field=name&sort_order=desc&limit=1",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(descending.body["data"][0]["name"], "Echo");

    let past_end = app
        .send(Method::GET, "/departments?offset=50", Some(&token), None)
        .await;
    assert_eq!(past_end.status, StatusCode::OK);
    assert!(past_end.body["data"].as_array().unwrap().is_empty());
    assert_eq!(past_end.body["pagination"]["total_items"], 5);
}

/// Walks every page of `uri` and returns the `(name, id)` pairs in order.
async fn collect_pages(app: &TestApp, token: &str, uri: &str) -> Vec<(String, i64)> {
    let mut rows = Vec::new();
    let mut offset = 0;
    loop {
        let page = app
            .send(
                Method::GET,
                &format!("{uri}&limit=2&offset={offset}"),
                Some(token),
                None,
            )
            .await;
        assert_eq!(page.status, StatusCode::OK, "{}", page.body);
        for item in page.body["data"].as_array().unwrap() {
            rows.push((item["name"].as_str().unwrap().to_string(), id(item)));
        }
        if page.body["pagination"]["has_next"] != true {
            return rows;
        }
        offset += 2;
    }
}

#[tokio::test]
async fn test_equal_sort_keys_break_ties_by_ascending_id() {
    let app = TestApp::new();
    let token = app.token().await;
    let mut sam_ids = Vec::new();
    for name in ["Sam", "Zoe", "Sam", "Ann", "Sam", "Sam"] {
        let person = app.create(&token, "/persons", json!({"name": name})).await;
        if name == "Sam" {
            sam_ids.push(id(&person));
        }
    }

    for (order, expected_names) in [
        ("asc", ["Ann", "Sam", "Sam", "Sam", "Sam", "Zoe"]),
        ("desc", ["Zoe", "Sam", "Sam", "Sam", "Sam", "Ann"]),
    ] {
        let rows = collect_pages(
            &app,
            &token,
            &format!("/persons?sort_field=name&sort_order={order}"),
        )
        .await;

        let names: Vec<&str> = rows.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, expected_names, "sort_order={order}");

        let tied: Vec<i64> = rows
            .iter()
            .filter(|(name, _)| name == "Sam")
            .map(|(_, id)| *id)
            .collect();
        assert_eq!(tied, sam_ids, "sort_order={order}");

        let mut ids: Vec<i64> = rows.iter().map(|(_, id)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 6, "a row was repeated or skipped across pages");
    }
}

#[tokio::test]
async fn test_update_rejects_null_name() {
    let app = TestApp::new();
    let token = app.token().await;
    let ada = app.create(&token, "/persons", json!({"name": "Ada"})).await;
    let dept = app.create(&token, "/departments", json!({"name": "Research"})).await;

    for uri in [
        format!("/persons/{}", id(&ada)),
        format!("/departments/{}", id(&dept)),
    ] {
        let response = app
            .send(Method::PUT, &uri, Some(&token), Some(json!({"name": null})))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}: {}", response.body);
    }

    let unchanged = app
        .send(Method::GET, &format!("/persons/{}", id(&ada)), Some(&token), None)
        .await;
    assert_eq!(unchanged.body["name"], "Ada");
}

#[tokio::test]
async fn test_invalid_paging_is_rejected() {
    let app = TestApp::new();
    let token = app.token().await;

    for query in [
        "limit=0",
        "limit=101",
        "offset=-1",
        "limit=abc",
        "sort_field=salary",
        "sort_order=sideways",
    ] {
        let response = app
            .send(Method::GET, &format!("/persons?{query}"), Some(&token), None)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "query {query}");
        assert!(response.body["code"].is_string(), "query {query}");
    }
}

#[tokio::test]
async fn test_unknown_references_are_rejected() {
    let app = TestApp::new();
    let token = app.token().await;

    for body in [
        json!({"name": "Ghost", "department_id": 999}),
        json!({"name": "Ghost", "job_id": 999}),
        json!({"name": "Ghost", "manager_id": 999}),
    ] {
        let response = app
            .send(Method::POST, "/persons", Some(&token), Some(body.clone()))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response.body["code"], "VALIDATION_ERROR");
    }

    let blank = app
        .send(Method::POST, "/persons", Some(&token), Some(json!({"name": "   "})))
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_management_cycles_are_rejected() {
    let app = TestApp::new();
    let token = app.token().await;

    let ceo = app.create(&token, "/persons", json!({"name": "CEO"})).await;
    let vp = app
        .create(&token, "/persons", json!({"name": "VP", "manager_id": id(&ceo)}))
        .await;
    let lead = app
        .create(&token, "/persons", json!({"name": "Lead", "manager_id": id(&vp)}))
        .await;

    let cycle = app
        .send(
            Method::PUT,
            &format!("/persons/{}", id(&ceo)),
            Some(&token),
            Some(json!({"manager_id": id(&lead)})),
        )
        .await;
    assert_eq!(cycle.status, StatusCode::BAD_REQUEST);
    assert_eq!(cycle.body["code"], "VALIDATION_ERROR");

    let own_manager = app
        .send(
            Method::PUT,
            &format!("/persons/{}", id(&vp)),
            Some(&token),
            Some(json!({"manager_id": id(&vp)})),
        )
        .await;
    assert_eq!(own_manager.status, StatusCode::BAD_REQUEST);

    let unknown = app
        .send(
            Method::PUT,
            "/persons/999",
            Some(&token),
            Some(json!({"name": "Nobody"})),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_department_and_job_detaches_persons() {
    let app = TestApp::new();
    let token = app.token().await;

    let department = app.create(&token, "/departments", json!({"name": "Ops"})).await;
    let job = app.create(&token, "/jobs", json!({"title": "Operator"})).await;
    let person = app
        .create(
            &token,
            "/persons",
            json!({"name": "Ken", "department_id": id(&department), "job_id": id(&job)}),
        )
        .await;

    for uri in [
        format!("/departments/{}", id(&department)),
        format!("/jobs/{}", id(&job)),
    ] {
        let response = app.send(Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(response.status, StatusCode::NO_CONTENT, "{uri}");
    }

    let detached = app
        .send(Method::GET, &format!("/persons/{}", id(&person)), Some(&token), None)
        .await;
    assert_eq!(detached.status, StatusCode::OK);
    assert_eq!(detached.body["department_id"], Value::Null);
    assert_eq!(detached.body["job_id"], Value::Null);
}

#[tokio::test]
async fn test_sub_lists_of_unknown_parents_are_404() {
    let app = TestApp::new();
    let token = app.token().await;

    for uri in ["/departments/42/persons", "/jobs/42/persons", "/persons/42/reports"] {
        let response = app.send(Method::GET, uri, Some(&token), None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn test_request_id_is_echoed_in_header_and_error_body() {
    let app = TestApp::new();

    let request = Request::builder()
        .uri("/persons")
        .header("x-request-id", "trace-me-123")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-me-123");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["request_id"], "trace-me-123");

    let generated = app.send(Method::GET, "/health/live", None, None).await;
    assert!(generated.request_id.is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new();

    let response = app
        .send(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["paths"]["/persons/{id}/reports"].is_object());
}
