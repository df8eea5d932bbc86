mod common;

use std::sync::atomic::Ordering;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::{app, seed_user, Reply, ADMIN, DISABLED, EMPLOYEE};

fn location(reply: &Reply) -> &str {
    reply
        .headers
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn set_cookies(reply: &Reply) -> Vec<String> {
    reply
        .headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_owned)
        .collect()
}

#[tokio::test]
async fn requests_without_session_are_unauthenticated() {
    let app = app().await;
    let reply = app.call("GET", "/brands", None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["code"], "SIGNDESK_UNAUTHENTICATED");
    assert_eq!(
        reply.headers.get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
}

#[tokio::test]
async fn user_id_header_alone_is_not_a_session() {
    let app = app().await;
    let me = app.call("GET", "/auth/session", Some(ADMIN), None).await;
    let admin_id = me.body["user_id"].as_str().unwrap().to_string();

    let req = Request::get("/users")
        .header("x-user-id", admin_id)
        .body(Body::empty())
        .unwrap();
    let reply = app.send(req).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_and_disabled_users_are_unauthenticated() {
    let app = app().await;
    for who in ["stranger@elsewhere.io", DISABLED] {
        let reply = app.call("GET", "/jobs", Some(who), None).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{who}");
    }
}

#[tokio::test]
async fn user_management_is_admin_only() {
    let app = app().await;

    for (method, body) in [("GET", None), ("POST", Some(json!({ "display_name": "N", "email": "n@x.io" })))] {
        let reply = app.call(method, "/users", Some(EMPLOYEE), body.clone()).await;
        assert_eq!(reply.status, StatusCode::FORBIDDEN, "{method}");
        assert_eq!(reply.body["code"], "SIGNDESK_FORBIDDEN");
    }

    let listed = app.call("GET", "/users", Some(ADMIN), None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body.as_array().unwrap().len(), 3);

    let created = app
        .call(
            "POST",
            "/users",
            Some(ADMIN),
            Some(json!({ "display_name": "New Hire", "email": "New@SignDesk.dev" })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["email"], "new@signdesk.dev");
    assert_eq!(created.body["role"], "employee");
    assert_eq!(created.body["status"], "active");
}

#[tokio::test]
async fn employees_may_read_only_their_own_user_record() {
    let app = app().await;
    let me = app.call("GET", "/auth/session", Some(EMPLOYEE), None).await;
    let my_id = me.body["user_id"].as_str().unwrap();

    let own = app
        .call("GET", &format!("/users/{my_id}"), Some(EMPLOYEE), None)
        .await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["email"], EMPLOYEE);

    let other = app
        .call("GET", &format!("/users/{}", Uuid::new_v4()), Some(EMPLOYEE), None)
        .await;
    assert_eq!(other.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let app = app().await;
    let reply = app
        .call(
            "POST",
            "/users",
            Some(ADMIN),
            Some(json!({ "display_name": "Copy", "email": EMPLOYEE.to_uppercase() })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn deleting_a_user_disables_it() {
    let app = app().await;
    let id = seed_user(&app.conn, "temp@signdesk.dev", "employee", "active").await;

    let reply = app
        .call("DELETE", &format!("/users/{id}"), Some(ADMIN), None)
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "disabled");

    let after = app.call("GET", &format!("/users/{id}"), Some(ADMIN), None).await;
    assert_eq!(after.status, StatusCode::OK);
    assert_eq!(after.body["status"], "disabled");

    let locked_out = app.call("GET", "/brands", Some("temp@signdesk.dev"), None).await;
    assert_eq!(locked_out.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn role_change_takes_effect_on_next_request() {
    let app = app().await;
    let me = app.call("GET", "/auth/session", Some(EMPLOYEE), None).await;
    let emp_id = me.body["user_id"].as_str().unwrap().to_string();

    let promoted = app
        .call(
            "PATCH",
            &format!("/users/{emp_id}"),
            Some(ADMIN),
            Some(json!({ "role": "admin" })),
        )
        .await;
    assert_eq!(promoted.status, StatusCode::OK);

    let reply = app.call("GET", "/users", Some(EMPLOYEE), None).await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn session_reports_resolved_identity() {
    let app = app().await;
    let reply = app.call("GET", "/auth/session", Some(ADMIN), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["email"], ADMIN);
    assert_eq!(reply.body["role"], "admin");
    assert_eq!(reply.body["display_name"], "admin");

    let anon = app.call("GET", "/auth/session", None, None).await;
    assert_eq!(anon.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn callback_for_unregistered_user_is_denied_and_signed_out() {
    let app = app().await;
    let reply = app
        .call("GET", "/auth/callback?code=intruder@elsewhere.io", None, None)
        .await;

    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(location(&reply), "/sign-in?error=access_denied");
    assert_eq!(app.provider.sign_outs.load(Ordering::SeqCst), 1);
    let cookies = set_cookies(&reply);
    assert!(cookies
        .iter()
        .any(|c| c.starts_with("sd-access-token=;") && c.contains("Max-Age=0")));
}

#[tokio::test]
async fn callback_for_disabled_user_is_denied() {
    let app = app().await;
    let reply = app
        .call("GET", &format!("/auth/callback?code={DISABLED}"), None, None)
        .await;
    assert_eq!(location(&reply), "/sign-in?error=access_denied");
}

#[tokio::test]
async fn callback_errors_redirect_to_sign_in() {
    let app = app().await;

    let reply = app.call("GET", "/auth/callback", None, None).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(location(&reply), "/sign-in?error=missing_code");

    let reply = app.call("GET", "/auth/callback?code=bad-code", None, None).await;
    assert_eq!(location(&reply), "/sign-in?error=exchange_failed");
}

#[tokio::test]
async fn callback_success_sets_session_cookies_and_lands_on_jobs() {
    let app = app().await;
    let reply = app
        .call("GET", &format!("/auth/callback?code={EMPLOYEE}"), None, None)
        .await;

    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(location(&reply), "/jobs");

    let cookies = set_cookies(&reply);
    let access = cookies
        .iter()
        .find(|c| c.starts_with("sd-access-token="))
        .expect("access cookie");
    assert!(access.starts_with(&format!("sd-access-token=tok:{EMPLOYEE}")));
    assert!(access.contains("HttpOnly"));
    assert!(access.contains("SameSite=Lax"));
    assert!(access.contains("Path=/"));
    assert!(cookies.iter().any(|c| c.starts_with("sd-refresh-token=refresh")));

    let users = app.call("GET", "/users", Some(ADMIN), None).await;
    let me = users
        .body
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == EMPLOYEE)
        .unwrap();
    assert!(!me["last_active_at"].is_null());
}

#[tokio::test]
async fn sign_out_clears_cookies() {
    let app = app().await;
    let reply = app.call("POST", "/auth/sign-out", Some(EMPLOYEE), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({ "success": true }));
    assert_eq!(app.provider.sign_outs.load(Ordering::SeqCst), 1);

    let cleared: Vec<_> = set_cookies(&reply)
        .into_iter()
        .filter(|c| c.contains("Max-Age=0"))
        .collect();
    assert_eq!(cleared.len(), 3);
}
