mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use common::{app, TestApp, ADMIN, EMPLOYEE};

#[tokio::test]
async fn create_without_required_fields_is_rejected_and_persists_nothing() {
    let app = app().await;
    let cases = [
        ("brands", vec!["name"]),
        ("clients", vec!["legal_name"]),
        ("jobs", vec!["title", "client_id"]),
        ("signs", vec!["brand_id", "name"]),
        ("options", vec!["sign_id", "name"]),
        ("option-values", vec!["option_id", "value"]),
        ("pricing-lines", vec!["job_id", "sign_id"]),
    ];

    for (collection, missing) in cases {
        let reply = app
            .call("POST", &format!("/{collection}"), Some(EMPLOYEE), Some(json!({})))
            .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{collection}");
        assert_eq!(reply.body["code"], "SIGNDESK_INVALID_INPUT");
        let pointers: Vec<String> = reply.body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["pointer"].as_str().unwrap().trim_start_matches('/').to_string())
            .collect();
        assert_eq!(pointers, missing, "{collection}");

        let list = app
            .call("GET", &format!("/{collection}"), Some(EMPLOYEE), None)
            .await;
        assert_eq!(list.status, StatusCode::OK);
        assert_eq!(list.body, json!([]), "{collection} must stay empty");
    }
}

#[tokio::test]
async fn blank_required_field_counts_as_missing() {
    let app = app().await;
    let reply = app
        .call("POST", "/brands", Some(ADMIN), Some(json!({ "name": "  " })))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["errors"][0]["pointer"], "/name");
}

#[tokio::test]
async fn get_unknown_id_is_not_found_and_malformed_id_is_bad_request() {
    let app = app().await;
    let reply = app
        .call("GET", &format!("/clients/{}", Uuid::new_v4()), Some(ADMIN), None)
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["code"], "SIGNDESK_NOT_FOUND");

    let reply = app.call("GET", "/clients/not-a-uuid", Some(ADMIN), None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn crud_round_trip_with_partial_update() {
    let app = app().await;
    let id = app
        .create(
            "clients",
            json!({ "legal_name": "Acme Holdings", "city": "Austin" }),
        )
        .await;

    let reply = app
        .call(
            "PUT",
            &format!("/clients/{id}"),
            Some(EMPLOYEE),
            Some(json!({ "contact_name": "Dana" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["legal_name"], "Acme Holdings");
    assert_eq!(reply.body["city"], "Austin");
    assert_eq!(reply.body["contact_name"], "Dana");

    let reply = app
        .call("PUT", &format!("/clients/{}", Uuid::new_v4()), Some(ADMIN), Some(json!({})))
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app.call("DELETE", &format!("/clients/{id}"), Some(ADMIN), None).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn signs_list_in_image_number_order() {
    let app = app().await;
    let brand = app.create("brands", json!({ "name": "Northwind" })).await;
    for (name, image) in [
        ("three", Some("storefront sign (3).png")),
        ("plain", None),
        ("one", Some("Sign(1).jpg")),
        ("logo", Some("logo.svg")),
    ] {
        app.create(
            "signs",
            json!({ "brand_id": brand, "name": name, "image_name": image }),
        )
        .await;
    }

    let reply = app
        .call("GET", &format!("/signs?brand_id={brand}"), Some(EMPLOYEE), None)
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    let names: Vec<&str> = reply
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["one", "three", "plain", "logo"]);
}

#[tokio::test]
async fn parent_filter_restricts_list() {
    let app = app().await;
    let a = app.create("brands", json!({ "name": "A" })).await;
    let b = app.create("brands", json!({ "name": "B" })).await;
    app.create("signs", json!({ "brand_id": a, "name": "a1" })).await;
    app.create("signs", json!({ "brand_id": b, "name": "b1" })).await;

    let reply = app
        .call("GET", &format!("/signs?brand_id={b}"), Some(EMPLOYEE), None)
        .await;
    assert_eq!(reply.body.as_array().unwrap().len(), 1);
    assert_eq!(reply.body[0]["name"], "b1");

    let reply = app.call("GET", "/signs?brand_id=zzz", Some(EMPLOYEE), None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply.headers[axum::http::header::CONTENT_TYPE],
        "application/problem+json"
    );
    assert_eq!(reply.body["code"], "SIGNDESK_INVALID_INPUT");
}

#[tokio::test]
async fn pricing_line_deleted_twice_reports_not_found() {
    let app = app().await;
    let client = app.create("clients", json!({ "legal_name": "C" })).await;
    let brand = app.create("brands", json!({ "name": "B" })).await;
    let job = app
        .create("jobs", json!({ "title": "Pylon", "client_id": client }))
        .await;
    let sign = app.create("signs", json!({ "brand_id": brand, "name": "S" })).await;
    let line = app
        .create("pricing-lines", json!({ "job_id": job, "sign_id": sign }))
        .await;

    let uri = format!("/pricing-lines/{line}");
    assert_eq!(
        app.call("DELETE", &uri, Some(EMPLOYEE), None).await.status,
        StatusCode::NO_CONTENT
    );
    let second = app.call("DELETE", &uri, Some(EMPLOYEE), None).await;
    assert_eq!(second.status, StatusCode::NOT_FOUND);
    assert_eq!(second.body["code"], "SIGNDESK_NOT_FOUND");
}

#[tokio::test]
async fn pricing_line_defaults() {
    let app = app().await;
    let client = app.create("clients", json!({ "legal_name": "C" })).await;
    let brand = app.create("brands", json!({ "name": "B" })).await;
    let job = app.create("jobs", json!({ "title": "T", "client_id": client })).await;
    let sign = app.create("signs", json!({ "brand_id": brand, "name": "S" })).await;

    let reply = app
        .call(
            "POST",
            "/pricing-lines",
            Some(EMPLOYEE),
            Some(json!({ "job_id": job, "sign_id": sign })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["quantity"], 1);
    assert_eq!(reply.body["unit_price"], 0.0);
}

#[tokio::test]
async fn references_are_enforced() {
    let app = app().await;

    let reply = app
        .call(
            "POST",
            "/jobs",
            Some(ADMIN),
            Some(json!({ "title": "Orphan", "client_id": Uuid::new_v4() })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let brand = app.create("brands", json!({ "name": "B" })).await;
    let sign = app.create("signs", json!({ "brand_id": brand, "name": "S" })).await;
    let client = app.create("clients", json!({ "legal_name": "C" })).await;
    let job = app.create("jobs", json!({ "title": "T", "client_id": client })).await;
    app.create("pricing-lines", json!({ "job_id": job, "sign_id": sign }))
        .await;

    for uri in [
        format!("/brands/{brand}"),
        format!("/clients/{client}"),
        format!("/jobs/{job}"),
    ] {
        let reply = app.call("DELETE", &uri, Some(ADMIN), None).await;
        assert_eq!(reply.status, StatusCode::CONFLICT, "{uri}: {}", reply.body);
        assert_eq!(reply.body["code"], "SIGNDESK_CONFLICT");
    }
    assert_eq!(
        app.call("GET", &format!("/jobs/{job}"), Some(ADMIN), None)
            .await
            .status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn deleting_a_sign_cascades_to_options_and_values() {
    let app = app().await;
    let brand = app.create("brands", json!({ "name": "B" })).await;
    let sign = app.create("signs", json!({ "brand_id": brand, "name": "S" })).await;
    let option = app
        .create("options", json!({ "sign_id": sign, "name": "Finish" }))
        .await;
    let value = app
        .create(
            "option-values",
            json!({ "option_id": option, "value": "Matte", "price_delta": 12.5 }),
        )
        .await;

    assert_eq!(
        app.call("DELETE", &format!("/signs/{sign}"), Some(ADMIN), None)
            .await
            .status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        app.call("GET", &format!("/options/{option}"), Some(ADMIN), None)
            .await
            .status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.call("GET", &format!("/option-values/{value}"), Some(ADMIN), None)
            .await
            .status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn job_creator_is_the_caller_not_the_body() {
    let app = app().await;
    let client = app.create("clients", json!({ "legal_name": "C" })).await;
    let me = app.call("GET", "/auth/session", Some(EMPLOYEE), None).await;
    let my_id = me.body["user_id"].as_str().unwrap().to_string();

    let reply = app
        .call(
            "POST",
            "/jobs",
            Some(EMPLOYEE),
            Some(json!({
                "title": "Channel letters",
                "client_id": client,
                "creator_id": Uuid::new_v4(),
            })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["creator_id"], my_id);
}

async fn touch(app: &TestApp, job: Uuid) -> DateTime<Utc> {
    let reply = app
        .call(
            "POST",
            "/jobs/update-last-modified",
            Some(EMPLOYEE),
            Some(json!({ "jobId": job })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.body["success"], true);
    reply.body["updated_at"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn update_last_modified_strictly_increases() {
    let app = app().await;
    let client = app.create("clients", json!({ "legal_name": "C" })).await;
    let job = app.create("jobs", json!({ "title": "T", "client_id": client })).await;

    let first = touch(&app, job).await;
    let second = touch(&app, job).await;
    assert!(second > first);

    let stored = app.call("GET", &format!("/jobs/{job}"), Some(EMPLOYEE), None).await;
    let stored: DateTime<Utc> =
        stored.body["updated_at"].as_str().unwrap().parse().unwrap();
    assert_eq!(stored, second);
}

#[tokio::test]
async fn update_last_modified_validates_job_id() {
    let app = app().await;
    let missing = app
        .call("POST", "/jobs/update-last-modified", Some(EMPLOYEE), Some(json!({})))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["errors"][0]["pointer"], "/jobId");

    let unknown = app
        .call(
            "POST",
            "/jobs/update-last-modified",
            Some(EMPLOYEE),
            Some(json!({ "jobId": Uuid::new_v4() })),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn job_edits_do_not_move_updated_at() {
    let app = app().await;
    let client = app.create("clients", json!({ "legal_name": "C" })).await;
    let job = app.create("jobs", json!({ "title": "T", "client_id": client })).await;
    let before = app.call("GET", &format!("/jobs/{job}"), Some(ADMIN), None).await;

    let after = app
        .call(
            "PUT",
            &format!("/jobs/{job}"),
            Some(ADMIN),
            Some(json!({ "title": "Renamed" })),
        )
        .await;
    assert_eq!(after.body["title"], "Renamed");
    assert_eq!(after.body["updated_at"], before.body["updated_at"]);

    let touched = touch(&app, job).await;
    let edited = app
        .call(
            "PATCH",
            &format!("/jobs/{job}"),
            Some(ADMIN),
            Some(json!({ "job_number": "J-7" })),
        )
        .await;
    let edited: DateTime<Utc> = edited.body["updated_at"].as_str().unwrap().parse().unwrap();
    assert_eq!(edited, touched);
}

#[tokio::test]
async fn client_edits_refresh_updated_at() {
    let app = app().await;
    let client = app.create("clients", json!({ "legal_name": "C" })).await;
    let before = app.call("GET", &format!("/clients/{client}"), Some(ADMIN), None).await;
    let before: DateTime<Utc> = before.body["updated_at"].as_str().unwrap().parse().unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let after = app
        .call(
            "PUT",
            &format!("/clients/{client}"),
            Some(ADMIN),
            Some(json!({ "contact_name": "Rae" })),
        )
        .await;
    assert_eq!(after.status, StatusCode::OK);
    let after: DateTime<Utc> = after.body["updated_at"].as_str().unwrap().parse().unwrap();
    assert!(after > before);
}
