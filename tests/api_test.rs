//! HTTP API tests driven through the router with `oneshot`

mod common;

use axum::http::{header, StatusCode};
use common::*;
use lyric_catalog::state::CatalogStore;
use serde_json::json;
use tower::ServiceExt;

async fn login(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(login_request(ADMIN_PASSWORD, "192.0.2.1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app(&[]).await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_search_songs_fuzzy_and_exact() {
    let (app, _) = test_app(&hymnal()).await;

    let response = app.clone().oneshot(get("/v1/songs?q=sheperds")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(titles(&body, "songs"), vec!["Shepherds Arise"]);
    assert_eq!(body["total"], 1);
    assert_eq!(body["query"], "sheperds");

    let response = app
        .clone()
        .oneshot(get("/v1/songs?q=%22a%20bulwark%20never%22"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(titles(&body, "songs"), vec!["A Mighty Fortress"]);

    let response = app.oneshot(get("/v1/songs")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total"], 6);
    assert_eq!(titles(&body, "songs")[0], "Amazing Grace");
    assert!(body["query"].is_null());
}

#[tokio::test]
async fn test_get_unknown_song() {
    let (app, _) = test_app(&[]).await;

    let response = app
        .oneshot(get(&format!("/v1/songs/{}", uuid::Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["status"], 404);
}

#[tokio::test]
async fn test_writes_require_admin() {
    let (app, _) = test_app(&[]).await;
    let song = json!({ "title": "Abide With Me", "lyrics": "fast falls the eventide" });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/v1/songs", song.clone(), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(json_request("POST", "/v1/songs", song, Some("not-a-session")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_migrates_plain_credential() {
    let (app, store) = test_app(&[]).await;
    assert!(!store.get_credential().await.unwrap().unwrap().is_hashed());

    let token = login(&app).await;
    assert_eq!(token.len(), 32);

    let stored = store.get_credential().await.unwrap().unwrap();
    assert!(stored.is_hashed());

    // the migrated credential still accepts the same password
    login(&app).await;
}

#[tokio::test]
async fn test_login_lockout_returns_retry_after() {
    let (app, _) = test_app(&[]).await;

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(login_request("wrong", "203.0.113.50"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app
        .clone()
        .oneshot(login_request(ADMIN_PASSWORD, "203.0.113.50"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "900");

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "RATE_LIMIT_EXCEEDED");
    assert_eq!(body["error"]["retry_after_minutes"], 15);

    // another client is unaffected
    let response = app
        .oneshot(login_request(ADMIN_PASSWORD, "203.0.113.51"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_song_crud_as_admin() {
    let (app, _) = test_app(&[]).await;
    let token = login(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/songs",
            json!({ "title": "  Abide With Me ", "lyrics": "fast falls the eventide", "author": "Lyte" }),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["title"], "Abide With Me");
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/v1/songs/{}", id),
            json!({ "title": "Abide with Me", "lyrics": "the darkness deepens" }),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["id"], created["id"]);
    assert!(updated["author"].is_null());

    let response = app
        .clone()
        .oneshot(get("/v1/songs?q=darknes"))
        .await
        .unwrap();
    assert_eq!(titles(&body_json(response).await, "songs"), vec!["Abide with Me"]);

    let response = app
        .clone()
        .oneshot(json_request("DELETE", &format!("/v1/songs/{}", id), json!({}), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(get(&format!("/v1/songs/{}", id))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_title_rejected() {
    let (app, _) = test_app(&[]).await;
    let token = login(&app).await;

    let response = app
        .oneshot(json_request("POST", "/v1/songs", json!({ "title": "   " }), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_list_ordering_and_search() {
    let songs = hymnal();
    let (app, store) = test_app(&songs).await;
    // Jerusalem, The Old Rugged Cross, Amazing Grace in curated order
    let curated = save_list(&store, "Sunday", &[&songs[5], &songs[0], &songs[1]], true).await;
    let plain = save_list(&store, "Evening", &[&songs[5], &songs[0], &songs[1]], false).await;

    let response = app
        .clone()
        .oneshot(get(&format!("/v1/lists/{}", curated.id)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(
        titles(&body, "songs"),
        vec!["Jerusalem", "The Old Rugged Cross", "Amazing Grace"]
    );
    assert_eq!(body["name"], "Sunday");

    let response = app
        .clone()
        .oneshot(get(&format!("/v1/lists/{}", plain.id)))
        .await
        .unwrap();
    assert_eq!(
        titles(&body_json(response).await, "songs"),
        vec!["Amazing Grace", "Jerusalem", "The Old Rugged Cross"]
    );

    // a search inside a curated list falls back to library order
    let response = app
        .clone()
        .oneshot(get(&format!("/v1/lists/{}?q=e", curated.id)))
        .await
        .unwrap();
    assert_eq!(
        titles(&body_json(response).await, "songs"),
        vec!["Amazing Grace", "Jerusalem", "The Old Rugged Cross"]
    );

    // songs outside the list never match
    let response = app
        .oneshot(get(&format!("/v1/lists/{}?q=fortress", curated.id)))
        .await
        .unwrap();
    assert!(titles(&body_json(response).await, "songs").is_empty());
}

#[tokio::test]
async fn test_list_index_sorted_by_name() {
    let (app, store) = test_app(&[]).await;
    save_list(&store, "The Sunday Set", &[], false).await;
    save_list(&store, "Advent", &[], false).await;
    save_list(&store, "Matins", &[], false).await;

    let response = app.clone().oneshot(get("/v1/lists")).await.unwrap();
    let body = body_json(response).await;
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|list| list["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Advent", "Matins", "The Sunday Set"]);

    let response = app.oneshot(get("/v1/lists?q=sunday")).await.unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_list_with_unknown_song_rejected() {
    let (app, _) = test_app(&hymnal()).await;
    let token = login(&app).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/lists",
            json!({ "name": "Broken", "song_ids": [uuid::Uuid::new_v4()] }),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deleting_song_removes_it_from_lists() {
    let songs = hymnal();
    let (app, store) = test_app(&songs).await;
    let list = save_list(&store, "Sunday", &[&songs[0], &songs[1]], true).await;
    let token = login(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/v1/songs/{}", songs[0].id),
            json!({}),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(get(&format!("/v1/lists/{}", list.id)))
        .await
        .unwrap();
    assert_eq!(titles(&body_json(response).await, "songs"), vec!["Amazing Grace"]);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let (app, _) = test_app(&[]).await;
    let token = login(&app).await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/v1/admin/logout", json!({}), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(json_request("POST", "/v1/admin/logout", json!({}), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let _ = lyric_catalog::metrics::init_metrics();
    let (app, _) = test_app(&hymnal()).await;

    app.clone().oneshot(get("/v1/songs?q=grace")).await.unwrap();

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let metrics = parse_prometheus_output(&body_text(response).await);
    assert!(metrics.contains_key("lyric_catalog_search_requests_total"));
    assert!(metrics.contains_key("lyric_catalog_http_requests_total"));
}
