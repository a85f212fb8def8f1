use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use std::sync::atomic::Ordering;

mod common;

use common::{FakeIdentity, SERVICE_TOKEN, json_request, send};
use userservice::constants::badges::{PROFILE_COMPLETE, PROFILE_PHOTO_UPLOADED};

fn bearer_get(uri: &str, subject: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(
            "Authorization",
            format!("Bearer {}", FakeIdentity::access_token_for(subject)),
        )
        .body(Body::empty())
        .unwrap()
}

fn bearer_json(method: &str, uri: &str, subject: &str, body: &serde_json::Value) -> Request<Body> {
    let mut request = json_request(method, uri, body);
    request.headers_mut().insert(
        "Authorization",
        format!("Bearer {}", FakeIdentity::access_token_for(subject))
            .parse()
            .unwrap(),
    );
    request
}

fn multipart_photo(subject: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    const BOUNDARY: &str = "XUSERSERVICEBOUNDARY";

    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"me\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/users/me/profile-photo")
        .header(
            "Authorization",
            format!("Bearer {}", FakeIdentity::access_token_for(subject)),
        )
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let ctx = common::spawn().await;
    let app = ctx.router();

    let (status, body) = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn test_register_and_duplicate() {
    let ctx = common::spawn().await;
    let app = ctx.router();
    let payload = json!({
        "email": "ada@example.com",
        "password": "secret1",
        "first_name": "Ada",
        "last_name": "Lovelace",
    });

    let (status, body) = send(&app, json_request("POST", "/users/register", &payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert!(body["data"].get("password_hash").is_none());

    let (status, _) = send(&app, json_request("POST", "/users/register", &payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_returns_tokens() {
    let ctx = common::spawn().await;
    let user = ctx.register("ada@example.com", "Ada", "Lovelace").await;
    let app = ctx.router();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            &json!({"email": "ada@example.com", "password": common::PASSWORD}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["access_token"],
        FakeIdentity::access_token_for(&user.keycloak_id)
    );

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            &json!({"email": "ada@example.com", "password": "wrong1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forgot_password_does_not_reveal_accounts() {
    let ctx = common::spawn().await;
    ctx.register("ada@example.com", "Ada", "Lovelace").await;
    let app = ctx.router();

    let (known_status, known_body) = send(
        &app,
        json_request(
            "POST",
            "/auth/forgot-password",
            &json!({"email": "ada@example.com"}),
        ),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        json_request(
            "POST",
            "/auth/forgot-password",
            &json!({"email": "nobody@example.com"}),
        ),
    )
    .await;

    assert_eq!(known_status, StatusCode::OK);
    assert_eq!(unknown_status, StatusCode::OK);
    assert_eq!(known_body, unknown_body);
    assert_eq!(
        known_body["data"]["message"],
        "if the email exists, a reset link will be sent"
    );

    let (status, body) = send(
        &app,
        json_request("POST", "/auth/forgot-password", &json!({"email": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email is required");
}

#[tokio::test]
async fn test_forgot_password_notifies_normalised_address() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path("/notifications"))
        .respond_with(wiremock::ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let mut config = common::test_config();
    config.notifications.url = format!("{}/notifications", server.uri());
    let ctx = common::spawn_with_config(config).await;
    ctx.register("ada@example.com", "Ada", "Lovelace").await;
    let app = ctx.router();

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/auth/forgot-password",
            &json!({"email": "  Ada@Example.COM "}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Delivery runs on a detached task.
    let mut received = Vec::new();
    for _ in 0..50 {
        received = server.received_requests().await.unwrap_or_default();
        if !received.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(received.len(), 1);

    let payload: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(payload["email"], "ada@example.com");

    let token = payload["token"].as_str().unwrap();
    let record = ctx
        .shared
        .store
        .find_valid_reset_token(
            &userservice::security::hash_token(token),
            chrono::Utc::now(),
        )
        .await
        .unwrap()
        .expect("token row missing");
    assert_eq!(record.email, "ada@example.com");
}

#[tokio::test]
async fn test_reset_password_status_codes() {
    let ctx = common::spawn().await;
    ctx.register("ada@example.com", "Ada", "Lovelace").await;
    let app = ctx.router();

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/auth/reset-password",
            &json!({"token": "", "new_password": "newpass7"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/reset-password",
            &json!({"token": "not-a-real-token", "new_password": "newpass7"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid or expired token");

    let raw = ctx
        .shared
        .reset_service
        .request_reset("ada@example.com")
        .await
        .unwrap();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/reset-password",
            &json!({"token": raw, "new_password": "newpass7"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "password updated");

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/auth/reset-password",
            &json!({"token": raw, "new_password": "newpass8"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_internal_award_requires_service_token() {
    let ctx = common::spawn().await;
    let user = ctx.register("ada@example.com", "Ada", "Lovelace").await;
    let app = ctx.router();
    let payload = json!({"user_id": user.id, "badge_key": PROFILE_COMPLETE});

    let (status, _) = send(&app, json_request("POST", "/internal/badges/award", &payload)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut wrong = json_request("POST", "/internal/badges/award", &payload);
    wrong
        .headers_mut()
        .insert("X-Service-Token", "guess".parse().unwrap());
    let (status, _) = send(&app, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    for _ in 0..2 {
        let mut request = json_request("POST", "/internal/badges/award", &payload);
        request
            .headers_mut()
            .insert("X-Service-Token", SERVICE_TOKEN.parse().unwrap());
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
    }

    let grants = ctx.shared.badge_service.grants_for_user(user.id).await.unwrap();
    assert_eq!(grants.len(), 1);

    let mut malformed = json_request(
        "POST",
        "/internal/badges/award",
        &json!({"user_id": "42", "badge_key": PROFILE_COMPLETE}),
    );
    malformed
        .headers_mut()
        .insert("X-Service-Token", SERVICE_TOKEN.parse().unwrap());
    let (status, _) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_configured_service_token_rejects_everything() {
    let mut config = common::test_config();
    config.internal.service_token = String::new();
    let ctx = common::spawn_with_config(config).await;
    let app = ctx.router();

    let request = Request::builder()
        .uri("/internal/users/ada@example.com")
        .header("X-Service-Token", "")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_routes_require_valid_token() {
    let ctx = common::spawn().await;
    let user = ctx.register("ada@example.com", "Ada", "Lovelace").await;
    let app = ctx.router();

    let (status, _) = send(
        &app,
        Request::builder()
            .uri("/users/me/badges")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, bearer_get("/users/me/badges", "kc-unknown")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, bearer_get("/users/me/badges", &user.keycloak_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_profile_completion_awards_badges() {
    let ctx = common::spawn().await;
    let user = ctx.register("ada@example.com", "Ada", "Lovelace").await;
    let app = ctx.router();
    let sub = user.keycloak_id.as_str();

    let (status, body) = send(
        &app,
        bearer_json(
            "PUT",
            "/users/me",
            sub,
            &json!({
                "phone_number": "0612345678",
                "country": "NL",
                "job_function": "Engineer",
                "sector": "ICT",
                "biography": "Analytical engines",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["country"], "NL");

    // Everything but the photo: not complete yet.
    let (_, body) = send(&app, bearer_get("/users/me/badges", sub)).await;
    assert_eq!(body["data"], json!([]));

    let (status, body) = send(&app, multipart_photo(sub, "image/png", b"\x89PNG fake")).await;
    assert_eq!(status, StatusCode::OK);
    let expected_url = format!("{}/users/{sub}/profile.png", common::PUBLIC_BASE_URL);
    assert_eq!(body["data"]["url"], expected_url);
    assert!(
        ctx.objects
            .objects
            .lock()
            .unwrap()
            .contains_key(&format!("users/{sub}/profile.png"))
    );

    let (_, body) = send(&app, bearer_get("/users/me/badges", sub)).await;
    let keys: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys.len(), 2);
    assert!(keys.contains(&PROFILE_PHOTO_UPLOADED));
    assert!(keys.contains(&PROFILE_COMPLETE));

    // A second update does not duplicate the completion badge.
    let (status, _) = send(
        &app,
        bearer_json("PUT", "/users/me", sub, &json!({"biography": "Notes on the engine"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let grants = ctx.shared.badge_service.grants_for_user(user.id).await.unwrap();
    assert_eq!(grants.len(), 2);

    let (status, body) = send(&app, bearer_get("/users/me/profile-photo/url", sub)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body["data"]["url"]
            .as_str()
            .unwrap()
            .contains("X-Amz-Expires=600")
    );
}

#[tokio::test]
async fn test_profile_photo_rejects_other_types() {
    let ctx = common::spawn().await;
    let user = ctx.register("ada@example.com", "Ada", "Lovelace").await;
    let app = ctx.router();

    let (status, _) = send(
        &app,
        multipart_photo(&user.keycloak_id, "image/gif", b"GIF89a"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(ctx.objects.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_photo_storage_outage_is_reported_as_storage() {
    let ctx = common::spawn().await;
    let user = ctx.register("ada@example.com", "Ada", "Lovelace").await;
    let app = ctx.router();
    ctx.objects.fail_puts.store(true, Ordering::SeqCst);

    let (status, body) = send(
        &app,
        multipart_photo(&user.keycloak_id, "image/png", b"\x89PNG fake"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Object storage service is unavailable");

    let stored = ctx.shared.user_service.get_by_id(user.id).await.unwrap();
    assert!(stored.profile_photo_url.is_empty());
    let grants = ctx.shared.badge_service.grants_for_user(user.id).await.unwrap();
    assert!(grants.is_empty());
}

#[tokio::test]
async fn test_filling_last_profile_field_awards_completion_once() {
    let ctx = common::spawn().await;
    let user = ctx.register("ada@example.com", "Ada", "Lovelace").await;
    let app = ctx.router();
    let sub = user.keycloak_id.as_str();

    let (status, _) = send(&app, multipart_photo(sub, "image/png", b"\x89PNG fake")).await;
    assert_eq!(status, StatusCode::OK);

    // Everything except the biography.
    let (status, _) = send(
        &app,
        bearer_json(
            "PUT",
            "/users/me",
            sub,
            &json!({
                "phone_number": "0612345678",
                "country": "NL",
                "job_function": "Engineer",
                "sector": "ICT",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let grants = ctx.shared.badge_service.grants_for_user(user.id).await.unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].badge_key, PROFILE_PHOTO_UPLOADED);

    let (status, _) = send(
        &app,
        bearer_json("PUT", "/users/me", sub, &json!({"biography": "Analytical engines"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let completion_count = |grants: &[userservice::db::BadgeGrant]| {
        grants
            .iter()
            .filter(|g| g.badge_key == PROFILE_COMPLETE)
            .count()
    };
    let grants = ctx.shared.badge_service.grants_for_user(user.id).await.unwrap();
    assert_eq!(completion_count(&grants), 1);

    let (status, _) = send(
        &app,
        bearer_json("PUT", "/users/me", sub, &json!({"biography": "Notes on the engine"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let grants = ctx.shared.badge_service.grants_for_user(user.id).await.unwrap();
    assert_eq!(completion_count(&grants), 1);
    assert_eq!(grants.len(), 2);
}

#[tokio::test]
async fn test_notification_settings_update() {
    let ctx = common::spawn().await;
    let user = ctx.register("ada@example.com", "Ada", "Lovelace").await;
    let app = ctx.router();
    let sub = user.keycloak_id.as_str();

    let (status, body) = send(
        &app,
        bearer_json(
            "PUT",
            "/users/me/notification-settings",
            sub,
            &json!({"system_push": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "system_alert settings cannot be modified");

    let (status, _) = send(
        &app,
        bearer_json(
            "PUT",
            "/users/me/notification-settings",
            sub,
            &json!({"like_pish": false}),
        ),
    )
    .await;
    assert!(status.is_client_error());

    let (status, body) = send(
        &app,
        bearer_json(
            "PUT",
            "/users/me/notification-settings",
            sub,
            &json!({"like_push": false, "expo_push_token": " ExponentPushToken[abc] "}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["settings"]["like"]["push"], false);
    assert_eq!(body["data"]["settings"]["like"]["email"], true);
    assert!(body["data"]["settings"].get("system_alert").is_none());
    assert_eq!(body["data"]["expo_push_token"], "ExponentPushToken[abc]");

    let internal = Request::builder()
        .uri("/internal/users/ada@example.com/notification-settings")
        .header("X-Service-Token", SERVICE_TOKEN)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, internal).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["settings"]["system_alert"]["push"], false);
    assert_eq!(body["data"]["settings"]["like"]["push"], false);
}

#[tokio::test]
async fn test_discovery_and_interests() {
    let ctx = common::spawn().await;
    let user = ctx.register("ada@example.com", "Ada", "Lovelace").await;
    let app = ctx.router();
    let sub = user.keycloak_id.as_str();

    let (_, body) = send(&app, bearer_get("/users/me/discovery-preferences", sub)).await;
    assert_eq!(body["data"]["radius_km"], 50);

    let (status, _) = send(
        &app,
        bearer_json(
            "PUT",
            "/users/me/discovery-preferences",
            sub,
            &json!({"radius_km": 501}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        bearer_json(
            "PUT",
            "/users/me/discovery-preferences",
            sub,
            &json!({"radius_km": 25}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["radius_km"], 25);

    let (_, body) = send(&app, bearer_get("/users/me/interests", sub)).await;
    let interests = body["data"].as_array().unwrap().clone();
    assert_eq!(interests.len(), userservice::constants::interests::CATALOG.len());
    assert!(interests.iter().all(|i| i["value"] == false));

    let first_id = interests[0]["id"].as_i64().unwrap();
    let (status, body) = send(
        &app,
        bearer_json(
            "PUT",
            "/users/me/interests",
            sub,
            &json!({"interests": [{"id": first_id, "value": true}]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["value"], true);
    assert_eq!(body["data"][1]["value"], false);

    let (status, _) = send(
        &app,
        bearer_json(
            "PUT",
            "/users/me/interests",
            sub,
            &json!({"interests": [{"id": 9999, "value": true}]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_lookups() {
    let ctx = common::spawn().await;
    let user = ctx.register("ada@example.com", "Ada", "Lovelace").await;
    let other = ctx.register("grace@example.com", "Grace", "Hopper").await;
    let app = ctx.router();

    let (status, body) = send(
        &app,
        Request::builder()
            .uri(format!("/users/keycloak/{}", user.keycloak_id))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], user.id.to_string());

    let (status, body) = send(&app, bearer_get("/users/ada/LOVELACE", &other.keycloak_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert!(body["data"].get("phone_number").is_none());

    let (status, _) = send(
        &app,
        Request::builder()
            .uri("/users/keycloak/kc-missing")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
