use crate::e2e::helpers;

use helpers::{TestContext, ADMIN_EMAIL, TEST_PASSWORD};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_sign_up_a_free_user(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/auth/signup",
            &json!({ "email": "  Sara@Example.com ", "password": TEST_PASSWORD }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);

    let body = response.body.as_ref().unwrap();
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["expires_in"], json!(ctx.config.jwt_expiration_hours * 3600));
    assert_eq!(body["user"]["email"], json!("sara@example.com"));
    assert_eq!(body["user"]["is_pro"], json!(false));
    assert_eq!(body["user"]["is_admin"], json!(false));
    assert!(body["user"].get("password_hash").is_none());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_duplicate_email(ctx: &TestContext) {
    ctx.sign_up("sara@example.com").await;

    let response = ctx
        .client
        .post(
            "/auth/signup",
            &json!({ "email": "SARA@example.com", "password": "another-password" }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::CONFLICT)
        .assert_error_message("This email is already registered.");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_validate_signup_input(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/auth/signup", &json!({ "email": "not-an-email", "password": TEST_PASSWORD }))
        .await
        .unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = ctx
        .client
        .post("/auth/signup", &json!({ "email": "sara@example.com", "password": "12345" }))
        .await
        .unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_flag_the_configured_admin_email(ctx: &TestContext) {
    let admin = ctx.sign_up(ADMIN_EMAIL).await;

    let response = ctx.client.get_with_auth("/api/session", &admin.token).await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body.as_ref().unwrap()["is_admin"], json!(true));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_sign_in_with_correct_credentials(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("reza@example.com").await.unwrap();

    let signed_in = ctx.sign_in("reza@example.com").await;

    assert_eq!(signed_in.id, user.id);
    assert_eq!(signed_in.email, "reza@example.com");
    assert_eq!(ctx.fixtures.count_sessions(user.id).await.unwrap(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_never_return_a_session_for_wrong_credentials(ctx: &TestContext) {
    let user = ctx.fixtures.create_user("reza@example.com").await.unwrap();

    let wrong_password = ctx
        .client
        .post(
            "/auth/signin",
            &json!({ "email": "reza@example.com", "password": "wrong-password" }),
        )
        .await
        .unwrap();
    let unknown_email = ctx
        .client
        .post(
            "/auth/signin",
            &json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }),
        )
        .await
        .unwrap();

    for response in [&wrong_password, &unknown_email] {
        response
            .assert_status(StatusCode::UNAUTHORIZED)
            .assert_error_message("Invalid email or password.");
        assert!(response.body.as_ref().unwrap().get("token").is_none());
    }
    assert_eq!(ctx.fixtures.count_sessions(user.id).await.unwrap(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_sign_out_and_invalidate_the_token(ctx: &TestContext) {
    let user = ctx.sign_up("sara@example.com").await;

    let response = ctx
        .client
        .post_empty_with_auth("/auth/signout", &user.token)
        .await
        .unwrap();
    response.assert_status(StatusCode::NO_CONTENT);

    let response = ctx.client.get_with_auth("/api/session", &user.token).await.unwrap();
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_missing_or_malformed_tokens(ctx: &TestContext) {
    let response = ctx.client.get("/api/session").await.unwrap();
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = ctx
        .client
        .get_with_auth("/api/session", "not-a-jwt")
        .await
        .unwrap();
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_upgrade_every_session_of_the_user(ctx: &TestContext) {
    let first = ctx.sign_up("sara@example.com").await;
    let second = ctx.sign_in("sara@example.com").await;

    let response = ctx
        .client
        .post_empty_with_auth("/api/subscription/upgrade", &first.token)
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.body.as_ref().unwrap()["is_pro"], json!(true));

    // The other device sees the upgrade without signing in again
    let response = ctx.client.get_with_auth("/api/session", &second.token).await.unwrap();
    assert_eq!(response.body.as_ref().unwrap()["is_pro"], json!(true));

    let stored = ctx.fixtures.find_user(first.id).await.unwrap().unwrap();
    assert!(stored.is_pro);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_stream_session_changes(ctx: &TestContext) {
    let user = ctx.sign_up("sara@example.com").await;

    let mut stream = ctx
        .client
        .open_stream("/api/session/events", &user.token)
        .await
        .unwrap();
    assert_eq!(stream.status, StatusCode::OK);

    let snapshot = stream.next_event().await.unwrap();
    assert_eq!(snapshot.event, "session");
    assert_eq!(snapshot.data["is_pro"], json!(false));

    ctx.client
        .post_empty_with_auth("/api/subscription/upgrade", &user.token)
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let update = tokio::time::timeout(std::time::Duration::from_secs(5), stream.next_event())
        .await
        .expect("no session event received")
        .unwrap();
    assert_eq!(update.event, "updated");
    assert_eq!(update.data["type"], json!("updated"));
    assert_eq!(update.data["session"]["is_pro"], json!(true));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_keep_sign_out_events_to_the_session_that_ended(ctx: &TestContext) {
    let laptop = ctx.sign_up("sara@example.com").await;
    let phone = ctx.sign_in("sara@example.com").await;

    let mut stream = ctx
        .client
        .open_stream("/api/session/events", &phone.token)
        .await
        .unwrap();
    assert_eq!(stream.next_event().await.unwrap().event, "session");

    ctx.client
        .post_empty_with_auth("/auth/signout", &laptop.token)
        .await
        .unwrap()
        .assert_status(StatusCode::NO_CONTENT);

    // Nothing reaches the phone, and its session is still good
    let leaked =
        tokio::time::timeout(std::time::Duration::from_millis(500), stream.next_event()).await;
    assert!(leaked.is_err(), "other session received {:?}", leaked);
    ctx.client
        .get_with_auth("/api/session", &phone.token)
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    ctx.client
        .post_empty_with_auth("/auth/signout", &phone.token)
        .await
        .unwrap()
        .assert_status(StatusCode::NO_CONTENT);

    let own = tokio::time::timeout(std::time::Duration::from_secs(5), stream.next_event())
        .await
        .expect("no sign out event received")
        .unwrap();
    assert_eq!(own.event, "signed_out");
    assert_eq!(own.data["user_id"], json!(phone.id.to_string()));

    let end = tokio::time::timeout(std::time::Duration::from_secs(5), stream.next_event_or_end())
        .await
        .expect("stream stayed open after sign out")
        .unwrap();
    assert!(end.is_none());
}
