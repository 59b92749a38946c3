use crate::e2e::helpers;

use helpers::{TestContext, ADMIN_EMAIL};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_forbid_admin_routes_for_regular_users(ctx: &TestContext) {
    let user = ctx.sign_up("sara@example.com").await;

    let response = ctx
        .client
        .get_with_auth("/api/admin/users", &user.token)
        .await
        .unwrap();
    response.assert_status(StatusCode::FORBIDDEN);

    let response = ctx.client.get("/api/admin/stats").await.unwrap();
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_and_search_users(ctx: &TestContext) {
    let admin = ctx.sign_up(ADMIN_EMAIL).await;
    ctx.fixtures.create_user("sara@example.com").await.unwrap();
    let reza = ctx.fixtures.create_user("reza@mail.ir").await.unwrap();

    let response = ctx
        .client
        .get_with_auth("/api/admin/users", &admin.token)
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.body.as_ref().unwrap().as_array().unwrap().len(), 3);

    let response = ctx
        .client
        .get_with_auth("/api/admin/users?search=EXAMPLE", &admin.token)
        .await
        .unwrap();
    let emails: Vec<&str> = response
        .body
        .as_ref()
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, vec!["sara@example.com"]);

    let fragment = &reza.id.to_string()[..8];
    let response = ctx
        .client
        .get_with_auth(&format!("/api/admin/users?search={}", fragment), &admin.token)
        .await
        .unwrap();
    let found = response.body.as_ref().unwrap().as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["email"], json!("reza@mail.ir"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_compute_revenue_from_pro_users(ctx: &TestContext) {
    let admin = ctx.sign_up(ADMIN_EMAIL).await;
    ctx.fixtures.create_pro_user("one@example.com").await.unwrap();
    ctx.fixtures.create_pro_user("two@example.com").await.unwrap();
    ctx.fixtures.create_user("three@example.com").await.unwrap();

    let response = ctx
        .client
        .get_with_auth("/api/admin/stats", &admin.token)
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);

    let stats = response.body.as_ref().unwrap();
    assert_eq!(stats["total_users"], json!(4));
    assert_eq!(stats["pro_users"], json!(2));
    // rust_decimal serializes as a string
    assert_eq!(stats["total_revenue"], json!("98000"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_update_user_and_their_sessions(ctx: &TestContext) {
    let admin = ctx.sign_up(ADMIN_EMAIL).await;
    let user = ctx.sign_up("sara@example.com").await;

    let response = ctx
        .client
        .patch_with_auth(
            &format!("/api/admin/users/{}", user.id),
            &json!({ "is_pro": true, "email": "sara.new@example.com" }),
            &admin.token,
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.body.as_ref().unwrap()["is_pro"], json!(true));

    let response = ctx.client.get_with_auth("/api/session", &user.token).await.unwrap();
    let session = response.body.as_ref().unwrap();
    assert_eq!(session["is_pro"], json!(true));
    assert_eq!(session["email"], json!("sara.new@example.com"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_hand_out_the_admin_email(ctx: &TestContext) {
    ctx.fixtures.create_admin("ops@replylens.com").await.unwrap();
    let admin = ctx.sign_in("ops@replylens.com").await;
    let user = ctx.fixtures.create_user("sara@example.com").await.unwrap();

    let response = ctx
        .client
        .patch_with_auth(
            &format!("/api/admin/users/{}", user.id),
            &json!({ "email": ADMIN_EMAIL }),
            &admin.token,
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::CONFLICT)
        .assert_error_message("This email is reserved for the administrator.");
    let stored = ctx.fixtures.find_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.email, "sara@example.com");

    // The real administrator can still sign up
    let owner = ctx.sign_up(ADMIN_EMAIL).await;
    let session = ctx
        .client
        .get_with_auth("/api/session", &owner.token)
        .await
        .unwrap();
    assert_eq!(session.body.as_ref().unwrap()["is_admin"], json!(true));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_email_taken_by_another_user(ctx: &TestContext) {
    let admin = ctx.sign_up(ADMIN_EMAIL).await;
    let user = ctx.fixtures.create_user("sara@example.com").await.unwrap();
    ctx.fixtures.create_user("reza@example.com").await.unwrap();

    let response = ctx
        .client
        .patch_with_auth(
            &format!("/api/admin/users/{}", user.id),
            &json!({ "email": "reza@example.com" }),
            &admin.token,
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::CONFLICT)
        .assert_error_message("This email is already registered.");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_never_modify_or_delete_an_admin(ctx: &TestContext) {
    let admin = ctx.sign_up(ADMIN_EMAIL).await;
    let other_admin = ctx.fixtures.create_admin("ops@replylens.com").await.unwrap();

    for target in [admin.id, other_admin.id] {
        let response = ctx
            .client
            .patch_with_auth(
                &format!("/api/admin/users/{}", target),
                &json!({ "is_pro": true }),
                &admin.token,
            )
            .await
            .unwrap();
        response.assert_status(StatusCode::FORBIDDEN);

        let response = ctx
            .client
            .delete_with_auth(&format!("/api/admin/users/{}", target), &admin.token)
            .await
            .unwrap();
        response.assert_status(StatusCode::FORBIDDEN);

        let stored = ctx.fixtures.find_user(target).await.unwrap().unwrap();
        assert!(!stored.is_pro);
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_delete_user_and_revoke_sessions(ctx: &TestContext) {
    let admin = ctx.sign_up(ADMIN_EMAIL).await;
    let user = ctx.sign_up("sara@example.com").await;

    let response = ctx
        .client
        .delete_with_auth(&format!("/api/admin/users/{}", user.id), &admin.token)
        .await
        .unwrap();
    response.assert_status(StatusCode::NO_CONTENT);

    assert!(ctx.fixtures.find_user(user.id).await.unwrap().is_none());
    assert_eq!(ctx.fixtures.count_sessions(user.id).await.unwrap(), 0);

    let response = ctx.client.get_with_auth("/api/session", &user.token).await.unwrap();
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_unknown_user(ctx: &TestContext) {
    let admin = ctx.sign_up(ADMIN_EMAIL).await;

    let response = ctx
        .client
        .delete_with_auth(
            &format!("/api/admin/users/{}", uuid::Uuid::new_v4()),
            &admin.token,
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
}
