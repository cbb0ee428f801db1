use serde_json::{json, Value};

use crate::helpers::TestApp;

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn get_profile_without_token_is_unauthorized(){
    let app = TestApp::spawn_app().await;

    let response = app.get("/profile", None).await;

    assert_eq!(response.status().as_u16(), 401)
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn get_profile_with_garbage_token_is_unauthorized(){
    let app = TestApp::spawn_app().await;

    let response = app.get("/profile", Some("not-a-token")).await;

    assert_eq!(response.status().as_u16(), 401)
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn profile_can_be_read_and_updated(){
    let app = TestApp::spawn_app().await;
    let customer = app.register_customer("juan@example.com").await;

    let response = app
        .patch(
            "/profile",
            &customer.token,
            &json!({ "address": "45 Mabini St, Quezon City" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let profile: Value = app
        .get("/profile", Some(&customer.token))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(profile["email"], "juan@example.com");
    assert_eq!(profile["address"], "45 Mabini St, Quezon City");
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn empty_profile_update_is_rejected(){
    let app = TestApp::spawn_app().await;
    let customer = app.register_customer("juan@example.com").await;

    let response = app.patch("/profile", &customer.token, &json!({})).await;

    assert_eq!(response.status().as_u16(), 400);
}
