use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};
use serde_json::{json, Value};

use crate::helpers::TestApp;

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn post_registration_without_body_fails() {
    let app = TestApp::spawn_app().await;

    let response = app
        .api_client
        .post(format!("{}/register", app.get_app_url()))
        .send()
        .await
        .expect("Failed to send request to register endpoint");

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn post_registration_creates_a_customer() {
    let app = TestApp::spawn_app().await;

    let customer = app.register_customer("juan@example.com").await;
    assert_eq!(customer.roles, vec!["customer".to_string()]);

    let stored = {
        use laundry::schema::users;

        let mut conn = app.pool.get().unwrap();
        users::table
            .filter(users::email.eq("juan@example.com"))
            .select(users::name)
            .first::<String>(&mut conn)
            .unwrap()
    };
    assert_eq!(stored, "Juan Dela Cruz");
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn post_registration_with_invalid_data_is_rejected() {
    let app = TestApp::spawn_app().await;

    let cases = [
        (
            json!({
                "name": "Juan", "email": "not-an-email",
                "password": "customer-password", "confirm_password": "customer-password"
            }),
            "invalid email",
        ),
        (
            json!({
                "name": "Juan", "email": "juan@example.com",
                "password": "customer-password", "confirm_password": "different-password"
            }),
            "mismatched passwords",
        ),
        (
            json!({
                "name": "Juan", "email": "juan@example.com",
                "password": "short", "confirm_password": "short"
            }),
            "short password",
        ),
    ];

    for (body, description) in cases {
        let response = app.post("/register", None, &body).await;
        assert_eq!(
            response.status().as_u16(),
            400,
            "The API did not reject a registration with {}",
            description
        );
    }
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn registering_the_same_email_twice_conflicts() {
    let app = TestApp::spawn_app().await;
    app.register_customer("juan@example.com").await;

    let response = app
        .post(
            "/register",
            None,
            &json!({
                "name": "Juan Again",
                "email": "juan@example.com",
                "password": "customer-password",
                "confirm_password": "customer-password",
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 409);
}
