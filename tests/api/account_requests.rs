use serde_json::{json, Value};

use crate::helpers::TestApp;

fn request_body(email: &str, shop_name: &str) -> Value {
    json!({
        "name": "Maria Santos",
        "email": email,
        "shop_name": shop_name,
        "branch_name": "Main",
        "branch_address": "12 Rizal St, Makati",
    })
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn account_request_starts_pending() {
    let app = TestApp::spawn_app().await;

    let response = app
        .post("/account-requests", None, &request_body("maria@example.com", "Suds"))
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let request: Value = response.json().await.unwrap();
    assert_eq!(request["status"], "pending");
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn shop_names_are_unique_regardless_of_case() {
    let app = TestApp::spawn_app().await;
    app.create_shop("Suds & Bubbles").await;

    let response = app
        .post(
            "/account-requests",
            None,
            &request_body("other@example.com", "suds & bubbles"),
        )
        .await;

    assert_eq!(response.status().as_u16(), 409);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn only_superadmins_can_review_requests() {
    let app = TestApp::spawn_app().await;
    let customer = app.register_customer("juan@example.com").await;

    let response = app
        .get("/admin/account-requests", Some(&customer.token))
        .await;

    assert_eq!(response.status().as_u16(), 403);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn approved_owner_can_manage_their_shop() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;

    let shops: Vec<Value> = app
        .get("/shops", Some(&shop.owner_token))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(shops.len(), 1);
    assert_eq!(shops[0]["shop_id"], shop.shop_id.to_string());

    let branches: Vec<Value> = app
        .get(&format!("/shops/{}/branches", shop.shop_id), None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0]["branch_id"], shop.branch_id.to_string());

    let hours: Vec<Value> = app
        .get(&format!("/branches/{}/hours", shop.branch_id), None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(hours.len(), 7);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn a_request_can_only_be_reviewed_once() {
    let app = TestApp::spawn_app().await;
    let admin = app.superadmin_token().await;

    let request: Value = app
        .post("/account-requests", None, &request_body("maria@example.com", "Suds"))
        .await
        .json()
        .await
        .unwrap();
    let request_id = request["request_id"].as_str().unwrap();

    let response = app
        .post(
            &format!("/admin/account-requests/{}/reject", request_id),
            Some(&admin),
            &json!({ "reason": "Incomplete details" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let rejected: Value = response.json().await.unwrap();
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(rejected["rejection_reason"], "Incomplete details");

    let response = app
        .post(
            &format!("/admin/account-requests/{}/approve", request_id),
            Some(&admin),
            &json!({}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 409);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn approvals_are_audited() {
    let app = TestApp::spawn_app().await;
    app.create_shop("Suds").await;
    let admin = app.superadmin_token().await;

    let logs: Vec<Value> = app
        .get("/admin/audit-logs?entity_type=account_request", Some(&admin))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["action"], "account_request.approved");
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn deleting_an_owner_removes_their_shops() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let admin = app.superadmin_token().await;

    let response = app
        .delete(&format!("/admin/owners/{}", shop.owner_id), &admin)
        .await;
    assert_eq!(response.status().as_u16(), 204);

    let response = app.get(&format!("/shops/{}/branches", shop.shop_id), None).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn one_pending_request_per_email() {
    let app = TestApp::spawn_app().await;

    let response = app
        .post("/account-requests", None, &request_body("maria@example.com", "Suds"))
        .await;
    assert_eq!(response.status().as_u16(), 201);

    let response = app
        .post("/account-requests", None, &request_body("maria@example.com", "Bubbles"))
        .await;
    assert_eq!(response.status().as_u16(), 409);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn admin_lists_shops_and_their_owners() {
    let app = TestApp::spawn_app().await;
    let suds = app.create_shop("Suds").await;
    app.create_shop("Bubbles").await;
    let admin = app.superadmin_token().await;

    let shops: Vec<Value> = app
        .get("/admin/shops", Some(&admin))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(shops.len(), 2);
    let listed = shops
        .iter()
        .find(|s| s["shop_id"] == suds.shop_id.to_string())
        .unwrap();
    assert_eq!(listed["owner_name"], "Maria Santos");

    let owners: Vec<Value> = app
        .get("/admin/owners", Some(&admin))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(owners.len(), 2);
    let owner = owners
        .iter()
        .find(|o| o["user_id"] == suds.owner_id.to_string())
        .unwrap();
    assert_eq!(owner["shops"][0]["name"], "Suds");

    let response = app.get("/admin/shops?page=2&limit=1", Some(&admin)).await;
    let page: Vec<Value> = response.json().await.unwrap();
    assert_eq!(page.len(), 1);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn deleting_a_shop_with_working_orders_cascades() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let service_id = app.create_service(&shop, "Wash & Fold", 60.0).await;
    let order_id = app
        .place_walk_in_order(&shop, &shop.owner_token, service_id)
        .await;
    let admin = app.superadmin_token().await;

    let response = app
        .delete(&format!("/admin/shops/{}", shop.shop_id), &admin)
        .await;
    assert_eq!(response.status().as_u16(), 204);

    let response = app.get(&format!("/orders/{}", order_id), Some(&admin)).await;
    assert_eq!(response.status().as_u16(), 404);
    let response = app.get(&format!("/shops/{}/branches", shop.shop_id), None).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn deleting_an_owner_with_working_orders_cascades() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let service_id = app.create_service(&shop, "Wash & Fold", 60.0).await;
    app.place_walk_in_order(&shop, &shop.owner_token, service_id)
        .await;
    let admin = app.superadmin_token().await;

    let response = app
        .delete(&format!("/admin/owners/{}", shop.owner_id), &admin)
        .await;
    assert_eq!(response.status().as_u16(), 204);

    let shops: Vec<Value> = app
        .get("/admin/shops", Some(&admin))
        .await
        .json()
        .await
        .unwrap();
    assert!(shops.is_empty());
}
