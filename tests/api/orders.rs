use serde_json::{json, Value};
use uuid::Uuid;

use crate::helpers::{TestApp, TestShop};

async fn place_order(
    app: &TestApp,
    shop: &TestShop,
    token: &str,
    body: Value,
) -> reqwest::Response {
    app.post(&format!("/branches/{}/orders", shop.branch_id), Some(token), &body)
        .await
}

async fn order_id(response: reqwest::Response) -> Uuid {
    assert_eq!(response.status().as_u16(), 201);
    let order: Value = response.json().await.unwrap();
    order["order_id"].as_str().unwrap().parse().unwrap()
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn order_totals_are_computed_from_branch_prices() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let service_id = app.create_service(&shop, "Wash & Fold", 60.0).await;
    let detergent: Value = app
        .post(
            &format!("/shops/{}/detergents", shop.shop_id),
            Some(&shop.owner_token),
            &json!({ "name": "Ariel", "kind": "detergent", "price": 15.0 }),
        )
        .await
        .json()
        .await
        .unwrap();
    let detergent_id = detergent["detergent_type_id"].as_str().unwrap();
    app.put(
        &format!("/branches/{}/detergents/{}/price", shop.branch_id, detergent_id),
        &shop.owner_token,
        &json!({ "price": 25.0 }),
    )
    .await;

    let customer = app.register_customer("juan@example.com").await;
    let response = place_order(
        &app,
        &shop,
        &customer.token,
        json!({
            "fulfillment": "dropoff",
            "items": [
                { "service_id": service_id, "quantity": 2.5, "detergent_type_id": detergent_id },
                { "service_id": service_id, "quantity": 1.0 },
            ],
        }),
    )
    .await;

    assert_eq!(response.status().as_u16(), 201);
    let order: Value = response.json().await.unwrap();
    assert_eq!(order["status"], "pending");
    assert_eq!(order["customer_name"], "Juan Dela Cruz");
    assert_eq!(order["total_price"], 235.0);
    assert_eq!(order["items"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn delivery_orders_need_an_address() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let service_id = app.create_service(&shop, "Wash & Fold", 60.0).await;
    let customer = app.register_customer("juan@example.com").await;

    let response = place_order(
        &app,
        &shop,
        &customer.token,
        json!({
            "fulfillment": "delivery",
            "items": [{ "service_id": service_id, "quantity": 1.0 }],
        }),
    )
    .await;

    assert_eq!(response.status().as_u16(), 400);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn services_of_another_shop_cannot_be_ordered() {
    let app = TestApp::spawn_app().await;
    let suds = app.create_shop("Suds").await;
    let bubbles = app.create_shop("Bubbles").await;
    let foreign_service = app.create_service(&bubbles, "Dry Clean", 150.0).await;
    let customer = app.register_customer("juan@example.com").await;

    let response = place_order(
        &app,
        &suds,
        &customer.token,
        json!({
            "fulfillment": "dropoff",
            "items": [{ "service_id": foreign_service, "quantity": 1.0 }],
        }),
    )
    .await;

    assert_eq!(response.status().as_u16(), 400);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn dropoff_order_moves_from_incoming_to_history() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let service_id = app.create_service(&shop, "Wash & Fold", 60.0).await;
    let employee = app.create_staff(&shop, "employee").await;
    let orders_path = format!("/branches/{}/orders", shop.branch_id);

    let order_id = order_id(
        place_order(
            &app,
            &shop,
            &employee.token,
            json!({
                "fulfillment": "dropoff",
                "customer_name": "Walk-in Customer",
                "items": [{ "service_id": service_id, "quantity": 3.0 }],
            }),
        )
        .await,
    )
    .await;

    let incoming: Vec<Value> = app
        .get(&orders_path, Some(&employee.token))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(incoming.len(), 1);

    let response = app
        .post(&format!("/orders/{}/advance", order_id), Some(&employee.token), &json!({}))
        .await;
    assert_eq!(response.status().as_u16(), 409);

    let response = app
        .post(&format!("/orders/{}/accept", order_id), Some(&employee.token), &json!({}))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let accepted: Value = response.json().await.unwrap();
    assert_eq!(accepted["status"], "in_progress");

    let work: Vec<Value> = app
        .get(&format!("{}?queue=work", orders_path), Some(&employee.token))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(work.len(), 1);

    let response = app
        .post(
            &format!("/orders/{}/advance", order_id),
            Some(&employee.token),
            &json!({ "expected_status": "in_progress" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let advanced: Value = response.json().await.unwrap();
    assert_eq!(advanced["status"], "completed");

    let history: Vec<Value> = app
        .get(&format!("{}?queue=history", orders_path), Some(&employee.token))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["total_price"], 180.0);

    let completed: Value = app
        .get(&format!("/orders/{}", order_id), Some(&shop.owner_token))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(completed["completed_by"], employee.user_id.to_string());

    let response = app
        .post(&format!("/orders/{}/advance", order_id), Some(&employee.token), &json!({}))
        .await;
    assert_eq!(response.status().as_u16(), 409);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn an_order_can_only_be_accepted_once() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let service_id = app.create_service(&shop, "Wash & Fold", 60.0).await;
    let first = app.create_staff(&shop, "employee").await;
    let second = app.create_staff(&shop, "employee").await;

    let order_id = order_id(
        place_order(
            &app,
            &shop,
            &first.token,
            json!({
                "fulfillment": "dropoff",
                "customer_name": "Walk-in Customer",
                "items": [{ "service_id": service_id, "quantity": 1.0 }],
            }),
        )
        .await,
    )
    .await;

    let accept_path = format!("/orders/{}/accept", order_id);
    let response = app.post(&accept_path, Some(&first.token), &json!({})).await;
    assert_eq!(response.status().as_u16(), 200);

    let response = app.post(&accept_path, Some(&second.token), &json!({})).await;
    assert_eq!(response.status().as_u16(), 409);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn delivery_staff_complete_delivering_orders() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let service_id = app.create_service(&shop, "Wash & Fold", 60.0).await;
    let employee = app.create_staff(&shop, "employee").await;
    let rider = app.create_staff(&shop, "delivery").await;
    let customer = app.register_customer("juan@example.com").await;

    let order_id = order_id(
        place_order(
            &app,
            &shop,
            &customer.token,
            json!({
                "fulfillment": "delivery",
                "delivery_address": "45 Mabini St, Quezon City",
                "items": [{ "service_id": service_id, "quantity": 1.0 }],
            }),
        )
        .await,
    )
    .await;
    let advance_path = format!("/orders/{}/advance", order_id);

    app.post(&format!("/orders/{}/accept", order_id), Some(&employee.token), &json!({}))
        .await;

    let response = app.post(&advance_path, Some(&rider.token), &json!({})).await;
    assert_eq!(response.status().as_u16(), 403);

    let advanced: Value = app
        .post(&advance_path, Some(&employee.token), &json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(advanced["status"], "delivering");

    let assigned: Vec<Value> = app
        .get("/delivery/orders", Some(&rider.token))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(assigned.len(), 1);

    let response = app
        .post(
            &advance_path,
            Some(&rider.token),
            &json!({ "expected_status": "in_progress" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 409);

    let advanced: Value = app
        .post(&advance_path, Some(&rider.token), &json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(advanced["status"], "completed");

    let mine: Value = app
        .get("/orders/mine", Some(&customer.token))
        .await
        .json()
        .await
        .unwrap();
    assert!(mine["active"].as_array().unwrap().is_empty());
    assert_eq!(mine["history"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn customers_cannot_read_other_customers_orders() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let service_id = app.create_service(&shop, "Wash & Fold", 60.0).await;
    let juan = app.register_customer("juan@example.com").await;
    let ana = app.register_customer("ana@example.com").await;

    let order_id = order_id(
        place_order(
            &app,
            &shop,
            &juan.token,
            json!({
                "fulfillment": "dropoff",
                "items": [{ "service_id": service_id, "quantity": 1.0 }],
            }),
        )
        .await,
    )
    .await;

    let response = app.get(&format!("/orders/{}", order_id), Some(&ana.token)).await;
    assert_eq!(response.status().as_u16(), 403);

    let response = app.get(&format!("/orders/{}", order_id), Some(&juan.token)).await;
    assert_eq!(response.status().as_u16(), 200);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn misspelled_expected_status_is_rejected() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let service_id = app.create_service(&shop, "Wash & Fold", 60.0).await;
    let order_id = app
        .place_walk_in_order(&shop, &shop.owner_token, service_id)
        .await;
    app.post(&format!("/orders/{}/accept", order_id), Some(&shop.owner_token), &json!({}))
        .await;

    let response = app
        .post(
            &format!("/orders/{}/advance", order_id),
            Some(&shop.owner_token),
            &json!({ "expected_status": "inprogress" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);

    let order: Value = app
        .get(&format!("/orders/{}", order_id), Some(&shop.owner_token))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(order["status"], "in_progress");
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn concurrent_advances_complete_an_order_once() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let service_id = app.create_service(&shop, "Wash & Fold", 60.0).await;
    let order_id = app
        .place_walk_in_order(&shop, &shop.owner_token, service_id)
        .await;
    app.post(&format!("/orders/{}/accept", order_id), Some(&shop.owner_token), &json!({}))
        .await;

    let advance_path = format!("/orders/{}/advance", order_id);
    let empty_body = json!({});
    let (first, second) = futures_util::join!(
        app.post(&advance_path, Some(&shop.owner_token), &empty_body),
        app.post(&advance_path, Some(&shop.owner_token), &empty_body)
    );

    let mut statuses = [first.status().as_u16(), second.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, [200, 409]);

    let history: Vec<Value> = app
        .get(
            &format!("/branches/{}/orders?queue=history", shop.branch_id),
            Some(&shop.owner_token),
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn deleting_a_branch_keeps_its_order_history() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let service_id = app.create_service(&shop, "Wash & Fold", 60.0).await;

    let completed = app
        .place_walk_in_order(&shop, &shop.owner_token, service_id)
        .await;
    app.post(&format!("/orders/{}/accept", completed), Some(&shop.owner_token), &json!({}))
        .await;
    let response = app
        .post(&format!("/orders/{}/advance", completed), Some(&shop.owner_token), &json!({}))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let working = app
        .place_walk_in_order(&shop, &shop.owner_token, service_id)
        .await;

    let response = app
        .delete(&format!("/branches/{}", shop.branch_id), &shop.owner_token)
        .await;
    assert_eq!(response.status().as_u16(), 204);

    let response = app
        .get(&format!("/orders/{}", working), Some(&shop.owner_token))
        .await;
    assert_eq!(response.status().as_u16(), 404);

    let response = app
        .get(&format!("/orders/{}", completed), Some(&shop.owner_token))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let entry: Value = response.json().await.unwrap();
    assert!(entry["branch_id"].is_null());
    assert_eq!(entry["shop_id"], shop.shop_id.to_string());
}
