use serde_json::{json, Value};

use crate::helpers::TestApp;

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn owners_cannot_touch_another_shops_catalog() {
    let app = TestApp::spawn_app().await;
    let suds = app.create_shop("Suds").await;
    let bubbles = app.create_shop("Bubbles").await;

    let response = app
        .post(
            &format!("/shops/{}/services", suds.shop_id),
            Some(&bubbles.owner_token),
            &json!({ "name": "Wash & Fold", "unit": "kg", "price": 60.0 }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 403);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn inactive_services_are_hidden_by_default() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let service_id = app.create_service(&shop, "Wash & Fold", 60.0).await;
    app.create_service(&shop, "Dry Clean", 150.0).await;

    let response = app
        .patch(
            &format!("/services/{}", service_id),
            &shop.owner_token,
            &json!({ "is_active": false }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let visible: Vec<Value> = app
        .get(&format!("/shops/{}/services", shop.shop_id), None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0]["name"], "Dry Clean");

    let all: Vec<Value> = app
        .get(
            &format!("/shops/{}/services?include_inactive=true", shop.shop_id),
            Some(&shop.owner_token),
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn negative_prices_are_rejected() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;

    let response = app
        .post(
            &format!("/shops/{}/detergents", shop.shop_id),
            Some(&shop.owner_token),
            &json!({ "name": "Ariel", "kind": "detergent", "price": -5.0 }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn branch_prices_override_the_shop_default() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;

    let detergent: Value = app
        .post(
            &format!("/shops/{}/detergents", shop.shop_id),
            Some(&shop.owner_token),
            &json!({ "name": "Downy", "kind": "softener", "price": 15.0 }),
        )
        .await
        .json()
        .await
        .unwrap();
    let detergent_id = detergent["detergent_type_id"].as_str().unwrap();
    let price_path = format!("/branches/{}/detergents/{}/price", shop.branch_id, detergent_id);
    let list_path = format!("/branches/{}/detergents", shop.branch_id);

    let response = app
        .put(&price_path, &shop.owner_token, &json!({ "price": 20.0 }))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let effective: Vec<Value> = app.get(&list_path, None).await.json().await.unwrap();
    assert_eq!(effective[0]["price"], 20.0);
    assert_eq!(effective[0]["default_price"], 15.0);
    assert_eq!(effective[0]["is_overridden"], true);

    let response = app.delete(&price_path, &shop.owner_token).await;
    assert_eq!(response.status().as_u16(), 204);

    let effective: Vec<Value> = app.get(&list_path, None).await.json().await.unwrap();
    assert_eq!(effective[0]["price"], 15.0);
    assert_eq!(effective[0]["is_overridden"], false);

    let response = app.delete(&price_path, &shop.owner_token).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn staff_can_be_added_and_removed() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let employee = app.create_staff(&shop, "employee").await;
    assert_eq!(employee.roles, vec!["employee".to_string()]);

    let staff: Vec<Value> = app
        .get(&format!("/branches/{}/staff", shop.branch_id), Some(&shop.owner_token))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(staff.len(), 1);
    assert_eq!(staff[0]["role"], "employee");

    let response = app
        .delete(
            &format!("/branches/{}/staff/{}", shop.branch_id, employee.user_id),
            &shop.owner_token,
        )
        .await;
    assert_eq!(response.status().as_u16(), 204);

    let response = app
        .get(&format!("/branches/{}/staff", shop.branch_id), Some(&employee.token))
        .await;
    assert_eq!(response.status().as_u16(), 403);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn renaming_a_shop_to_a_taken_name_conflicts() {
    let app = TestApp::spawn_app().await;
    let suds = app.create_shop("Suds").await;
    app.create_shop("Bubbles").await;

    let response = app
        .patch(
            &format!("/shops/{}", suds.shop_id),
            &suds.owner_token,
            &json!({ "name": "BUBBLES" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 409);

    let response = app
        .patch(
            &format!("/shops/{}", suds.shop_id),
            &suds.owner_token,
            &json!({ "name": "Suds Express" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn branch_hours_replace_the_whole_week() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let hours_path = format!("/branches/{}/hours", shop.branch_id);

    let response = app
        .put(
            &hours_path,
            &shop.owner_token,
            &json!([
                { "day_of_week": 1, "opens_at": "07:00", "closes_at": "21:00" },
                { "day_of_week": 0, "is_closed": true },
            ]),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let hours: Vec<Value> = app.get(&hours_path, None).await.json().await.unwrap();
    assert_eq!(hours.len(), 2);
    assert_eq!(hours[0]["day_of_week"], 0);
    assert_eq!(hours[0]["is_closed"], true);
    assert_eq!(hours[1]["day_of_week"], 1);
    assert_eq!(hours[1]["is_closed"], false);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn invalid_branch_hours_are_rejected() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let hours_path = format!("/branches/{}/hours", shop.branch_id);

    let cases = [
        (
            json!([{ "day_of_week": 1, "opens_at": "18:00", "closes_at": "08:00" }]),
            "closing before opening",
        ),
        (
            json!([{ "day_of_week": 1, "opens_at": "8am", "closes_at": "18:00" }]),
            "unparseable time",
        ),
        (
            json!([{ "day_of_week": 7, "opens_at": "08:00", "closes_at": "18:00" }]),
            "day out of range",
        ),
    ];

    for (body, description) in cases {
        let response = app.put(&hours_path, &shop.owner_token, &body).await;
        assert_eq!(
            response.status().as_u16(),
            400,
            "The API did not reject hours with {}",
            description
        );
    }

    let hours: Vec<Value> = app.get(&hours_path, None).await.json().await.unwrap();
    assert_eq!(hours.len(), 7);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn services_on_working_orders_cannot_be_deleted() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;
    let service_id = app.create_service(&shop, "Wash & Fold", 60.0).await;
    app.place_walk_in_order(&shop, &shop.owner_token, service_id)
        .await;

    let response = app
        .delete(&format!("/services/{}", service_id), &shop.owner_token)
        .await;
    assert_eq!(response.status().as_u16(), 409);

    let unused = app.create_service(&shop, "Dry Clean", 150.0).await;
    let response = app
        .delete(&format!("/services/{}", unused), &shop.owner_token)
        .await;
    assert_eq!(response.status().as_u16(), 204);
}

#[actix_web::test]
#[ignore] // Requires running PostgreSQL instance
async fn detergents_can_be_updated_and_deleted() {
    let app = TestApp::spawn_app().await;
    let shop = app.create_shop("Suds").await;

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
    let detergent_path = format!("/detergents/{}", detergent_id);

    let response = app
        .patch(&detergent_path, &shop.owner_token, &json!({ "price": 18.5 }))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["price"], 18.5);
    assert_eq!(updated["name"], "Ariel");

    let response = app.delete(&detergent_path, &shop.owner_token).await;
    assert_eq!(response.status().as_u16(), 204);

    let listed: Vec<Value> = app
        .get(&format!("/shops/{}/detergents", shop.shop_id), None)
        .await
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());

    let response = app.delete(&detergent_path, &shop.owner_token).await;
    assert_eq!(response.status().as_u16(), 404);
}
