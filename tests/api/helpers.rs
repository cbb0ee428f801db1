use diesel::{Connection, PgConnection, RunQueryDsl};
use laundry::{
    configuration::{DatabaseSettings, Settings, SuperadminSettings},
    startup::{get_connection_pool, Application},
    telemetry::{get_subscriber, init_subscriber},
    utils::DbPool,
};
use once_cell::sync::Lazy;
use reqwest::redirect::Policy;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

static LOGGER_INSTANCE: Lazy<()> = Lazy::new(|| {
    let log_level = "info".to_string();
    let name = "laundry-test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(name, log_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(name, log_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub const SUPERADMIN_EMAIL: &str = "root@laundry.test";
pub const SUPERADMIN_PASSWORD: &str = "superadmin-password";

#[derive(Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

// A freshly approved shop: its owner's credentials and first branch
#[derive(Debug)]
pub struct TestShop {
    pub owner_token: String,
    pub owner_id: Uuid,
    pub shop_id: Uuid,
    pub branch_id: Uuid,
}

pub struct TestApp {
    pub host: String,
    pub port: u16,
    pub pool: DbPool,
    pub api_client: reqwest::Client,
}

impl TestApp {
    fn create_db(settings: &DatabaseSettings) -> DbPool {
        let mut connection = PgConnection::establish(&settings.get_database_url())
            .expect("Failed to connect to postgres database");

        let query = format!(r#"CREATE DATABASE "{}";"#, settings.name);
        diesel::sql_query(query)
            .execute(&mut connection)
            .expect("Failed to create test database");

        get_connection_pool(settings)
    }

    pub fn get_app_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub async fn spawn_app() -> TestApp {
        Lazy::force(&LOGGER_INSTANCE);

        let mut settings = Settings::get();
        settings.application.port = 0;
        settings.database.name = Uuid::new_v4().to_string();
        settings.database.max_connections = 4;
        settings.database.run_migrations = true;
        settings.superadmin = Some(SuperadminSettings {
            email: SUPERADMIN_EMAIL.to_string(),
            name: "Test Admin".to_string(),
            password: SecretString::from(SUPERADMIN_PASSWORD.to_string()),
        });

        let pool = TestApp::create_db(&settings.database);

        let application = Application::new(settings)
            .await
            .expect("Failed to build application");

        let host = application.host.clone();
        let port = application.port;
        tokio::task::spawn(application.run_until_stopped());

        let api_client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .unwrap();

        TestApp {
            host,
            port,
            pool,
            api_client,
        }
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: &Value) -> reqwest::Response {
        let mut request = self
            .api_client
            .post(format!("{}{}", self.get_app_url(), path))
            .json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn patch(&self, path: &str, token: &str, body: &Value) -> reqwest::Response {
        self.api_client
            .patch(format!("{}{}", self.get_app_url(), path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put(&self, path: &str, token: &str, body: &Value) -> reqwest::Response {
        self.api_client
            .put(format!("{}{}", self.get_app_url(), path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.api_client.get(format!("{}{}", self.get_app_url(), path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str, token: &str) -> reqwest::Response {
        self.api_client
            .delete(format!("{}{}", self.get_app_url(), path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str) -> LoginResponse {
        let response = self
            .post("/login", None, &json!({ "email": email, "password": password }))
            .await;
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.expect("Failed to parse login response")
    }

    pub async fn superadmin_token(&self) -> String {
        self.login(SUPERADMIN_EMAIL, SUPERADMIN_PASSWORD).await.token
    }

    pub async fn register_customer(&self, email: &str) -> LoginResponse {
        let response = self
            .post(
                "/register",
                None,
                &json!({
                    "name": "Juan Dela Cruz",
                    "email": email,
                    "password": "customer-password",
                    "confirm_password": "customer-password",
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        self.login(email, "customer-password").await
    }

    /// Requests a shop account, approves it and logs in as the new owner.
    pub async fn create_shop(&self, shop_name: &str) -> TestShop {
        let owner_email = format!("{}@owners.test", Uuid::new_v4());
        let response = self
            .post(
                "/account-requests",
                None,
                &json!({
                    "name": "Maria Santos",
                    "email": owner_email,
                    "shop_name": shop_name,
                    "branch_name": "Main",
                    "branch_address": "12 Rizal St, Makati",
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        let request: Value = response.json().await.unwrap();
        let request_id = request["request_id"].as_str().unwrap();

        let admin = self.superadmin_token().await;
        let response = self
            .post(
                &format!("/admin/account-requests/{}/approve", request_id),
                Some(&admin),
                &json!({}),
            )
            .await;
        assert_eq!(response.status().as_u16(), 200);
        let approved: Value = response.json().await.unwrap();

        let password = approved["temporary_password"].as_str().unwrap();
        let owner = self.login(&owner_email, password).await;

        TestShop {
            owner_token: owner.token,
            owner_id: owner.user_id,
            shop_id: approved["shop_id"].as_str().unwrap().parse().unwrap(),
            branch_id: approved["branch_id"].as_str().unwrap().parse().unwrap(),
        }
    }

    pub async fn create_service(&self, shop: &TestShop, name: &str, price: f64) -> Uuid {
        let response = self
            .post(
                &format!("/shops/{}/services", shop.shop_id),
                Some(&shop.owner_token),
                &json!({ "name": name, "unit": "kg", "price": price }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        let service: Value = response.json().await.unwrap();
        service["service_id"].as_str().unwrap().parse().unwrap()
    }

    pub async fn create_staff(&self, shop: &TestShop, role: &str) -> LoginResponse {
        let email = format!("{}@staff.test", Uuid::new_v4());
        let response = self
            .post(
                &format!("/branches/{}/staff", shop.branch_id),
                Some(&shop.owner_token),
                &json!({
                    "name": "Pedro Reyes",
                    "email": email,
                    "password": "staff-password",
                    "role": role,
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        self.login(&email, "staff-password").await
    }

    /// Places a dropoff order as branch staff and returns its id.
    pub async fn place_walk_in_order(
        &self,
        shop: &TestShop,
        token: &str,
        service_id: Uuid,
    ) -> Uuid {
        let response = self
            .post(
                &format!("/branches/{}/orders", shop.branch_id),
                Some(token),
                &json!({
                    "fulfillment": "dropoff",
                    "customer_name": "Walk-in Customer",
                    "items": [{ "service_id": service_id, "quantity": 1.0 }],
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        let order: Value = response.json().await.unwrap();
        order["order_id"].as_str().unwrap().parse().unwrap()
    }
}
