use chrono::{DateTime, NaiveTime, Utc};
use diesel::prelude::{AsChangeset, Insertable, Queryable, Selectable};
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{
    account_requests, audit_logs, branch_detergent_prices, branches, detergent_types,
    operating_hours, order_history, order_items, orders, role_assignments, services, shops, users,
};

#[derive(Queryable, Selectable, Insertable, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserProfileInfo {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = users)]
pub struct UserProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Debug, Clone)]
#[diesel(table_name = role_assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RoleAssignment {
    pub assignment_id: Uuid,
    pub user_id: Uuid,
    pub role_name: String,
    pub shop_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = shops)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Shop {
    pub shop_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = shops)]
pub struct ShopChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = branches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Branch {
    pub branch_id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    pub address: String,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = branches)]
pub struct BranchChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = services)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Service {
    pub service_id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    pub price: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = services)]
pub struct ServiceChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub price: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = detergent_types)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DetergentType {
    pub detergent_type_id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    pub kind: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = detergent_types)]
pub struct DetergentTypeChanges {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub price: Option<f64>,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Debug, Clone)]
#[diesel(table_name = branch_detergent_prices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BranchDetergentPrice {
    pub branch_id: Uuid,
    pub detergent_type_id: Uuid,
    pub price: f64,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = operating_hours)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OperatingHours {
    pub branch_id: Uuid,
    pub day_of_week: i16,
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
    pub is_closed: bool,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Debug, Clone)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Order {
    pub order_id: Uuid,
    pub branch_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub fulfillment: String,
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemModel {
    pub order_item_id: Uuid,
    pub order_id: Uuid,
    pub service_id: Uuid,
    pub detergent_type_id: Option<Uuid>,
    pub quantity: f64,
    pub unit_price: f64,
    pub detergent_price: f64,
    pub line_total: f64,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Debug, Clone)]
#[diesel(table_name = order_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderHistoryEntry {
    pub order_id: Uuid,
    pub shop_id: Uuid,
    pub branch_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub customer_name: String,
    pub fulfillment: String,
    pub total_price: f64,
    pub items: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub completed_by: Option<Uuid>,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Debug, Clone)]
#[diesel(table_name = account_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccountRequest {
    pub request_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub shop_name: String,
    pub branch_name: String,
    pub branch_address: String,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Insertable, Serialize, Debug, Clone)]
#[diesel(table_name = audit_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AuditLog {
    pub audit_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
