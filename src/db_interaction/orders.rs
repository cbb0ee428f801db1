use std::collections::HashMap;

use anyhow::anyhow;
use chrono::Utc;
use diesel::{
    prelude::Queryable, Connection, ExpressionMethods, NullableExpressionMethods,
    OptionalExtension, PgConnection, QueryDsl, RunQueryDsl, SelectableHelper,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::authorization::{load_grants, AuthzError},
    domain::{price_lines, Fulfillment, OrderStatus, RequestedLine, Role},
    models::{Order, OrderHistoryEntry, OrderItemModel, User},
    schema::{detergent_types, order_history, order_items, orders, services, users},
    telemetry::spawn_blocking_with_tracing,
    utils::{DbConnection, Pagination},
};

use super::{
    branches::find_branch,
    detergents::branch_detergents,
    StoreError,
};

pub struct NewOrder {
    pub fulfillment: Fulfillment,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<RequestedLine>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OrderQueue {
    Incoming,
    Work,
    History,
}

// Struct to represent an order line together with the names it refers to
#[derive(Queryable, Serialize, Debug, Clone)]
pub struct OrderItemView {
    pub order_item_id: Uuid,
    #[serde(skip)]
    pub order_id: Uuid,
    pub service_id: Uuid,
    pub service_name: String,
    pub detergent_type_id: Option<Uuid>,
    pub detergent_name: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
    pub detergent_price: f64,
    pub line_total: f64,
}

// Struct to represent a working order (with associated items)
#[derive(Serialize, Debug, Clone)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemView>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum OrderRecord {
    Active(OrderWithItems),
    Completed(OrderHistoryEntry),
}

#[derive(Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum QueueListing {
    Active(Vec<OrderWithItems>),
    History(Vec<OrderHistoryEntry>),
}

#[derive(Serialize, Debug, Clone)]
pub struct CustomerOrders {
    pub active: Vec<OrderWithItems>,
    pub history: Vec<OrderHistoryEntry>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Advanced {
    pub order_id: Uuid,
    pub previous_status: OrderStatus,
    pub status: OrderStatus,
}

fn parse_column<T: std::str::FromStr<Err = String>>(value: &str) -> Result<T, StoreError> {
    value
        .parse::<T>()
        .map_err(|e| StoreError::UnexpectedError(anyhow!(e)))
}

fn load_items(
    conn: &mut PgConnection,
    order_ids: &[Uuid],
) -> Result<Vec<OrderItemView>, diesel::result::Error> {
    order_items::table
        .inner_join(services::table)
        .left_join(detergent_types::table)
        .filter(order_items::order_id.eq_any(order_ids.to_vec()))
        .select((
            order_items::order_item_id,
            order_items::order_id,
            order_items::service_id,
            services::name,
            order_items::detergent_type_id,
            detergent_types::name.nullable(),
            order_items::quantity,
            order_items::unit_price,
            order_items::detergent_price,
            order_items::line_total,
        ))
        .load::<OrderItemView>(conn)
}

// Groups the items of every order in one query, keeping the order of `orders`
fn with_items(
    conn: &mut PgConnection,
    orders: Vec<Order>,
) -> Result<Vec<OrderWithItems>, diesel::result::Error> {
    let ids: Vec<Uuid> = orders.iter().map(|o| o.order_id).collect();

    let mut grouped: HashMap<Uuid, Vec<OrderItemView>> = HashMap::new();
    for item in load_items(conn, &ids)? {
        grouped.entry(item.order_id).or_default().push(item);
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = grouped.remove(&order.order_id).unwrap_or_default();
            OrderWithItems { order, items }
        })
        .collect())
}

fn find_order(
    conn: &mut PgConnection,
    order_id: Uuid,
) -> Result<Option<Order>, diesel::result::Error> {
    orders::table
        .find(order_id)
        .select(Order::as_select())
        .get_result::<Order>(conn)
        .optional()
}

fn find_history_entry(
    conn: &mut PgConnection,
    order_id: Uuid,
) -> Result<Option<OrderHistoryEntry>, diesel::result::Error> {
    order_history::table
        .find(order_id)
        .select(OrderHistoryEntry::as_select())
        .get_result::<OrderHistoryEntry>(conn)
        .optional()
}

#[tracing::instrument("Creating order", skip(conn, new_order))]
pub async fn create_order(
    mut conn: DbConnection,
    actor: Uuid,
    branch_id: Uuid,
    new_order: NewOrder,
) -> Result<OrderWithItems, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<OrderWithItems, StoreError, _>(|conn| {
            let branch = find_branch(conn, branch_id)?;
            let grants = load_grants(conn, actor)?;

            let is_staff = grants
                .require_branch_staff(branch.shop_id, branch_id, &[Role::Employee])
                .is_ok();

            let (customer_id, customer_name, customer_phone, delivery_address) = if is_staff {
                let name = new_order
                    .customer_name
                    .filter(|n| !n.trim().is_empty())
                    .ok_or_else(|| {
                        StoreError::InvalidInput(
                            "customer_name is required for walk-in orders".to_string(),
                        )
                    })?;
                (None, name, new_order.customer_phone, new_order.delivery_address)
            } else if grants.has_role(Role::Customer) {
                let customer = users::table
                    .find(actor)
                    .select(User::as_select())
                    .get_result::<User>(conn)
                    .map_err(StoreError::or_not_found("user"))?;
                (
                    Some(actor),
                    customer.name,
                    new_order.customer_phone.or(customer.phone_number),
                    new_order.delivery_address.or(customer.address),
                )
            } else {
                return Err(AuthzError::NotBranchStaff(branch_id).into());
            };

            let delivery_address = delivery_address.filter(|a| !a.trim().is_empty());
            if new_order.fulfillment.requires_address() && delivery_address.is_none() {
                return Err(StoreError::InvalidInput(format!(
                    "{} orders need a delivery_address",
                    new_order.fulfillment.as_str()
                )));
            }

            let requested: Vec<Uuid> = new_order.items.iter().map(|l| l.service_id).collect();
            let service_prices: HashMap<Uuid, f64> = services::table
                .filter(services::shop_id.eq(branch.shop_id))
                .filter(services::is_active.eq(true))
                .filter(services::service_id.eq_any(requested))
                .select((services::service_id, services::price))
                .load::<(Uuid, f64)>(conn)?
                .into_iter()
                .collect();

            let detergent_prices: HashMap<Uuid, f64> =
                branch_detergents(conn, branch.shop_id, branch_id)?
                    .into_iter()
                    .map(|d| (d.detergent_type_id, d.price))
                    .collect();

            let (lines, total_price) =
                price_lines(&new_order.items, &service_prices, &detergent_prices)
                    .map_err(|e| StoreError::InvalidInput(e.to_string()))?;

            let now = Utc::now();
            let order = Order {
                order_id: Uuid::new_v4(),
                branch_id,
                customer_id,
                customer_name,
                customer_phone,
                fulfillment: new_order.fulfillment.as_str().to_string(),
                status: OrderStatus::Pending.as_str().to_string(),
                assigned_to: None,
                delivery_address,
                notes: new_order.notes,
                total_price,
                created_at: now,
                updated_at: now,
            };

            diesel::insert_into(orders::table)
                .values(&order)
                .execute(conn)?;

            let items: Vec<OrderItemModel> = lines
                .into_iter()
                .map(|line| OrderItemModel {
                    order_item_id: Uuid::new_v4(),
                    order_id: order.order_id,
                    service_id: line.service_id,
                    detergent_type_id: line.detergent_type_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    detergent_price: line.detergent_price,
                    line_total: line.line_total,
                })
                .collect();

            diesel::insert_into(order_items::table)
                .values(&items)
                .execute(conn)?;

            let mut created = with_items(conn, vec![order])?;
            created
                .pop()
                .ok_or_else(|| StoreError::UnexpectedError(anyhow!("created order vanished")))
        })
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Listing branch orders", skip(conn))]
pub async fn list_branch_orders(
    mut conn: DbConnection,
    actor: Uuid,
    branch_id: Uuid,
    queue: OrderQueue,
    pagination: Pagination,
) -> Result<QueueListing, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        let branch = find_branch(&mut conn, branch_id)?;
        load_grants(&mut conn, actor)?.require_branch_staff(
            branch.shop_id,
            branch_id,
            &[Role::Employee, Role::Delivery],
        )?;

        let listing = match queue {
            OrderQueue::Incoming => {
                let pending = orders::table
                    .filter(orders::branch_id.eq(branch_id))
                    .filter(orders::status.eq(OrderStatus::Pending.as_str()))
                    .order(orders::created_at.asc())
                    .limit(pagination.limit())
                    .offset(pagination.offset())
                    .select(Order::as_select())
                    .load::<Order>(&mut conn)?;
                QueueListing::Active(with_items(&mut conn, pending)?)
            }
            OrderQueue::Work => {
                let working = orders::table
                    .filter(orders::branch_id.eq(branch_id))
                    .filter(orders::status.eq_any(OrderStatus::work_queue()))
                    .order(orders::updated_at.asc())
                    .limit(pagination.limit())
                    .offset(pagination.offset())
                    .select(Order::as_select())
                    .load::<Order>(&mut conn)?;
                QueueListing::Active(with_items(&mut conn, working)?)
            }
            OrderQueue::History => QueueListing::History(
                order_history::table
                    .filter(order_history::branch_id.eq(branch_id))
                    .order(order_history::completed_at.desc())
                    .limit(pagination.limit())
                    .offset(pagination.offset())
                    .select(OrderHistoryEntry::as_select())
                    .load::<OrderHistoryEntry>(&mut conn)?,
            ),
        };

        Ok::<_, StoreError>(listing)
    })
    .await??;

    Ok(res)
}

// Working orders first, then the history table once an order is completed
#[tracing::instrument("Getting order", skip(conn))]
pub async fn get_order(
    mut conn: DbConnection,
    actor: Uuid,
    order_id: Uuid,
) -> Result<OrderRecord, StoreError> {
    let res = spawn_blocking_with_tracing(move || -> Result<OrderRecord, StoreError> {
        if let Some(order) = find_order(&mut conn, order_id)? {
            if order.customer_id != Some(actor) {
                let branch = find_branch(&mut conn, order.branch_id)?;
                load_grants(&mut conn, actor)?.require_branch_staff(
                    branch.shop_id,
                    branch.branch_id,
                    &[Role::Employee, Role::Delivery],
                )?;
            }
            let mut found = with_items(&mut conn, vec![order])?;
            return found
                .pop()
                .map(OrderRecord::Active)
                .ok_or(StoreError::NotFound("order"));
        }

        let entry = find_history_entry(&mut conn, order_id)?.ok_or(StoreError::NotFound("order"))?;
        if entry.customer_id != Some(actor) {
            let grants = load_grants(&mut conn, actor)?;
            match entry.branch_id {
                Some(branch_id) => {
                    grants.require_branch_staff(
                        entry.shop_id,
                        branch_id,
                        &[Role::Employee, Role::Delivery],
                    )?;
                }
                None => grants.require_shop_owner(entry.shop_id)?,
            }
        }
        Ok(OrderRecord::Completed(entry))
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Listing orders of customer", skip(conn))]
pub async fn list_customer_orders(
    mut conn: DbConnection,
    actor: Uuid,
) -> Result<CustomerOrders, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        let active = orders::table
            .filter(orders::customer_id.eq(actor))
            .order(orders::created_at.desc())
            .select(Order::as_select())
            .load::<Order>(&mut conn)?;

        let history = order_history::table
            .filter(order_history::customer_id.eq(actor))
            .order(order_history::completed_at.desc())
            .select(OrderHistoryEntry::as_select())
            .load::<OrderHistoryEntry>(&mut conn)?;

        Ok::<_, StoreError>(CustomerOrders {
            active: with_items(&mut conn, active)?,
            history,
        })
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Listing orders out for delivery", skip(conn))]
pub async fn list_delivery_orders(
    mut conn: DbConnection,
    actor: Uuid,
) -> Result<Vec<OrderWithItems>, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        let branches = load_grants(&mut conn, actor)?.branches_with(&[Role::Delivery]);

        let delivering = orders::table
            .filter(orders::branch_id.eq_any(branches))
            .filter(orders::status.eq(OrderStatus::Delivering.as_str()))
            .order(orders::updated_at.asc())
            .select(Order::as_select())
            .load::<Order>(&mut conn)?;

        with_items(&mut conn, delivering).map_err(StoreError::from)
    })
    .await??;

    Ok(res)
}

#[tracing::instrument("Accepting order", skip(conn))]
pub async fn accept_order(
    mut conn: DbConnection,
    actor: Uuid,
    order_id: Uuid,
) -> Result<Order, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Order, StoreError, _>(|conn| {
            let order = match find_order(conn, order_id)? {
                Some(order) => order,
                None if find_history_entry(conn, order_id)?.is_some() => {
                    return Err(StoreError::Conflict("order is already completed".to_string()))
                }
                None => return Err(StoreError::NotFound("order")),
            };
            let branch = find_branch(conn, order.branch_id)?;
            load_grants(conn, actor)?.require_branch_staff(
                branch.shop_id,
                branch.branch_id,
                &[Role::Employee],
            )?;

            let accepted = diesel::update(
                orders::table
                    .filter(orders::order_id.eq(order_id))
                    .filter(orders::status.eq(OrderStatus::Pending.as_str())),
            )
            .set((
                orders::status.eq(OrderStatus::InProgress.as_str()),
                orders::assigned_to.eq(Some(actor)),
                orders::updated_at.eq(Utc::now()),
            ))
            .returning(Order::as_returning())
            .get_result::<Order>(conn)
            .optional()?;

            accepted.ok_or_else(|| StoreError::Conflict("order is no longer pending".to_string()))
        })
    })
    .await??;

    Ok(res)
}

// Moves a completed order and its items into the history table
fn complete_order(
    conn: &mut PgConnection,
    order: Order,
    shop_id: Uuid,
    actor: Uuid,
) -> Result<(), StoreError> {
    let items = load_items(conn, &[order.order_id])?;
    let items = serde_json::to_value(&items).map_err(|e| StoreError::UnexpectedError(e.into()))?;

    let entry = OrderHistoryEntry {
        order_id: order.order_id,
        shop_id,
        branch_id: Some(order.branch_id),
        customer_id: order.customer_id,
        customer_name: order.customer_name,
        fulfillment: order.fulfillment,
        total_price: order.total_price,
        items,
        created_at: order.created_at,
        completed_at: Utc::now(),
        completed_by: Some(actor),
    };

    diesel::insert_into(order_history::table)
        .values(&entry)
        .execute(conn)?;

    diesel::delete(orders::table.find(order.order_id)).execute(conn)?;

    Ok(())
}

/// Moves the order one step forward along its fulfillment path.
///
/// The row is locked for the duration of the transaction. When `expected`
/// is given and the order has already moved past it the call fails with a
/// conflict instead of advancing twice.
#[tracing::instrument("Advancing order", skip(conn))]
pub async fn advance_order(
    mut conn: DbConnection,
    actor: Uuid,
    order_id: Uuid,
    expected: Option<OrderStatus>,
) -> Result<Advanced, StoreError> {
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Advanced, StoreError, _>(|conn| {
            let locked = orders::table
                .find(order_id)
                .for_update()
                .select(Order::as_select())
                .get_result::<Order>(conn)
                .optional()?;

            let order = match locked {
                Some(order) => order,
                None if find_history_entry(conn, order_id)?.is_some() => {
                    return Err(StoreError::Conflict("order is already completed".to_string()))
                }
                None => return Err(StoreError::NotFound("order")),
            };

            let current: OrderStatus = parse_column(&order.status)?;
            let fulfillment: Fulfillment = parse_column(&order.fulfillment)?;

            let branch = find_branch(conn, order.branch_id)?;
            let role = load_grants(conn, actor)?.require_branch_staff(
                branch.shop_id,
                branch.branch_id,
                &[Role::Employee, Role::Delivery],
            )?;

            if let Some(expected) = expected {
                if expected != current {
                    return Err(StoreError::Conflict(format!(
                        "order is {}, expected {}",
                        current, expected
                    )));
                }
            }

            if role == Role::Delivery && current != OrderStatus::Delivering {
                return Err(AuthzError::NotBranchStaff(branch.branch_id).into());
            }

            if current == OrderStatus::Pending {
                return Err(StoreError::Conflict("accept the order first".to_string()));
            }

            let next = current
                .next(fulfillment)
                .ok_or_else(|| StoreError::Conflict(format!("order is already {}", current)))?;

            if next == OrderStatus::Completed {
                complete_order(conn, order, branch.shop_id, actor)?;
            } else {
                diesel::update(
                    orders::table
                        .filter(orders::order_id.eq(order_id))
                        .filter(orders::status.eq(current.as_str())),
                )
                .set((
                    orders::status.eq(next.as_str()),
                    orders::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;
            }

            Ok(Advanced {
                order_id,
                previous_status: current,
                status: next,
            })
        })
    })
    .await??;

    Ok(res)
}
