use chrono::Duration;
use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus},
    fge_api::order_objects::OrderQueryFilter,
    traits::OrderFlowError,
};

/// Inserts a new order into the database using the given connection. The status starts as 'pending' and the
/// timestamps are set by the schema defaults.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderFlowError> {
    if fetch_order_by_order_id(&order.order_id, conn).await?.is_some() {
        return Err(OrderFlowError::OrderAlreadyExists(order.order_id));
    }
    let inserted: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                customer_id,
                customer_name,
                pickup_lat,
                pickup_lng,
                pickup_address,
                destination_lat,
                destination_lng,
                destination_address,
                delivery_details,
                distance,
                price
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *;
        "#,
    )
    .bind(order.order_id)
    .bind(order.customer_id)
    .bind(order.customer_name)
    .bind(order.pickup.lat)
    .bind(order.pickup.lng)
    .bind(order.pickup.address)
    .bind(order.destination.lat)
    .bind(order.destination.lng)
    .bind(order.destination.address)
    .bind(order.delivery_details)
    .bind(order.distance)
    .bind(order.price)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order [{}] inserted with id {}", inserted.order_id, inserted.id);
    Ok(inserted)
}

/// Returns the entry in the orders table for the corresponding `order_id`
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// `pending → accepted`. The guard is part of the UPDATE, so exactly one rider can win a race on the
/// same pending order; everyone else sees zero rows updated.
pub async fn accept_order(
    order_id: &OrderId,
    rider_id: i64,
    rider_name: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET
            status = 'accepted',
            rider_id = $1,
            rider_name = $2,
            accepted_at = CURRENT_TIMESTAMP,
            updated_at = CURRENT_TIMESTAMP
        WHERE order_id = $3 AND status = 'pending'
        RETURNING *"#,
    )
    .bind(rider_id)
    .bind(rider_name)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// `accepted → in_progress`, restricted to the assigned rider.
pub async fn start_delivery(
    order_id: &OrderId,
    rider_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET
            status = 'in_progress',
            started_at = CURRENT_TIMESTAMP,
            updated_at = CURRENT_TIMESTAMP
        WHERE order_id = $1 AND status = 'accepted' AND rider_id = $2
        RETURNING *"#,
    )
    .bind(order_id.as_str())
    .bind(rider_id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// `in_progress → delivered`, restricted to the assigned rider.
pub async fn complete_delivery(
    order_id: &OrderId,
    rider_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET
            status = 'delivered',
            delivered_at = CURRENT_TIMESTAMP,
            updated_at = CURRENT_TIMESTAMP
        WHERE order_id = $1 AND status = 'in_progress' AND rider_id = $2
        RETURNING *"#,
    )
    .bind(order_id.as_str())
    .bind(rider_id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Writes 'cancelled', but only if the current status is one of `from`.
pub async fn cancel_order(
    order_id: &OrderId,
    from: &[OrderStatus],
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        "UPDATE orders SET status = 'cancelled', updated_at = CURRENT_TIMESTAMP WHERE order_id = ",
    );
    builder.push_bind(order_id.as_str());
    let statuses = from.iter().map(|s| format!("'{s}'")).collect::<Vec<_>>().join(",");
    builder.push(format!(" AND status IN ({statuses})"));
    builder.push(" RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    let order = builder.build_query_as::<Order>().fetch_optional(conn).await?;
    Ok(order)
}

/// Replaces the delivery details while the order is still 'pending'.
pub async fn update_delivery_details(
    order_id: &OrderId,
    details: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET delivery_details = $1, updated_at = CURRENT_TIMESTAMP
        WHERE order_id = $2 AND status = 'pending'
        RETURNING *"#,
    )
    .bind(details)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Cancels pending orders that have not been updated for longer than `limit`.
pub async fn expire_stale_pending_orders(
    limit: Duration,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, OrderFlowError> {
    let rows = sqlx::query_as(
        format!(
            "UPDATE orders SET updated_at = CURRENT_TIMESTAMP, status = 'cancelled' WHERE status = 'pending' AND \
             (unixepoch(CURRENT_TIMESTAMP) - unixepoch(updated_at)) > {} RETURNING *;",
            limit.num_seconds()
        )
        .as_str(),
    )
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

/// All orders placed by the customer, newest first.
pub async fn orders_for_customer(customer_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE customer_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(customer_id)
        .fetch_all(conn)
        .await
}

/// All orders assigned to the rider, newest first.
pub async fn orders_for_rider(rider_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE rider_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(rider_id)
        .fetch_all(conn)
        .await
}

/// The rider-facing "available" list: every pending order, newest first.
pub async fn available_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE status = 'pending' ORDER BY created_at DESC, id DESC")
        .fetch_all(conn)
        .await
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`
///
/// Resulting orders are ordered by `created_at` in descending order
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM orders
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(order_id) = query.order_id {
        where_clause.push("order_id = ");
        where_clause.push_bind_unseparated(order_id.as_str().to_string());
    }
    if let Some(cid) = query.customer_id {
        where_clause.push("customer_id = ");
        where_clause.push_bind_unseparated(cid);
    }
    if let Some(rid) = query.rider_id {
        where_clause.push("rider_id = ");
        where_clause.push_bind_unseparated(rid);
    }
    if let Some(status) = query.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status.to_string());
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at DESC, id DESC");

    trace!("🗃️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Order>();
    let orders = query.fetch_all(conn).await?;
    trace!("🗃️ Result of search_orders: {:?}", orders.len());
    Ok(orders)
}
