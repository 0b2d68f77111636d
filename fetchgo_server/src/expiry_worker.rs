use chrono::Duration;
use fetchgo_engine::{db_types::Order, events::EventProducers, OrderFlowApi, SqliteDatabase};
use log::*;
use tokio::task::JoinHandle;

/// Starts the stale-order expiry worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Pending orders that no rider has touched within `stale_limit` are cancelled, so the available
/// list does not fill up with orders whose customers have long given up.
pub fn start_expiry_worker(db: SqliteDatabase, producers: EventProducers, stale_limit: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(std::time::Duration::from_secs(60));
        let api = OrderFlowApi::new(db, producers);
        info!("🕰️ Stale order expiry worker started");
        loop {
            timer.tick().await;
            trace!("🕰️ Running stale order expiry job");
            match api.expire_stale_orders(stale_limit).await {
                Ok(expired) if expired.is_empty() => {},
                Ok(expired) => {
                    info!("🕰️ {} stale orders cancelled: {}", expired.len(), order_list(&expired));
                },
                Err(e) => {
                    error!("🕰️ Error running stale order expiry job: {e}");
                },
            }
        }
    })
}

fn order_list(orders: &[Order]) -> String {
    orders
        .iter()
        .map(|o| format!("[{}] order_id: {} customer: #{}", o.id, o.order_id, o.customer_id))
        .collect::<Vec<String>>()
        .join(", ")
}
