use fetchgo_engine::db_types::Order;
use prettytable::{format::consts::FORMAT_CLEAN, row, Table};

pub fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders matched.");
        return;
    }
    let mut table = Table::new();
    table.set_format(*FORMAT_CLEAN);
    table.set_titles(row!["Order", "Status", "Customer", "Rider", "Distance", "Price", "Created"]);
    for order in orders {
        let rider = order.rider_name.as_deref().unwrap_or("-");
        table.add_row(row![
            order.order_id.as_str(),
            order.status,
            format!("{} (#{})", order.customer_name, order.customer_id),
            rider,
            order.distance,
            order.price,
            order.created_at.format("%Y-%m-%d %H:%M"),
        ]);
    }
    table.printstd();
}
