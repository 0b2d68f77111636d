use clap::{Args, Parser, Subcommand};
use fetchgo_engine::db_types::{AccountKind, OrderId, OrderStatus, Role};

mod client;
mod formatting;
mod token;

use client::FetchGoClient;
use formatting::print_orders;
use token::print_access_token;

#[derive(Parser, Debug)]
#[command(version = "0.1.0", about = "Operator console for a FetchGo server")]
pub struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign an access token locally. Requires the server's JWT secret.
    #[clap(name = "token")]
    AccessToken(TokenParams),
    /// List orders on the server, with optional filters. Requires a read_all token.
    #[clap(name = "orders")]
    Orders(OrderSearchParams),
    /// Cancel an order. Requires a super_admin token.
    #[clap(name = "cancel")]
    Cancel {
        /// The public order id to cancel
        order_id: OrderId,
    },
    /// Grant or revoke the elevated roles on an account. Requires a super_admin token.
    #[clap(name = "roles")]
    Roles(RoleParams),
    /// Price a trip between two coordinates without placing an order.
    #[clap(name = "quote")]
    Quote(QuoteParams),
}

#[derive(Debug, Args)]
pub struct TokenParams {
    /// The server's JWT signing secret (FG_JWT_SECRET)
    #[arg(short = 's', long = "secret", env = "FG_JWT_SECRET")]
    pub secret: String,
    /// The account id the token identifies
    #[arg(short = 'a', long = "account", default_value = "0")]
    pub account_id: i64,
    /// The account kind (customer or rider)
    #[arg(short = 'k', long = "kind", default_value = "customer")]
    pub kind: AccountKind,
    /// The display name baked into the token
    #[arg(short = 'n', long = "name", default_value = "operator")]
    pub name: String,
    /// Roles you want the token to grant
    #[arg(short = 'r', long = "roles", value_delimiter = ',', default_value = "customer")]
    pub roles: Vec<Role>,
}

#[derive(Debug, Args)]
pub struct OrderSearchParams {
    /// Only orders for this customer account id
    #[arg(short = 'c', long = "customer")]
    pub customer_id: Option<i64>,
    /// Only orders assigned to this rider account id
    #[arg(short = 'r', long = "rider")]
    pub rider_id: Option<i64>,
    /// Only orders with this status
    #[arg(short = 's', long = "status")]
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Args)]
pub struct RoleParams {
    /// The account kind (customer or rider)
    #[arg(short = 'k', long = "kind")]
    pub kind: AccountKind,
    /// The account id
    #[arg(short = 'a', long = "account")]
    pub account_id: i64,
    /// Roles to grant (read_all, super_admin)
    #[arg(long = "apply", value_delimiter = ',')]
    pub apply: Vec<Role>,
    /// Roles to revoke
    #[arg(long = "revoke", value_delimiter = ',')]
    pub revoke: Vec<Role>,
}

#[derive(Debug, Args)]
pub struct QuoteParams {
    #[arg(long = "from-lat", allow_hyphen_values = true)]
    pub from_lat: f64,
    #[arg(long = "from-lng", allow_hyphen_values = true)]
    pub from_lng: f64,
    #[arg(long = "to-lat", allow_hyphen_values = true)]
    pub to_lat: f64,
    #[arg(long = "to-lng", allow_hyphen_values = true)]
    pub to_lng: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Arguments::parse();
    match cli.command {
        Command::AccessToken(params) => print_access_token(params)?,
        Command::Orders(params) => {
            let client = FetchGoClient::from_env()?;
            let orders = client.search_orders(&params).await?;
            print_orders(&orders);
        },
        Command::Cancel { order_id } => {
            let client = FetchGoClient::from_env()?;
            let order = client.cancel_order(&order_id).await?;
            println!("Order {} is now {}", order.order_id, order.status);
        },
        Command::Roles(params) => {
            let client = FetchGoClient::from_env()?;
            client.update_roles(&params).await?;
            println!("Roles updated for {} #{}", params.kind, params.account_id);
        },
        Command::Quote(params) => {
            let client = FetchGoClient::from_env()?;
            let quote = client.quote(&params).await?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        },
    }
    Ok(())
}
