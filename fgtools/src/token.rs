use anyhow::{Context, Result};
use chrono::Duration;
use fetchgo_server::{auth::TokenIssuer, config::AuthConfig};
use fg_common::Secret;

use crate::TokenParams;

/// Sign an access token with the server's secret and print it, ready for `FG_ACCESS_TOKEN`.
pub fn print_access_token(params: TokenParams) -> Result<()> {
    let config = AuthConfig { jwt_secret: Secret::new(params.secret), token_expiry: Duration::hours(24) };
    let signer = TokenIssuer::new(&config);
    let token = signer
        .issue_token(params.account_id, params.kind, &params.name, params.roles.clone())
        .context("Could not sign the token")?;
    println!("--------------------------- FetchGo access token ---------------------------");
    println!("Account:  {} #{}", params.kind, params.account_id);
    println!("Roles:    {:?}", params.roles);
    println!("Valid:    24 hours");
    println!();
    println!("{token}");
    println!("----------------------------------------------------------------------------");
    Ok(())
}
