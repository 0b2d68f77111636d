use sqlx::SqliteConnection;

use crate::{
    db_types::{AccountKind, Role},
    traits::AuthApiError,
};

/// Roles granted beyond the one implied by the account kind.
pub async fn extra_roles_for_account(
    kind: AccountKind,
    account_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Role>, AuthApiError> {
    let roles: Vec<(Role,)> =
        sqlx::query_as("SELECT role FROM extra_roles WHERE account_kind = $1 AND account_id = $2")
            .bind(kind)
            .bind(account_id)
            .fetch_all(conn)
            .await?;
    Ok(roles.into_iter().map(|(r,)| r).collect())
}

pub async fn assign_roles(
    kind: AccountKind,
    account_id: i64,
    roles: &[Role],
    conn: &mut SqliteConnection,
) -> Result<(), AuthApiError> {
    for role in roles {
        sqlx::query(
            "INSERT INTO extra_roles (account_kind, account_id, role) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
        )
        .bind(kind)
        .bind(account_id)
        .bind(role)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn remove_roles(
    kind: AccountKind,
    account_id: i64,
    roles: &[Role],
    conn: &mut SqliteConnection,
) -> Result<u64, AuthApiError> {
    let mut removed = 0;
    for role in roles {
        let result = sqlx::query("DELETE FROM extra_roles WHERE account_kind = $1 AND account_id = $2 AND role = $3")
            .bind(kind)
            .bind(account_id)
            .bind(role)
            .execute(&mut *conn)
            .await?;
        removed += result.rows_affected();
    }
    Ok(removed)
}
