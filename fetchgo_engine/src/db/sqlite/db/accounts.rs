use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Customer, NewCustomer, NewRider, Rider},
    traits::AuthApiError,
};

pub async fn insert_customer(customer: NewCustomer, conn: &mut SqliteConnection) -> Result<Customer, AuthApiError> {
    let result: Result<Customer, sqlx::Error> = sqlx::query_as(
        r#"
        INSERT INTO customers (full_name, phone_number, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, full_name, phone_number, created_at"#,
    )
    .bind(customer.full_name)
    .bind(customer.phone_number)
    .bind(customer.password_hash)
    .fetch_one(conn)
    .await;
    match result {
        Ok(customer) => {
            debug!("🗃️ Customer account #{} created", customer.id);
            Ok(customer)
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AuthApiError::PhoneAlreadyRegistered),
        Err(e) => Err(e.into()),
    }
}

pub async fn insert_rider(rider: NewRider, conn: &mut SqliteConnection) -> Result<Rider, AuthApiError> {
    let result: Result<Rider, sqlx::Error> = sqlx::query_as(
        r#"
        INSERT INTO riders (full_name, phone_number, plate_number, licence_number, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, full_name, phone_number, plate_number, licence_number, created_at"#,
    )
    .bind(rider.full_name)
    .bind(rider.phone_number)
    .bind(rider.plate_number)
    .bind(rider.licence_number)
    .bind(rider.password_hash)
    .fetch_one(conn)
    .await;
    match result {
        Ok(rider) => {
            debug!("🗃️ Rider account #{} created", rider.id);
            Ok(rider)
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AuthApiError::PhoneAlreadyRegistered),
        Err(e) => Err(e.into()),
    }
}

pub async fn customer_by_id(customer_id: i64, conn: &mut SqliteConnection) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as("SELECT id, full_name, phone_number, created_at FROM customers WHERE id = $1")
        .bind(customer_id)
        .fetch_optional(conn)
        .await
}

pub async fn rider_by_id(rider_id: i64, conn: &mut SqliteConnection) -> Result<Option<Rider>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, full_name, phone_number, plate_number, licence_number, created_at FROM riders WHERE id = $1",
    )
    .bind(rider_id)
    .fetch_optional(conn)
    .await
}

/// The customer with the given phone number, plus their stored password hash.
pub async fn customer_credentials_by_phone(
    phone_number: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<(Customer, String)>, sqlx::Error> {
    use sqlx::Row;
    let row = sqlx::query(
        "SELECT id, full_name, phone_number, password_hash, created_at FROM customers WHERE phone_number = $1",
    )
    .bind(phone_number)
    .fetch_optional(conn)
    .await?;
    row.map(|row| {
        let customer = Customer {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            phone_number: row.try_get("phone_number")?,
            created_at: row.try_get("created_at")?,
        };
        let hash: String = row.try_get("password_hash")?;
        Ok((customer, hash))
    })
    .transpose()
}

/// The rider with the given phone number, plus their stored password hash.
pub async fn rider_credentials_by_phone(
    phone_number: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<(Rider, String)>, sqlx::Error> {
    use sqlx::Row;
    let row = sqlx::query(
        "SELECT id, full_name, phone_number, plate_number, licence_number, password_hash, created_at FROM riders \
         WHERE phone_number = $1",
    )
    .bind(phone_number)
    .fetch_optional(conn)
    .await?;
    row.map(|row| {
        let rider = Rider {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            phone_number: row.try_get("phone_number")?,
            plate_number: row.try_get("plate_number")?,
            licence_number: row.try_get("licence_number")?,
            created_at: row.try_get("created_at")?,
        };
        let hash: String = row.try_get("password_hash")?;
        Ok((rider, hash))
    })
    .transpose()
}
