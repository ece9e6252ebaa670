//! User and super-user flag storage

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use siteperm::{access_adapter::CreateUserData, prelude::*, types::User};

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
	Ok(User {
		login: row.try_get("login")?,
		email: row.try_get("email")?,
		super_user: row.try_get("super_user")?,
		created_at: Timestamp(row.try_get("created_at")?),
	})
}

pub(crate) async fn create_user(db: &SqlitePool, data: CreateUserData<'_>) -> SpResult<()> {
	let res = sqlx::query(
		"INSERT INTO users (login, email, super_user, created_at) VALUES (?1, ?2, ?3, ?4)",
	)
	.bind(data.login)
	.bind(data.email)
	.bind(data.super_user)
	.bind(Timestamp::now().0)
	.execute(db)
	.await;

	match res {
		Ok(_) => {
			info!("User created: {}", data.login);
			Ok(())
		}
		Err(err) if is_unique_violation(&err) => {
			Err(Error::validation(format!("login or email of '{}' is already taken", data.login)))
		}
		Err(err) => {
			inspect(&err);
			Err(Error::DbError)
		}
	}
}

pub(crate) async fn read_user(db: &SqlitePool, login: &str) -> SpResult<User> {
	let res = sqlx::query("SELECT login, email, super_user, created_at FROM users WHERE login = ?1")
		.bind(login)
		.fetch_one(db)
		.await;

	map_res(res, user_from_row)
}

pub(crate) async fn list_users(db: &SqlitePool) -> SpResult<Vec<User>> {
	let rows =
		sqlx::query("SELECT login, email, super_user, created_at FROM users ORDER BY login")
			.fetch_all(db)
			.await
			.inspect_err(inspect)
			.or(Err(Error::DbError))?;

	collect_res(rows.iter().map(user_from_row))
}

pub(crate) async fn read_login_by_email(db: &SqlitePool, email: &str) -> SpResult<Option<Box<str>>> {
	sqlx::query_scalar::<_, String>("SELECT login FROM users WHERE email = ?1")
		.bind(email)
		.fetch_optional(db)
		.await
		.inspect_err(inspect)
		.map(|login| login.map(Into::into))
		.or(Err(Error::DbError))
}

/// Delete a user and all associated data
pub(crate) async fn delete_user(db: &SqlitePool, login: &str) -> SpResult<()> {
	let mut tx = db.begin().await.inspect_err(inspect).or(Err(Error::DbError))?;

	sqlx::query("DELETE FROM access WHERE login = ?1")
		.bind(login)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	sqlx::query("DELETE FROM prefs WHERE login = ?1")
		.bind(login)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	let res = sqlx::query("DELETE FROM users WHERE login = ?1")
		.bind(login)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	if res.rows_affected() == 0 {
		// Dropping the transaction rolls it back
		return Err(Error::NotFound);
	}

	tx.commit().await.inspect_err(inspect).or(Err(Error::DbError))?;

	info!("User deleted: {}", login);
	Ok(())
}

pub(crate) async fn update_super_user(db: &SqlitePool, login: &str, super_user: bool) -> SpResult<()> {
	let res = sqlx::query("UPDATE users SET super_user = ?2 WHERE login = ?1")
		.bind(login)
		.bind(super_user)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

pub(crate) async fn list_super_users(db: &SqlitePool) -> SpResult<Vec<Box<str>>> {
	let logins = sqlx::query_scalar::<_, String>(
		"SELECT login FROM users WHERE super_user = 1 ORDER BY login",
	)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	Ok(logins.into_iter().map(Into::into).collect())
}

// vim: ts=4
