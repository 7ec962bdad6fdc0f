use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Account, NewAccount};
use crate::repositories::AccountRepository;
use crate::schema::accounts;

#[derive(Clone)]
pub struct PgAccountRepository {
    pool: AsyncDbPool,
}

impl PgAccountRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    /// A clash on `accounts_email_key` surfaces as `AppError::Duplicate`
    /// through the database error converter.
    async fn create(&self, new_account: NewAccount) -> AppResult<Account> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(accounts::table)
            .values(&new_account)
            .returning(Account::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let mut conn = self.pool.get().await?;

        accounts::table
            .filter(accounts::email.eq(email))
            .select(Account::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Account>> {
        let mut conn = self.pool.get().await?;

        accounts::table
            .find(id)
            .select(Account::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }
}
