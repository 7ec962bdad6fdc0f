//! Account registration, login and token refresh.

use std::sync::Arc;

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::models::{Account, NewAccount, normalize_email};
use crate::repositories::AccountRepository;
use crate::utils::jwt::{TokenPair, generate_token_pair, validate_refresh_token};
use crate::utils::password::{hash_password, verify_password};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Verified against when the email is unknown so both failure paths pay for
/// one Argon2 run. Same parameters as `Argon2::default()`; matches no password.
const UNKNOWN_ACCOUNT_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$zVNNhSK4J5Z12ThZkas0/g$q4JshuVyGlbiJsRbVtyrzaLvonX60GJfFsHEey85+o8";

/// An account together with freshly issued tokens.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub account: Account,
    pub tokens: TokenPair,
}

#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountRepository>,
    jwt_config: JwtConfig,
}

impl AuthService {
    pub fn new(accounts: Arc<dyn AccountRepository>, jwt_config: JwtConfig) -> Self {
        Self {
            accounts,
            jwt_config,
        }
    }

    /// Creates an account. Emails compare case-insensitively, so a second
    /// registration differing only in case is a duplicate.
    pub async fn register(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let email = normalize_email(email);
        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AppError::Duplicate {
                entity: "account".to_string(),
                field: "email".to_string(),
                value: email,
            });
        }

        let password_hash = run_blocking({
            let password = password.to_string();
            move || hash_password(&password)
        })
        .await?;

        let account = self
            .accounts
            .create(NewAccount {
                email,
                password_hash,
            })
            .await?;
        tracing::info!(account_id = account.id, "Account registered");
        self.session(account)
    }

    /// Unknown email and wrong password fail with the same message.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let email = normalize_email(email);
        let account = self.accounts.find_by_email(&email).await?;
        let hash = account
            .as_ref()
            .map_or(UNKNOWN_ACCOUNT_HASH, |a| a.password_hash.as_str())
            .to_string();

        let verified = run_blocking({
            let password = password.to_string();
            move || verify_password(&password, &hash)
        })
        .await?;

        match account {
            Some(account) if verified => self.session(account),
            Some(account) => {
                tracing::debug!(account_id = account.id, "Password mismatch");
                Err(invalid_credentials())
            }
            None => Err(invalid_credentials()),
        }
    }

    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthSession> {
        let claims = validate_refresh_token(refresh_token, &self.jwt_config.secret)?;
        let account = self.current_account(claims.account_id()?).await?;
        self.session(account)
    }

    /// Account behind a validated token. A deleted account is treated as an
    /// invalid token.
    pub async fn current_account(&self, account_id: i32) -> AppResult<Account> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized {
                message: "Account no longer exists".to_string(),
            })
    }

    fn session(&self, account: Account) -> AppResult<AuthSession> {
        let tokens = generate_token_pair(account.id, &account.email, &self.jwt_config)?;
        Ok(AuthSession { account, tokens })
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized {
        message: INVALID_CREDENTIALS.to_string(),
    }
}

/// Argon2 is CPU bound; keep it off the async workers.
async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal {
            source: anyhow::Error::new(e).context("password hashing task failed"),
        })?
}
