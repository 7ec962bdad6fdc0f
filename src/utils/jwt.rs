use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by every token this service issues.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Account id
    pub sub: String,
    pub email: String,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(account_id: i32, email: &str, token_type: TokenType, expiration_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: account_id.to_string(),
            email: email.to_string(),
            token_type,
            iat: now.timestamp(),
            exp: (now + Duration::hours(expiration_hours)).timestamp(),
        }
    }

    pub fn account_id(&self) -> AppResult<i32> {
        self.sub.parse().map_err(|_| AppError::Unauthorized {
            message: "Invalid token subject".to_string(),
        })
    }
}

/// A freshly signed access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

pub fn generate_token(
    account_id: i32,
    email: &str,
    token_type: TokenType,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    let claims = Claims::new(account_id, email, token_type, expiration_hours);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to generate JWT token: {}", e),
    })
}

pub fn generate_access_token(account_id: i32, email: &str, config: &JwtConfig) -> AppResult<String> {
    generate_token(
        account_id,
        email,
        TokenType::Access,
        &config.secret,
        config.access_token_expiration,
    )
}

pub fn generate_token_pair(account_id: i32, email: &str, config: &JwtConfig) -> AppResult<TokenPair> {
    Ok(TokenPair {
        access_token: generate_access_token(account_id, email, config)?,
        refresh_token: generate_token(
            account_id,
            email,
            TokenType::Refresh,
            &config.secret,
            config.refresh_token_expiration,
        )?,
        expires_in: config.access_token_seconds(),
    })
}

/// Decodes `token` and checks its signature, expiry and type.
pub fn validate_token(token: &str, secret: &str, expected: TokenType) -> AppResult<Claims> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        let message = match e.kind() {
            ErrorKind::ExpiredSignature => "Token has expired".to_string(),
            ErrorKind::InvalidSignature => "Invalid token signature".to_string(),
            ErrorKind::InvalidToken => "Invalid token".to_string(),
            _ => format!("Token validation failed: {}", e),
        };
        AppError::Unauthorized { message }
    })?;

    if claims.token_type != expected {
        return Err(AppError::Unauthorized {
            message: format!(
                "Invalid token type: expected {:?}, got {:?}",
                expected, claims.token_type
            ),
        });
    }

    Ok(claims)
}

pub fn validate_access_token(token: &str, secret: &str) -> AppResult<Claims> {
    validate_token(token, secret, TokenType::Access)
}

pub fn validate_refresh_token(token: &str, secret: &str) -> AppResult<Claims> {
    validate_token(token, secret, TokenType::Refresh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test_secret_key_for_jwt_testing_0123".to_string(),
            access_token_expiration: 1,
            refresh_token_expiration: 168,
        }
    }

    #[test]
    fn test_token_pair_round_trip() {
        let config = config();
        let pair = generate_token_pair(7, "ada@example.com", &config).unwrap();
        assert_ne!(pair.access_token, pair.refresh_token);
        assert_eq!(pair.expires_in, 3600);

        let claims = validate_access_token(&pair.access_token, &config.secret).unwrap();
        assert_eq!(claims.account_id().unwrap(), 7);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 3600);

        let refresh = validate_refresh_token(&pair.refresh_token, &config.secret).unwrap();
        assert_eq!(refresh.token_type, TokenType::Refresh);
    }

    #[test]
    fn test_wrong_token_type_is_rejected() {
        let config = config();
        let pair = generate_token_pair(1, "a@b.co", &config).unwrap();
        assert!(matches!(
            validate_access_token(&pair.refresh_token, &config.secret),
            Err(AppError::Unauthorized { .. })
        ));
        assert!(validate_refresh_token(&pair.access_token, &config.secret).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = generate_access_token(1, "a@b.co", &config()).unwrap();
        match validate_access_token(&token, "another_secret_that_is_long_enough") {
            Err(AppError::Unauthorized { message }) => {
                assert_eq!(message, "Invalid token signature")
            }
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let secret = config().secret;
        // Past the default 60 second leeway
        let token = generate_token(1, "a@b.co", TokenType::Access, &secret, -1).unwrap();
        match validate_access_token(&token, &secret) {
            Err(AppError::Unauthorized { message }) => assert_eq!(message, "Token has expired"),
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(validate_access_token("not.a.token", &config().secret).is_err());
    }
}
