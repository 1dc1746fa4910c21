//! Authentication service for user registration, login, and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::error::{map_unique_violation, AppError, AppResult};
use crate::models::{parse_roles, RoleName, User};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// Input for registering a user
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 3, max = 80, message = "Username must be between 3 and 80 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// Role name, matched case-insensitively; unknown names become clerk
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub exp: i64,
    pub iat: i64,
}

/// Access token issued at login
#[derive(Debug, Serialize)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CredentialRow {
    id: Uuid,
    password_hash: String,
    is_active: bool,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Register a user with a single role
    pub async fn register(&self, input: RegisterInput) -> AppResult<User> {
        input.validate()?;

        let taken = sqlx::query_as::<_, (bool, bool)>(
            r#"
            SELECT
                EXISTS(SELECT 1 FROM users WHERE username = $1),
                EXISTS(SELECT 1 FROM users WHERE email = $2)
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .fetch_one(&self.db)
        .await?;

        if taken.0 {
            return Err(AppError::conflict("user", "Username already registered"));
        }
        if taken.1 {
            return Err(AppError::conflict("user", "Email already registered"));
        }

        let role = RoleName::for_registration(input.role.as_deref());

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let mut tx = self.db.begin().await?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "user"))?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, id FROM roles WHERE name = $2
            "#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, role = %role, "User registered");

        self.find_user(user_id)
            .await?
            .ok_or_else(|| AppError::Internal("Registered user not found".to_string()))
    }

    /// Login with username and password
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthToken> {
        let credentials = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, password_hash, is_active FROM users WHERE username = $1",
        )
        .bind(&input.username)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Incorrect username or password".to_string()))?;

        let valid = verify(&input.password, &credentials.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::Unauthorized(
                "Incorrect username or password".to_string(),
            ));
        }

        if !credentials.is_active {
            return Err(AppError::Unauthorized("Account is disabled".to_string()));
        }

        self.generate_token(credentials.id)
    }

    /// Resolve the principal behind a bearer token.
    ///
    /// Missing or inactive users are rejected even when the token itself is valid.
    pub async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = self.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token payload".to_string()))?;

        let user = self
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        if !user.is_active {
            return Err(AppError::Unauthorized("Inactive user".to_string()));
        }

        Ok(user)
    }

    /// Validate access token and return claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }

    /// Load a user with their role names
    pub async fn find_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, is_active, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let role_names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(Some(User {
            id: row.id,
            username: row.username,
            email: row.email,
            is_active: row.is_active,
            roles: parse_roles(&role_names),
            created_at: row.created_at,
        }))
    }

    /// Generate an access token for a user
    fn generate_token(&self, user_id: Uuid) -> AppResult<AuthToken> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_token_expiry);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(AuthToken {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        DatabaseConfig, JwtConfig, ReplenishmentConfig, ReportingConfig, ServerConfig,
    };
    use shared::RegenerationPolicy;

    fn config() -> Config {
        Config {
            environment: "test".to_string(),
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/unused".to_string(),
                max_connections: 1,
                min_connections: 0,
                acquire_timeout_secs: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                access_token_expiry: 1800,
            },
            replenishment: ReplenishmentConfig {
                lookback_days: 30,
                forecast_days: 7,
                safety_stock_factor: rust_decimal::Decimal::new(15, 1),
                regeneration_policy: RegenerationPolicy::Additive,
            },
            reporting: ReportingConfig {
                performance_window_days: 30,
            },
        }
    }

    fn service() -> AuthService {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        AuthService::new(pool, &config())
    }

    #[tokio::test]
    async fn issued_token_validates_to_same_subject() {
        let service = service();
        let user_id = Uuid::new_v4();
        let token = service.generate_token(user_id).unwrap();
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 1800);

        let claims = service.validate_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.exp - claims.iat, 1800);
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_unauthorized() {
        let service = service();
        let other = AuthService {
            jwt_secret: "another-secret".to_string(),
            ..service.clone()
        };
        let token = other.generate_token(Uuid::new_v4()).unwrap();
        assert!(matches!(
            service.validate_token(&token.access_token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn registration_input_rules() {
        let input = RegisterInput {
            username: "ab".to_string(),
            email: "clerk@example.com".to_string(),
            password: "secret1".to_string(),
            role: None,
        };
        assert!(input.validate().is_err());

        let input = RegisterInput {
            username: "alice".to_string(),
            email: "not-an-email".to_string(),
            password: "secret1".to_string(),
            role: None,
        };
        assert!(input.validate().is_err());

        let input = RegisterInput {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "12345".to_string(),
            role: Some("Manager".to_string()),
        };
        assert!(input.validate().is_err());
    }
}
