use std::sync::Arc;

use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        claims::Claims,
        dto::{AuthSession, LoginRequest, PublicUser, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password_blocking, verify_password_blocking},
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    db::StoreError,
    error::AppError,
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Well-formed Argon2id digest at the default cost that no password matches.
const UNKNOWN_USER_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$YWNhZGVteS1sb2dpbi0xNg$kZPClkQ9N0PE43X/3ymKe0ZeoZd7xdZuatnUjEY+Ong";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Register, login and identify on top of the credential store, the password
/// hasher and the token issuer.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.users.clone(), state.keys.clone())
    }
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    #[instrument(skip(self, input), fields(email = %input.email.trim()))]
    pub async fn register(&self, input: RegisterRequest) -> Result<AuthSession, AppError> {
        let email = input.email.trim().to_string();
        let name = input.name.trim().to_string();

        if !is_valid_email(&email) {
            warn!("invalid email");
            return Err(AppError::Validation("Invalid email".into()));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            warn!("password too short");
            return Err(AppError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".into()));
        }

        // Early exit only; the unique index decides races.
        if self.users.find_by_email(&email).await?.is_some() {
            warn!("email already registered");
            return Err(AppError::DuplicateUser);
        }

        let password_hash = hash_password_blocking(input.password).await?;

        let new_user = NewUser {
            email,
            password_hash,
            name,
            role: input.role.unwrap_or_default(),
        };
        let user = match self.users.create(new_user).await {
            Ok(u) => u,
            Err(StoreError::UniqueViolation(constraint)) => {
                warn!(%constraint, "email registered concurrently");
                return Err(AppError::DuplicateUser);
            }
            Err(e) => {
                error!(error = %e, "create user failed");
                return Err(e.into());
            }
        };

        let session = self.session_for(user)?;
        info!(user_id = %session.user.id, role = %session.user.role, "user registered");
        Ok(session)
    }

    #[instrument(skip(self, input), fields(email = %input.email.trim()))]
    pub async fn login(&self, input: LoginRequest) -> Result<AuthSession, AppError> {
        let email = input.email.trim();

        // Unknown emails still pay for a full verify against UNKNOWN_USER_HASH.
        let user = self.users.find_by_email(email).await?;
        let hash = user
            .as_ref()
            .map_or_else(|| UNKNOWN_USER_HASH.to_string(), |u| u.password_hash.clone());
        let matched = verify_password_blocking(input.password, hash).await?;

        let user = match user {
            Some(u) if matched => u,
            Some(u) => {
                warn!(user_id = %u.id, "login invalid password");
                return Err(AppError::InvalidCredentials);
            }
            None => {
                warn!("login unknown email");
                return Err(AppError::InvalidCredentials);
            }
        };

        let session = self.session_for(user)?;
        info!(user_id = %session.user.id, "user logged in");
        Ok(session)
    }

    /// Current public view of the user named by already-verified claims.
    #[instrument(skip(self, claims), fields(user_id = %claims.sub))]
    pub async fn identify(&self, claims: &Claims) -> Result<PublicUser, AppError> {
        match self.users.find_by_id(claims.sub).await? {
            Some(u) => Ok(u.into()),
            None => {
                warn!("token subject no longer exists");
                Err(AppError::InvalidToken)
            }
        }
    }

    fn session_for(&self, user: User) -> Result<AuthSession, AppError> {
        let token = self.keys.issue(user.id, user.role).map_err(|e| {
            error!(error = %e, "jwt sign failed");
            e
        })?;
        Ok(AuthSession {
            token,
            user: user.into(),
        })
    }
}
