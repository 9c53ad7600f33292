//! Login, logout and self-registration

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tt_auth::{
    hash_password, landing_path, post_login_redirect, verify_password, Session, SessionIdentity,
    SessionStore,
};
use tt_contracts::employees::RegistrationContract;
use tt_contracts::Contract;
use tt_core::config::AuthConfig;
use tt_core::error::TtError;
use tt_core::result::TtResult;
use tt_core::traits::Id;
use tt_db::{CreateUserDto, Stores};
use tt_models::{NewUser, Role, User};

use crate::context::Caller;

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
    pub return_url: Option<String>,
}

#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Success { session: Session, redirect: String },
    Failed { error: String },
}

/// The signed-in user as shown to the client
#[derive(Debug, Clone, Serialize)]
pub struct AccountInfo {
    pub user_id: Id,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub employee_id: Option<Id>,
    pub landing_path: &'static str,
}

pub struct AccountService<'a> {
    stores: &'a Stores,
    sessions: &'a dyn SessionStore,
    auth: &'a AuthConfig,
}

impl<'a> AccountService<'a> {
    pub fn new(stores: &'a Stores, sessions: &'a dyn SessionStore, auth: &'a AuthConfig) -> Self {
        Self {
            stores,
            sessions,
            auth,
        }
    }

    /// Check credentials and open a session.
    ///
    /// Unknown email, wrong password and inactive account yield the same failure.
    pub async fn login(&self, request: LoginRequest) -> TtResult<LoginOutcome> {
        let user = self.stores.users.find_by_email(&request.email).await?;

        let user = match user {
            Some(user) if user.is_active && verify_password(&request.password, &user.password_hash) => user,
            _ => {
                warn!(email = %request.email.trim(), "Failed login attempt");
                return Ok(LoginOutcome::Failed {
                    error: INVALID_CREDENTIALS.to_string(),
                });
            }
        };

        let lifetime_seconds = if request.remember_me {
            self.auth.persistent_session_days * 86_400
        } else {
            self.auth.session_lifetime_minutes * 60
        };
        let session = Session::authenticated(identity_of(&user), lifetime_seconds, request.remember_me);
        self.sessions.set(session.clone());

        let redirect = post_login_redirect(request.return_url.as_deref(), user.role);
        info!(
            user_id = user.id,
            role = user.role.as_str(),
            persistent = request.remember_me,
            "User logged in"
        );
        Ok(LoginOutcome::Success { session, redirect })
    }

    pub fn logout(&self, session_id: &str) {
        if let Some(session) = self.sessions.get(session_id) {
            info!(user_id = session.identity.user_id, "User logged out");
        }
        self.sessions.delete(session_id);
    }

    /// Create an Employee-role account without an employee profile
    pub async fn register(&self, mut user: NewUser) -> TtResult<User> {
        user.role = Role::Employee;
        RegistrationContract.validate(&user)?;

        if self.stores.users.find_by_email(&user.email).await?.is_some() {
            return Err(TtError::conflict("A user with this email already exists"));
        }

        let created = self
            .stores
            .users
            .create(CreateUserDto {
                email: user.email.trim().to_string(),
                password_hash: hash_password(&user.password)?,
                first_name: user.first_name.trim().to_string(),
                last_name: user.last_name.trim().to_string(),
                role: Role::Employee,
            })
            .await?;
        info!(user_id = created.id, "User registered");
        Ok(created)
    }

    pub fn me(caller: &Caller) -> AccountInfo {
        AccountInfo {
            user_id: caller.user_id,
            email: caller.email.clone(),
            display_name: caller.display_name.clone(),
            role: caller.role,
            employee_id: caller.employee_id,
            landing_path: landing_path(caller.role),
        }
    }
}

fn identity_of(user: &User) -> SessionIdentity {
    SessionIdentity {
        user_id: user.id,
        email: user.email.clone(),
        display_name: user.full_name(),
        role: user.role,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tt_auth::MemorySessionStore;

    async fn stores_with_admin() -> Stores {
        let stores = Stores::memory();
        stores
            .users
            .create(CreateUserDto {
                email: "admin@test.com".into(),
                password_hash: hash_password("Admin123!").unwrap(),
                first_name: "Admin".into(),
                last_name: "System".into(),
                role: Role::Admin,
            })
            .await
            .unwrap();
        stores
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
            remember_me: false,
            return_url: None,
        }
    }

    #[tokio::test]
    async fn test_admin_login_redirects_to_employees() {
        let stores = stores_with_admin().await;
        let sessions = MemorySessionStore::new();
        let auth = AuthConfig::default();
        let service = AccountService::new(&stores, &sessions, &auth);

        match service.login(login("admin@test.com", "Admin123!")).await.unwrap() {
            LoginOutcome::Success { session, redirect } => {
                assert_eq!(redirect, "/employees");
                assert!(!session.persistent);
                assert_eq!(session.lifetime_seconds, 3600);
                assert!(sessions.get(&session.id).is_some());
            }
            LoginOutcome::Failed { error } => panic!("login failed: {error}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_password_fails_without_session() {
        let stores = stores_with_admin().await;
        let sessions = MemorySessionStore::new();
        let auth = AuthConfig::default();
        let service = AccountService::new(&stores, &sessions, &auth);

        for request in [login("admin@test.com", "wrong"), login("nobody@test.com", "Admin123!")] {
            match service.login(request).await.unwrap() {
                LoginOutcome::Failed { error } => assert_eq!(error, INVALID_CREDENTIALS),
                LoginOutcome::Success { .. } => panic!("login should fail"),
            }
        }
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn test_remember_me_and_return_url() {
        let stores = stores_with_admin().await;
        let sessions = MemorySessionStore::new();
        let auth = AuthConfig::default();
        let service = AccountService::new(&stores, &sessions, &auth);

        let mut request = login("admin@test.com", "Admin123!");
        request.remember_me = true;
        request.return_url = Some("//evil.example.com".into());
        let LoginOutcome::Success { session, redirect } = service.login(request).await.unwrap() else {
            panic!("login failed");
        };
        assert_eq!(redirect, "/employees");
        assert!(session.persistent);
        assert_eq!(session.lifetime_seconds, 14 * 86_400);

        service.logout(&session.id);
        assert!(sessions.get(&session.id).is_none());
    }

    #[tokio::test]
    async fn test_register_forces_employee_role() {
        let stores = stores_with_admin().await;
        let sessions = MemorySessionStore::new();
        let auth = AuthConfig::default();
        let service = AccountService::new(&stores, &sessions, &auth);

        let user = service
            .register(NewUser {
                email: "new@test.com".into(),
                first_name: "Anna".into(),
                last_name: "Nowak".into(),
                password: "Secret123!".into(),
                role: Role::Admin,
            })
            .await
            .unwrap();
        assert_eq!(user.role, Role::Employee);
        assert!(stores.employees.find_by_user(user.id).await.unwrap().is_none());

        let dup = service
            .register(NewUser {
                email: "ADMIN@test.com".into(),
                first_name: "X".into(),
                last_name: "Y".into(),
                password: "Secret123!".into(),
                role: Role::Employee,
            })
            .await
            .unwrap_err();
        assert_eq!(dup.status_code(), 409);
    }
}
