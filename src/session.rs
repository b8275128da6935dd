//! Login state and the route guard.
//!
//! The session is a flag in storage. Every [`Session`] re-derives itself from
//! that flag, so a login or logout through one storage handle reaches the
//! others through [`Session::sync`].

use tokio::sync::broadcast::{error::TryRecvError, Receiver};

use crate::config::Credentials;
use crate::entity::DemoUser;
use crate::error::{Result, StockflowError};
use crate::route::{Redirect, Route};
use crate::storage::{keys, LocalStorage, StorageEvent};

const SIGNED_IN: &str = "true";
const MIN_PASSWORD_LEN: usize = 6;

/// Sign-up form. Registration is simulated and never grants a session.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    pub fn validate(&self) -> Result<()> {
        validate_new_password(&self.password, &self.confirm_password)
    }
}

/// Shared by sign-up and profile updates
pub fn validate_new_password(password: &str, confirm: &str) -> Result<()> {
    if password != confirm {
        return Err(StockflowError::InvalidPassword("passwords do not match"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(StockflowError::InvalidPassword(
            "must be at least 6 characters",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Session {
    credentials: Credentials,
    user: Option<DemoUser>,
    loading: bool,
    error: Option<String>,
}

impl Session {
    /// A session that has not checked storage yet
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            user: None,
            loading: true,
            error: None,
        }
    }

    /// Check storage for an existing login. Ends the loading state.
    pub fn restore(&mut self, storage: &LocalStorage) -> Result<()> {
        let flag = storage.read_raw(keys::SESSION)?;
        self.apply_flag(flag.as_deref());
        self.loading = false;
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&DemoUser> {
        self.user.as_ref()
    }

    /// Message from the last failed login
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn login(&mut self, storage: &LocalStorage, email: &str, password: &str) -> Result<Redirect> {
        self.error = None;
        self.loading = false;

        if !self.credentials.matches(email, password) {
            self.user = None;
            storage.delete(keys::SESSION)?;
            let err = StockflowError::InvalidCredentials;
            self.error = Some(err.to_string());
            tracing::info!(email, "login rejected");
            return Err(err);
        }

        storage.write_raw(keys::SESSION, SIGNED_IN)?;
        self.user = Some(DemoUser::admin(self.credentials.email.clone()));
        tracing::info!(email, "logged in");
        Ok(Redirect::now(Route::Home))
    }

    pub fn register(&mut self, storage: &LocalStorage, form: &Registration) -> Result<Redirect> {
        self.error = None;
        form.validate()?;

        self.user = None;
        storage.delete(keys::SESSION)?;
        tracing::info!(email = %form.email, "registration accepted (not persisted)");
        Ok(Redirect::now(Route::Login))
    }

    pub fn logout(&mut self, storage: &LocalStorage) -> Result<Redirect> {
        self.user = None;
        storage.delete(keys::SESSION)?;
        tracing::info!("logged out");
        Ok(Redirect::now(Route::Login))
    }

    /// Apply session changes made through other storage handles.
    /// Returns true if the authenticated state changed.
    pub fn sync(&mut self, storage: &LocalStorage, events: &mut Receiver<StorageEvent>) -> Result<bool> {
        let before = self.is_authenticated();
        loop {
            match events.try_recv() {
                Ok(event) if event.key == keys::SESSION => {
                    self.apply_flag(event.value.as_deref());
                }
                Ok(_) => {}
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::debug!(missed, "session sync lagged, re-reading flag");
                    let flag = storage.read_raw(keys::SESSION)?;
                    self.apply_flag(flag.as_deref());
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        self.loading = false;
        Ok(before != self.is_authenticated())
    }

    fn apply_flag(&mut self, flag: Option<&str>) {
        self.user = match flag {
            Some(SIGNED_IN) => Some(DemoUser::admin(self.credentials.email.clone())),
            _ => None,
        };
    }
}

/// What to show for a route given the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Initial session check still running
    Loading,
    Allow,
    RedirectToLogin,
}

pub fn guard(session: &Session, route: Route) -> GuardDecision {
    if session.is_loading() {
        GuardDecision::Loading
    } else if session.is_authenticated() || route.is_public() {
        GuardDecision::Allow
    } else {
        GuardDecision::RedirectToLogin
    }
}

/// Like [`guard`], as an error for callers that cannot render a redirect
pub fn require(session: &Session, route: Route) -> Result<()> {
    match guard(session, route) {
        GuardDecision::Allow => Ok(()),
        GuardDecision::Loading | GuardDecision::RedirectToLogin => Err(StockflowError::Unauthenticated {
            route: route.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restored(storage: &LocalStorage) -> Session {
        let mut session = Session::new(Credentials::default());
        session.restore(storage).unwrap();
        session
    }

    #[test]
    fn test_guard_waits_for_initial_check() {
        let session = Session::new(Credentials::default());
        assert_eq!(guard(&session, Route::Home), GuardDecision::Loading);
        assert_eq!(guard(&session, Route::Login), GuardDecision::Loading);
    }

    #[test]
    fn test_guard_redirects_anonymous_users() {
        let storage = LocalStorage::in_memory();
        let session = restored(&storage);

        assert_eq!(guard(&session, Route::StockOut), GuardDecision::RedirectToLogin);
        assert_eq!(guard(&session, Route::Login), GuardDecision::Allow);
        assert_eq!(guard(&session, Route::Register), GuardDecision::Allow);
        assert!(matches!(
            require(&session, Route::Home),
            Err(StockflowError::Unauthenticated { .. })
        ));
    }

    #[test]
    fn test_login_with_demo_credentials() {
        let storage = LocalStorage::in_memory();
        let mut session = restored(&storage);

        let redirect = session.login(&storage, "admin@admin.com", "1234").unwrap();

        assert_eq!(redirect.to, Route::Home);
        assert!(session.is_authenticated());
        assert_eq!(session.user().unwrap().role, "admin");
        assert_eq!(storage.read_raw(keys::SESSION).unwrap().as_deref(), Some("true"));
        assert_eq!(guard(&session, Route::Home), GuardDecision::Allow);
    }

    #[test]
    fn test_login_with_wrong_password() {
        let storage = LocalStorage::in_memory();
        let mut session = restored(&storage);

        let result = session.login(&storage, "admin@admin.com", "nope");

        assert!(matches!(result, Err(StockflowError::InvalidCredentials)));
        assert!(!session.is_authenticated());
        assert!(session.error().is_some());
        assert!(storage.read_raw(keys::SESSION).unwrap().is_none());
    }

    #[test]
    fn test_restore_existing_login() {
        let storage = LocalStorage::in_memory();
        storage.write_raw(keys::SESSION, "true").unwrap();

        let session = restored(&storage);
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_logout_clears_flag() {
        let storage = LocalStorage::in_memory();
        let mut session = restored(&storage);
        session.login(&storage, "admin@admin.com", "1234").unwrap();

        let redirect = session.logout(&storage).unwrap();

        assert_eq!(redirect.to, Route::Login);
        assert!(!session.is_authenticated());
        assert!(storage.read_raw(keys::SESSION).unwrap().is_none());
    }

    #[test]
    fn test_register_never_signs_in() {
        let storage = LocalStorage::in_memory();
        let mut session = restored(&storage);
        let form = Registration {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            password: "segredo".to_string(),
            confirm_password: "segredo".to_string(),
        };

        let redirect = session.register(&storage, &form).unwrap();

        assert_eq!(redirect.to, Route::Login);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_register_rejects_bad_passwords() {
        let storage = LocalStorage::in_memory();
        let mut session = restored(&storage);
        let mut form = Registration {
            password: "abc".to_string(),
            confirm_password: "abc".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            session.register(&storage, &form),
            Err(StockflowError::InvalidPassword(_))
        ));

        form.confirm_password = "abcdef".to_string();
        assert!(session.register(&storage, &form).is_err());
    }

    #[test]
    fn test_sync_follows_other_tab() {
        let storage = LocalStorage::in_memory();
        let other_tab = storage.clone();
        let mut events = storage.subscribe();
        let mut session = restored(&storage);
        let mut other_session = restored(&other_tab);

        other_session.login(&other_tab, "admin@admin.com", "1234").unwrap();
        assert!(session.sync(&storage, &mut events).unwrap());
        assert!(session.is_authenticated());

        other_session.logout(&other_tab).unwrap();
        assert!(session.sync(&storage, &mut events).unwrap());
        assert!(!session.is_authenticated());

        assert!(!session.sync(&storage, &mut events).unwrap());
    }
}
