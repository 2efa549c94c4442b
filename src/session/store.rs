//! Authenticated session state

use super::storage::{keys, KeyValueStore};
use crate::error::Result;
use crate::i18n::Language;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// User role as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Token pair returned by login/register
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// The authenticated user's credentials and identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub role: Role,
    pub access_token: String,
    pub refresh_token: String,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Owns the current session and keeps it in sync with durable storage.
///
/// Created once at the application root and shared by reference with the
/// HTTP client and services.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    current: RwLock<Option<Session>>,
    language: RwLock<Language>,
}

impl SessionStore {
    /// Create an empty store on top of `storage` without reading it
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            current: RwLock::new(None),
            language: RwLock::new(Language::default()),
        }
    }

    /// Create a store and rehydrate it from `storage`
    pub fn hydrated(storage: Arc<dyn KeyValueStore>, fallback_language: Language) -> Self {
        let store = Self::new(storage);
        store.hydrate(fallback_language);
        store
    }

    /// Rebuild in-memory state from persisted storage.
    ///
    /// A session is restored only when both email and role are stored.
    pub fn hydrate(&self, fallback_language: Language) {
        let email = self.storage.get(keys::USER_EMAIL);
        let role = self
            .storage
            .get(keys::USER_ROLE)
            .and_then(|r| r.parse::<Role>().ok());

        let session = match (email, role) {
            (Some(email), Some(role)) if !email.is_empty() => Some(Session {
                email,
                role,
                access_token: self.storage.get(keys::ACCESS_TOKEN).unwrap_or_default(),
                refresh_token: self.storage.get(keys::REFRESH_TOKEN).unwrap_or_default(),
            }),
            _ => None,
        };

        let language = self
            .storage
            .get(keys::LANGUAGE)
            .map(|code| Language::from_code_lossy(&code))
            .unwrap_or(fallback_language);

        if let Some(ref s) = session {
            tracing::debug!(email = %s.email, role = %s.role, "session restored");
        }

        *self.current.write() = session;
        *self.language.write() = language;
    }

    /// Store credentials after a successful login or registration
    pub fn login(&self, tokens: AuthTokens, email: &str, role: Role) -> Result<()> {
        self.storage.set(keys::ACCESS_TOKEN, &tokens.access_token)?;
        self.storage.set(keys::REFRESH_TOKEN, &tokens.refresh_token)?;
        self.storage.set(keys::USER_EMAIL, email)?;
        self.storage.set(keys::USER_ROLE, role.as_str())?;

        *self.current.write() = Some(Session {
            email: email.to_string(),
            role,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        });

        tracing::info!(email = %email, role = %role, "logged in");
        Ok(())
    }

    /// Drop credentials from memory and storage.
    ///
    /// In-memory state is cleared even when storage fails.
    pub fn clear(&self) -> Result<()> {
        let previous = self.current.write().take();
        if let Some(s) = previous {
            tracing::info!(email = %s.email, "logged out");
        }

        for key in [
            keys::ACCESS_TOKEN,
            keys::REFRESH_TOKEN,
            keys::USER_EMAIL,
            keys::USER_ROLE,
        ] {
            self.storage.remove(key)?;
        }
        Ok(())
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current
            .read()
            .as_ref()
            .map(Session::is_admin)
            .unwrap_or(false)
    }

    /// Bearer token to attach to outgoing requests, if any
    pub fn access_token(&self) -> Option<String> {
        self.current
            .read()
            .as_ref()
            .map(|s| s.access_token.clone())
            .filter(|t| !t.is_empty())
    }

    pub fn language(&self) -> Language {
        *self.language.read()
    }

    /// Change and persist the UI language
    pub fn set_language(&self, language: Language) -> Result<()> {
        self.storage.set(keys::LANGUAGE, language.code())?;
        *self.language.write() = language;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    fn tokens() -> AuthTokens {
        AuthTokens {
            access_token: "access-123".to_string(),
            refresh_token: "refresh-456".to_string(),
        }
    }

    #[test]
    fn test_login_stores_both_tokens() {
        let storage = Arc::new(MemoryStore::new());
        let store = SessionStore::new(storage.clone());

        store.login(tokens(), "jane@example.com", Role::User).unwrap();

        assert!(store.is_authenticated());
        assert!(!store.is_admin());
        assert_eq!(
            storage.get(keys::ACCESS_TOKEN).as_deref(),
            Some("access-123")
        );
        assert_eq!(
            storage.get(keys::REFRESH_TOKEN).as_deref(),
            Some("refresh-456")
        );
        assert_eq!(store.access_token().as_deref(), Some("access-123"));
    }

    #[test]
    fn test_clear_removes_both_tokens() {
        let storage = Arc::new(MemoryStore::new());
        let store = SessionStore::new(storage.clone());
        store.login(tokens(), "jane@example.com", Role::Admin).unwrap();

        store.clear().unwrap();

        assert!(!store.is_authenticated());
        assert!(!store.is_admin());
        assert!(storage.get(keys::ACCESS_TOKEN).is_none());
        assert!(storage.get(keys::REFRESH_TOKEN).is_none());
        assert!(store.access_token().is_none());
    }

    #[test]
    fn test_clear_keeps_language() {
        let storage = Arc::new(MemoryStore::new());
        let store = SessionStore::new(storage.clone());
        store.set_language(Language::Sk).unwrap();
        store.login(tokens(), "jane@example.com", Role::User).unwrap();
        store.clear().unwrap();
        assert_eq!(storage.get(keys::LANGUAGE).as_deref(), Some("sk"));
    }

    #[test]
    fn test_hydrate_restores_session() {
        let storage = Arc::new(MemoryStore::new());
        SessionStore::new(storage.clone())
            .login(tokens(), "admin@example.com", Role::Admin)
            .unwrap();

        let store = SessionStore::hydrated(storage, Language::En);
        let session = store.current().unwrap();
        assert_eq!(session.email, "admin@example.com");
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.access_token, "access-123");
        assert!(store.is_admin());
    }

    #[test]
    fn test_hydrate_requires_email_and_role() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(keys::ACCESS_TOKEN, "orphan").unwrap();
        storage.set(keys::USER_EMAIL, "x@example.com").unwrap();

        let store = SessionStore::hydrated(storage.clone(), Language::En);
        assert!(!store.is_authenticated());

        storage.set(keys::USER_ROLE, "SUPERUSER").unwrap();
        store.hydrate(Language::En);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_hydrate_language_fallback() {
        let storage = Arc::new(MemoryStore::new());
        let store = SessionStore::hydrated(storage.clone(), Language::Sk);
        assert_eq!(store.language(), Language::Sk);

        storage.set(keys::LANGUAGE, "en").unwrap();
        store.hydrate(Language::Sk);
        assert_eq!(store.language(), Language::En);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert!("guest".parse::<Role>().is_err());
        assert_eq!(
            serde_json::to_string(&Role::Admin).unwrap(),
            "\"ADMIN\""
        );
    }
}
