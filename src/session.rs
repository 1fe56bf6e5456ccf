//! Explicit login session.
//!
//! `login` writes `session.toml` next to the config, `logout` removes it, and
//! every authenticated command loads it and hands it to the store.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{KhataError, Result};
use crate::model::{Role, User};
use crate::store::{write_toml, Store};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Session {
    pub user_id: u32,
    pub name: String,
    pub phone: String,
    pub role: Role,
    pub started: NaiveDateTime,
}

fn session_file(cfg_dir: &Path) -> PathBuf {
    cfg_dir.join("session.toml")
}

impl Session {
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            phone: user.phone.clone(),
            role: user.role,
            started: Local::now().naive_local(),
        }
    }

    /// Check credentials against the user collection and persist the session
    pub fn login(store: &Store, phone: &str, password: &str) -> Result<Session> {
        let users = store.load::<User>()?;
        let user = users
            .records
            .iter()
            .find(|u| u.phone == phone.trim())
            .filter(|u| u.active && u.password_matches(password))
            .ok_or(KhataError::InvalidCredentials)?;

        let session = Session::for_user(user);
        write_toml(&session_file(store.root()), &session)?;
        tracing::info!(phone = %session.phone, role = %session.role, "logged in");
        Ok(session)
    }

    /// The stored session, if any
    pub fn load(cfg_dir: &Path) -> Result<Option<Session>> {
        let path = session_file(cfg_dir);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let session = toml::from_str(&content)
            .map_err(|e| KhataError::ConfigParse { path, source: e })?;
        Ok(Some(session))
    }

    /// The stored session, re-validated against the user collection.
    /// Role and name always come from the user record. A session whose user
    /// was removed or deactivated is cleared.
    pub fn current(store: &Store) -> Result<Session> {
        let mut session = Session::load(store.root())?.ok_or(KhataError::NotLoggedIn)?;
        let users = store.load::<User>()?;
        let Some(user) = users
            .get(session.user_id)
            .filter(|u| u.active && u.phone == session.phone)
        else {
            tracing::warn!(phone = %session.phone, "dropping session of a removed user");
            Session::logout(store.root())?;
            return Err(KhataError::NotLoggedIn);
        };
        if session.role != user.role {
            tracing::warn!(
                phone = %session.phone,
                stored = %session.role,
                actual = %user.role,
                "session role does not match the user record"
            );
        }
        session.role = user.role;
        session.name = user.name.clone();
        Ok(session)
    }

    /// Remove the stored session, returning it if there was one
    pub fn logout(cfg_dir: &Path) -> Result<Option<Session>> {
        let previous = Session::load(cfg_dir)?;
        let path = session_file(cfg_dir);
        if path.exists() {
            fs::remove_file(path)?;
        }
        if let Some(session) = &previous {
            tracing::info!(phone = %session.phone, "logged out");
        }
        Ok(previous)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(KhataError::AdminRequired)
        }
    }

    /// Admins see every ledger, users only their own
    pub fn ensure_can_view(&self, phone: &str) -> Result<()> {
        if self.is_admin() || self.phone == phone {
            Ok(())
        } else {
            Err(KhataError::Forbidden(phone.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use tempfile::TempDir;

    fn store() -> (TempDir, Store) {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::create(&temp_dir.path().join("shop")).unwrap();
        store.register_admin("Admin", "admin", "admin").unwrap();
        (temp_dir, store)
    }

    #[test]
    fn login_persists_session() {
        let (_dir, store) = store();
        let session = Session::login(&store, "admin", "admin").unwrap();
        assert!(session.is_admin());
        assert_eq!(Session::current(&store).unwrap(), session);
    }

    #[test]
    fn wrong_password_is_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            Session::login(&store, "admin", "nope"),
            Err(KhataError::InvalidCredentials)
        ));
        assert!(Session::load(store.root()).unwrap().is_none());
    }

    #[test]
    fn session_of_removed_customer_is_dropped() {
        let (_dir, store) = store();
        let admin = Session::login(&store, "admin", "admin").unwrap();
        store.add_customer(&admin, "Asha", "9000000001").unwrap();

        Session::login(&store, "9000000001", "9000000001").unwrap();
        store.remove_customer(&admin, "9000000001").unwrap();

        assert!(matches!(Session::current(&store), Err(KhataError::NotLoggedIn)));
        assert!(Session::load(store.root()).unwrap().is_none());
    }

    #[test]
    fn users_only_view_their_own_ledger() {
        let (_dir, store) = store();
        let admin = Session::login(&store, "admin", "admin").unwrap();
        let customer = store.add_customer(&admin, "Asha", "9000000001").unwrap();
        let session = Session::for_user(&customer);

        assert!(session.ensure_can_view("9000000001").is_ok());
        assert!(matches!(
            session.ensure_can_view("9000000002"),
            Err(KhataError::Forbidden(_))
        ));
        assert!(admin.ensure_can_view("9000000002").is_ok());
    }

    #[test]
    fn edited_session_role_is_ignored() {
        let (_dir, store) = store();
        let admin = Session::login(&store, "admin", "admin").unwrap();
        store.add_customer(&admin, "Asha", "9000000001").unwrap();

        let mut session = Session::login(&store, "9000000001", "9000000001").unwrap();
        session.role = Role::Admin;
        write_toml(&session_file(store.root()), &session).unwrap();

        let current = Session::current(&store).unwrap();
        assert_eq!(current.role, Role::User);
        assert!(matches!(current.require_admin(), Err(KhataError::AdminRequired)));
    }
}
