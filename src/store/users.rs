use chrono::Local;

use super::{require_text, Store};
use crate::error::{KhataError, Result};
use crate::model::{hash_password, Role, User};
use crate::session::Session;

impl Store {
    /// Seed the first admin account. Only `init` calls this, before any session exists.
    pub fn register_admin(&self, name: &str, phone: &str, password: &str) -> Result<User> {
        let name = require_text(name, "name")?;
        let phone = require_text(phone, "phone")?;
        if password.is_empty() {
            return Err(KhataError::MissingField("password"));
        }

        let mut users = self.load::<User>()?;
        if users.records.iter().any(|u| u.phone == phone) {
            return Err(KhataError::CustomerExists(phone));
        }

        let password_hash = hash_password(password)?;
        let user = users.insert(|id| User {
            id,
            name,
            email: format!("{phone}@example.com"),
            password_hash,
            phone,
            role: Role::Admin,
            active: true,
            created: Local::now().naive_local(),
        });
        self.save(&users)?;
        tracing::info!(phone = %user.phone, "admin account created");
        Ok(user)
    }

    pub fn users(&self) -> Result<Vec<User>> {
        Ok(self.load::<User>()?.records)
    }

    /// Non-admin users, i.e. the shop's customers
    pub fn customers(&self) -> Result<Vec<User>> {
        let mut customers: Vec<User> = self
            .users()?
            .into_iter()
            .filter(|u| !u.is_admin())
            .collect();
        customers.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(customers)
    }

    pub fn find_customer(&self, phone: &str) -> Result<User> {
        self.users()?
            .into_iter()
            .find(|u| u.phone == phone && !u.is_admin())
            .ok_or_else(|| KhataError::CustomerNotFound(phone.to_string()))
    }

    /// Add a customer. Their initial password is their phone number.
    pub fn add_customer(&self, session: &Session, name: &str, phone: &str) -> Result<User> {
        session.require_admin()?;
        let name = require_text(name, "name")?;
        let phone = require_text(phone, "phone")?;

        let mut users = self.load::<User>()?;
        if users.records.iter().any(|u| u.phone == phone) {
            return Err(KhataError::CustomerExists(phone));
        }

        let password_hash = hash_password(&phone)?;
        let user = users.insert(|id| User {
            id,
            name,
            email: format!("{phone}@example.com"),
            password_hash,
            phone,
            role: Role::User,
            active: true,
            created: Local::now().naive_local(),
        });
        self.save(&users)?;
        tracing::info!(operator = %session.phone, phone = %user.phone, "customer added");
        Ok(user)
    }

    /// Change the logged-in user's own password
    pub fn change_password(&self, session: &Session, current: &str, new: &str) -> Result<()> {
        if new.is_empty() {
            return Err(KhataError::MissingField("new password"));
        }
        let mut users = self.load::<User>()?;
        let user = users
            .get_mut(session.user_id)
            .filter(|u| u.password_matches(current))
            .ok_or(KhataError::InvalidCredentials)?;
        user.password_hash = hash_password(new)?;
        self.save(&users)?;
        tracing::info!(phone = %session.phone, "password changed");
        Ok(())
    }

    /// Remove a customer account. Their sales and payments stay on record.
    pub fn remove_customer(&self, session: &Session, phone: &str) -> Result<User> {
        session.require_admin()?;
        let mut users = self.load::<User>()?;
        let id = users
            .records
            .iter()
            .find(|u| u.phone == phone && !u.is_admin())
            .map(|u| u.id)
            .ok_or_else(|| KhataError::CustomerNotFound(phone.to_string()))?;
        let removed = users
            .remove(id)
            .ok_or_else(|| KhataError::CustomerNotFound(phone.to_string()))?;
        self.save(&users)?;
        tracing::info!(operator = %session.phone, phone = %removed.phone, "customer removed");
        Ok(removed)
    }
}
