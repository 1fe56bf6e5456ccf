use chrono::{Local, NaiveDateTime};

use super::{require_text, Store};
use crate::error::{KhataError, Result};
use crate::model::{validate_amount, Expense};
use crate::session::Session;

#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDateTime>,
}

impl Store {
    /// All expenses, newest first
    pub fn expenses(&self) -> Result<Vec<Expense>> {
        let mut expenses = self.load::<Expense>()?.records;
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(expenses)
    }

    pub fn add_expense(
        &self,
        session: &Session,
        description: &str,
        amount: f64,
        date: Option<NaiveDateTime>,
    ) -> Result<Expense> {
        session.require_admin()?;
        let description = require_text(description, "description")?;
        let amount = validate_amount(amount)?;

        let mut expenses = self.load::<Expense>()?;
        let expense = expenses.insert(|id| Expense {
            id,
            description,
            amount,
            date: date.unwrap_or_else(|| Local::now().naive_local()),
        });
        self.save(&expenses)?;
        tracing::info!(operator = %session.phone, id = expense.id, amount, "expense added");
        Ok(expense)
    }

    pub fn update_expense(
        &self,
        session: &Session,
        id: u32,
        patch: ExpensePatch,
    ) -> Result<Expense> {
        session.require_admin()?;
        let mut expenses = self.load::<Expense>()?;
        let expense = expenses.get_mut(id).ok_or(KhataError::ExpenseNotFound(id))?;
        if let Some(description) = &patch.description {
            expense.description = require_text(description, "description")?;
        }
        if let Some(amount) = patch.amount {
            expense.amount = validate_amount(amount)?;
        }
        if let Some(date) = patch.date {
            expense.date = date;
        }
        let updated = expense.clone();
        self.save(&expenses)?;
        tracing::info!(operator = %session.phone, id, "expense updated");
        Ok(updated)
    }

    pub fn remove_expense(&self, session: &Session, id: u32) -> Result<Expense> {
        session.require_admin()?;
        let mut expenses = self.load::<Expense>()?;
        let removed = expenses.remove(id).ok_or(KhataError::ExpenseNotFound(id))?;
        self.save(&expenses)?;
        tracing::info!(operator = %session.phone, id, "expense removed");
        Ok(removed)
    }
}
