use chrono::Local;

use super::{require_text, Store};
use crate::error::{KhataError, Result};
use crate::model::{validate_amount, Category, Product};
use crate::session::Session;

/// Input for `Store::add_product`
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: f64,
    /// Defaults to the category's unit
    pub unit: Option<String>,
    pub description: Option<String>,
    pub stock: u32,
    pub featured: bool,
}

/// Partial update for `Store::update_product`; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub stock: Option<u32>,
    pub available: Option<bool>,
    pub featured: Option<bool>,
}

impl Store {
    /// Categories sorted by name
    pub fn categories(&self) -> Result<Vec<Category>> {
        let mut categories = self.load::<Category>()?.records;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    fn find_category(&self, name: &str) -> Result<Category> {
        self.load::<Category>()?
            .records
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| KhataError::CategoryNotFound(name.to_string()))
    }

    pub fn add_category(&self, session: &Session, name: &str, unit: &str) -> Result<Category> {
        session.require_admin()?;
        let name = require_text(name, "name")?;
        let unit = require_text(unit, "unit")?;

        let mut categories = self.load::<Category>()?;
        if categories
            .records
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(&name))
        {
            return Err(KhataError::CategoryExists(name));
        }
        let category = categories.insert(|id| Category { id, name, unit });
        self.save(&categories)?;
        tracing::info!(operator = %session.phone, category = %category.name, "category added");
        Ok(category)
    }

    /// Remove a category that no product refers to
    pub fn remove_category(&self, session: &Session, name: &str) -> Result<Category> {
        session.require_admin()?;
        let category = self.find_category(name)?;
        let count = self
            .products()?
            .iter()
            .filter(|p| p.category.eq_ignore_ascii_case(&category.name))
            .count();
        if count > 0 {
            return Err(KhataError::CategoryInUse {
                name: category.name,
                count,
            });
        }

        let mut categories = self.load::<Category>()?;
        let removed = categories
            .remove(category.id)
            .ok_or_else(|| KhataError::CategoryNotFound(name.to_string()))?;
        self.save(&categories)?;
        tracing::info!(operator = %session.phone, category = %removed.name, "category removed");
        Ok(removed)
    }

    /// Products sorted by category, then name
    pub fn products(&self) -> Result<Vec<Product>> {
        let mut products = self.load::<Product>()?.records;
        products.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
        Ok(products)
    }

    pub fn product(&self, id: u32) -> Result<Product> {
        self.load::<Product>()?
            .get(id)
            .cloned()
            .ok_or(KhataError::ProductNotFound(id))
    }

    pub fn add_product(&self, session: &Session, new: NewProduct) -> Result<Product> {
        session.require_admin()?;
        let name = require_text(&new.name, "name")?;
        let price = validate_amount(new.price)?;
        let category = self.find_category(&new.category)?;
        let unit = match new.unit {
            Some(unit) => require_text(&unit, "unit")?,
            None => category.unit.clone(),
        };

        let mut products = self.load::<Product>()?;
        let product = products.insert(|id| Product {
            id,
            name,
            description: new.description.filter(|d| !d.trim().is_empty()),
            price,
            category: category.name,
            unit,
            stock: new.stock,
            available: true,
            featured: new.featured,
            created: Local::now().naive_local(),
        });
        self.save(&products)?;
        tracing::info!(
            operator = %session.phone,
            id = product.id,
            product = %product.name,
            "product added"
        );
        Ok(product)
    }

    pub fn update_product(
        &self,
        session: &Session,
        id: u32,
        patch: ProductPatch,
    ) -> Result<Product> {
        session.require_admin()?;
        let category = match &patch.category {
            Some(name) => Some(self.find_category(name)?.name),
            None => None,
        };

        let mut products = self.load::<Product>()?;
        let product = products.get_mut(id).ok_or(KhataError::ProductNotFound(id))?;
        if let Some(name) = &patch.name {
            product.name = require_text(name, "name")?;
        }
        if let Some(price) = patch.price {
            product.price = validate_amount(price)?;
        }
        if let Some(category) = category {
            product.category = category;
        }
        if let Some(unit) = &patch.unit {
            product.unit = require_text(unit, "unit")?;
        }
        if let Some(description) = patch.description {
            product.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(available) = patch.available {
            product.available = available;
        }
        if let Some(featured) = patch.featured {
            product.featured = featured;
        }
        let updated = product.clone();
        self.save(&products)?;
        tracing::info!(operator = %session.phone, id, "product updated");
        Ok(updated)
    }

    /// Add units to a product's stock
    pub fn restock(&self, session: &Session, id: u32, quantity: u32) -> Result<Product> {
        session.require_admin()?;
        if quantity == 0 {
            return Err(KhataError::InvalidQuantity(quantity));
        }
        let mut products = self.load::<Product>()?;
        let product = products.get_mut(id).ok_or(KhataError::ProductNotFound(id))?;
        product.stock = product.stock.saturating_add(quantity);
        let updated = product.clone();
        self.save(&products)?;
        tracing::info!(
            operator = %session.phone,
            id,
            added = quantity,
            stock = updated.stock,
            "product restocked"
        );
        Ok(updated)
    }

    pub fn remove_product(&self, session: &Session, id: u32) -> Result<Product> {
        session.require_admin()?;
        let mut products = self.load::<Product>()?;
        let removed = products.remove(id).ok_or(KhataError::ProductNotFound(id))?;
        self.save(&products)?;
        tracing::info!(operator = %session.phone, id, product = %removed.name, "product removed");
        Ok(removed)
    }
}
