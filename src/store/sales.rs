use chrono::{Local, NaiveDateTime};

use super::Store;
use crate::error::{KhataError, Result};
use crate::model::{validate_amount, PaymentRecord, Product, SaleRecord};
use crate::session::Session;

/// Input for `Store::record_sale`
#[derive(Debug, Clone)]
pub struct NewSale {
    pub product_id: u32,
    pub quantity: u32,
    /// Walk-in sales carry no customer
    pub customer_phone: Option<String>,
    /// Defaults to now
    pub date: Option<NaiveDateTime>,
}

/// Input for `Store::record_payment`
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub customer_phone: String,
    pub amount: f64,
    pub date: Option<NaiveDateTime>,
    pub note: Option<String>,
}

impl Store {
    /// Record a sale and take the sold quantity out of stock.
    ///
    /// Stock is only written after the sale itself is on disk, so a failed
    /// sale leaves the catalog untouched.
    pub fn record_sale(&self, session: &Session, new: NewSale) -> Result<SaleRecord> {
        session.require_admin()?;
        if new.quantity == 0 {
            return Err(KhataError::InvalidQuantity(new.quantity));
        }

        let customer = match &new.customer_phone {
            Some(phone) => Some(self.find_customer(phone)?),
            None => None,
        };

        let mut products = self.load::<Product>()?;
        let product = products
            .get_mut(new.product_id)
            .ok_or(KhataError::ProductNotFound(new.product_id))?;
        if !product.available {
            return Err(KhataError::ProductUnavailable(product.name.clone()));
        }
        if product.stock < new.quantity {
            return Err(KhataError::NotEnoughStock {
                product: product.name.clone(),
                available: product.stock,
                requested: new.quantity,
            });
        }
        product.stock -= new.quantity;
        let product = product.clone();

        let mut sales = self.load::<SaleRecord>()?;
        let sale = sales.insert(|id| SaleRecord {
            id,
            product_id: product.id,
            product_name: product.name.clone(),
            category: product.category.clone(),
            unit: product.unit.clone(),
            quantity: new.quantity,
            unit_price: product.price,
            total: product.price * f64::from(new.quantity),
            customer_name: customer.as_ref().map(|c| c.name.clone()),
            customer_phone: customer.as_ref().map(|c| c.phone.clone()),
            date: new.date.unwrap_or_else(|| Local::now().naive_local()),
        });

        self.save(&sales)?;
        if let Err(e) = self.save(&products) {
            sales.remove(sale.id);
            self.save(&sales)?;
            return Err(e);
        }
        tracing::info!(
            operator = %session.phone,
            id = sale.id,
            product = %sale.product_name,
            quantity = sale.quantity,
            total = sale.total,
            stock_left = product.stock,
            "sale recorded"
        );
        Ok(sale)
    }

    /// All sales, newest first
    pub fn sales(&self) -> Result<Vec<SaleRecord>> {
        let mut sales = self.load::<SaleRecord>()?.records;
        sales.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(sales)
    }

    /// One customer's sales in the order they were recorded
    pub fn sales_for(&self, phone: &str) -> Result<Vec<SaleRecord>> {
        Ok(self
            .load::<SaleRecord>()?
            .records
            .into_iter()
            .filter(|s| s.is_for(phone))
            .collect())
    }

    pub fn sale(&self, id: u32) -> Result<SaleRecord> {
        self.load::<SaleRecord>()?
            .get(id)
            .cloned()
            .ok_or(KhataError::SaleNotFound(id))
    }

    /// Record money received from a customer
    pub fn record_payment(&self, session: &Session, new: NewPayment) -> Result<PaymentRecord> {
        session.require_admin()?;
        let amount = validate_amount(new.amount)?;
        let customer = self.find_customer(&new.customer_phone)?;

        let mut payments = self.load::<PaymentRecord>()?;
        let payment = payments.insert(|id| PaymentRecord {
            id,
            customer_phone: customer.phone.clone(),
            amount,
            date: new.date.unwrap_or_else(|| Local::now().naive_local()),
            note: new.note.filter(|n| !n.trim().is_empty()),
        });
        self.save(&payments)?;
        tracing::info!(
            operator = %session.phone,
            id = payment.id,
            phone = %payment.customer_phone,
            amount = payment.amount,
            "payment recorded"
        );
        Ok(payment)
    }

    /// All payments, newest first
    pub fn payments(&self) -> Result<Vec<PaymentRecord>> {
        let mut payments = self.load::<PaymentRecord>()?.records;
        payments.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(payments)
    }

    /// One customer's payments in the order they were recorded
    pub fn payments_for(&self, phone: &str) -> Result<Vec<PaymentRecord>> {
        Ok(self
            .load::<PaymentRecord>()?
            .records
            .into_iter()
            .filter(|p| p.customer_phone == phone)
            .collect())
    }
}
