use chrono::Local;
use std::collections::BTreeMap;

use super::Store;
use crate::error::{KhataError, Result};
use crate::model::{
    order_number, Order, OrderItem, OrderStatus, OrderType, PaymentStatus, Product,
};
use crate::session::Session;

/// Input for `Store::place_order`
#[derive(Debug, Clone, Default)]
pub struct NewOrder {
    /// `(product id, quantity)` lines in the order given
    pub items: Vec<(u32, u32)>,
    /// Required when an admin places the order; users always order for themselves
    pub customer_phone: Option<String>,
    pub order_type: OrderType,
    /// Required for delivery orders
    pub address: Option<String>,
    pub instructions: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Store {
    /// Place an order and reserve its stock.
    ///
    /// Every line is checked before anything is written. Quantities of the
    /// same product on several lines are added up for the stock check.
    pub fn place_order(&self, session: &Session, new: NewOrder) -> Result<Order> {
        let phone = match new.customer_phone {
            Some(phone) => {
                session.ensure_can_view(&phone)?;
                phone
            }
            None if session.is_admin() => return Err(KhataError::MissingField("customer phone")),
            None => session.phone.clone(),
        };
        let customer = self.find_customer(&phone)?;

        if new.items.is_empty() {
            return Err(KhataError::MissingField("items"));
        }
        let address = non_empty(new.address);
        if new.order_type == OrderType::Delivery && address.is_none() {
            return Err(KhataError::MissingField("delivery address"));
        }

        let mut products = self.load::<Product>()?;
        let mut requested: BTreeMap<u32, u32> = BTreeMap::new();
        let mut items = Vec::with_capacity(new.items.len());
        for &(product_id, quantity) in &new.items {
            if quantity == 0 {
                return Err(KhataError::InvalidQuantity(quantity));
            }
            let product = products
                .get(product_id)
                .ok_or(KhataError::ProductNotFound(product_id))?;
            if !product.available {
                return Err(KhataError::ProductUnavailable(product.name.clone()));
            }
            let wanted = requested.entry(product_id).or_insert(0);
            *wanted = wanted.saturating_add(quantity);
            if product.stock < *wanted {
                return Err(KhataError::NotEnoughStock {
                    product: product.name.clone(),
                    available: product.stock,
                    requested: *wanted,
                });
            }
            items.push(OrderItem {
                product_id,
                product_name: product.name.clone(),
                unit: product.unit.clone(),
                quantity,
                unit_price: product.price,
                total: product.price * f64::from(quantity),
            });
        }

        for (&id, &quantity) in &requested {
            if let Some(product) = products.get_mut(id) {
                product.stock -= quantity;
            }
        }

        let total: f64 = items.iter().map(|i| i.total).sum();
        let now = Local::now().naive_local();
        let mut orders = self.load::<Order>()?;
        let order = orders.insert(|id| Order {
            id,
            number: order_number(id, now),
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            items,
            total,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            order_type: new.order_type,
            address,
            instructions: non_empty(new.instructions),
            created: now,
            updated: now,
        });

        self.save(&orders)?;
        if let Err(e) = self.save(&products) {
            orders.remove(order.id);
            self.save(&orders)?;
            return Err(e);
        }
        tracing::info!(
            operator = %session.phone,
            number = %order.number,
            phone = %order.customer_phone,
            lines = order.items.len(),
            total = order.total,
            "order placed"
        );
        Ok(order)
    }

    /// All orders, newest first
    pub fn orders(&self) -> Result<Vec<Order>> {
        let mut orders = self.load::<Order>()?.records;
        orders.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(orders)
    }

    /// One customer's orders, newest first
    pub fn orders_for(&self, phone: &str) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .load::<Order>()?
            .records
            .into_iter()
            .filter(|o| o.is_for(phone))
            .collect();
        orders.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(orders)
    }

    /// A single order. Users may only see their own.
    pub fn order(&self, session: &Session, id: u32) -> Result<Order> {
        let order = self
            .load::<Order>()?
            .get(id)
            .cloned()
            .ok_or(KhataError::OrderNotFound(id))?;
        session.ensure_can_view(&order.customer_phone)?;
        Ok(order)
    }

    /// Move an order along and/or record its payment state.
    ///
    /// Delivered and cancelled orders keep their status. Cancelling puts the
    /// reserved stock back on the shelf.
    pub fn update_order_status(
        &self,
        session: &Session,
        id: u32,
        status: Option<OrderStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Order> {
        session.require_admin()?;
        if status.is_none() && payment_status.is_none() {
            return Err(KhataError::MissingField("status or payment status"));
        }

        let mut orders = self.load::<Order>()?;
        let order = orders.get_mut(id).ok_or(KhataError::OrderNotFound(id))?;
        let previous = order.clone();

        if let Some(status) = status.filter(|s| *s != order.status) {
            if order.status.is_closed() {
                return Err(KhataError::OrderClosed {
                    number: order.number.clone(),
                    status: order.status,
                });
            }
            order.status = status;
        }
        if let Some(payment_status) = payment_status {
            order.payment_status = payment_status;
        }
        order.updated = Local::now().naive_local();
        let updated = order.clone();
        self.save(&orders)?;

        if updated.status == OrderStatus::Cancelled && previous.status != OrderStatus::Cancelled {
            if let Err(e) = self.restore_stock(&updated) {
                if let Some(order) = orders.get_mut(id) {
                    *order = previous;
                }
                self.save(&orders)?;
                return Err(e);
            }
        }

        tracing::info!(
            operator = %session.phone,
            number = %updated.number,
            status = %updated.status,
            payment = %updated.payment_status,
            "order updated"
        );
        Ok(updated)
    }

    /// Return a cancelled order's quantities to stock. Products removed from
    /// the catalog since are skipped.
    fn restore_stock(&self, order: &Order) -> Result<()> {
        let mut products = self.load::<Product>()?;
        for item in &order.items {
            if let Some(product) = products.get_mut(item.product_id) {
                product.stock = product.stock.saturating_add(item.quantity);
            }
        }
        self.save(&products)
    }
}
