use clap::ValueEnum;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::ledger::build_customer_ledger;
use crate::model::{Expense, Order, OrderStatus, PaymentRecord, Product, SaleRecord, User};

/// Dashboard section to display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Section {
    #[default]
    Overview,
    Products,
    Orders,
    Users,
    Reports,
}

/// Order counts by stage
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrderStats {
    pub total: usize,
    /// Placed but not yet confirmed
    pub pending: usize,
    /// Confirmed, preparing or ready
    pub in_progress: usize,
    /// Delivered
    pub completed: usize,
    pub cancelled: usize,
    /// Totals of delivered orders
    pub revenue: f64,
}

impl OrderStats {
    pub fn compute(orders: &[Order]) -> Self {
        let mut stats = OrderStats {
            total: orders.len(),
            ..Default::default()
        };
        for order in orders {
            match order.status {
                OrderStatus::Pending => stats.pending += 1,
                OrderStatus::Confirmed | OrderStatus::Preparing | OrderStatus::Ready => {
                    stats.in_progress += 1
                }
                OrderStatus::Delivered => {
                    stats.completed += 1;
                    stats.revenue += order.total;
                }
                OrderStatus::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }
}

/// Headline numbers of the overview section
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub customers: usize,
    pub products: usize,
    pub sales: usize,
    pub orders: OrderStats,
    /// Sale totals plus delivered orders
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
}

impl Overview {
    pub fn compute(
        users: &[User],
        products: &[Product],
        sales: &[SaleRecord],
        orders: &[Order],
        expenses: &[Expense],
    ) -> Self {
        let orders = OrderStats::compute(orders);
        let revenue: f64 = sales.iter().map(|s| s.total).sum::<f64>() + orders.revenue;
        let spent: f64 = expenses.iter().map(|e| e.amount).sum();
        Self {
            customers: users.iter().filter(|u| !u.is_admin()).count(),
            products: products.len(),
            sales: sales.len(),
            orders,
            revenue,
            expenses: spent,
            profit: revenue - spent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductStats {
    pub total: usize,
    pub available: usize,
    pub unavailable: usize,
    /// Available products at or below the threshold, lowest stock first
    pub low_stock: Vec<Product>,
}

impl ProductStats {
    pub fn compute(products: &[Product], threshold: u32) -> Self {
        let available = products.iter().filter(|p| p.available).count();
        let mut low_stock: Vec<Product> = products
            .iter()
            .filter(|p| p.available && p.stock <= threshold)
            .cloned()
            .collect();
        low_stock.sort_by_key(|p| p.stock);
        Self {
            total: products.len(),
            available,
            unavailable: products.len() - available,
            low_stock,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRevenue {
    pub category: String,
    pub quantity: u64,
    pub revenue: f64,
}

/// Sales grouped by category, highest revenue first
pub fn revenue_by_category(sales: &[SaleRecord]) -> Vec<CategoryRevenue> {
    let mut groups: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
    for sale in sales {
        let group = groups.entry(sale.category.as_str()).or_insert((0, 0.0));
        group.0 += u64::from(sale.quantity);
        group.1 += sale.total;
    }
    let mut rows: Vec<CategoryRevenue> = groups
        .into_iter()
        .map(|(category, (quantity, revenue))| CategoryRevenue {
            category: category.to_string(),
            quantity,
            revenue,
        })
        .collect();
    rows.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    rows
}

/// Money owed to the shop and money held as advances
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Receivables {
    pub outstanding: f64,
    pub advances: f64,
}

impl Receivables {
    pub fn compute(balances: &[CustomerBalance]) -> Self {
        Self {
            outstanding: balances.iter().map(|b| b.balance.max(0.0)).sum(),
            advances: balances.iter().map(|b| (-b.balance).max(0.0)).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerBalance {
    pub name: String,
    pub phone: String,
    pub balance: f64,
}

/// Every customer's reconciled balance, recomputed from records
pub fn customer_balances(
    customers: &[User],
    sales: &[SaleRecord],
    payments: &[PaymentRecord],
) -> Result<Vec<CustomerBalance>> {
    customers
        .iter()
        .filter(|u| !u.is_admin())
        .map(|customer| {
            let ledger = build_customer_ledger(&customer.phone, sales, payments)?;
            Ok(CustomerBalance {
                name: customer.name.clone(),
                phone: customer.phone.clone(),
                balance: ledger.balance(),
            })
        })
        .collect()
}
