//! File-backed document store.
//!
//! Every collection lives in its own TOML file under `<config dir>/data/` as
//! an array of `[[records]]` plus the next id to hand out. Commands load what
//! they need, change it in memory and write whole files back.

mod catalog;
mod expenses;
mod orders;
mod sales;
mod users;

pub use catalog::{NewProduct, ProductPatch};
pub use expenses::ExpensePatch;
pub use orders::NewOrder;
pub use sales::{NewPayment, NewSale};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::BUSINESS_TEMPLATE;
use crate::error::{KhataError, Result};
use crate::model::{
    BusinessInfo, Category, Expense, Order, PaymentRecord, Product, SaleRecord, User,
};
use crate::session::Session;

/// A record type stored in its own collection file
pub trait Document: Serialize + DeserializeOwned {
    const COLLECTION: &'static str;

    fn id(&self) -> u32;
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> u32 {
        self.id
    }
}

impl Document for Category {
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> u32 {
        self.id
    }
}

impl Document for Product {
    const COLLECTION: &'static str = "products";

    fn id(&self) -> u32 {
        self.id
    }
}

impl Document for SaleRecord {
    const COLLECTION: &'static str = "sales";

    fn id(&self) -> u32 {
        self.id
    }
}

impl Document for PaymentRecord {
    const COLLECTION: &'static str = "payments";

    fn id(&self) -> u32 {
        self.id
    }
}

impl Document for Order {
    const COLLECTION: &'static str = "orders";

    fn id(&self) -> u32 {
        self.id
    }
}

impl Document for Expense {
    const COLLECTION: &'static str = "expenses";

    fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Collection<T> {
    next_id: u32,
    pub records: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }
}

impl<T: Document + Clone> Collection<T> {
    /// Append a record built around a freshly allocated id
    pub fn insert(&mut self, build: impl FnOnce(u32) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let record = build(id);
        self.records.push(record.clone());
        record
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        self.records.iter_mut().find(|r| r.id() == id)
    }

    pub fn remove(&mut self, id: u32) -> Option<T> {
        let idx = self.records.iter().position(|r| r.id() == id)?;
        Some(self.records.remove(idx))
    }

    /// Hand-edited files may lack `next_id`; never reuse an id already present
    fn repair_next_id(&mut self) {
        let max_id = self.records.iter().map(|r| r.id()).max().unwrap_or(0);
        if self.next_id <= max_id {
            self.next_id = max_id + 1;
        }
    }
}

#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
    data_dir: PathBuf,
}

impl Store {
    /// Open the store of an initialized config directory
    pub fn open(cfg_dir: &Path) -> Result<Self> {
        if !cfg_dir.exists() {
            return Err(KhataError::ConfigNotFound(cfg_dir.to_path_buf()));
        }
        let data_dir = cfg_dir.join("data");
        fs::create_dir_all(&data_dir)?;
        Ok(Self {
            root: cfg_dir.to_path_buf(),
            data_dir,
        })
    }

    /// Create the directory layout and seed the business document
    pub fn create(cfg_dir: &Path) -> Result<Self> {
        if cfg_dir.exists() {
            return Err(KhataError::AlreadyInitialized(cfg_dir.to_path_buf()));
        }
        fs::create_dir_all(cfg_dir.join("data"))?;
        fs::write(cfg_dir.join("business.toml"), BUSINESS_TEMPLATE)?;
        Self::open(cfg_dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.toml"))
    }

    /// Load a collection (empty if its file does not exist yet)
    pub fn load<T: Document + Clone>(&self) -> Result<Collection<T>> {
        let path = self.collection_path(T::COLLECTION);
        if !path.exists() {
            return Ok(Collection::default());
        }
        let content = fs::read_to_string(&path)?;
        let mut collection: Collection<T> =
            toml::from_str(&content).map_err(|e| KhataError::ConfigParse { path, source: e })?;
        collection.repair_next_id();
        Ok(collection)
    }

    pub fn save<T: Document>(&self, collection: &Collection<T>) -> Result<()> {
        let path = self.collection_path(T::COLLECTION);
        write_toml(&path, collection)
    }

    pub fn business(&self) -> Result<BusinessInfo> {
        let path = self.root.join("business.toml");
        if !path.exists() {
            return Err(KhataError::ConfigFileNotFound(path));
        }
        let content = fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|e| KhataError::ConfigParse { path, source: e })
    }

    pub fn save_business(&self, session: &Session, info: &BusinessInfo) -> Result<()> {
        session.require_admin()?;
        write_toml(&self.root.join("business.toml"), info)?;
        tracing::info!(operator = %session.phone, name = %info.name, "business info updated");
        Ok(())
    }
}

pub(crate) fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = toml::to_string_pretty(value).map_err(|e| KhataError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, content)?;
    Ok(())
}

pub(crate) fn require_text(value: &str, field: &'static str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(KhataError::MissingField(field));
    }
    Ok(trimmed.to_string())
}
