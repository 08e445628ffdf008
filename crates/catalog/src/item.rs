use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use tally_core::{DomainError, DomainResult, Entity, ItemId};

/// One catalog row as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
    pub stock_available: i64,
}

impl CatalogItem {
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        unit_price: u64,
        stock_available: i64,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if stock_available < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }
        Ok(Self {
            id,
            name,
            unit_price,
            stock_available,
        })
    }
}

impl Entity for CatalogItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Anything that can list the current catalog.
pub trait CatalogSource {
    fn list_items(&self) -> Vec<CatalogItem>;

    /// Point-in-time copy of the listing, suitable for validating draft lines.
    fn snapshot(&self) -> Catalog {
        Catalog::from_items(self.list_items())
    }
}

/// In-memory catalog snapshot, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    index: HashMap<ItemId, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a listing. A later row with a repeated id
    /// replaces the earlier one in place.
    pub fn from_items(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let mut catalog = Self::new();
        for item in items {
            catalog.upsert(item);
        }
        catalog
    }

    pub fn upsert(&mut self, item: CatalogItem) {
        let id = *item.id();
        match self.index.get(&id) {
            Some(&pos) => self.items[pos] = item,
            None => {
                self.index.insert(id, self.items.len());
                self.items.push(item);
            }
        }
    }

    pub fn get(&self, id: &ItemId) -> Option<&CatalogItem> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.index.contains_key(id)
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Apply a stock movement and return the new level.
    ///
    /// Stock cannot go negative; a rejected movement leaves the item untouched.
    pub fn adjust_stock(&mut self, id: &ItemId, delta: i64) -> DomainResult<i64> {
        let pos = *self
            .index
            .get(id)
            .ok_or_else(|| DomainError::not_found(format!("item {id}")))?;
        let item = &mut self.items[pos];

        let new_stock = item
            .stock_available
            .checked_add(delta)
            .ok_or_else(|| DomainError::invariant("stock level overflow"))?;
        if new_stock < 0 {
            return Err(DomainError::invariant("stock cannot go negative"));
        }

        item.stock_available = new_stock;
        tracing::debug!(item_id = %id, delta, stock = new_stock, "stock adjusted");
        Ok(new_stock)
    }
}

impl CatalogSource for Catalog {
    fn list_items(&self) -> Vec<CatalogItem> {
        self.items.clone()
    }
}
