//! Catalog domain module.
//!
//! Item master data (name, unit price, available stock) as seen by invoice
//! drafts. Drafts only ever read a [`Catalog`] snapshot; stock levels change
//! when an invoice is persisted.

pub mod item;

pub use item::{Catalog, CatalogItem, CatalogSource};
