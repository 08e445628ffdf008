//! Parties domain module (customers and suppliers).
//!
//! Invoice headers reference a party; sales go to customers and purchases come
//! from suppliers.

pub mod party;

pub use party::{ContactInfo, Party, PartyKind, PartyRegistry};
