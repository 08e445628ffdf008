//! Invoicing error taxonomy.

use thiserror::Error;

use tally_core::{DomainError, ItemId, PartyId};
use tally_parties::PartyKind;

/// Rejection of a draft mutation. The draft is unchanged whenever one of
/// these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineError {
    /// Unknown item, non-positive quantity or an amount that does not fit.
    #[error("invalid line input: {0}")]
    InvalidLineInput(String),

    /// The cumulative drafted quantity would exceed the known stock.
    #[error("insufficient stock for item {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        item_id: ItemId,
        requested: i64,
        available: i64,
    },

    /// Caller passed a position that is not in the draft.
    #[error("line index {index} out of range (draft has {len} lines)")]
    IndexOutOfRange { index: usize, len: usize },
}

impl LineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidLineInput(msg.into())
    }
}

impl From<LineError> for DomainError {
    fn from(err: LineError) -> Self {
        match err {
            LineError::InvalidLineInput(msg) => DomainError::Validation(msg),
            other => DomainError::invariant(other.to_string()),
        }
    }
}

/// Rejection of an invoice submission by an [`InvoiceStore`](crate::InvoiceStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("invoice has no lines")]
    EmptyInvoice,

    #[error("invalid line: {0}")]
    InvalidLine(String),

    #[error("unknown item {0}")]
    UnknownItem(ItemId),

    #[error("insufficient stock for item {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        item_id: ItemId,
        requested: i64,
        available: i64,
    },

    #[error("unknown party {0}")]
    UnknownParty(PartyId),

    #[error("party {party_id} is a {actual:?}, expected a {expected:?}")]
    PartyKindMismatch {
        party_id: PartyId,
        expected: PartyKind,
        actual: PartyKind,
    },

    #[error("invoice amount overflow")]
    Overflow,

    #[error("stock movement rejected: {0}")]
    Catalog(#[from] DomainError),
}

impl From<SubmitError> for DomainError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Catalog(inner) => inner,
            SubmitError::UnknownItem(id) => DomainError::not_found(format!("item {id}")),
            SubmitError::UnknownParty(id) => DomainError::not_found(format!("party {id}")),
            SubmitError::EmptyInvoice | SubmitError::InvalidLine(_) | SubmitError::Overflow => {
                DomainError::Validation(err.to_string())
            }
            other => DomainError::invariant(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_errors_map_onto_domain_errors() {
        let err: DomainError = LineError::invalid("quantity must be positive").into();
        assert_eq!(err, DomainError::validation("quantity must be positive"));

        let err: DomainError = LineError::IndexOutOfRange { index: 3, len: 1 }.into();
        assert_eq!(
            err,
            DomainError::invariant("line index 3 out of range (draft has 1 lines)")
        );
    }

    #[test]
    fn submit_errors_map_onto_domain_errors() {
        let id = ItemId::new();
        let err: DomainError = SubmitError::UnknownItem(id).into();
        assert_eq!(err, DomainError::not_found(format!("item {id}")));

        let inner = DomainError::invariant("stock cannot go negative");
        let err: DomainError = SubmitError::from(inner.clone()).into();
        assert_eq!(err, inner);
    }
}
