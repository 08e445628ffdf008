//! Persistence boundary for finalized invoices.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use tally_catalog::{Catalog, CatalogItem, CatalogSource};
use tally_core::{DomainError, InvoiceId, ItemId, PartyId};
use tally_parties::PartyRegistry;

use crate::draft::{InvoiceKind, PersistenceLine};
use crate::error::SubmitError;

/// Invoice header entered on the sale / purchase form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    pub date: NaiveDate,
    pub party_id: PartyId,
    pub notes: Option<String>,
}

/// Accepts a finalized invoice and applies its stock movements atomically
/// with invoice creation.
pub trait InvoiceStore {
    fn submit(
        &mut self,
        kind: InvoiceKind,
        header: &InvoiceHeader,
        lines: &[PersistenceLine],
    ) -> Result<InvoiceId, SubmitError>;
}

/// An invoice as recorded by [`InMemoryInvoiceStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredInvoice {
    pub id: InvoiceId,
    pub kind: InvoiceKind,
    pub header: InvoiceHeader,
    pub lines: Vec<PersistenceLine>,
    /// Total in smallest currency unit.
    pub total: u64,
}

/// Store backed by an owned catalog. Used by tests and local tooling.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInvoiceStore {
    catalog: Catalog,
    parties: Option<PartyRegistry>,
    invoices: Vec<StoredInvoice>,
}

impl InMemoryInvoiceStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            parties: None,
            invoices: Vec::new(),
        }
    }

    /// Validate header party references against `parties` on submission.
    pub fn with_parties(mut self, parties: PartyRegistry) -> Self {
        self.parties = Some(parties);
        self
    }

    /// Live catalog, including stock movements of stored invoices.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn invoices(&self) -> &[StoredInvoice] {
        &self.invoices
    }

    pub fn get(&self, id: &InvoiceId) -> Option<&StoredInvoice> {
        self.invoices.iter().find(|invoice| &invoice.id == id)
    }

    fn check_party(&self, kind: InvoiceKind, party_id: PartyId) -> Result<(), SubmitError> {
        let Some(parties) = &self.parties else {
            return Ok(());
        };
        let expected = kind.counterparty();
        match parties.require(&party_id, expected) {
            Ok(_) => Ok(()),
            Err(DomainError::NotFound(_)) => Err(SubmitError::UnknownParty(party_id)),
            Err(_) => Err(SubmitError::PartyKindMismatch {
                party_id,
                expected,
                actual: parties.get(&party_id).map_or(expected, |party| party.kind()),
            }),
        }
    }

    /// Per-item quantities in first-seen order, plus the invoice total.
    fn tally(lines: &[PersistenceLine]) -> Result<(Vec<(ItemId, i64)>, u64), SubmitError> {
        let mut quantities: Vec<(ItemId, i64)> = Vec::new();
        let mut total: u64 = 0;

        for line in lines {
            if line.quantity <= 0 {
                return Err(SubmitError::InvalidLine(format!(
                    "quantity for item {} must be positive",
                    line.item_id
                )));
            }
            if line.unit_price == 0 {
                return Err(SubmitError::InvalidLine(format!(
                    "unit_price for item {} must be positive",
                    line.item_id
                )));
            }
            let amount = line
                .unit_price
                .checked_mul(line.quantity as u64)
                .ok_or(SubmitError::Overflow)?;
            total = total.checked_add(amount).ok_or(SubmitError::Overflow)?;

            match quantities.iter_mut().find(|(id, _)| *id == line.item_id) {
                Some((_, quantity)) => {
                    *quantity = quantity
                        .checked_add(line.quantity)
                        .ok_or(SubmitError::Overflow)?;
                }
                None => quantities.push((line.item_id, line.quantity)),
            }
        }

        Ok((quantities, total))
    }
}

impl InvoiceStore for InMemoryInvoiceStore {
    fn submit(
        &mut self,
        kind: InvoiceKind,
        header: &InvoiceHeader,
        lines: &[PersistenceLine],
    ) -> Result<InvoiceId, SubmitError> {
        if lines.is_empty() {
            return Err(SubmitError::EmptyInvoice);
        }
        self.check_party(kind, header.party_id)?;
        let (quantities, total) = Self::tally(lines)?;

        // Movements are applied to a copy and swapped in only once every line
        // has gone through, so a rejection leaves stock untouched.
        let mut next = self.catalog.clone();
        for (item_id, quantity) in quantities {
            let available = next
                .get(&item_id)
                .map(|entry| entry.stock_available)
                .ok_or(SubmitError::UnknownItem(item_id))?;
            if kind.consumes_stock() && quantity > available {
                return Err(SubmitError::InsufficientStock {
                    item_id,
                    requested: quantity,
                    available,
                });
            }
            next.adjust_stock(&item_id, kind.stock_delta(quantity))?;
        }

        let id = InvoiceId::new();
        self.catalog = next;
        self.invoices.push(StoredInvoice {
            id,
            kind,
            header: header.clone(),
            lines: lines.to_vec(),
            total,
        });

        tracing::info!(
            invoice_id = %id,
            kind = %kind,
            party_id = %header.party_id,
            lines = lines.len(),
            total,
            "invoice stored"
        );
        Ok(id)
    }
}

impl CatalogSource for InMemoryInvoiceStore {
    fn list_items(&self) -> Vec<CatalogItem> {
        self.catalog.list_items()
    }
}
