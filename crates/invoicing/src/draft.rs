use serde::{Deserialize, Serialize};

use tally_catalog::Catalog;
use tally_core::ItemId;
use tally_parties::PartyKind;

use crate::error::LineError;

/// Which side of the business an invoice records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceKind {
    Sale,
    Purchase,
}

impl InvoiceKind {
    /// Whether persisting the invoice takes stock out of the catalog.
    pub fn consumes_stock(self) -> bool {
        matches!(self, InvoiceKind::Sale)
    }

    /// Signed stock movement for `quantity` units once the invoice is persisted.
    pub fn stock_delta(self, quantity: i64) -> i64 {
        match self {
            InvoiceKind::Sale => -quantity,
            InvoiceKind::Purchase => quantity,
        }
    }

    /// The kind of party named on the invoice header.
    pub fn counterparty(self) -> PartyKind {
        match self {
            InvoiceKind::Sale => PartyKind::Customer,
            InvoiceKind::Purchase => PartyKind::Supplier,
        }
    }
}

impl core::fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InvoiceKind::Sale => f.write_str("sale"),
            InvoiceKind::Purchase => f.write_str("purchase"),
        }
    }
}

/// One drafted line. Fields are read-only outside this module so the
/// subtotal can only change together with the quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    item_id: ItemId,
    item_label: String,
    quantity: i64,
    unit_price: u64,
    subtotal: u64,
}

impl LineItem {
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// Catalog name as it was when the line was first added.
    pub fn item_label(&self) -> &str {
        &self.item_label
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Price in smallest currency unit, captured on the first add.
    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    pub fn subtotal(&self) -> u64 {
        self.subtotal
    }
}

/// Line shape accepted by the persistence side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceLine {
    pub item_id: ItemId,
    pub quantity: i64,
    pub unit_price: u64,
}

impl From<&LineItem> for PersistenceLine {
    fn from(line: &LineItem) -> Self {
        Self {
            item_id: line.item_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

/// An in-progress, unsaved invoice: ordered lines, at most one per item.
///
/// Invariant: the sum of all subtotals fits in a `u64`, so
/// [`grand_total`](Self::grand_total) never overflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    kind: InvoiceKind,
    lines: Vec<LineItem>,
}

impl InvoiceDraft {
    fn new(kind: InvoiceKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
        }
    }

    pub fn kind(&self) -> InvoiceKind {
        self.kind
    }

    /// Lines in display order.
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line subtotals, derived on every call.
    pub fn grand_total(&self) -> u64 {
        self.lines.iter().map(|line| line.subtotal).sum()
    }

    /// Quantity currently drafted for `item_id` (0 when absent).
    pub fn quantity_of(&self, item_id: &ItemId) -> i64 {
        self.position(item_id)
            .map(|pos| self.lines[pos].quantity)
            .unwrap_or(0)
    }

    /// Lines stripped down to `item_id`, `quantity` and `unit_price`.
    pub fn to_persistence_payload(&self) -> Vec<PersistenceLine> {
        self.lines.iter().map(PersistenceLine::from).collect()
    }

    fn position(&self, item_id: &ItemId) -> Option<usize> {
        self.lines.iter().position(|line| &line.item_id == item_id)
    }
}

/// Owns one [`InvoiceDraft`] and is the only way to mutate it.
///
/// Each mutation is accept-or-reject: on `Err` the draft is exactly as it was
/// before the call. Stock checks run against the caller's catalog snapshot
/// and are advisory; the store re-validates on submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLineBuilder {
    draft: InvoiceDraft,
}

impl InvoiceLineBuilder {
    pub fn new(kind: InvoiceKind) -> Self {
        Self {
            draft: InvoiceDraft::new(kind),
        }
    }

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    pub fn kind(&self) -> InvoiceKind {
        self.draft.kind
    }

    pub fn lines(&self) -> &[LineItem] {
        self.draft.lines()
    }

    pub fn len(&self) -> usize {
        self.draft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draft.is_empty()
    }

    pub fn grand_total(&self) -> u64 {
        self.draft.grand_total()
    }

    pub fn quantity_of(&self, item_id: &ItemId) -> i64 {
        self.draft.quantity_of(item_id)
    }

    pub fn to_persistence_payload(&self) -> Vec<PersistenceLine> {
        self.draft.to_persistence_payload()
    }

    /// Add `quantity` units of `item_id` at `unit_price`.
    ///
    /// An item already in the draft is merged into its existing line, which
    /// keeps the unit price it was first added with. The merged quantity must
    /// not exceed the snapshot's available stock, for sales and purchases alike.
    pub fn add_line(
        &mut self,
        catalog: &Catalog,
        item_id: ItemId,
        quantity: i64,
        unit_price: u64,
    ) -> Result<&LineItem, LineError> {
        let result = self.try_add_line(catalog, item_id, quantity, unit_price);
        match &result {
            Ok(pos) => {
                let line = &self.draft.lines[*pos];
                tracing::debug!(
                    kind = %self.draft.kind,
                    item_id = %item_id,
                    quantity = line.quantity,
                    subtotal = line.subtotal,
                    total = self.draft.grand_total(),
                    "invoice line added"
                );
            }
            Err(err) => {
                tracing::debug!(kind = %self.draft.kind, item_id = %item_id, error = %err, "invoice line rejected");
            }
        }
        let pos = result?;
        Ok(&self.draft.lines[pos])
    }

    /// Add `quantity` units of `item_id` at the catalog's current price.
    pub fn add_catalog_line(
        &mut self,
        catalog: &Catalog,
        item_id: ItemId,
        quantity: i64,
    ) -> Result<&LineItem, LineError> {
        let unit_price = catalog
            .get(&item_id)
            .map(|entry| entry.unit_price)
            .ok_or_else(|| LineError::invalid(format!("unknown item {item_id}")))?;
        self.add_line(catalog, item_id, quantity, unit_price)
    }

    /// Remove and return the line at `index` (display order, 0-based).
    pub fn remove_line(&mut self, index: usize) -> Result<LineItem, LineError> {
        let len = self.draft.lines.len();
        if index >= len {
            return Err(LineError::IndexOutOfRange { index, len });
        }
        let removed = self.draft.lines.remove(index);
        tracing::debug!(
            kind = %self.draft.kind,
            item_id = %removed.item_id,
            total = self.draft.grand_total(),
            "invoice line removed"
        );
        Ok(removed)
    }

    /// Drop every line. Confirming with the user is the caller's job.
    pub fn clear(&mut self) {
        self.draft.lines.clear();
        tracing::debug!(kind = %self.draft.kind, "invoice draft cleared");
    }

    /// Validate and commit; returns the position of the touched line.
    fn try_add_line(
        &mut self,
        catalog: &Catalog,
        item_id: ItemId,
        quantity: i64,
        unit_price: u64,
    ) -> Result<usize, LineError> {
        let entry = catalog
            .get(&item_id)
            .ok_or_else(|| LineError::invalid(format!("unknown item {item_id}")))?;

        if quantity <= 0 {
            return Err(LineError::invalid("quantity must be positive"));
        }
        if unit_price == 0 {
            return Err(LineError::invalid("unit_price must be positive"));
        }

        let existing = self.draft.position(&item_id);
        let requested = existing
            .map(|pos| self.draft.lines[pos].quantity)
            .unwrap_or(0)
            .checked_add(quantity)
            .ok_or_else(|| LineError::invalid("quantity too large"))?;

        if requested > entry.stock_available {
            return Err(LineError::InsufficientStock {
                item_id,
                requested,
                available: entry.stock_available,
            });
        }

        let price = existing
            .map(|pos| self.draft.lines[pos].unit_price)
            .unwrap_or(unit_price);
        let subtotal = price
            .checked_mul(requested as u64)
            .ok_or_else(|| LineError::invalid("line amount too large"))?;

        let replaced = existing
            .map(|pos| self.draft.lines[pos].subtotal)
            .unwrap_or(0);
        (self.draft.grand_total() - replaced)
            .checked_add(subtotal)
            .ok_or_else(|| LineError::invalid("invoice total too large"))?;

        match existing {
            Some(pos) => {
                let line = &mut self.draft.lines[pos];
                line.quantity = requested;
                line.subtotal = subtotal;
                Ok(pos)
            }
            None => {
                self.draft.lines.push(LineItem {
                    item_id,
                    item_label: entry.name.clone(),
                    quantity: requested,
                    unit_price: price,
                    subtotal,
                });
                Ok(self.draft.lines.len() - 1)
            }
        }
    }
}
