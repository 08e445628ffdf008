//! End-to-end flow: catalog snapshot -> draft -> submit -> refreshed stock.

use chrono::NaiveDate;

use tally_catalog::{Catalog, CatalogItem, CatalogSource};
use tally_core::{DomainError, ItemId, PartyId};
use tally_invoicing::{
    InMemoryInvoiceStore, InvoiceHeader, InvoiceKind, InvoiceLineBuilder, LineError, SubmitError,
    submit_draft,
};
use tally_parties::{ContactInfo, Party, PartyKind, PartyRegistry};

struct Fixture {
    store: InMemoryInvoiceStore,
    widget: ItemId,
    gadget: ItemId,
    customer: PartyId,
    supplier: PartyId,
}

fn fixture() -> Fixture {
    tally_observability::init();

    let widget = CatalogItem::new(ItemId::new(), "Widget", 500, 10).unwrap();
    let gadget = CatalogItem::new(ItemId::new(), "Gadget", 1_250, 2).unwrap();
    let customer = Party::new(
        PartyId::new(),
        PartyKind::Customer,
        "Corner Shop",
        ContactInfo::default(),
    )
    .unwrap();
    let supplier = Party::new(
        PartyId::new(),
        PartyKind::Supplier,
        "Acme Wholesale",
        ContactInfo::default(),
    )
    .unwrap();

    let mut parties = PartyRegistry::new();
    let customer_id = customer.id_typed();
    let supplier_id = supplier.id_typed();
    parties.insert(customer);
    parties.insert(supplier);

    Fixture {
        widget: widget.id,
        gadget: gadget.id,
        customer: customer_id,
        supplier: supplier_id,
        store: InMemoryInvoiceStore::new(Catalog::from_items(vec![widget, gadget]))
            .with_parties(parties),
    }
}

fn header(party_id: PartyId) -> InvoiceHeader {
    InvoiceHeader {
        date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        party_id,
        notes: None,
    }
}

#[test]
fn sale_then_purchase_moves_stock_and_clears_drafts() {
    let mut fx = fixture();

    let snapshot = fx.store.snapshot();
    let mut sale = InvoiceLineBuilder::new(InvoiceKind::Sale);
    sale.add_catalog_line(&snapshot, fx.widget, 3).unwrap();
    sale.add_catalog_line(&snapshot, fx.gadget, 2).unwrap();
    sale.add_catalog_line(&snapshot, fx.widget, 4).unwrap();
    assert_eq!(sale.grand_total(), 7 * 500 + 2 * 1_250);

    let sale_id = submit_draft(&mut sale, &header(fx.customer), &mut fx.store).unwrap();
    assert!(sale.is_empty());

    let stored = fx.store.get(&sale_id).unwrap();
    assert_eq!(stored.kind, InvoiceKind::Sale);
    assert_eq!(stored.total, 6_000);
    assert_eq!(stored.lines.len(), 2);

    let snapshot = fx.store.snapshot();
    assert_eq!(snapshot.get(&fx.widget).unwrap().stock_available, 3);
    assert_eq!(snapshot.get(&fx.gadget).unwrap().stock_available, 0);

    // Purchase lines are checked against the snapshot like sale lines.
    let mut purchase = InvoiceLineBuilder::new(InvoiceKind::Purchase);
    let err = purchase.add_line(&snapshot, fx.gadget, 1, 900).unwrap_err();
    assert!(matches!(err, LineError::InsufficientStock { available: 0, .. }));
    purchase.add_line(&snapshot, fx.widget, 3, 400).unwrap();
    submit_draft(&mut purchase, &header(fx.supplier), &mut fx.store).unwrap();

    let snapshot = fx.store.snapshot();
    assert_eq!(snapshot.get(&fx.widget).unwrap().stock_available, 6);
    assert_eq!(fx.store.invoices().len(), 2);
}

#[test]
fn stale_snapshot_is_caught_at_submission() {
    let mut fx = fixture();

    // Two drafts opened against the same snapshot.
    let snapshot = fx.store.snapshot();
    let mut first = InvoiceLineBuilder::new(InvoiceKind::Sale);
    let mut second = InvoiceLineBuilder::new(InvoiceKind::Sale);
    first.add_catalog_line(&snapshot, fx.gadget, 2).unwrap();
    second.add_catalog_line(&snapshot, fx.gadget, 1).unwrap();

    submit_draft(&mut first, &header(fx.customer), &mut fx.store).unwrap();

    let err = submit_draft(&mut second, &header(fx.customer), &mut fx.store).unwrap_err();
    assert_eq!(
        err,
        SubmitError::InsufficientStock {
            item_id: fx.gadget,
            requested: 1,
            available: 0,
        }
    );
    assert_eq!(second.len(), 1);

    // With a fresh snapshot the builder itself refuses the line.
    let fresh = fx.store.snapshot();
    let mut third = InvoiceLineBuilder::new(InvoiceKind::Sale);
    let err = third.add_catalog_line(&fresh, fx.gadget, 1).unwrap_err();
    assert!(matches!(err, LineError::InsufficientStock { available: 0, .. }));
    assert!(matches!(DomainError::from(err), DomainError::InvariantViolation(_)));
}

#[test]
fn wrong_counterparty_keeps_draft_for_correction() {
    let mut fx = fixture();
    let snapshot = fx.store.snapshot();

    let mut sale = InvoiceLineBuilder::new(InvoiceKind::Sale);
    sale.add_catalog_line(&snapshot, fx.widget, 1).unwrap();

    let err = submit_draft(&mut sale, &header(fx.supplier), &mut fx.store).unwrap_err();
    assert!(matches!(err, SubmitError::PartyKindMismatch { .. }));
    assert_eq!(sale.len(), 1);

    submit_draft(&mut sale, &header(fx.customer), &mut fx.store).unwrap();
    assert!(sale.is_empty());
}
