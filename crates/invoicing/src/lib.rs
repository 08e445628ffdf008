//! Invoicing domain module (sales and purchase invoices).
//!
//! [`InvoiceLineBuilder`] assembles the lines of one draft invoice against a
//! catalog snapshot, enforcing the stock and merge rules before any mutation
//! is accepted. The builder performs no IO: persistence goes through an
//! [`InvoiceStore`], driven by [`submit_draft`].

pub mod draft;
pub mod error;
pub mod store;
pub mod submit;

pub use draft::{InvoiceDraft, InvoiceKind, InvoiceLineBuilder, LineItem, PersistenceLine};
pub use error::{LineError, SubmitError};
pub use store::{InMemoryInvoiceStore, InvoiceHeader, InvoiceStore, StoredInvoice};
pub use submit::submit_draft;
