//! Draft submission orchestration.

use tally_core::InvoiceId;

use crate::draft::InvoiceLineBuilder;
use crate::error::SubmitError;
use crate::store::{InvoiceHeader, InvoiceStore};

/// Hand the draft's lines to `store` under `header`.
///
/// The draft is cleared only when the store accepts the invoice; on failure
/// it is left as-is so the user can correct it and retry.
pub fn submit_draft<S>(
    builder: &mut InvoiceLineBuilder,
    header: &InvoiceHeader,
    store: &mut S,
) -> Result<InvoiceId, SubmitError>
where
    S: InvoiceStore + ?Sized,
{
    let lines = builder.to_persistence_payload();
    match store.submit(builder.kind(), header, &lines) {
        Ok(id) => {
            tracing::info!(
                invoice_id = %id,
                kind = %builder.kind(),
                total = builder.grand_total(),
                "draft submitted"
            );
            builder.clear();
            Ok(id)
        }
        Err(err) => {
            tracing::warn!(kind = %builder.kind(), error = %err, "draft submission rejected");
            Err(err)
        }
    }
}
