//! Batch execution
//!
//! A batch is one form-encoded POST carrying up to [`MAX_BATCH_OPS`]
//! `op=<command>` lines built by the `uri_*` functions. The answer is a JSON
//! array whose item `i` is the result of command `i`; a failed item is
//! reported inside the array and does not fail the call.

use kc_core::{BatchOpRet, Error, Result};

use crate::client::KodoClient;
use crate::transport::HttpRequest;
use crate::uri::query_escape;

/// Most commands one batch request may carry
pub const MAX_BATCH_OPS: usize = 1000;

/// Reject oversized batches before anything is sent
pub fn check_batch_size(operations: &[String]) -> Result<()> {
    if operations.len() > MAX_BATCH_OPS {
        return Err(Error::LimitExceeded {
            limit: MAX_BATCH_OPS,
            actual: operations.len(),
        });
    }
    Ok(())
}

/// Form body with one `op=` parameter per command, in order
pub fn batch_form(operations: &[String]) -> String {
    operations
        .iter()
        .map(|op| format!("op={}", query_escape(op)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Send `operations` to `host` (scheme included) as a single batch
pub(crate) async fn execute(
    client: &KodoClient,
    host: &str,
    operations: &[String],
) -> Result<Vec<BatchOpRet>> {
    check_batch_size(operations)?;

    let request = HttpRequest::post(format!("{host}/batch")).form(batch_form(operations));
    let results = client
        .request::<Option<Vec<BatchOpRet>>>(request)
        .await?
        .unwrap_or_default();

    if results.len() != operations.len() {
        return Err(Error::Decode(format!(
            "batch answered {} results for {} operations",
            results.len(),
            operations.len()
        )));
    }

    let failed = results.iter().filter(|r| !r.is_success()).count();
    if failed > 0 {
        tracing::warn!(failed, total = results.len(), "batch finished with failed items");
    }
    Ok(results)
}
