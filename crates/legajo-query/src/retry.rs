//! One automatic retry for reads. Mutations never retry: "add" is not
//! idempotent.

use std::{future::Future, time::Duration};

use legajo_core::backend::BackendResult;

pub(crate) async fn retry_once<T, F, Fut>(
  what: &str,
  delay: Duration,
  op: F,
) -> BackendResult<T>
where
  F: Fn() -> Fut,
  Fut: Future<Output = BackendResult<T>>,
{
  match op().await {
    Err(e) if e.is_transient() => {
      tracing::warn!(what, error = %e, "read failed, retrying once");
      tokio::time::sleep(delay).await;
      op().await
    }
    other => other,
  }
}
