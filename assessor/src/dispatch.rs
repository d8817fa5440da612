//! Batch dispatch.
//!
//! The dispatcher turns the planner's pending requests into bounded batches and issues each
//! batch as one concurrent operation. Batches run strictly in the order they were formed;
//! within a batch there is no ordering guarantee between requests, only positional
//! correspondence between the batch and its replies. The join at the end of each batch is
//! the pipeline's suspension point.

use crate::error::AssessorError;
use crate::traits::backend::{BackendReply, GradingBackend};
use crate::types::DispatchRequest;
use futures::future::join_all;

/// Split `items` into consecutive batches of at most `batch_size`.
///
/// Produces `ceil(n / batch_size)` batches whose lengths sum to `n`. A batch size of zero
/// is normalized to one.
pub fn partition<T>(items: Vec<T>, batch_size: usize) -> Vec<Vec<T>> {
    let batch_size = batch_size.max(1);
    let mut batches: Vec<Vec<T>> = Vec::with_capacity(items.len().div_ceil(batch_size));
    let mut current: Vec<T> = Vec::with_capacity(batch_size);

    for item in items {
        current.push(item);
        if current.len() == batch_size {
            batches.push(std::mem::replace(&mut current, Vec::with_capacity(batch_size)));
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

/// Issue every request of one batch concurrently and collect one result per request.
///
/// The returned vector is positionally aligned with `batch`: `results[i]` belongs to
/// `batch[i]`. Transport failures arrive as the `Err` value of their slot: they are data,
/// never a propagated error that would abort the rest of the batch.
pub async fn dispatch_batch(
    batch: &[DispatchRequest],
    backend: &dyn GradingBackend,
) -> Vec<Result<BackendReply, AssessorError>> {
    join_all(batch.iter().map(|request| backend.assess(request))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskKind;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn request(uid: &str) -> DispatchRequest {
        DispatchRequest {
            uid: uid.to_string(),
            task_kind: TaskKind::FreeText,
            reference: json!("reference"),
            template: json!(""),
            response: json!("response"),
        }
    }

    /// Replies with the request's uid in the body, or no response at all for listed uids.
    struct EchoBackend {
        unreachable: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl EchoBackend {
        fn new(unreachable: &[&str]) -> Self {
            EchoBackend {
                unreachable: unreachable.iter().map(|s| s.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GradingBackend for EchoBackend {
        async fn assess(
            &self,
            request: &DispatchRequest,
        ) -> Result<BackendReply, AssessorError> {
            self.calls.lock().unwrap().push(request.uid.clone());
            if self.unreachable.contains(&request.uid) {
                return Err(AssessorError::Unreachable(format!(
                    "no route to backend for {}",
                    request.uid
                )));
            }
            Ok(BackendReply {
                status: 200,
                body: request.uid.clone(),
            })
        }
    }

    #[test]
    fn test_partition_counts_and_sizes() {
        let items: Vec<u32> = (0..10).collect();
        let batches = partition(items, 3);
        // ceil(10 / 3) = 4 batches, all items preserved in order.
        assert_eq!(batches.len(), 4);
        assert_eq!(
            batches.iter().map(|b| b.len()).collect::<Vec<_>>(),
            vec![3, 3, 3, 1]
        );
        assert_eq!(batches.concat(), (0..10).collect::<Vec<u32>>());
    }

    #[test]
    fn test_partition_exact_multiple() {
        let batches = partition((0..9).collect::<Vec<u32>>(), 3);
        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|b| b.len() == 3));
    }

    #[test]
    fn test_partition_empty_input() {
        let batches = partition(Vec::<u32>::new(), 8);
        assert!(batches.is_empty());
    }

    #[test]
    fn test_partition_zero_batch_size_is_normalized() {
        let batches = partition(vec![1, 2, 3], 0);
        assert_eq!(batches.len(), 3);
    }

    #[tokio::test]
    async fn test_dispatch_batch_preserves_positional_correspondence() {
        let backend = EchoBackend::new(&[]);
        let batch = vec![request("u1"), request("u2"), request("u3")];

        let results = dispatch_batch(&batch, &backend).await;

        assert_eq!(results.len(), 3);
        for (request, result) in batch.iter().zip(&results) {
            assert_eq!(result.as_ref().unwrap().body, request.uid);
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_collected_not_propagated() {
        let backend = EchoBackend::new(&["u2"]);
        let batch = vec![request("u1"), request("u2"), request("u3")];

        let results = dispatch_batch(&batch, &backend).await;

        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(AssessorError::Unreachable(_))));
        assert!(results[2].is_ok());
        // The failing unit did not stop its siblings from being issued.
        assert_eq!(backend.calls.lock().unwrap().len(), 3);
    }
}
