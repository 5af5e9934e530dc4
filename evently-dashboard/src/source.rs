use std::future::Future;

use evently_client::ApiError;
use serde::Serialize;

/// A dashboard source that failed and was rendered as empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: &'static str,
    pub error: String,
}

/// Await one source, defaulting to an empty list on failure
pub(crate) async fn settle<T, F>(source: &'static str, request: F) -> (Vec<T>, Option<SourceFailure>)
where
    F: Future<Output = Result<Vec<T>, ApiError>>,
{
    match request.await {
        Ok(items) => (items, None),
        Err(e) => {
            tracing::warn!(source, error = %e, "Dashboard source failed, showing empty");
            (
                Vec::new(),
                Some(SourceFailure {
                    source,
                    error: e.to_string(),
                }),
            )
        }
    }
}

/// Collect the failures of settled sources, in source order
pub(crate) fn failures<const N: usize>(settled: [Option<SourceFailure>; N]) -> Vec<SourceFailure> {
    settled.into_iter().flatten().collect()
}
