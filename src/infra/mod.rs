pub mod google;
pub mod yelp;

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{Instrument, warn};

/// Runs `fetch` for every id with at most `concurrency` in flight, returning
/// results in input order. Failures are logged and come back as `None`.
pub async fn fetch_concurrently<T, F, Fut>(
    ids: Vec<String>,
    concurrency: usize,
    fetch: F,
) -> Vec<Option<T>>
where
    T: Send + 'static,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Option<T>>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = Vec::with_capacity(ids.len());

    for id in ids {
        let sem = semaphore.clone();
        let span = tracing::debug_span!("fetch_details", id = %id);
        let fut = fetch(id);
        tasks.push(tokio::spawn(
            async move {
                let _permit = sem.acquire_owned().await.ok()?;
                match fut.await {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(error = %e, "Detail fetch failed, skipping");
                        None
                    }
                }
            }
            .instrument(span),
        ));
    }

    let mut results = Vec::with_capacity(tasks.len());
    for task in tasks {
        results.push(task.await.unwrap_or_else(|e| {
            warn!(error = %e, "Detail task panicked");
            None
        }));
    }
    results
}
