// src/download/pool.rs
// =============================================================================
// A fixed-size worker pool that runs every task exactly once.
//
// How it works:
// 1. A feeder task pushes every DownloadTask into a bounded task channel
// 2. N worker tasks share the receiving end and pull until it's empty
// 3. Each worker sends one DownloadResult per task into a results channel
// 4. The caller (the single aggregator) drains results as they land
//
// Only N workers exist, so at most N tasks are ever in flight. Workers never
// share data with each other; the results channel is the only meeting point,
// and only the aggregator prints or counts, so progress output never tears.
//
// The pool doesn't know anything about HTTP: the per-task work is passed in
// as a closure. That keeps the scheduling rules testable without a network.
// =============================================================================

use std::future::Future;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use futures::FutureExt; // catch_unwind() on futures
use tokio::sync::{mpsc, Mutex};

use super::task::{DownloadResult, DownloadTask, Outcome};
use crate::error::DownloadError;

// Runs `work` for every task with at most `pool_size` in flight
//
// Parameters:
//   tasks: the full, fixed task list
//   pool_size: number of workers
//   work: does one task; its error becomes that task's Failure
//   on_result: called once per result, in completion order
//
// Returns: one DownloadResult per task, in completion order
pub async fn run_pool<W, Fut, C>(
    tasks: Vec<DownloadTask>,
    pool_size: NonZeroUsize,
    work: W,
    mut on_result: C,
) -> Vec<DownloadResult>
where
    W: Fn(DownloadTask) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<PathBuf, DownloadError>> + Send + 'static,
    C: FnMut(&DownloadResult),
{
    let expected = tasks.len();
    let mut results = Vec::with_capacity(expected);
    if expected == 0 {
        return results;
    }

    let capacity = pool_size.get();
    let (task_tx, task_rx) = mpsc::channel::<DownloadTask>(capacity);
    let (result_tx, mut result_rx) = mpsc::channel::<DownloadResult>(capacity);

    // Feeder: closing task_tx (by dropping it) is what tells workers to stop
    tokio::spawn(async move {
        for task in tasks {
            if task_tx.send(task).await.is_err() {
                break;
            }
        }
    });

    // No point starting more workers than there are tasks
    let task_rx = Arc::new(Mutex::new(task_rx));
    let work = Arc::new(work);
    for id in 0..capacity.min(expected) {
        tokio::spawn(worker(
            id,
            Arc::clone(&task_rx),
            result_tx.clone(),
            Arc::clone(&work),
        ));
    }
    // Workers hold the only senders now, so recv() returns None once they're done
    drop(result_tx);

    while results.len() < expected {
        match result_rx.recv().await {
            Some(result) => {
                on_result(&result);
                results.push(result);
            }
            None => break,
        }
    }

    if results.len() < expected {
        tracing::error!(
            expected,
            received = results.len(),
            "worker pool shut down before every task reported"
        );
    }

    results
}

async fn worker<W, Fut>(
    id: usize,
    tasks: Arc<Mutex<mpsc::Receiver<DownloadTask>>>,
    results: mpsc::Sender<DownloadResult>,
    work: Arc<W>,
) where
    W: Fn(DownloadTask) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<PathBuf, DownloadError>> + Send + 'static,
{
    loop {
        // The lock is released at the end of this statement, before the work runs
        let next = tasks.lock().await.recv().await;
        let Some(task) = next else {
            break;
        };

        tracing::debug!(worker = id, url = %task.source, "download started");

        let job = task.clone();
        let outcome = match AssertUnwindSafe(async { (*work)(job).await })
            .catch_unwind()
            .await
        {
            Ok(Ok(path)) => Outcome::Success(path),
            Ok(Err(e)) => Outcome::Failure(e.to_string()),
            Err(_) => {
                tracing::warn!(worker = id, url = %task.source, "download panicked");
                Outcome::Failure("download panicked".to_string())
            }
        };

        tracing::debug!(worker = id, url = %task.source, ?outcome, "download finished");

        if results.send(DownloadResult { task, outcome }).await.is_err() {
            break;
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Arc<Mutex<Receiver>>?
//    - tokio's mpsc channel has exactly one receiver
//    - Several workers need to pull from it, so they share it behind a Mutex
//    - Arc lets every spawned worker own a handle to the same Mutex
//
// 2. How does the pool know it's finished?
//    - The feeder drops its Sender after the last task, so recv() yields None
//    - Each worker drops its result Sender when it exits
//    - The aggregator stops once it has `expected` results
//
// 3. What is catch_unwind doing here?
//    - A panic inside one download would otherwise kill its worker silently
//    - Catching it turns the panic into a Failure for that one task, so the
//      caller still gets exactly one result per task
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use url::Url;

    fn tasks(n: usize) -> Vec<DownloadTask> {
        (0..n)
            .map(|i| DownloadTask {
                source: Url::parse(&format!("https://example.com/{i}.webp")).unwrap(),
                destination: PathBuf::from(format!("out/{i}.webp")),
            })
            .collect()
    }

    fn pool(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_every_task_gets_exactly_one_result() {
        let input = tasks(25);
        let results = run_pool(
            input.clone(),
            pool(4),
            |task: DownloadTask| async move {
                if task.source.path().starts_with("/1") {
                    Err(DownloadError::from(FetchError::Status {
                        url: task.source.to_string(),
                        status: 500,
                    }))
                } else {
                    Ok(task.destination)
                }
            },
            |_| {},
        )
        .await;

        assert_eq!(results.len(), 25);
        let mut seen: Vec<_> = results.iter().map(|r| r.task.clone()).collect();
        seen.sort_by(|a, b| a.destination.cmp(&b.destination));
        let mut expected = input;
        expected.sort_by(|a, b| a.destination.cmp(&b.destination));
        assert_eq!(seen, expected);

        // "/1", "/10".."/19"
        let failed = results.iter().filter(|r| !r.is_success()).count();
        assert_eq!(failed, 11);
    }

    #[tokio::test]
    async fn test_never_more_than_pool_size_in_flight() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let work = {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            move |task: DownloadTask| {
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(task.destination)
                }
            }
        };

        let results = run_pool(tasks(10), pool(3), work, |_| {}).await;

        assert_eq!(results.len(), 10);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_pool_of_one_runs_sequentially() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let work = {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            move |task: DownloadTask| {
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(task.destination)
                }
            }
        };

        let results = run_pool(tasks(5), pool(1), work, |_| {}).await;

        assert_eq!(results.len(), 5);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_results_arrive_in_completion_order() {
        // Task 0 is slow, task 1 is fast: with two workers, 1 finishes first
        let work = |task: DownloadTask| async move {
            let delay = if task.source.path() == "/0.webp" { 200 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(task.destination)
        };

        let mut progress = Vec::new();
        let results = run_pool(tasks(2), pool(2), work, |r| {
            progress.push(r.task.source.path().to_string());
        })
        .await;

        assert_eq!(progress, vec!["/1.webp", "/0.webp"]);
        assert_eq!(results[0].task.source.path(), "/1.webp");
    }

    #[tokio::test]
    async fn test_panicking_task_becomes_failure() {
        let work = |task: DownloadTask| async move {
            if task.source.path() == "/1.webp" {
                panic!("boom");
            }
            Ok(task.destination)
        };

        let results = run_pool(tasks(3), pool(2), work, |_| {}).await;

        assert_eq!(results.len(), 3);
        let failed: Vec<_> = results.iter().filter(|r| !r.is_success()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].task.source.path(), "/1.webp");
        assert_eq!(
            failed[0].outcome,
            Outcome::Failure("download panicked".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_task_list() {
        let mut calls = 0;
        let results = run_pool(
            Vec::new(),
            pool(3),
            |task: DownloadTask| async move { Ok(task.destination) },
            |_| calls += 1,
        )
        .await;

        assert!(results.is_empty());
        assert_eq!(calls, 0);
    }
}
