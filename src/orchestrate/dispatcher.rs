//! Concurrent fan-out of worker invocations with failure isolation.

use crate::agents::AgentRegistry;
use crate::config::DispatchConfig;
use crate::types::{ErrorKind, ProgressEvent, WorkerResult, WorkerRole};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// Destination for progress events. A disabled sink drops everything, so the
/// non-streaming path runs the same code without a channel.
#[derive(Clone)]
pub struct EventSink {
    tx: Option<UnboundedSender<ProgressEvent>>,
}

impl EventSink {
    pub fn new(tx: UnboundedSender<ProgressEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Sends an event; a dropped receiver is not an error.
    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

/// Runs the selected workers concurrently and collects one `WorkerResult`
/// per requested role.
pub struct Dispatcher {
    registry: Arc<AgentRegistry>,
    per_worker_timeout: Duration,
    global_timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<AgentRegistry>, config: &DispatchConfig) -> Self {
        Self {
            registry,
            per_worker_timeout: Duration::from_millis(config.per_worker_timeout_ms),
            global_timeout: Duration::from_millis(config.global_timeout_ms),
        }
    }

    /// Fans the query out to every requested role.
    ///
    /// The returned map always has exactly one entry per requested role.
    /// Unavailable roles fail immediately without scheduling work or emitting
    /// events. Launched roles get exactly one `Started` and exactly one
    /// matching `Completed` or `Failed`. At the global deadline remaining
    /// tasks are aborted; their roles are recorded as `Timeout` and late
    /// results are discarded.
    pub async fn run_all(
        &self,
        query: &str,
        roles: &[WorkerRole],
        sink: &EventSink,
    ) -> HashMap<WorkerRole, WorkerResult> {
        let mut results: HashMap<WorkerRole, WorkerResult> = HashMap::new();
        let mut launched: Vec<WorkerRole> = Vec::new();
        let mut tasks: JoinSet<(WorkerRole, WorkerResult)> = JoinSet::new();
        let deadline = Instant::now() + self.global_timeout;

        for &role in roles {
            if results.contains_key(&role) || launched.contains(&role) {
                continue;
            }
            let worker = match self.registry.get(role).await {
                Ok(worker) => worker,
                Err(e) => {
                    tracing::warn!(role = %role, error = %e, "Worker unavailable, skipping");
                    results.insert(role, WorkerResult::failure(ErrorKind::NotAvailable, e.to_string()));
                    continue;
                }
            };

            sink.emit(ProgressEvent::Started(role));
            launched.push(role);

            let query = query.to_string();
            let per_worker = self.per_worker_timeout;
            tasks.spawn(async move {
                let started = Instant::now();
                let result = match tokio::time::timeout(per_worker, worker.execute(&query)).await {
                    Ok(Ok(payload)) => WorkerResult::success(payload),
                    Ok(Err(e)) => WorkerResult::failure(ErrorKind::WorkerError, e.to_string()),
                    Err(_) => WorkerResult::failure(
                        ErrorKind::Timeout,
                        format!("{} exceeded {:?}", role, per_worker),
                    ),
                };
                tracing::info!(
                    role = %role,
                    success = result.is_success(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Worker finished"
                );
                (role, result)
            });
        }

        let mut deadline_hit = false;
        while !tasks.is_empty() {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((role, result)))) => {
                    let event = if result.is_success() {
                        ProgressEvent::Completed(role)
                    } else {
                        ProgressEvent::Failed(role)
                    };
                    // First write wins; a slot is never overwritten.
                    results.entry(role).or_insert(result);
                    sink.emit(event);
                }
                Ok(Some(Err(e))) => {
                    tracing::warn!(error = %e, "Worker task aborted or panicked");
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(timeout = ?self.global_timeout, "Global deadline hit, aborting stragglers");
                    deadline_hit = true;
                    tasks.abort_all();
                    break;
                }
            }
        }

        // Launched roles with no recorded result were cut off by the global
        // deadline (or their task died). Each still owes its Failed event.
        for role in launched {
            if !results.contains_key(&role) {
                let (kind, message) = if deadline_hit {
                    (ErrorKind::Timeout, format!("{} cut off by global deadline", role))
                } else {
                    (ErrorKind::WorkerError, format!("{} task terminated abnormally", role))
                };
                results.insert(role, WorkerResult::failure(kind, message));
                sink.emit(ProgressEvent::Failed(role));
            }
        }

        results
    }
}
