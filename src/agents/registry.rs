//! Agent registry with lazy, memoized instance construction.
//!
//! The registry is the only place worker roles are wired to concrete
//! implementations. Construction is deferred to the first `get` call and the
//! resulting instance is cached and shared; a failed construction is not
//! cached, so a later `get` retries from scratch. Each registration carries a
//! generation number, and instances are served or cached only while their
//! generation is current, so re-registering a role always takes effect even
//! against a `get` that is mid-construction.

use crate::agents::Worker;
use crate::types::{AppError, Result, WorkerRole};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type Constructor = Arc<dyn Fn() -> BoxFuture<'static, Result<Arc<dyn Worker>>> + Send + Sync>;

struct Registration {
    /// Bumped on every `register` for the role. An instance is only served
    /// or cached while its generation matches the current registration, so
    /// a replaced constructor can never leak a stale worker into the cache.
    generation: u64,
    construct: Constructor,
}

struct CachedInstance {
    generation: u64,
    worker: Arc<dyn Worker>,
}

/// Registry mapping worker roles to constructors and live instances.
pub struct AgentRegistry {
    constructors: parking_lot::RwLock<HashMap<WorkerRole, Registration>>,
    instances: parking_lot::Mutex<HashMap<WorkerRole, CachedInstance>>,
    /// Per-role construction guards: concurrent first callers for the same
    /// role serialize (one constructs, the rest reuse) without blocking
    /// construction of other roles.
    construction_locks: parking_lot::Mutex<HashMap<WorkerRole, Arc<tokio::sync::Mutex<()>>>>,
    next_generation: AtomicU64,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            constructors: parking_lot::RwLock::new(HashMap::new()),
            instances: parking_lot::Mutex::new(HashMap::new()),
            construction_locks: parking_lot::Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Register a constructor for a role. Re-registering replaces the
    /// constructor and invalidates any cached instance built from the old
    /// one, including one still mid-construction in a concurrent `get`.
    pub fn register<F, Fut>(&self, role: WorkerRole, constructor: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Arc<dyn Worker>>> + Send + 'static,
    {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        self.constructors.write().insert(
            role,
            Registration {
                generation,
                construct: Arc::new(move || Box::pin(constructor())),
            },
        );
        self.instances.lock().remove(&role);
        tracing::debug!(role = %role, generation, "Registered agent constructor");
    }

    /// Get the live instance for a role, constructing it on first access.
    ///
    /// Returns `NotAvailable` if the role has no constructor or the
    /// constructor fails; failure does not poison later retries.
    pub async fn get(&self, role: WorkerRole) -> Result<Arc<dyn Worker>> {
        let role_lock = {
            let mut locks = self.construction_locks.lock();
            Arc::clone(locks.entry(role).or_default())
        };
        let _construction = role_lock.lock().await;

        let (generation, construct) = {
            let constructors = self.constructors.read();
            match constructors.get(&role) {
                Some(registration) => (
                    registration.generation,
                    Arc::clone(&registration.construct),
                ),
                None => {
                    return Err(AppError::Configuration(format!(
                        "Agent '{}' is not registered",
                        role
                    )))
                }
            }
        };

        {
            let instances = self.instances.lock();
            if let Some(cached) = instances.get(&role) {
                if cached.generation == generation {
                    return Ok(Arc::clone(&cached.worker));
                }
            }
        }

        match construct().await {
            Ok(worker) => {
                tracing::info!(role = %role, "Constructed agent instance");
                let current = self
                    .constructors
                    .read()
                    .get(&role)
                    .map(|registration| registration.generation);
                // Cache only while our registration is still current; if the
                // role was re-registered mid-construction this instance is
                // already stale and the next `get` rebuilds from the new
                // constructor.
                if current == Some(generation) {
                    self.instances.lock().insert(
                        role,
                        CachedInstance {
                            generation,
                            worker: Arc::clone(&worker),
                        },
                    );
                }
                Ok(worker)
            }
            Err(e) => {
                tracing::warn!(role = %role, error = %e, "Agent construction failed");
                Err(AppError::Configuration(format!(
                    "Agent '{}' unavailable: {}",
                    role, e
                )))
            }
        }
    }

    /// All roles with a registered constructor, in the fixed dispatch order.
    pub fn roles(&self) -> Vec<WorkerRole> {
        let constructors = self.constructors.read();
        WorkerRole::dispatchable()
            .into_iter()
            .filter(|role| constructors.contains_key(role))
            .collect()
    }

    /// Whether a role has a registered constructor.
    pub fn has_role(&self, role: WorkerRole) -> bool {
        self.constructors.read().contains_key(&role)
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::WorkerPayload;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubWorker {
        role: WorkerRole,
    }

    #[async_trait]
    impl Worker for StubWorker {
        fn role(&self) -> WorkerRole {
            self.role
        }

        async fn execute(&self, _input: &str) -> Result<WorkerPayload> {
            Ok(WorkerPayload::new())
        }
    }

    #[tokio::test]
    async fn test_get_unregistered_role_is_not_available() {
        let registry = AgentRegistry::new();
        let result = registry.get(WorkerRole::Search).await;
        assert!(result.is_err());
        assert!(!registry.has_role(WorkerRole::Search));
    }

    #[tokio::test]
    async fn test_get_memoizes_instance() {
        let registry = AgentRegistry::new();
        let constructed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&constructed);

        registry.register(WorkerRole::Search, move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(StubWorker {
                    role: WorkerRole::Search,
                }) as Arc<dyn Worker>)
            }
        });

        let first = registry.get(WorkerRole::Search).await.unwrap();
        let second = registry.get(WorkerRole::Search).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(constructed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_constructor_failure_does_not_poison_retry() {
        let registry = AgentRegistry::new();
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        registry.register(WorkerRole::Geo, move || {
            let counter = Arc::clone(&counter);
            async move {
                // First attempt fails, later attempts succeed.
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(AppError::Backend("clustering service offline".to_string()))
                } else {
                    Ok(Arc::new(StubWorker {
                        role: WorkerRole::Geo,
                    }) as Arc<dyn Worker>)
                }
            }
        });

        assert!(registry.get(WorkerRole::Geo).await.is_err());
        assert!(registry.get(WorkerRole::Geo).await.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_access_constructs_once() {
        let registry = Arc::new(AgentRegistry::new());
        let constructed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&constructed);

        registry.register(WorkerRole::Analyst, move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                Ok(Arc::new(StubWorker {
                    role: WorkerRole::Analyst,
                }) as Arc<dyn Worker>)
            }
        });

        let a = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.get(WorkerRole::Analyst).await })
        };
        let b = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.get(WorkerRole::Analyst).await })
        };

        let first = a.await.unwrap().unwrap();
        let second = b.await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(constructed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reregister_replaces_instance() {
        let registry = AgentRegistry::new();
        registry.register(WorkerRole::Redactor, || async {
            Ok(Arc::new(StubWorker {
                role: WorkerRole::Redactor,
            }) as Arc<dyn Worker>)
        });
        let first = registry.get(WorkerRole::Redactor).await.unwrap();

        registry.register(WorkerRole::Redactor, || async {
            Ok(Arc::new(StubWorker {
                role: WorkerRole::Redactor,
            }) as Arc<dyn Worker>)
        });
        let second = registry.get(WorkerRole::Redactor).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_reregister_during_inflight_get_does_not_cache_stale_instance() {
        let registry = Arc::new(AgentRegistry::new());
        registry.register(WorkerRole::Search, || async {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            Ok(Arc::new(StubWorker {
                role: WorkerRole::Search,
            }) as Arc<dyn Worker>)
        });

        let inflight = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.get(WorkerRole::Search).await })
        };
        // Let the first get enter construction before replacing the
        // constructor underneath it.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        registry.register(WorkerRole::Search, || async {
            Ok(Arc::new(StubWorker {
                role: WorkerRole::Search,
            }) as Arc<dyn Worker>)
        });

        let first = inflight.await.unwrap().unwrap();
        let after = registry.get(WorkerRole::Search).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &after));

        // The replacement instance is the one that stays memoized.
        let again = registry.get(WorkerRole::Search).await.unwrap();
        assert!(Arc::ptr_eq(&after, &again));
    }

    #[tokio::test]
    async fn test_slow_construction_does_not_block_other_roles() {
        let registry = Arc::new(AgentRegistry::new());
        registry.register(WorkerRole::Analyst, || async {
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            Ok(Arc::new(StubWorker {
                role: WorkerRole::Analyst,
            }) as Arc<dyn Worker>)
        });
        registry.register(WorkerRole::Search, || async {
            Ok(Arc::new(StubWorker {
                role: WorkerRole::Search,
            }) as Arc<dyn Worker>)
        });

        let slow = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.get(WorkerRole::Analyst).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        // The search constructor must finish while the analyst one is
        // still sleeping.
        let fast = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            registry.get(WorkerRole::Search),
        )
        .await;
        assert!(fast.expect("search construction was blocked").is_ok());

        assert!(slow.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_roles_in_dispatch_order() {
        let registry = AgentRegistry::new();
        registry.register(WorkerRole::Redactor, || async {
            Ok(Arc::new(StubWorker {
                role: WorkerRole::Redactor,
            }) as Arc<dyn Worker>)
        });
        registry.register(WorkerRole::Search, || async {
            Ok(Arc::new(StubWorker {
                role: WorkerRole::Search,
            }) as Arc<dyn Worker>)
        });

        assert_eq!(
            registry.roles(),
            vec![WorkerRole::Search, WorkerRole::Redactor]
        );
    }
}
