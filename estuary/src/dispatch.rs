//! Continuation and blocking call forms
//!
//! Every client operation is an async future underneath. [`Dispatcher`]
//! runs such futures in the background and reports the outcome through a
//! success or failure continuation, and [`Dispatcher::wait`] turns the
//! continuation form back into a blocking call.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use tokio::sync::oneshot;

/// Boxed success continuation
pub type OnSuccess<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Boxed failure continuation
pub type OnFailure = Box<dyn FnOnce(Error) + Send + 'static>;

/// Runtime owned by a dispatcher created outside of any async context.
/// Shut down in the background so dropping it from async code does not panic.
struct OwnedRuntime {
    inner: Mutex<Option<Runtime>>,
}

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.inner.lock().take() {
            runtime.shutdown_background();
        }
    }
}

/// Spawns client futures and routes their outcome to continuations
#[derive(Clone)]
pub struct Dispatcher {
    handle: Handle,
    owned: Option<Arc<OwnedRuntime>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("owns_runtime", &self.owned.is_some())
            .finish()
    }
}

impl Dispatcher {
    /// Use the current tokio runtime, or start a small dedicated one when
    /// called outside of any runtime
    pub fn new() -> Result<Self> {
        if let Ok(handle) = Handle::try_current() {
            return Ok(Self {
                handle,
                owned: None,
            });
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("estuary-dispatch")
            .enable_all()
            .build()
            .map_err(|e| Error::Config(format!("cannot start client runtime: {}", e)))?;
        let handle = runtime.handle().clone();
        Ok(Self {
            handle,
            owned: Some(Arc::new(OwnedRuntime {
                inner: Mutex::new(Some(runtime)),
            })),
        })
    }

    /// Dispatch onto an existing runtime
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle,
            owned: None,
        }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Run `future` in the background. Exactly one of the continuations is
    /// invoked with its outcome.
    pub fn spawn<T, F, S, E>(&self, future: F, on_success: S, on_failure: E)
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
        S: FnOnce(T) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        self.handle.spawn(async move {
            match future.await {
                Ok(value) => on_success(value),
                Err(err) => on_failure(err),
            }
        });
    }

    /// Block until one of the continuations handed to `issue` fires.
    ///
    /// Both continuations share a one-shot slot, so the first one to run
    /// wins. If both are dropped without running the call fails with
    /// [`Error::Transport`].
    ///
    /// On a multi-thread runtime worker the wait goes through
    /// [`tokio::task::block_in_place`], so the worker's queued tasks move to
    /// another thread while this one blocks. A current-thread runtime has no
    /// other thread to make progress on, so blocking there fails with
    /// [`Error::Config`] before anything is sent.
    pub fn wait<T, I>(issue: I) -> Result<T>
    where
        T: Send + 'static,
        I: FnOnce(OnSuccess<T>, OnFailure),
    {
        let in_runtime = match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => {
                return Err(Error::Config(
                    "blocking call on a current-thread runtime; use the async form".to_string(),
                ));
            }
            Ok(_) => true,
            Err(_) => false,
        };

        let (tx, rx) = oneshot::channel::<Result<T>>();
        let slot = Arc::new(Mutex::new(Some(tx)));

        let success_slot = Arc::clone(&slot);
        let on_success: OnSuccess<T> = Box::new(move |value| {
            if let Some(tx) = success_slot.lock().take() {
                let _ = tx.send(Ok(value));
            }
        });
        let on_failure: OnFailure = Box::new(move |err| {
            if let Some(tx) = slot.lock().take() {
                let _ = tx.send(Err(err));
            }
        });

        issue(on_success, on_failure);

        let outcome = if in_runtime {
            tokio::task::block_in_place(|| rx.blocking_recv())
        } else {
            rx.blocking_recv()
        };
        outcome.map_err(|_| Error::Transport("request dropped before completion".to_string()))?
    }

    /// Blocking form of an arbitrary client future
    pub fn block_on<T, F>(&self, future: F) -> Result<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self::wait(|on_success, on_failure| self.spawn(future, on_success, on_failure))
    }
}
