//! Shared, reference-counted ownership of one [`YfClient`].
//!
//! Many lightweight handles ([`Ticker`](crate::Ticker), [`Tickers`](crate::Tickers))
//! can share a single client, and so a single connection pool, cookie jar and
//! crumb. The registry creates the client on the first [`acquire`](ClientRegistry::acquire)
//! and closes it when the last [`ClientLease`] is released.

use std::future::Future;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use tokio::sync::Mutex;

use crate::core::{ClientConfig, YfClient};

#[derive(Debug, Default)]
struct RegistryState {
    client: Option<YfClient>,
    refcount: usize,
}

impl RegistryState {
    /// Drop one lease; hands back the client once the count reaches zero.
    fn release(&mut self) -> Option<YfClient> {
        self.refcount = self.refcount.saturating_sub(1);
        tracing::debug!(refcount = self.refcount, "client lease released");
        if self.refcount == 0 {
            self.client.take()
        } else {
            None
        }
    }
}

#[derive(Debug)]
struct RegistryInner {
    config: ClientConfig,
    state: Mutex<RegistryState>,
}

/// Holds at most one live client and the number of leases on it.
///
/// Cloning yields another handle to the same registry.
#[derive(Debug, Clone)]
pub struct ClientRegistry {
    inner: Arc<RegistryInner>,
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl ClientRegistry {
    /// Registry whose clients are built from `config`.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                config,
                state: Mutex::new(RegistryState::default()),
            }),
        }
    }

    /// Process-wide registry with the default configuration. Facades created
    /// with `new` use it.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<ClientRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::default)
    }

    /// Take a lease on the shared client, creating it if no lease is live.
    pub async fn acquire(&self) -> ClientLease {
        let mut state = self.inner.state.lock().await;
        let client = match &state.client {
            Some(c) => c.clone(),
            None => {
                let c = YfClient::new(self.inner.config.clone());
                tracing::debug!("shared client created");
                state.client = Some(c.clone());
                c
            }
        };
        state.refcount += 1;
        tracing::debug!(refcount = state.refcount, "client lease acquired");
        ClientLease {
            client,
            registry: Some(self.clone()),
        }
    }

    /// Number of live leases.
    pub async fn refcount(&self) -> usize {
        self.inner.state.lock().await.refcount
    }

    /// The shared client, if any lease is live.
    pub async fn current(&self) -> Option<YfClient> {
        self.inner.state.lock().await.client.clone()
    }

    async fn release_one(&self) {
        let retired = self.inner.state.lock().await.release();
        if let Some(client) = retired {
            client.close().await;
            tracing::debug!("shared client closed");
        }
    }

    /// Release from a synchronous context. The count is settled before
    /// returning unless another task holds the registry lock.
    fn release_now(&self) {
        let retired = match self.inner.state.try_lock() {
            Ok(mut state) => state.release(),
            Err(_) => {
                tracing::debug!("registry busy, releasing lease later");
                let registry = self.clone();
                run_detached(async move { registry.release_one().await });
                return;
            }
        };
        if let Some(client) = retired {
            if !client.try_close() {
                run_detached(async move { client.close().await });
            }
            tracing::debug!("shared client closed");
        }
    }
}

/// A counted reference to a registry's client. Dereferences to [`YfClient`].
///
/// Prefer [`release`](Self::release). A lease that is simply dropped is
/// released on the spot; only if another task holds the registry lock at
/// that moment is the release handed to a spawned task.
#[derive(Debug)]
pub struct ClientLease {
    client: YfClient,
    registry: Option<ClientRegistry>,
}

impl ClientLease {
    /// The leased client.
    #[must_use]
    pub const fn client(&self) -> &YfClient {
        &self.client
    }

    /// Give the lease back; closes the client if this was the last one.
    pub async fn release(mut self) {
        if let Some(registry) = self.registry.take() {
            registry.release_one().await;
        }
    }
}

impl Deref for ClientLease {
    type Target = YfClient;

    fn deref(&self) -> &YfClient {
        &self.client
    }
}

impl Drop for ClientLease {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.take() {
            registry.release_now();
        }
    }
}

/// Spawn on the current runtime, or run to completion when there is none.
fn run_detached(fut: impl Future<Output = ()> + Send + 'static) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(fut);
        }
        Err(_) => futures::executor::block_on(fut),
    }
}
