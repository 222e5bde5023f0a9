use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use super::YfClient;
use crate::core::ClientConfig;

#[derive(Debug, Default)]
struct RegistryState {
    client: Option<YfClient>,
    refcount: usize,
}

#[derive(Debug)]
struct RegistryInner {
    config: ClientConfig,
    state: Mutex<RegistryState>,
}

/// Blocking counterpart of [`crate::ClientRegistry`], guarded by a thread lock.
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

    /// Process-wide blocking registry with the default configuration.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<ClientRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::default)
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take a lease on the shared client, creating it if no lease is live.
    #[must_use]
    pub fn acquire(&self) -> ClientLease {
        let mut state = self.lock();
        let client = match &state.client {
            Some(c) => c.clone(),
            None => {
                let c = YfClient::new(self.inner.config.clone());
                tracing::debug!("shared blocking client created");
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
    #[must_use]
    pub fn refcount(&self) -> usize {
        self.lock().refcount
    }

    /// The shared client, if any lease is live.
    #[must_use]
    pub fn current(&self) -> Option<YfClient> {
        self.lock().client.clone()
    }

    fn release_one(&self) {
        let mut state = self.lock();
        state.refcount = state.refcount.saturating_sub(1);
        tracing::debug!(refcount = state.refcount, "client lease released");
        if state.refcount == 0
            && let Some(client) = state.client.take()
        {
            client.close();
            tracing::debug!("shared blocking client closed");
        }
    }
}

/// A counted reference to a blocking registry's client, released on drop.
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

    /// Give the lease back now instead of at drop.
    pub fn release(mut self) {
        if let Some(registry) = self.registry.take() {
            registry.release_one();
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
            registry.release_one();
        }
    }
}
