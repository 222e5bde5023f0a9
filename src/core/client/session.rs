//! Lazy HTTP session: opened on first use, dropped on `close`.

use std::future::Future;

use crate::core::YfError;

impl super::YfClient {
    /// Open the HTTP session if it is not open yet.
    ///
    /// # Errors
    ///
    /// Returns [`YfError::Http`] if the HTTP client cannot be constructed.
    pub async fn ensure_open(&self) -> Result<(), YfError> {
        self.session().await.map(|_| ())
    }

    /// The live session and its generation, opening one if needed.
    pub(crate) async fn session(&self) -> Result<(reqwest::Client, u64), YfError> {
        {
            let state = self.inner.state.read().await;
            if let Some(http) = &state.http {
                return Ok((http.clone(), state.generation));
            }
        }

        let mut state = self.inner.state.write().await;
        // Another task may have opened it while we waited for the write lock.
        if let Some(http) = &state.http {
            return Ok((http.clone(), state.generation));
        }
        let http = self.inner.config.http_client()?;
        state.generation += 1;
        state.http = Some(http.clone());
        state.crumb = None;
        tracing::debug!(generation = state.generation, "session opened");
        Ok((http, state.generation))
    }

    /// Drop the HTTP session and the crumb. Safe to call any number of times;
    /// the next request opens a fresh session.
    pub async fn close(&self) {
        let mut state = self.inner.state.write().await;
        close_session(&mut state);
    }

    /// Close without waiting for the session lock. Returns `false` if the
    /// lock is held elsewhere and nothing was done.
    pub(crate) fn try_close(&self) -> bool {
        match self.inner.state.try_write() {
            Ok(mut state) => {
                close_session(&mut state);
                true
            }
            Err(_) => false,
        }
    }

    /// Whether an HTTP session is currently open.
    pub async fn is_open(&self) -> bool {
        self.inner.state.read().await.http.is_some()
    }

    /// Open the session, run `f` with a handle to this client, then close the
    /// session whatever `f` returned.
    ///
    /// # Errors
    ///
    /// Returns the error from opening the session, or whatever `f` returns.
    pub async fn scoped<F, Fut, T>(&self, f: F) -> Result<T, YfError>
    where
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = Result<T, YfError>>,
    {
        self.ensure_open().await?;
        let out = f(self.clone()).await;
        self.close().await;
        out
    }
}

fn close_session(state: &mut super::SessionState) {
    state.crumb = None;
    if state.http.take().is_some() {
        tracing::debug!(generation = state.generation, "session closed");
    }
}
