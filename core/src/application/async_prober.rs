//! Async facade over [`PortProber`].

use std::sync::Arc;

use tokio::task::{self, JoinError};

use super::PortProber;
use crate::adapters::TcpBinder;
use crate::config::ProbeConfig;
use crate::domain::{Allocation, FreePorts};
use crate::error::{Error, Result};
use crate::ports::PortBinder;

/// Runs each probe call on tokio's blocking pool.
///
/// One call is one blocking task, so the probes of a batch stay sequential
/// and in input order.
pub struct AsyncPortProber<B: PortBinder = TcpBinder> {
    inner: Arc<PortProber<B>>,
}

impl AsyncPortProber<TcpBinder> {
    pub fn new() -> Self {
        Self::from_prober(PortProber::new())
    }

    pub fn with_config(config: ProbeConfig) -> Self {
        Self::from_prober(PortProber::with_config(config))
    }
}

impl Default for AsyncPortProber<TcpBinder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: PortBinder> Clone for AsyncPortProber<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B> AsyncPortProber<B>
where
    B: PortBinder + 'static,
{
    pub fn from_prober(prober: PortProber<B>) -> Self {
        Self {
            inner: Arc::new(prober),
        }
    }

    pub fn prober(&self) -> &PortProber<B> {
        &self.inner
    }

    /// See [`PortProber::allocate_one`].
    pub async fn allocate_one(&self, port: u64) -> Result<Allocation> {
        self.run(move |prober| prober.allocate_one(port)).await
    }

    /// See [`PortProber::allocate_range`].
    pub async fn allocate_range(&self, from: u64, to: u64) -> Result<FreePorts> {
        self.run(move |prober| prober.allocate_range(from, to)).await
    }

    /// See [`PortProber::allocate_range_first_fit`].
    pub async fn allocate_range_first_fit(&self, from: u64, to: u64) -> Result<Allocation> {
        self.run(move |prober| prober.allocate_range_first_fit(from, to))
            .await
    }

    /// See [`PortProber::allocate_set`].
    pub async fn allocate_set(&self, ports: Vec<u64>) -> Result<FreePorts> {
        self.run(move |prober| prober.allocate_set(&ports)).await
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&PortProber<B>) -> Result<T> + Send + 'static,
    {
        let prober = Arc::clone(&self.inner);
        task::spawn_blocking(move || f(&prober))
            .await
            .unwrap_or_else(join_failure)
    }
}

fn join_failure<T>(err: JoinError) -> Result<T> {
    if err.is_panic() {
        std::panic::resume_unwind(err.into_panic());
    }
    Err(Error::Aborted(err.to_string()))
}
