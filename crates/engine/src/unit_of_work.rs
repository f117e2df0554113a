// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unit of work: one transaction attempt with a deadline and lock retries
//!
//! Every attempt runs under a hard deadline. A deadline miss rolls the
//! transaction back and surfaces immediately; only lock contention is
//! retried, with a doubling backoff, up to the configured retry count.
//! The operation closure must therefore be safe to run more than once
//! against a fresh transaction.

use crate::error::LifecycleError;
use std::future::Future;
use std::pin::Pin;
use vk_adapters::Telemetry;
use vk_core::UnitOfWorkConfig;
use vk_storage::{Store, StoreError, StoreTx};

/// The boxed future an operation closure returns, borrowing the transaction
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, LifecycleError>> + Send + 'a>>;

/// Runs operations transactionally with deadline and retry policy
#[derive(Clone)]
pub struct UnitOfWork<T: Telemetry> {
    config: UnitOfWorkConfig,
    telemetry: T,
}

impl<Tel: Telemetry> UnitOfWork<Tel> {
    pub fn new(config: UnitOfWorkConfig, telemetry: Tel) -> Self {
        Self { config, telemetry }
    }

    /// Run `op` inside a transaction, committing on success.
    ///
    /// Contention (from `begin`, from the closure, or from `commit`) rolls
    /// back and retries. Any other closure error rolls back and propagates
    /// unchanged.
    pub async fn run<S, T, F>(&self, store: &S, op: F) -> Result<T, LifecycleError>
    where
        S: Store,
        T: Send,
        F: for<'a> Fn(&'a mut S::Tx) -> TxFuture<'a, T>,
    {
        let mut attempt = 0u32;
        loop {
            let mut tx = match store.begin().await {
                Ok(tx) => tx,
                Err(StoreError::Busy) => {
                    if self.backoff(&mut attempt).await {
                        continue;
                    }
                    return Err(LifecycleError::LockTimeout { attempts: attempt });
                }
                Err(err) => {
                    self.telemetry.tx_failure();
                    return Err(err.into());
                }
            };

            match tokio::time::timeout(self.config.timeout, op(&mut tx)).await {
                Err(_) => {
                    if let Err(err) = tx.rollback().await {
                        tracing::warn!(%err, "rollback after deadline failed");
                    }
                    self.telemetry.tx_failure();
                    return Err(LifecycleError::TransactionTimeout);
                }
                Ok(Ok(value)) => match tx.commit().await {
                    Ok(()) => return Ok(value),
                    Err(StoreError::Busy) => {
                        if self.backoff(&mut attempt).await {
                            continue;
                        }
                        return Err(LifecycleError::LockTimeout { attempts: attempt });
                    }
                    Err(err) => {
                        self.telemetry.tx_failure();
                        return Err(err.into());
                    }
                },
                Ok(Err(err)) => {
                    if let Err(rb) = tx.rollback().await {
                        tracing::warn!(err = %rb, "rollback failed");
                    }
                    if err.is_lock_contention() {
                        if self.backoff(&mut attempt).await {
                            continue;
                        }
                        return Err(LifecycleError::LockTimeout { attempts: attempt });
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Sleep before the next attempt; false once retries are spent
    async fn backoff(&self, attempt: &mut u32) -> bool {
        self.telemetry.lock_conflict();
        if *attempt >= self.config.max_lock_retries {
            self.telemetry.tx_failure();
            return false;
        }
        let factor = 2u32.saturating_pow(*attempt);
        let delay = self.config.base_delay.saturating_mul(factor);
        tracing::debug!(attempt = *attempt, ?delay, "retrying after lock contention");
        self.telemetry.retry();
        tokio::time::sleep(delay).await;
        *attempt += 1;
        true
    }
}

#[cfg(test)]
#[path = "unit_of_work_tests.rs"]
mod tests;
