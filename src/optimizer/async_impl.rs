//! Async optimization driver, available with the `async` feature.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;

use super::Optimizer;
use crate::error::{Error, Result};
use crate::params::ParamId;

impl Optimizer {
    /// Async variant of [`optimize`](Optimizer::optimize).
    ///
    /// Objective evaluations run on the blocking thread pool via
    /// [`spawn_blocking`](tokio::task::spawn_blocking); parallelizable
    /// warm-up rounds are collected through a [`JoinSet`] and drained before
    /// the first sequential round.
    ///
    /// # Errors
    ///
    /// The same failure modes as [`optimize`](Optimizer::optimize), plus
    /// [`Error::TaskError`] if an evaluation task panics.
    pub async fn optimize_async<F>(&self, f: F) -> Result<(HashMap<ParamId, f64>, f64)>
    where
        F: Fn(&HashMap<ParamId, f64>) -> f64 + Send + Sync + 'static,
    {
        self.start()?;
        let driven = self.drive_async(Arc::new(f)).await;
        self.finish();
        driven?;
        self.best()
    }

    async fn drive_async<F>(&self, f: Arc<F>) -> Result<()>
    where
        F: Fn(&HashMap<ParamId, f64>) -> f64 + Send + Sync + 'static,
    {
        let mut join_set: JoinSet<(HashMap<ParamId, f64>, f64)> = JoinSet::new();

        loop {
            if !self.running() {
                // Let in-flight evaluations finish; their results are moot.
                while join_set.join_next().await.is_some() {}
                return Err(Error::Stopped);
            }
            let (x, parallel) = self.next();
            let Some(x) = x else { break };

            if parallel {
                let f = Arc::clone(&f);
                join_set.spawn_blocking(move || {
                    let y = f(&x);
                    (x, y)
                });
            } else {
                self.drain(&mut join_set).await?;
                let f = Arc::clone(&f);
                let (x, y) = tokio::task::spawn_blocking(move || {
                    let y = f(&x);
                    (x, y)
                })
                .await
                .map_err(|e| Error::TaskError(e.to_string()))?;
                self.log(&x, y)?;
            }
        }

        self.drain(&mut join_set).await
    }

    /// Logs every outstanding parallel evaluation.
    async fn drain(&self, join_set: &mut JoinSet<(HashMap<ParamId, f64>, f64)>) -> Result<()> {
        while let Some(result) = join_set.join_next().await {
            let (x, y) = result.map_err(|e| Error::TaskError(e.to_string()))?;
            self.log(&x, y)?;
        }
        Ok(())
    }
}
