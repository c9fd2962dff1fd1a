//! Blocking optimization driver.

use std::collections::HashMap;

use super::Optimizer;
use crate::error::{Error, Result};
use crate::params::ParamId;

impl Optimizer {
    /// Runs the full optimization loop, calling `f` as few times as
    /// possible, and returns the best observed `(x, y)`.
    ///
    /// Parallelizable warm-up rounds are evaluated on scoped threads and
    /// joined before the first sequential round; model-driven rounds
    /// evaluate inline. The loop ends when the round budget is exhausted or
    /// a sticky exploration error skips the remaining model-driven rounds —
    /// in both cases the best observation logged so far is returned (check
    /// [`exploration_err`](Optimizer::exploration_err) to distinguish them).
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRunning`] if another run is in flight,
    /// [`Error::Stopped`] if [`stop`](Optimizer::stop) was called, and
    /// [`Error::NoObservations`] if the loop produced no observations at
    /// all.
    pub fn optimize<F>(&self, f: F) -> Result<(HashMap<ParamId, f64>, f64)>
    where
        F: Fn(&HashMap<ParamId, f64>) -> f64 + Send + Sync,
    {
        self.start()?;

        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("optimize").entered();

        let driven = std::thread::scope(|scope| {
            let mut pending = Vec::new();
            loop {
                if !self.running() {
                    return Err(Error::Stopped);
                }
                let (x, parallel) = self.next();
                let Some(x) = x else { break };

                if parallel {
                    let f = &f;
                    pending.push(scope.spawn(move || {
                        let y = f(&x);
                        self.log(&x, y)
                    }));
                } else {
                    // Sequential rounds must see every outstanding
                    // observation before the next model fit.
                    for handle in pending.drain(..) {
                        handle.join().expect("objective thread panicked")?;
                    }
                    let y = f(&x);
                    self.log(&x, y)?;
                }
            }
            for handle in pending.drain(..) {
                handle.join().expect("objective thread panicked")?;
            }
            Ok(())
        });

        self.finish();
        driven?;
        self.best()
    }
}
