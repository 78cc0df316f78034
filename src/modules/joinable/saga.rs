use crate::services::platform::PlatformError;
use futures::future::BoxFuture;
use std::fmt::Display;
use std::future::Future;
use tracing::{error, info, warn};

type Compensation = BoxFuture<'static, Result<(), PlatformError>>;

/// Forward steps paired with compensations. When a step fails, the
/// compensations of every earlier step run newest-first.
pub struct Saga {
    name: &'static str,
    completed: Vec<(&'static str, Compensation)>,
}

impl Saga {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            completed: Vec::new(),
        }
    }

    /// Runs a forward step. On failure the saga is rolled back before the
    /// error is handed back.
    pub async fn run<T, E, F>(&mut self, step: &'static str, forward: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        match forward.await {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("{}: step '{}' failed: {}", self.name, step, e);
                self.rollback().await;
                Err(e)
            }
        }
    }

    /// Registers how to undo a step that has already succeeded.
    pub fn compensate(&mut self, step: &'static str, undo: Compensation) {
        self.completed.push((step, undo));
    }

    /// Returns how many compensations succeeded.
    pub async fn rollback(&mut self) -> usize {
        let mut undone = 0;
        while let Some((step, undo)) = self.completed.pop() {
            match undo.await {
                Ok(()) => {
                    info!("{}: compensated step '{}'", self.name, step);
                    undone += 1;
                }
                Err(e) => {
                    error!(
                        "{}: compensation for step '{}' failed, manual cleanup needed: {}",
                        self.name, step, e
                    );
                }
            }
        }
        undone
    }

    /// Ends the saga. Registered compensations are dropped without running.
    pub fn commit(mut self) {
        self.completed.clear();
    }
}
