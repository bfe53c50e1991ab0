//! Lifecycle state machine.

use crate::config::RequestArgs;
use crate::generator::{GenError, Generator, OutputBuffer};
use crate::seed::{SeedError, SeedSelection, SeedStore};
use std::io;
use thiserror::Error;

/// Which fatal step ended a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No seed material could be loaded.
    LoadFailed,
    /// The generator refused to produce output.
    DrawFailed,
}

/// Position of a run in the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Nothing done yet.
    Start,
    /// A seed source has been chosen.
    SeedSelected,
    /// Seed material is in the generator.
    Reseeded,
    /// Output exists and may be delivered.
    Drawn,
    /// New seed state is on disk.
    Persisted,
    /// Run complete.
    Done,
    /// A fatal step failed; no output was produced.
    Failed(FailureKind),
}

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Seed material could not be loaded.
    #[error(transparent)]
    Load(SeedError),
    /// The generator refused to draw.
    #[error("generator draw failed: {0}")]
    Draw(#[source] GenError),
    /// The caller's delivery closure failed.
    #[error("failed to deliver output: {0}")]
    Deliver(#[source] io::Error),
    /// A step was called out of order.
    #[error("cannot {step} in state {from:?}")]
    InvalidTransition {
        /// State at the time of the call.
        from: LifecycleState,
        /// The step that was attempted.
        step: &'static str,
    },
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The seed source that was used.
    pub selection: SeedSelection,
    /// Bytes handed to the caller.
    pub bytes_delivered: usize,
    /// Seed bytes written back, or `None` if persistence failed.
    pub persisted: Option<usize>,
}

/// Drives one select → reseed → draw → persist run.
pub struct SeedLifecycle<G: Generator> {
    store: SeedStore,
    generator: G,
    state: LifecycleState,
    selection: Option<SeedSelection>,
}

impl<G: Generator> SeedLifecycle<G> {
    /// Creates a lifecycle in the `Start` state.
    pub fn new(store: SeedStore, generator: G) -> Self {
        Self {
            store,
            generator,
            state: LifecycleState::Start,
            selection: None,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Returns the generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    fn expect_state(&self, expected: LifecycleState, step: &'static str) -> Result<(), LifecycleError> {
        if self.state != expected {
            return Err(LifecycleError::InvalidTransition {
                from: self.state,
                step,
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: LifecycleState) {
        tracing::debug!(from = ?self.state, to = ?next, "Lifecycle transition");
        self.state = next;
    }

    /// `Start → SeedSelected`. Selection itself never fails.
    pub fn select(&mut self) -> Result<&SeedSelection, LifecycleError> {
        self.expect_state(LifecycleState::Start, "select a seed")?;
        let selection = self.store.select_seed();
        self.transition(LifecycleState::SeedSelected);
        Ok(self.selection.insert(selection))
    }

    /// `SeedSelected → Reseeded`, or `Failed(LoadFailed)`.
    pub fn reseed(&mut self) -> Result<u64, LifecycleError> {
        self.expect_state(LifecycleState::SeedSelected, "reseed")?;
        let Some(selection) = self.selection.as_ref() else {
            return Err(LifecycleError::InvalidTransition {
                from: self.state,
                step: "reseed",
            });
        };

        match self.store.load_seed(selection, &mut self.generator) {
            Ok(loaded) => {
                self.transition(LifecycleState::Reseeded);
                Ok(loaded)
            }
            Err(e) => {
                self.transition(LifecycleState::Failed(FailureKind::LoadFailed));
                Err(LifecycleError::Load(e))
            }
        }
    }

    /// `Reseeded → Drawn`, or `Failed(DrawFailed)`.
    pub fn draw(&mut self, count: usize) -> Result<OutputBuffer, LifecycleError> {
        self.expect_state(LifecycleState::Reseeded, "draw")?;

        match self.generator.draw(count) {
            Ok(buffer) => {
                self.transition(LifecycleState::Drawn);
                tracing::info!(bytes = buffer.len(), "Drew random bytes");
                Ok(buffer)
            }
            Err(e) => {
                self.transition(LifecycleState::Failed(FailureKind::DrawFailed));
                Err(LifecycleError::Draw(e))
            }
        }
    }

    /// `Drawn → Persisted`, or `Drawn → Done` when saving fails.
    ///
    /// A save failure is logged and reported as `Ok(None)`.
    pub fn persist(&mut self) -> Result<Option<usize>, LifecycleError> {
        self.expect_state(LifecycleState::Drawn, "persist")?;

        match self.store.persist_seed(&mut self.generator) {
            Ok(written) => {
                self.transition(LifecycleState::Persisted);
                Ok(Some(written))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Seed state not saved; next run starts from weaker seed");
                self.transition(LifecycleState::Done);
                Ok(None)
            }
        }
    }

    /// `Persisted → Done`. A no-op when already `Done`.
    pub fn finish(&mut self) -> Result<(), LifecycleError> {
        match self.state {
            LifecycleState::Persisted => {
                self.transition(LifecycleState::Done);
                Ok(())
            }
            LifecycleState::Done => Ok(()),
            from => Err(LifecycleError::InvalidTransition {
                from,
                step: "finish",
            }),
        }
    }

    /// Runs the whole lifecycle for `request`.
    ///
    /// `deliver` receives the drawn bytes before the seed is persisted.
    /// It is never called on a failed run. If delivery fails the run
    /// still persists, since the generator state has already advanced,
    /// and then reports the delivery error.
    pub fn run<F>(&mut self, request: &RequestArgs, deliver: F) -> Result<RunReport, LifecycleError>
    where
        F: FnOnce(&OutputBuffer) -> io::Result<()>,
    {
        let selection = self.select()?.clone();
        self.reseed()?;
        let output = self.draw(request.byte_count())?;

        let delivered = deliver(&output);
        let persisted = self.persist()?;
        self.finish()?;
        delivered.map_err(LifecycleError::Deliver)?;

        Ok(RunReport {
            selection,
            bytes_delivered: output.len(),
            persisted,
        })
    }
}
