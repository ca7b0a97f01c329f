//! Bounded-retry search over randomized layouts.
//!
//! Two policies decide what to do with each attempt's layout:
//!
//! - [`DensityPolicy`]: stop at the first layout whose plant count reaches
//!   `floor(width * height * density)`, giving up after a fixed cap.
//! - [`BestOfPolicy`]: run exactly N attempts and keep the largest layout.
//!
//! [`SearchRun`] wraps a policy with the externally visible attempt state
//! (counter and loading flag). The synchronous drivers here and the async
//! controller in `plantgrid-search` both step a `SearchRun`.

use std::ops::ControlFlow;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{check_density, ConfigError};
use crate::exits::{compute_layout, ExitSet};
use crate::grid::{Grid, GridDims};
use crate::layout::Layout;

/// Attempt state as seen by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStatus {
    /// Completed attempts, 1-indexed once the first attempt is in.
    pub attempts: usize,
    /// Attempt limit of the running policy.
    pub max_attempts: usize,
    /// True from the start of a run until its terminal attempt.
    pub loading: bool,
    /// Plant count of the most recent attempt.
    pub last_plants: Option<usize>,
    /// Plant count of the layout the policy currently favours.
    pub best_plants: Option<usize>,
}

/// What to keep from each attempt.
pub trait SearchPolicy {
    type Outcome;

    /// Upper bound on attempts for this run.
    fn max_attempts(&self) -> usize;

    /// Take one attempt's layout. `Break` ends the run early.
    fn observe(&mut self, layout: Layout) -> ControlFlow<()>;

    /// Plant count of the layout the policy would adopt right now.
    fn best_plants(&self) -> Option<usize>;

    fn finish(self, attempts: usize) -> Self::Outcome;
}

/// Result of a density-target run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensityOutcome {
    /// The adopted layout; `None` when the cap was exhausted.
    pub layout: Option<Layout>,
    pub attempts: usize,
    pub succeeded: bool,
}

/// Result of a best-of-N run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestOfOutcome {
    /// Largest layout seen; `None` only if zero attempts were requested.
    pub layout: Option<Layout>,
    pub attempts: usize,
}

/// Number of plants a density run must reach.
pub fn density_target(dims: GridDims, density: f64) -> usize {
    (dims.cell_count() as f64 * density).floor() as usize
}

/// First layout at or above a plant-count target wins.
#[derive(Debug, Clone)]
pub struct DensityPolicy {
    target: usize,
    attempt_cap: usize,
    adopted: Option<Layout>,
}

impl DensityPolicy {
    /// Rejects a density outside 0–1 (NaN included) and a zero attempt cap.
    pub fn new(dims: GridDims, density: f64, attempt_cap: usize) -> Result<Self, ConfigError> {
        check_density(density)?;
        if attempt_cap == 0 {
            return Err(ConfigError::ZeroAttemptCap);
        }
        Ok(Self {
            target: density_target(dims, density),
            attempt_cap,
            adopted: None,
        })
    }

    pub fn target(&self) -> usize {
        self.target
    }
}

impl SearchPolicy for DensityPolicy {
    type Outcome = DensityOutcome;

    fn max_attempts(&self) -> usize {
        self.attempt_cap
    }

    fn observe(&mut self, layout: Layout) -> ControlFlow<()> {
        if layout.plant_count() >= self.target {
            self.adopted = Some(layout);
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn best_plants(&self) -> Option<usize> {
        self.adopted.as_ref().map(Layout::plant_count)
    }

    fn finish(self, attempts: usize) -> DensityOutcome {
        let succeeded = self.adopted.is_some();
        if !succeeded {
            log::warn!(
                "no layout reached {} plants in {} attempts",
                self.target,
                attempts
            );
        }
        DensityOutcome {
            layout: self.adopted,
            attempts,
            succeeded,
        }
    }
}

/// Keep the largest of exactly N layouts. Ties keep the earlier one.
#[derive(Debug, Clone)]
pub struct BestOfPolicy {
    attempts: usize,
    best: Option<Layout>,
}

impl BestOfPolicy {
    pub fn new(attempts: usize) -> Self {
        Self {
            attempts,
            best: None,
        }
    }
}

impl SearchPolicy for BestOfPolicy {
    type Outcome = BestOfOutcome;

    fn max_attempts(&self) -> usize {
        self.attempts
    }

    fn observe(&mut self, layout: Layout) -> ControlFlow<()> {
        let better = self
            .best
            .as_ref()
            .map_or(true, |b| layout.plant_count() > b.plant_count());
        if better {
            self.best = Some(layout);
        }
        ControlFlow::Continue(())
    }

    fn best_plants(&self) -> Option<usize> {
        self.best.as_ref().map(Layout::plant_count)
    }

    fn finish(self, attempts: usize) -> BestOfOutcome {
        BestOfOutcome {
            layout: self.best,
            attempts,
        }
    }
}

/// A policy plus the attempt counter and loading flag of one run.
#[derive(Debug)]
pub struct SearchRun<P: SearchPolicy> {
    policy: P,
    status: SearchStatus,
    stopped: bool,
}

impl<P: SearchPolicy> SearchRun<P> {
    /// Start a run: zero attempts, loading.
    pub fn new(policy: P) -> Self {
        let status = SearchStatus {
            attempts: 0,
            max_attempts: policy.max_attempts(),
            loading: true,
            last_plants: None,
            best_plants: None,
        };
        Self {
            policy,
            status,
            stopped: false,
        }
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    /// No more attempts are wanted: the cap is reached or the policy stopped.
    pub fn is_done(&self) -> bool {
        self.stopped || self.status.attempts >= self.status.max_attempts
    }

    /// Feed one attempt's layout to the policy.
    pub fn record(&mut self, layout: Layout) -> &SearchStatus {
        self.status.attempts += 1;
        self.status.last_plants = Some(layout.plant_count());
        if self.policy.observe(layout).is_break() {
            self.stopped = true;
        }
        self.status.best_plants = self.policy.best_plants();
        &self.status
    }

    /// End the run, clearing the loading flag.
    pub fn finish(mut self) -> (P::Outcome, SearchStatus) {
        self.status.loading = false;
        let outcome = self.policy.finish(self.status.attempts);
        (outcome, self.status)
    }
}

/// Drive a policy to completion, one [`compute_layout`] per attempt.
///
/// `observer` sees the starting status, the status after every attempt
/// (loading still set) and the final status with loading cleared.
pub fn run_policy<P: SearchPolicy>(
    policy: P,
    grid: &Grid,
    exits: &ExitSet,
    rng: &mut impl Rng,
    mut observer: impl FnMut(&SearchStatus),
) -> P::Outcome {
    let mut run = SearchRun::new(policy);
    observer(run.status());
    while !run.is_done() {
        let layout = compute_layout(grid, exits, rng);
        log::debug!(
            "attempt {}: {} plants",
            run.status().attempts + 1,
            layout.plant_count()
        );
        observer(run.record(layout));
    }
    let (outcome, status) = run.finish();
    observer(&status);
    outcome
}

/// Attempt up to `attempt_cap` layouts, adopting the first that reaches
/// `floor(width * height * density)` plants.
pub fn run_density_search(
    grid: &Grid,
    exits: &ExitSet,
    density: f64,
    attempt_cap: usize,
    rng: &mut impl Rng,
    observer: impl FnMut(&SearchStatus),
) -> Result<DensityOutcome, ConfigError> {
    let policy = DensityPolicy::new(grid.dims(), density, attempt_cap)?;
    log::info!(
        "density search: target {} plants, cap {}, {} exits",
        policy.target(),
        attempt_cap,
        exits.len()
    );
    let outcome = run_policy(policy, grid, exits, rng, observer);
    log::info!(
        "density search finished after {} attempts (succeeded: {})",
        outcome.attempts,
        outcome.succeeded
    );
    Ok(outcome)
}

/// Run exactly `attempts` layouts and adopt the largest.
pub fn run_best_of_search(
    grid: &Grid,
    exits: &ExitSet,
    attempts: usize,
    rng: &mut impl Rng,
    observer: impl FnMut(&SearchStatus),
) -> BestOfOutcome {
    log::info!("best-of search: {} attempts, {} exits", attempts, exits.len());
    let outcome = run_policy(BestOfPolicy::new(attempts), grid, exits, rng, observer);
    log::info!(
        "best-of search finished: {} plants",
        outcome.layout.as_ref().map_or(0, Layout::plant_count)
    );
    outcome
}
