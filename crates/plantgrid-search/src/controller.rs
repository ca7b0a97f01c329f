//! Async search controller.
//!
//! Runs one attempt at a time on tokio's blocking pool and pauses between
//! attempts, so a host event loop on the same runtime keeps redrawing and
//! can watch the attempt counter tick. Attempt state and the adopted layout
//! are published on `watch` channels; only the controller writes them.
//!
//! A second run triggered while one is in flight is rejected with
//! [`SearchError::AlreadyRunning`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use plantgrid_logic::config::{validate_config, SearchConfig};
use plantgrid_logic::exits::{compute_layout, ExitSet};
use plantgrid_logic::grid::Grid;
use plantgrid_logic::layout::Layout;
use plantgrid_logic::search::{
    BestOfOutcome, BestOfPolicy, DensityOutcome, DensityPolicy, SearchPolicy, SearchRun,
    SearchStatus,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;

use crate::error::{Result, SearchError};

/// Outcomes that may carry a layout to adopt.
trait Adopt {
    fn adopted(&self) -> Option<&Layout>;
}

impl Adopt for DensityOutcome {
    fn adopted(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }
}

impl Adopt for BestOfOutcome {
    fn adopted(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }
}

/// Clears the running flag when a run ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SearchController {
    config: SearchConfig,
    running: AtomicBool,
    status: watch::Sender<SearchStatus>,
    layout: watch::Sender<Option<Layout>>,
}

impl SearchController {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let errors = validate_config(&config);
        if !errors.is_empty() {
            return Err(SearchError::InvalidConfig(errors));
        }
        let (status, _) = watch::channel(SearchStatus::default());
        let (layout, _) = watch::channel(None);
        Ok(Self {
            config,
            running: AtomicBool::new(false),
            status,
            layout,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Latest attempt state.
    pub fn status(&self) -> SearchStatus {
        self.status.borrow().clone()
    }

    /// Receive every attempt-state change.
    pub fn subscribe(&self) -> watch::Receiver<SearchStatus> {
        self.status.subscribe()
    }

    /// The most recently adopted layout.
    pub fn layout(&self) -> Option<Layout> {
        self.layout.borrow().clone()
    }

    /// Receive layout adoptions.
    pub fn subscribe_layout(&self) -> watch::Receiver<Option<Layout>> {
        self.layout.subscribe()
    }

    /// One attempt off the calling thread, without touching controller state.
    pub async fn compute_once(&self, grid: &Grid, exits: &ExitSet) -> Result<Layout> {
        let grid = grid.clone();
        let exits = exits.clone();
        let seed = self.config.seed;
        let layout = tokio::task::spawn_blocking(move || {
            let mut rng = attempt_rng(seed);
            compute_layout(&grid, &exits, &mut rng)
        })
        .await?;
        Ok(layout)
    }

    /// Attempt until a layout reaches the configured density or the attempt
    /// cap runs out. On failure the previously adopted layout is kept.
    pub async fn run_density(&self, grid: &Grid, exits: &ExitSet) -> Result<DensityOutcome> {
        let policy = DensityPolicy::new(grid.dims(), self.config.density, self.config.attempt_cap)
            .map_err(|e| SearchError::InvalidConfig(vec![e]))?;
        log::info!(
            "density search started: target {} plants, cap {}",
            policy.target(),
            self.config.attempt_cap
        );
        self.run(policy, grid, exits).await
    }

    /// Run the configured number of attempts and adopt the largest layout.
    pub async fn run_best_of(&self, grid: &Grid, exits: &ExitSet) -> Result<BestOfOutcome> {
        log::info!(
            "best-of search started: {} attempts",
            self.config.best_of_attempts
        );
        self.run(BestOfPolicy::new(self.config.best_of_attempts), grid, exits)
            .await
    }

    async fn run<P>(&self, policy: P, grid: &Grid, exits: &ExitSet) -> Result<P::Outcome>
    where
        P: SearchPolicy,
        P::Outcome: Adopt,
    {
        let _guard = self.begin()?;

        // Snapshot the inputs: the host may edit its exits while we run.
        let grid = Arc::new(grid.clone());
        let exits = Arc::new(exits.clone());

        let mut run = SearchRun::new(policy);
        self.status.send_replace(run.status().clone());

        let driven = self.drive(&mut run, &grid, &exits).await;
        let (outcome, status) = run.finish();

        if driven.is_ok() {
            if let Some(layout) = outcome.adopted() {
                self.layout.send_replace(Some(layout.clone()));
            }
        }
        log::info!(
            "search finished after {} attempts, best {:?} plants",
            status.attempts,
            status.best_plants
        );
        self.status.send_replace(status);

        driven.map(|()| outcome)
    }

    async fn drive<P: SearchPolicy>(
        &self,
        run: &mut SearchRun<P>,
        grid: &Arc<Grid>,
        exits: &Arc<ExitSet>,
    ) -> Result<()> {
        let mut seeds = self.config.seed.map(StdRng::seed_from_u64);

        while !run.is_done() {
            let attempt_seed = seeds.as_mut().map(|s| s.gen::<u64>());
            let grid = Arc::clone(grid);
            let exits = Arc::clone(exits);
            let layout = tokio::task::spawn_blocking(move || {
                let mut rng = attempt_rng(attempt_seed);
                compute_layout(&grid, &exits, &mut rng)
            })
            .await?;

            let status = run.record(layout).clone();
            log::debug!(
                "attempt {}/{}: {:?} plants",
                status.attempts,
                status.max_attempts,
                status.last_plants
            );
            self.status.send_replace(status);

            if !run.is_done() {
                self.pause().await;
            }
        }
        Ok(())
    }

    fn begin(&self) -> Result<RunGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SearchError::AlreadyRunning)?;
        Ok(RunGuard(&self.running))
    }

    /// Hand control back to the runtime between attempts.
    async fn pause(&self) {
        let pause = self.config.yield_pause();
        if pause.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(pause).await;
        }
    }
}

fn attempt_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(config: SearchConfig) -> SearchController {
        SearchController::new(config).unwrap()
    }

    fn seeded(seed: u64) -> SearchConfig {
        SearchConfig {
            seed: Some(seed),
            yield_pause_ms: 0,
            ..Default::default()
        }
    }

    #[test]
    fn invalid_config_rejected() {
        let config = SearchConfig {
            attempt_cap: 0,
            ..Default::default()
        };
        assert!(matches!(
            SearchController::new(config),
            Err(SearchError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn density_zero_adopts_first_attempt() {
        let grid = Grid::new(6, 6).unwrap();
        let exits = ExitSet::new(&grid, [0]).unwrap();
        let ctl = controller(SearchConfig {
            density: 0.0,
            ..seeded(1)
        });
        let outcome = ctl.run_density(&grid, &exits).await.unwrap();
        assert!(outcome.succeeded);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(ctl.layout(), outcome.layout);
        let status = ctl.status();
        assert_eq!(status.attempts, 1);
        assert!(!status.loading);
        assert!(!ctl.is_running());
    }

    #[tokio::test]
    async fn failed_density_keeps_previous_layout() {
        let grid = Grid::new(4, 4).unwrap();
        let exits = ExitSet::new(&grid, [0]).unwrap();
        let ctl = controller(SearchConfig {
            density: 1.0,
            attempt_cap: 5,
            best_of_attempts: 5,
            ..seeded(2)
        });
        let best = ctl.run_best_of(&grid, &exits).await.unwrap();
        let adopted = ctl.layout();
        assert_eq!(adopted, best.layout);

        let outcome = ctl.run_density(&grid, &exits).await.unwrap();
        assert!(!outcome.succeeded);
        assert_eq!(outcome.attempts, 5);
        assert_eq!(ctl.layout(), adopted);
        assert!(!ctl.status().loading);
    }

    #[tokio::test]
    async fn concurrent_trigger_rejected() {
        let grid = Grid::new(8, 8).unwrap();
        let exits = ExitSet::new(&grid, [0, 63]).unwrap();
        let ctl = controller(SearchConfig {
            best_of_attempts: 10,
            yield_pause_ms: 1,
            ..seeded(3)
        });
        let (first, second) = tokio::join!(
            ctl.run_best_of(&grid, &exits),
            ctl.run_best_of(&grid, &exits)
        );
        assert_eq!(first.unwrap().attempts, 10);
        assert!(matches!(second, Err(SearchError::AlreadyRunning)));

        // The guard is released once the first run completes.
        assert!(ctl.run_best_of(&grid, &exits).await.is_ok());
    }

    #[tokio::test]
    async fn subscriber_sees_counter_and_single_completion() {
        let ctl = Arc::new(controller(SearchConfig {
            best_of_attempts: 20,
            yield_pause_ms: 1,
            ..seeded(4)
        }));
        let mut rx = ctl.subscribe();

        let runner = Arc::clone(&ctl);
        let task = tokio::spawn(async move {
            let grid = Grid::new(6, 6).unwrap();
            let exits = ExitSet::new(&grid, [0]).unwrap();
            runner.run_best_of(&grid, &exits).await
        });

        let mut seen = Vec::new();
        loop {
            rx.changed().await.unwrap();
            let status = rx.borrow_and_update().clone();
            let done = !status.loading && status.attempts == 20;
            seen.push(status);
            if done {
                break;
            }
        }
        let outcome = task.await.unwrap().unwrap();

        assert_eq!(outcome.attempts, 20);
        assert!(seen
            .iter()
            .any(|s| s.loading && s.attempts > 0 && s.attempts < 20));
        assert!(seen.windows(2).all(|w| w[0].attempts <= w[1].attempts));
        assert_eq!(seen.iter().filter(|s| !s.loading).count(), 1);
        assert_eq!(ctl.layout(), outcome.layout);
    }

    #[tokio::test]
    async fn seeded_runs_are_reproducible() {
        let grid = Grid::new(7, 5).unwrap();
        let exits = ExitSet::new(&grid, [0, 34]).unwrap();
        let a = controller(SearchConfig {
            best_of_attempts: 15,
            ..seeded(9)
        });
        let b = controller(SearchConfig {
            best_of_attempts: 15,
            ..seeded(9)
        });
        let first = a.run_best_of(&grid, &exits).await.unwrap();
        let second = b.run_best_of(&grid, &exits).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn compute_once_leaves_state_alone() {
        let grid = Grid::new(5, 5).unwrap();
        let ctl = controller(seeded(5));
        let layout = ctl.compute_once(&grid, &ExitSet::none()).await.unwrap();
        assert_eq!(layout.plant_count(), 25);
        assert_eq!(ctl.status(), SearchStatus::default());
        assert!(ctl.layout().is_none());
    }
}
