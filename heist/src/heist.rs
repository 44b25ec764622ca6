//! # Heist Runner
//!
//! Builds the shared regions for one run, starts one OS thread per actor and
//! collects the outcome once every actor has finished.
//!
//! ## Key Concepts
//! - Actor threads are named (`master`, `ordinary-<id>`) and each runs inside
//!   its own tracing span.
//! - An actor that hits a `HeistError` aborts the process: the regions have no
//!   degraded mode and the remaining actors would otherwise block forever.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::actors::{MasterThief, OrdinaryThief};
use crate::config::{HeistConfig, RoomPlan};
use crate::error::{HeistError, HeistResult};
use crate::regions::{
    AssaultParty, CollectionSite, ConcentrationSite, CrossingLog, Museum, Regions, RoomSnapshot,
};
use crate::reporter::Reporter;
use crate::{log_error, thief_span};

/// Outcome of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct HeistSummary {
    pub seed: u64,
    pub canvases_collected: u32,
    pub successful_extractions: u32,
    pub displacements: Vec<u32>,
    /// Excursions taken by each ordinary thief
    pub excursions_per_thief: Vec<usize>,
    pub rooms: Vec<RoomSnapshot>,
    pub excursions: Vec<CrossingLog>,
}

pub struct Heist {
    config: HeistConfig,
    reporter: Arc<dyn Reporter>,
}

impl Heist {
    pub fn new(config: HeistConfig, reporter: Arc<dyn Reporter>) -> HeistResult<Self> {
        config.validate()?;
        Ok(Self { config, reporter })
    }

    /// Run the heist to completion on fresh regions.
    pub fn run(&self) -> HeistResult<HeistSummary> {
        let config = &self.config;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);

        let canvases: Vec<u32> = match &config.rooms {
            RoomPlan::Random { count, canvases } => (0..*count)
                .map(|_| rng.random_range(canvases.clone()))
                .collect(),
            RoomPlan::Fixed(canvases) => canvases.clone(),
        };
        let displacements: Vec<u32> = (0..config.ordinary_thieves)
            .map(|_| rng.random_range(config.displacement.clone()))
            .collect();

        let parties = config.assault_parties();
        let regions = Arc::new(Regions {
            museum: Museum::new(
                &canvases,
                config.base_success_probability,
                config.max_consecutive_misses,
                rng.random(),
            ),
            concentration: ConcentrationSite::new(config.ordinary_thieves),
            collection: CollectionSite::new(
                config.ordinary_thieves,
                parties,
                config.party_size,
                canvases.len(),
                Arc::clone(&self.reporter),
            ),
            parties: (0..parties)
                .map(|id| AssaultParty::new(id, config.party_size))
                .collect(),
        });

        tracing::info!(
            seed,
            ordinary_thieves = config.ordinary_thieves,
            parties,
            rooms = ?canvases,
            "starting the heist"
        );

        let thieves = displacements
            .iter()
            .enumerate()
            .map(|(id, &displacement)| {
                let mut thief = OrdinaryThief::new(id, displacement, Arc::clone(&regions));
                spawn_actor(format!("ordinary-{}", id), move || {
                    let span = thief_span!("ordinary", id, displacement);
                    let _guard = span.enter();
                    thief.run()
                })
            })
            .collect::<HeistResult<Vec<_>>>()?;

        let mut master = MasterThief::new(config.ordinary_thieves, canvases.len(), Arc::clone(&regions));
        let master = spawn_actor("master".to_string(), move || {
            let span = thief_span!("master", 0);
            let _guard = span.enter();
            master.run()
        })?;

        let canvases_collected = join_actor("master", master)?;
        let excursions_per_thief = thieves
            .into_iter()
            .enumerate()
            .map(|(id, handle)| join_actor(&format!("ordinary-{}", id), handle))
            .collect::<HeistResult<Vec<_>>>()?;

        Ok(HeistSummary {
            seed,
            canvases_collected,
            successful_extractions: regions.museum.successful_extractions()?,
            displacements,
            excursions_per_thief,
            rooms: regions.museum.snapshot()?,
            excursions: regions.excursions()?,
        })
    }
}

fn spawn_actor<T, F>(name: String, body: F) -> HeistResult<JoinHandle<T>>
where
    T: Send + 'static,
    F: FnOnce() -> HeistResult<T> + Send + 'static,
{
    let actor = name.clone();
    thread::Builder::new()
        .name(name)
        .spawn(move || match body() {
            Ok(value) => value,
            Err(err) => fatal(&actor, &err),
        })
        .map_err(|e| HeistError::ThreadSpawn(e.to_string()))
}

fn join_actor<T>(name: &str, handle: JoinHandle<T>) -> HeistResult<T> {
    handle
        .join()
        .map_err(|_| HeistError::ActorPanicked(name.to_string()))
}

/// Invariant violations end the run on the spot.
fn fatal(actor: &str, err: &HeistError) -> ! {
    log_error!(err, actor);
    eprintln!("fatal: {} stopped the heist: {}", actor, err);
    std::process::abort()
}
