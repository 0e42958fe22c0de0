//! Registry: the single owner of application state.
//!
//! State lives in an `Arc<Snapshot>`. Every mutating call clones the snapshot, applies the
//! change to the clone and, only on success, swaps the new snapshot in and hands it to the
//! sink. Readers holding an older `Arc` keep a consistent view; a failed operation leaves
//! nothing behind.

use crate::config::EngineConfig;
use crate::logic;
use crate::models::{
    BoutId, Classification, Competition, CompetitionError, CompetitionId, Competitor,
    CompetitorId, PoolId, Referee, RefereeId,
};
use crate::persistence::{JsonStore, PersistenceError, Snapshot, SnapshotSink};
use crate::seed;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use uuid::Uuid;

pub struct Registry<R = StdRng> {
    state: Arc<Snapshot>,
    config: EngineConfig,
    rng: R,
    sink: Option<Box<dyn SnapshotSink>>,
}

impl Registry<StdRng> {
    /// Empty registry with an entropy-seeded random source and no sink.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rng(Snapshot::default(), config, StdRng::from_entropy())
    }
}

impl<R: Rng> Registry<R> {
    pub fn with_rng(snapshot: Snapshot, config: EngineConfig, rng: R) -> Self {
        Self {
            state: Arc::new(snapshot),
            config,
            rng,
            sink: None,
        }
    }

    /// Load from `store`, top the roster up with seed data and save it back.
    /// A missing file starts from an empty snapshot. A file that cannot be parsed is first
    /// moved aside with [`JsonStore::set_aside`]; if even that fails, or the file cannot be
    /// read at all, the error is returned and nothing is written.
    pub fn open(store: &JsonStore, config: EngineConfig, rng: R) -> Result<Self, PersistenceError> {
        let mut snapshot = match store.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                log::info!("No data at {}, starting fresh", store.path().display());
                Snapshot::default()
            }
            Err(PersistenceError::Json(e)) => {
                let backup = store.set_aside()?;
                log::error!(
                    "Failed to parse {}: {}; kept the old file as {}",
                    store.path().display(),
                    e,
                    backup.display()
                );
                Snapshot::default()
            }
            Err(e) => return Err(e),
        };
        let seeded = seed::ensure_minimum_roster(&mut snapshot, &config);
        let registry = Self::with_rng(snapshot, config, rng);
        if seeded {
            store.persist(registry.snapshot());
        }
        Ok(registry)
    }

    /// Every committed snapshot is handed to `sink`.
    pub fn with_sink(mut self, sink: impl SnapshotSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.state)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply `f` to a copy of the state; commit and persist only if it succeeds.
    fn mutate<T>(
        &mut self,
        f: impl FnOnce(&mut Snapshot, &EngineConfig, &mut R) -> Result<T, CompetitionError>,
    ) -> Result<T, CompetitionError> {
        let mut next = Snapshot::clone(&self.state);
        let out = f(&mut next, &self.config, &mut self.rng)?;
        self.state = Arc::new(next);
        if let Some(sink) = &self.sink {
            sink.persist(self.snapshot());
        }
        Ok(out)
    }

    /// [`Self::mutate`] scoped to one competition, with read access to both rosters.
    fn mutate_competition<T>(
        &mut self,
        id: CompetitionId,
        f: impl FnOnce(
            &mut Competition,
            &[Competitor],
            &[Referee],
            &EngineConfig,
            &mut R,
        ) -> Result<T, CompetitionError>,
    ) -> Result<T, CompetitionError> {
        self.mutate(|snapshot, config, rng| {
            let Snapshot {
                competitors,
                referees,
                competitions,
            } = snapshot;
            let competition = competitions
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or(CompetitionError::CompetitionNotFound(id))?;
            f(competition, competitors.as_slice(), referees.as_slice(), config, rng)
        })
    }

    // Roster

    pub fn list_competitors(&self) -> &[Competitor] {
        &self.state.competitors
    }

    pub fn list_referees(&self) -> &[Referee] {
        &self.state.referees
    }

    pub fn competitor(&self, id: CompetitorId) -> Option<&Competitor> {
        self.state.competitors.iter().find(|c| c.id == id)
    }

    pub fn referee(&self, id: RefereeId) -> Option<&Referee> {
        self.state.referees.iter().find(|r| r.id == id)
    }

    pub fn add_competitor(&mut self, competitor: Competitor) -> Result<(), CompetitionError> {
        self.mutate(|s, _, _| {
            if competitor.id == Competitor::BYE_ID || s.competitors.iter().any(|c| c.id == competitor.id) {
                return Err(CompetitionError::DuplicateId(competitor.id));
            }
            s.competitors.push(competitor);
            Ok(())
        })
    }

    /// Replace the stored record with the same id.
    pub fn update_competitor(&mut self, competitor: Competitor) -> Result<(), CompetitionError> {
        self.mutate(|s, _, _| {
            let slot = s
                .competitors
                .iter_mut()
                .find(|c| c.id == competitor.id)
                .ok_or(CompetitionError::CompetitorNotFound(competitor.id))?;
            *slot = competitor;
            Ok(())
        })
    }

    /// Remove a fencer and withdraw them from every competition's registrations.
    /// Bouts already fenced keep their history.
    pub fn remove_competitor(&mut self, id: CompetitorId) -> Result<(), CompetitionError> {
        self.mutate(|s, _, _| {
            let before = s.competitors.len();
            s.competitors.retain(|c| c.id != id);
            if s.competitors.len() == before {
                return Err(CompetitionError::CompetitorNotFound(id));
            }
            for comp in &mut s.competitions {
                comp.registered.remove(&id);
            }
            Ok(())
        })
    }

    pub fn add_referee(&mut self, referee: Referee) -> Result<(), CompetitionError> {
        self.mutate(|s, _, _| {
            if s.referees.iter().any(|r| r.id == referee.id) {
                return Err(CompetitionError::DuplicateId(referee.id));
            }
            s.referees.push(referee);
            Ok(())
        })
    }

    pub fn remove_referee(&mut self, id: RefereeId) -> Result<(), CompetitionError> {
        self.mutate(|s, _, _| {
            let before = s.referees.len();
            s.referees.retain(|r| r.id != id);
            if s.referees.len() == before {
                return Err(CompetitionError::RefereeNotFound(id));
            }
            Ok(())
        })
    }

    // Competitions

    pub fn competitions(&self) -> &[Competition] {
        &self.state.competitions
    }

    pub fn competition(&self, id: CompetitionId) -> Result<&Competition, CompetitionError> {
        self.state
            .competitions
            .iter()
            .find(|c| c.id == id)
            .ok_or(CompetitionError::CompetitionNotFound(id))
    }

    pub fn add_competition(&mut self, competition: Competition) -> Result<(), CompetitionError> {
        self.mutate(|s, _, _| {
            if s.competitions.iter().any(|c| c.id == competition.id) {
                return Err(CompetitionError::DuplicateId(competition.id));
            }
            s.competitions.push(competition);
            Ok(())
        })
    }

    /// Swap in an externally edited competition record.
    pub fn replace_competition(
        &mut self,
        id: CompetitionId,
        competition: Competition,
    ) -> Result<(), CompetitionError> {
        self.mutate_competition(id, |comp, _, _, _, _| {
            *comp = Competition { id, ..competition };
            Ok(())
        })
    }

    pub fn remove_competition(&mut self, id: CompetitionId) -> Result<(), CompetitionError> {
        self.mutate(|s, _, _| {
            let before = s.competitions.len();
            s.competitions.retain(|c| c.id != id);
            if s.competitions.len() == before {
                return Err(CompetitionError::CompetitionNotFound(id));
            }
            Ok(())
        })
    }

    /// Returns true if the fencer is registered afterwards.
    pub fn toggle_registration(
        &mut self,
        id: CompetitionId,
        competitor: CompetitorId,
    ) -> Result<bool, CompetitionError> {
        self.mutate_competition(id, |comp, roster, _, _, _| {
            if !roster.iter().any(|c| c.id == competitor) {
                return Err(CompetitionError::CompetitorNotFound(competitor));
            }
            comp.toggle_registration(competitor)
        })
    }

    /// Register the whole roster.
    pub fn register_all(&mut self, id: CompetitionId) -> Result<(), CompetitionError> {
        self.mutate_competition(id, |comp, roster, _, _, _| {
            if !comp.accepts_registrations() {
                return Err(CompetitionError::InvalidPhase {
                    action: "change registrations",
                    phase: comp.phase,
                });
            }
            comp.registered = roster.iter().map(|c| c.id).collect();
            Ok(())
        })
    }

    pub fn set_qualifier_cutoff(
        &mut self,
        id: CompetitionId,
        cutoff: usize,
    ) -> Result<(), CompetitionError> {
        if cutoff <= 1 {
            return Err(CompetitionError::InvalidConfiguration(format!(
                "qualifier cutoff must be at least 2 (got {cutoff})"
            )));
        }
        self.mutate_competition(id, |comp, _, _, _, _| {
            comp.qualifier_cutoff = cutoff;
            Ok(())
        })
    }

    // Engine

    pub fn generate_pools(
        &mut self,
        id: CompetitionId,
        pool_count: usize,
    ) -> Result<(), CompetitionError> {
        self.mutate_competition(id, |comp, roster, referees, config, rng| {
            logic::generate_pools(comp, roster, referees, pool_count, config, rng)
        })
    }

    /// Pool-stage standings of the registered fencers.
    pub fn ranking(&self, id: CompetitionId) -> Result<Vec<Classification>, CompetitionError> {
        let comp = self.competition(id)?;
        Ok(logic::competition_ranking(comp, &self.state.competitors))
    }

    pub fn pool_ranking(
        &self,
        id: CompetitionId,
        pool: PoolId,
    ) -> Result<Vec<Classification>, CompetitionError> {
        let comp = self.competition(id)?;
        let pool = comp
            .pools
            .iter()
            .find(|p| p.id == pool)
            .ok_or(CompetitionError::StageNotFound(pool))?;
        Ok(logic::pool_ranking(pool, &self.state.competitors))
    }

    pub fn global_ranking(&self) -> Vec<Classification> {
        logic::global_ranking(&self.state.competitions, &self.state.competitors)
    }

    /// `qualifier_count` of None uses the competition's stored cutoff.
    pub fn generate_bracket(
        &mut self,
        id: CompetitionId,
        qualifier_count: Option<usize>,
    ) -> Result<(), CompetitionError> {
        self.mutate_competition(id, |comp, roster, referees, config, rng| {
            let count = qualifier_count.unwrap_or(comp.qualifier_cutoff);
            logic::generate_bracket(comp, roster, referees, count, config, rng)
        })
    }

    pub fn advance_round(&mut self, id: CompetitionId) -> Result<(), CompetitionError> {
        self.mutate_competition(id, |comp, _, referees, config, rng| {
            logic::advance_round(comp, referees, config, rng)
        })
    }

    /// Score a bout in the pool or round `stage`.
    pub fn update_bout_score(
        &mut self,
        id: CompetitionId,
        stage: Uuid,
        bout: BoutId,
        touches_1: u32,
        touches_2: u32,
        completed: bool,
    ) -> Result<(), CompetitionError> {
        self.mutate_competition(id, |comp, _, _, _, _| {
            logic::update_bout_score(comp, stage, bout, touches_1, touches_2, completed)
        })
    }

    pub fn simulate_pools(&mut self, id: CompetitionId) -> Result<(), CompetitionError> {
        self.mutate_competition(id, |comp, _, _, _, rng| logic::simulate_pools(comp, rng))
    }

    pub fn simulate_round(&mut self, id: CompetitionId) -> Result<(), CompetitionError> {
        self.mutate_competition(id, |comp, _, _, _, rng| logic::simulate_round(comp, rng))
    }

    pub fn simulate_all(&mut self, id: CompetitionId) -> Result<(), CompetitionError> {
        self.mutate_competition(id, |comp, _, referees, config, rng| {
            logic::simulate_all(comp, referees, config, rng)
        })
    }
}
