//! Competition, its phase, pools and elimination rounds.

use crate::models::bout::{Bout, BoutId};
use crate::models::competitor::{CompetitorId, RefereeId, Weapon};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Unique identifier for a competition.
pub type CompetitionId = Uuid;

/// Unique identifier for a pool.
pub type PoolId = Uuid;

/// Unique identifier for an elimination round.
pub type RoundId = Uuid;

/// Errors that can occur during competition operations.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum CompetitionError {
    #[error("Competition not found: {0}")]
    CompetitionNotFound(CompetitionId),
    #[error("Competitor not found: {0}")]
    CompetitorNotFound(CompetitorId),
    #[error("Referee not found: {0}")]
    RefereeNotFound(RefereeId),
    /// No pool or round with this id in the competition.
    #[error("Pool or round not found: {0}")]
    StageNotFound(Uuid),
    #[error("Bout not found: {0}")]
    BoutNotFound(BoutId),
    #[error("Competition has no elimination rounds")]
    NoRounds,
    #[error("Need at least {required} participants (have {available})")]
    InsufficientParticipants { required: usize, available: usize },
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Cannot {action} while the competition is in phase {phase:?}")]
    InvalidPhase { action: &'static str, phase: Phase },
    #[error("Score {score} is outside the touch limit {limit}")]
    ScoreOutOfRange { score: u32, limit: u32 },
    #[error("Bye bout {0} cannot be rescored")]
    ByeNotScorable(BoutId),
    /// A later round was already built from this round's winners.
    #[error("Round {0} is closed; later rounds were drawn from its results")]
    StageLocked(RoundId),
    #[error("An entry with id {0} already exists")]
    DuplicateId(Uuid),
}

impl CompetitionError {
    /// True for the "no such id" family, which callers may treat as a soft no-op.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CompetitionError::CompetitionNotFound(_)
                | CompetitionError::CompetitorNotFound(_)
                | CompetitionError::RefereeNotFound(_)
                | CompetitionError::StageNotFound(_)
                | CompetitionError::BoutNotFound(_)
        )
    }
}

/// Lifecycle of a competition. Transitions only happen through engine operations.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Fencers may register; nothing generated yet.
    #[default]
    Registration,
    /// Pools generated; bouts being scored.
    Pools,
    /// Elimination bracket in progress.
    Elimination,
    /// Final decided.
    Finished,
}

/// A round-robin group: every pair of its members meets exactly once.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    pub name: String,
    pub bouts: Vec<Bout>,
    #[serde(default)]
    pub referee: Option<RefereeId>,
    #[serde(default)]
    pub piste: String,
}

impl Pool {
    /// Members in first-appearance order across the bout list.
    pub fn competitors(&self) -> Vec<CompetitorId> {
        let mut seen = Vec::new();
        for bout in &self.bouts {
            for id in [bout.fencer_1, bout.fencer_2] {
                if !seen.contains(&id) {
                    seen.push(id);
                }
            }
        }
        seen
    }
}

/// One elimination round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    /// "Quarterfinals", "Semifinal", "Final", or "Round of N".
    pub name: String,
    pub bouts: Vec<Bout>,
}

impl Round {
    pub fn is_complete(&self) -> bool {
        self.bouts.iter().all(|b| b.completed)
    }
}

/// A competition: metadata, registrations, pools and the elimination bracket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Competition {
    pub id: CompetitionId,
    pub name: String,
    #[serde(default)]
    pub organizer: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub venue: String,
    pub weapon: Weapon,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub registered: BTreeSet<CompetitorId>,
    #[serde(default)]
    pub pools: Vec<Pool>,
    /// Ordered; round i+1 is built only from round i's winners.
    #[serde(default)]
    pub rounds: Vec<Round>,
    /// How many top-ranked competitors advance to the bracket.
    #[serde(default = "default_qualifier_cutoff")]
    pub qualifier_cutoff: usize,
}

fn default_qualifier_cutoff() -> usize {
    crate::config::EngineConfig::default().default_qualifier_cutoff
}

impl Competition {
    /// Create a new competition in Registration with nobody registered.
    pub fn new(
        name: impl Into<String>,
        organizer: impl Into<String>,
        date: NaiveDate,
        venue: impl Into<String>,
        weapon: Weapon,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            organizer: organizer.into(),
            date,
            venue: venue.into(),
            weapon,
            phase: Phase::Registration,
            registered: BTreeSet::new(),
            pools: Vec::new(),
            rounds: Vec::new(),
            qualifier_cutoff: default_qualifier_cutoff(),
        }
    }

    pub fn pool_bouts(&self) -> impl Iterator<Item = &Bout> {
        self.pools.iter().flat_map(|p| p.bouts.iter())
    }

    pub fn elimination_bouts(&self) -> impl Iterator<Item = &Bout> {
        self.rounds.iter().flat_map(|r| r.bouts.iter())
    }

    /// Registrations are only open before the bracket starts.
    pub fn accepts_registrations(&self) -> bool {
        matches!(self.phase, Phase::Registration | Phase::Pools)
    }

    /// Add or remove `competitor` from the registration set. Returns true if now registered.
    pub fn toggle_registration(&mut self, competitor: CompetitorId) -> Result<bool, CompetitionError> {
        if !self.accepts_registrations() {
            return Err(CompetitionError::InvalidPhase {
                action: "change registrations",
                phase: self.phase,
            });
        }
        if self.registered.remove(&competitor) {
            Ok(false)
        } else {
            self.registered.insert(competitor);
            Ok(true)
        }
    }

    /// Mutable bout lookup inside the pool or round with id `stage`.
    pub fn bout_mut(&mut self, stage: Uuid, bout: BoutId) -> Result<&mut Bout, CompetitionError> {
        let bouts = if let Some(pool) = self.pools.iter_mut().find(|p| p.id == stage) {
            &mut pool.bouts
        } else if let Some(round) = self.rounds.iter_mut().find(|r| r.id == stage) {
            &mut round.bouts
        } else {
            return Err(CompetitionError::StageNotFound(stage));
        };
        bouts
            .iter_mut()
            .find(|b| b.id == bout)
            .ok_or(CompetitionError::BoutNotFound(bout))
    }

    /// Winner of the final, once the competition is finished.
    pub fn champion(&self) -> Option<CompetitorId> {
        if self.phase != Phase::Finished {
            return None;
        }
        let last = self.rounds.last()?;
        match last.bouts.as_slice() {
            [final_bout] => Some(final_bout.advancing()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn competition() -> Competition {
        Competition::new(
            "Open",
            "Federation",
            NaiveDate::from_ymd_opt(2025, 1, 25).unwrap(),
            "Madrid",
            Weapon::Epee,
        )
    }

    #[test]
    fn registration_toggles_and_closes_in_elimination() {
        let mut c = competition();
        let id = Uuid::new_v4();
        assert_eq!(c.toggle_registration(id), Ok(true));
        assert_eq!(c.toggle_registration(id), Ok(false));
        assert!(c.registered.is_empty());
        c.phase = Phase::Elimination;
        assert!(matches!(
            c.toggle_registration(id),
            Err(CompetitionError::InvalidPhase { .. })
        ));
    }

    #[test]
    fn bout_lookup_reports_missing_stage_and_bout() {
        let mut c = competition();
        let stage = Uuid::new_v4();
        assert_eq!(
            c.bout_mut(stage, Uuid::new_v4()).unwrap_err(),
            CompetitionError::StageNotFound(stage)
        );
        c.pools.push(Pool {
            id: stage,
            name: "Pool 1".into(),
            bouts: Vec::new(),
            referee: None,
            piste: "Piste 1".into(),
        });
        let bout = Uuid::new_v4();
        assert_eq!(
            c.bout_mut(stage, bout).unwrap_err(),
            CompetitionError::BoutNotFound(bout)
        );
    }

    #[test]
    fn unknown_fields_are_ignored_on_load() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "name": "Legacy",
            "date": "2024-05-01",
            "weapon": "sabre",
            "some_future_field": [1, 2, 3]
        }"#;
        let c: Competition = serde_json::from_str(json).unwrap();
        assert_eq!(c.phase, Phase::Registration);
        assert_eq!(c.qualifier_cutoff, 16);
        assert!(c.pools.is_empty());
    }
}
