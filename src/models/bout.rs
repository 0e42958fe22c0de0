//! Bout (single match between two fencers), Side, and the win rules shared by pools and brackets.

use crate::models::competitor::{Competitor, CompetitorId, RefereeId};
use crate::models::CompetitionError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::{Builder, Uuid};

/// Unique identifier for a bout.
pub type BoutId = Uuid;

/// Build an id from the injected random source, so seeded runs are fully reproducible.
pub(crate) fn random_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    Builder::from_random_bytes(rng.gen()).into_uuid()
}

/// Which side of a bout.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

/// A single bout. `winner` is only set while `completed` is true.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bout {
    pub id: BoutId,
    pub fencer_1: CompetitorId,
    pub fencer_2: CompetitorId,
    /// None when no referee could be assigned (empty referee roster, or a bye).
    #[serde(default)]
    pub referee: Option<RefereeId>,
    #[serde(default)]
    pub touches_1: u32,
    #[serde(default)]
    pub touches_2: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub bye: bool,
    #[serde(default)]
    pub winner: Option<CompetitorId>,
    pub touch_limit: u32,
}

impl Bout {
    pub fn new(
        id: BoutId,
        fencer_1: CompetitorId,
        fencer_2: CompetitorId,
        referee: Option<RefereeId>,
        touch_limit: u32,
    ) -> Self {
        Self {
            id,
            fencer_1,
            fencer_2,
            referee,
            touches_1: 0,
            touches_2: 0,
            completed: false,
            bye: false,
            winner: None,
            touch_limit,
        }
    }

    /// An uncontested advancement: always completed, `fencer` wins `touch_limit`-0.
    pub fn bye(id: BoutId, fencer: CompetitorId, touch_limit: u32) -> Self {
        Self {
            id,
            fencer_1: fencer,
            fencer_2: Competitor::BYE_ID,
            referee: None,
            touches_1: touch_limit,
            touches_2: 0,
            completed: true,
            bye: true,
            winner: Some(fencer),
            touch_limit,
        }
    }

    pub fn involves(&self, competitor: CompetitorId) -> bool {
        self.fencer_1 == competitor || self.fencer_2 == competitor
    }

    pub fn fencer(&self, side: Side) -> CompetitorId {
        match side {
            Side::One => self.fencer_1,
            Side::Two => self.fencer_2,
        }
    }

    /// (given, received) touches for `competitor`, or None if they did not fence this bout.
    pub fn touches_for(&self, competitor: CompetitorId) -> Option<(u32, u32)> {
        if self.fencer_1 == competitor {
            Some((self.touches_1, self.touches_2))
        } else if self.fencer_2 == competitor {
            Some((self.touches_2, self.touches_1))
        } else {
            None
        }
    }

    /// Side with strictly more touches; None on equal touches.
    pub fn leader(&self) -> Option<Side> {
        use std::cmp::Ordering::*;
        match self.touches_1.cmp(&self.touches_2) {
            Greater => Some(Side::One),
            Less => Some(Side::Two),
            Equal => None,
        }
    }

    /// Side that goes through to the next round: the present fencer of a bye,
    /// otherwise the leader; equal touches default to side one.
    pub fn advancing_side(&self) -> Side {
        if self.bye {
            return Side::One;
        }
        self.leader().unwrap_or(Side::One)
    }

    pub fn advancing(&self) -> CompetitorId {
        self.fencer(self.advancing_side())
    }

    /// Set both scores; the winner is recomputed when completed, cleared otherwise.
    pub fn record_score(
        &mut self,
        touches_1: u32,
        touches_2: u32,
        completed: bool,
    ) -> Result<(), CompetitionError> {
        if self.bye {
            return Err(CompetitionError::ByeNotScorable(self.id));
        }
        for score in [touches_1, touches_2] {
            if score > self.touch_limit {
                return Err(CompetitionError::ScoreOutOfRange {
                    score,
                    limit: self.touch_limit,
                });
            }
        }
        self.touches_1 = touches_1;
        self.touches_2 = touches_2;
        self.completed = completed;
        self.winner = completed.then(|| self.advancing());
        Ok(())
    }
}
