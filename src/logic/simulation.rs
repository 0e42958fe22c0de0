//! Random scoring for demos and tests. Outcomes are random; nothing user-facing relies on them.

use crate::config::EngineConfig;
use crate::logic::bracket::advance_round;
use crate::models::{Bout, Competition, CompetitionError, Phase, Referee};
use rand::Rng;

/// One side reaches the touch limit, the other scores strictly less.
fn score_randomly<R: Rng + ?Sized>(bout: &mut Bout, rng: &mut R) -> Result<(), CompetitionError> {
    let limit = bout.touch_limit;
    let loser = rng.gen_range(0..limit.max(1));
    let (t1, t2) = if rng.gen_bool(0.5) {
        (limit, loser)
    } else {
        (loser, limit)
    };
    bout.record_score(t1, t2, true)
}

/// Score every unfinished pool bout.
pub fn simulate_pools<R: Rng + ?Sized>(
    competition: &mut Competition,
    rng: &mut R,
) -> Result<(), CompetitionError> {
    if competition.phase != Phase::Pools {
        return Err(CompetitionError::InvalidPhase {
            action: "simulate pool bouts",
            phase: competition.phase,
        });
    }
    for bout in competition.pools.iter_mut().flat_map(|p| p.bouts.iter_mut()) {
        if !bout.completed {
            score_randomly(bout, rng)?;
        }
    }
    Ok(())
}

/// Score every unfinished bout of the current elimination round.
pub fn simulate_round<R: Rng + ?Sized>(
    competition: &mut Competition,
    rng: &mut R,
) -> Result<(), CompetitionError> {
    if competition.phase != Phase::Elimination {
        return Err(CompetitionError::InvalidPhase {
            action: "simulate the current round",
            phase: competition.phase,
        });
    }
    let round = competition
        .rounds
        .last_mut()
        .ok_or(CompetitionError::NoRounds)?;
    for bout in round.bouts.iter_mut().filter(|b| !b.completed) {
        score_randomly(bout, rng)?;
    }
    Ok(())
}

/// Score and advance until the competition is Finished.
pub fn simulate_all<R: Rng + ?Sized>(
    competition: &mut Competition,
    referees: &[Referee],
    config: &EngineConfig,
    rng: &mut R,
) -> Result<(), CompetitionError> {
    while competition.phase == Phase::Elimination {
        simulate_round(competition, rng)?;
        advance_round(competition, referees, config, rng)?;
    }
    if competition.phase != Phase::Finished {
        return Err(CompetitionError::InvalidPhase {
            action: "simulate the bracket",
            phase: competition.phase,
        });
    }
    Ok(())
}
