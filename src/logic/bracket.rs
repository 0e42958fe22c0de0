//! Elimination bracket: seeding from the pool ranking, byes, advancing rounds, scoring bouts.

use crate::config::EngineConfig;
use crate::logic::ranking::competition_ranking;
use crate::logic::referees::pick_referee;
use crate::logic::seeding::seed_order;
use crate::models::{
    random_id, Bout, BoutId, Competition, CompetitionError, Competitor, CompetitorId, Phase,
    Referee, Round,
};
use rand::Rng;
use uuid::Uuid;

/// Conventional name of a round with `slots` fencers (two per bout).
pub fn round_name(slots: usize) -> String {
    match slots {
        8 => "Quarterfinals".to_string(),
        4 => "Semifinal".to_string(),
        2 => "Final".to_string(),
        n => format!("Round of {n}"),
    }
}

/// Build the first elimination round from the pool ranking.
///
/// Takes the top `qualifier_count` ranked fencers (fewer if not enough are ranked), sizes
/// the bracket with [`EngineConfig::bracket_size`], and walks [`seed_order`] in pairs: seed
/// `s` is the fencer ranked `s`. Two fencers make a real bout; a lone fencer gets a bye;
/// two empty slots produce nothing. Replaces any earlier bracket; phase becomes Elimination.
///
/// A bracket at most half full loses the seeding guarantee: dropping empty pairs lets
/// seeds 1 and 2 meet before the final (3 qualifiers in 8 slots meet in the semifinal).
pub fn generate_bracket<R: Rng + ?Sized>(
    competition: &mut Competition,
    roster: &[Competitor],
    referees: &[Referee],
    qualifier_count: usize,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<(), CompetitionError> {
    if qualifier_count <= 1 {
        return Err(CompetitionError::InvalidConfiguration(format!(
            "qualifier count must be at least 2 (got {qualifier_count})"
        )));
    }
    if competition.pools.is_empty() {
        return Err(CompetitionError::InvalidPhase {
            action: "generate the bracket",
            phase: competition.phase,
        });
    }
    config.validate()?;

    let ranking = competition_ranking(competition, roster);
    let qualified: Vec<CompetitorId> = ranking
        .iter()
        .take(qualifier_count)
        .map(|c| c.competitor_id)
        .collect();
    if qualified.len() < 2 {
        return Err(CompetitionError::InsufficientParticipants {
            required: 2,
            available: qualified.len(),
        });
    }

    let size = config.bracket_size(qualified.len());
    let limit = config.elimination_touch_limit;
    let seeded = |seed: usize| qualified.get(seed - 1).copied();

    let mut bouts = Vec::with_capacity(size / 2);
    for pair in seed_order(size).chunks_exact(2) {
        match (seeded(pair[0]), seeded(pair[1])) {
            (Some(a), Some(b)) => {
                let referee = pick_referee(referees, competition.weapon, rng);
                bouts.push(Bout::new(random_id(rng), a, b, referee, limit));
            }
            (Some(a), None) | (None, Some(a)) => bouts.push(Bout::bye(random_id(rng), a, limit)),
            (None, None) => {}
        }
    }

    log::info!(
        "Competition {}: bracket of {} for {} qualifier(s), {} bye(s)",
        competition.id,
        size,
        qualified.len(),
        bouts.iter().filter(|b| b.bye).count()
    );
    competition.qualifier_cutoff = qualifier_count;
    competition.rounds = vec![Round {
        id: random_id(rng),
        name: round_name(size),
        bouts,
    }];
    competition.phase = Phase::Elimination;
    Ok(())
}

/// Pair the advancing fencers of the last round into the next one.
///
/// Unfinished bouts are accepted: their advancing side is read from the current touches
/// (equal touches favour side one). Winners meet in order (1 v 2, 3 v 4, ...) and an odd one
/// out gets a bye. With a single winner left the competition is Finished and no round is
/// added.
pub fn advance_round<R: Rng + ?Sized>(
    competition: &mut Competition,
    referees: &[Referee],
    config: &EngineConfig,
    rng: &mut R,
) -> Result<(), CompetitionError> {
    if competition.phase != Phase::Elimination {
        return Err(CompetitionError::InvalidPhase {
            action: "advance the bracket",
            phase: competition.phase,
        });
    }
    let last = competition.rounds.last().ok_or(CompetitionError::NoRounds)?;
    let winners: Vec<CompetitorId> = last
        .bouts
        .iter()
        .map(Bout::advancing)
        .filter(|id| *id != Competitor::BYE_ID)
        .collect();

    if winners.len() <= 1 {
        competition.phase = Phase::Finished;
        log::info!("Competition {} finished", competition.id);
        return Ok(());
    }

    let limit = config.elimination_touch_limit;
    let bouts: Vec<Bout> = winners
        .chunks(2)
        .map(|pair| match *pair {
            [a, b] => {
                let referee = pick_referee(referees, competition.weapon, rng);
                Bout::new(random_id(rng), a, b, referee, limit)
            }
            _ => Bout::bye(random_id(rng), pair[0], limit),
        })
        .collect();

    let name = round_name(bouts.len() * 2);
    log::debug!("Competition {}: advancing to {}", competition.id, name);
    competition.rounds.push(Round {
        id: random_id(rng),
        name,
        bouts,
    });
    Ok(())
}

/// Set the score of one bout in the pool or round `stage`. Re-applying the same score
/// leaves the competition unchanged.
/// Only the latest elimination round takes scores; earlier rounds are locked.
pub fn update_bout_score(
    competition: &mut Competition,
    stage: Uuid,
    bout: BoutId,
    touches_1: u32,
    touches_2: u32,
    completed: bool,
) -> Result<(), CompetitionError> {
    let latest = competition.rounds.last().map(|r| r.id);
    if latest != Some(stage) && competition.rounds.iter().any(|r| r.id == stage) {
        return Err(CompetitionError::StageLocked(stage));
    }
    competition
        .bout_mut(stage, bout)?
        .record_score(touches_1, touches_2, completed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_names_follow_slot_count() {
        assert_eq!(round_name(2), "Final");
        assert_eq!(round_name(4), "Semifinal");
        assert_eq!(round_name(8), "Quarterfinals");
        assert_eq!(round_name(16), "Round of 16");
        assert_eq!(round_name(64), "Round of 64");
    }
}
