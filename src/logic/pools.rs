//! Pool stage: drawing fencers into balanced pools and building the round-robin bouts.

use crate::config::EngineConfig;
use crate::logic::ranking::registered_competitors;
use crate::logic::referees::pick_referee;
use crate::models::{
    random_id, Bout, Competition, CompetitionError, Competitor, Phase, Pool, Referee, Weapon,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Sizes of `pool_count` pools holding `total` fencers: the first `total % pool_count`
/// pools get one extra member.
pub fn pool_sizes(total: usize, pool_count: usize) -> Vec<usize> {
    if pool_count == 0 {
        return Vec::new();
    }
    let base = total / pool_count;
    let extra = total % pool_count;
    (0..pool_count)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}

/// Draw `competitors` into pools.
///
/// 1. Require at least 2 fencers.
/// 2. Clamp `pool_count` to `[1, total / 2]` so no pool has fewer than 2 members.
/// 3. Shuffle, then split with [`pool_sizes`].
/// 4. Every pair inside a pool gets one bout (i < j), each with a referee for `weapon`.
pub fn build_pools<R: Rng + ?Sized>(
    competitors: &[Competitor],
    pool_count: usize,
    weapon: Weapon,
    referees: &[Referee],
    config: &EngineConfig,
    rng: &mut R,
) -> Result<Vec<Pool>, CompetitionError> {
    let total = competitors.len();
    if total < 2 {
        return Err(CompetitionError::InsufficientParticipants {
            required: 2,
            available: total,
        });
    }
    let pool_count = pool_count.clamp(1, total / 2);

    let mut drawn: Vec<&Competitor> = competitors.iter().collect();
    drawn.shuffle(rng);

    let mut pools = Vec::with_capacity(pool_count);
    let mut remaining = drawn.as_slice();
    for (index, size) in pool_sizes(total, pool_count).into_iter().enumerate() {
        let (members, rest) = remaining.split_at(size);
        remaining = rest;

        let mut bouts = Vec::with_capacity(size * (size - 1) / 2);
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                let referee = pick_referee(referees, weapon, rng);
                bouts.push(Bout::new(
                    random_id(rng),
                    members[i].id,
                    members[j].id,
                    referee,
                    config.pool_touch_limit,
                ));
            }
        }

        pools.push(Pool {
            id: random_id(rng),
            name: format!("Pool {}", index + 1),
            bouts,
            referee: pick_referee(referees, weapon, rng),
            piste: format!("Piste {}", index + 1),
        });
    }
    Ok(pools)
}

/// (Re)generate the pools of `competition` from its registered fencers.
/// Any previous pools and elimination rounds are discarded; phase becomes Pools.
pub fn generate_pools<R: Rng + ?Sized>(
    competition: &mut Competition,
    roster: &[Competitor],
    referees: &[Referee],
    pool_count: usize,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<(), CompetitionError> {
    let registered = registered_competitors(competition, roster);
    let pools = build_pools(
        &registered,
        pool_count,
        competition.weapon,
        referees,
        config,
        rng,
    )?;
    log::info!(
        "Competition {}: drew {} fencers into {} pool(s)",
        competition.id,
        registered.len(),
        pools.len()
    );
    competition.pools = pools;
    competition.rounds.clear();
    competition.phase = Phase::Pools;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_differ_by_at_most_one() {
        assert_eq!(pool_sizes(10, 3), vec![4, 3, 3]);
        assert_eq!(pool_sizes(12, 3), vec![4, 4, 4]);
        assert_eq!(pool_sizes(7, 2), vec![4, 3]);
        assert_eq!(pool_sizes(5, 0), Vec::<usize>::new());
    }
}
