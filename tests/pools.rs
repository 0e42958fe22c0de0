//! Integration tests for the pool stage: drawing pools and their round-robin bouts.

mod common;

use common::{competition_for, fencers, referees, rng};
use fencing_tournament_web::{
    build_pools, generate_bracket, generate_pools, CompetitionError, EngineConfig, Phase, Referee,
    Weapon,
};
use std::collections::HashSet;

#[test]
fn ten_fencers_into_three_pools() {
    let roster = fencers(10);
    let pools = build_pools(&roster, 3, Weapon::Epee, &referees(), &EngineConfig::default(), &mut rng(1)).unwrap();

    let mut sizes: Vec<usize> = pools.iter().map(|p| p.competitors().len()).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![3, 3, 4]);

    let mut bout_counts: Vec<usize> = pools.iter().map(|p| p.bouts.len()).collect();
    bout_counts.sort_unstable();
    assert_eq!(bout_counts, vec![3, 3, 6]);

    // Every fencer drawn exactly once.
    let all: Vec<_> = pools.iter().flat_map(|p| p.competitors()).collect();
    let unique: HashSet<_> = all.iter().copied().collect();
    assert_eq!(all.len(), 10);
    assert_eq!(unique.len(), 10);
}

#[test]
fn every_pair_meets_exactly_once() {
    let roster = fencers(7);
    let pools = build_pools(&roster, 1, Weapon::Epee, &referees(), &EngineConfig::default(), &mut rng(2)).unwrap();
    assert_eq!(pools.len(), 1);
    let pool = &pools[0];
    assert_eq!(pool.bouts.len(), 21);
    let pairs: HashSet<_> = pool
        .bouts
        .iter()
        .map(|b| {
            let (lo, hi) = if b.fencer_1 < b.fencer_2 { (b.fencer_1, b.fencer_2) } else { (b.fencer_2, b.fencer_1) };
            assert_ne!(lo, hi);
            (lo, hi)
        })
        .collect();
    assert_eq!(pairs.len(), 21);
    assert!(pool.bouts.iter().all(|b| b.touch_limit == 5 && !b.completed && !b.bye));
    assert_eq!(pool.name, "Pool 1");
    assert_eq!(pool.piste, "Piste 1");
}

#[test]
fn pool_count_is_clamped() {
    let roster = fencers(5);
    let config = EngineConfig::default();
    let too_many = build_pools(&roster, 10, Weapon::Epee, &referees(), &config, &mut rng(3)).unwrap();
    assert_eq!(too_many.len(), 2);
    let zero = build_pools(&roster, 0, Weapon::Epee, &referees(), &config, &mut rng(3)).unwrap();
    assert_eq!(zero.len(), 1);
    assert!(too_many.iter().all(|p| p.competitors().len() >= 2));
}

#[test]
fn fewer_than_two_fencers_is_insufficient() {
    let roster = fencers(1);
    let err = build_pools(&roster, 1, Weapon::Epee, &referees(), &EngineConfig::default(), &mut rng(4)).unwrap_err();
    assert_eq!(
        err,
        CompetitionError::InsufficientParticipants { required: 2, available: 1 }
    );
}

#[test]
fn specialist_referees_are_assigned() {
    let roster = fencers(6);
    let refs = referees();
    let epee_ref = refs[0].id;
    let pools = build_pools(&roster, 2, Weapon::Epee, &refs, &EngineConfig::default(), &mut rng(5)).unwrap();
    for pool in &pools {
        assert_eq!(pool.referee, Some(epee_ref));
        assert!(pool.bouts.iter().all(|b| b.referee == Some(epee_ref)));
    }
}

#[test]
fn no_referees_leaves_bouts_unassigned() {
    let roster = fencers(4);
    let none: Vec<Referee> = Vec::new();
    let pools = build_pools(&roster, 1, Weapon::Foil, &none, &EngineConfig::default(), &mut rng(6)).unwrap();
    assert!(pools[0].bouts.iter().all(|b| b.referee.is_none()));
}

#[test]
fn same_seed_same_draw() {
    let roster = fencers(12);
    let config = EngineConfig::default();
    let a = build_pools(&roster, 3, Weapon::Epee, &referees(), &config, &mut rng(42)).unwrap();
    let b = build_pools(&roster, 3, Weapon::Epee, &referees(), &config, &mut rng(42)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn regenerating_pools_discards_the_bracket() {
    let roster = fencers(8);
    let refs = referees();
    let config = EngineConfig::default();
    let mut comp = competition_for(&roster);
    let mut r = rng(7);

    generate_pools(&mut comp, &roster, &refs, 2, &config, &mut r).unwrap();
    assert_eq!(comp.phase, Phase::Pools);
    generate_bracket(&mut comp, &roster, &refs, 8, &config, &mut r).unwrap();
    assert_eq!(comp.phase, Phase::Elimination);
    assert_eq!(comp.rounds.len(), 1);

    generate_pools(&mut comp, &roster, &refs, 4, &config, &mut r).unwrap();
    assert_eq!(comp.phase, Phase::Pools);
    assert!(comp.rounds.is_empty());
    assert_eq!(comp.pools.len(), 4);
}

#[test]
fn only_registered_fencers_are_drawn() {
    let roster = fencers(6);
    let mut comp = competition_for(&roster[..4]);
    generate_pools(&mut comp, &roster, &referees(), 1, &EngineConfig::default(), &mut rng(8)).unwrap();
    let drawn: HashSet<_> = comp.pools[0].competitors().into_iter().collect();
    let expected: HashSet<_> = roster[..4].iter().map(|c| c.id).collect();
    assert_eq!(drawn, expected);
}

#[test]
fn failed_generation_keeps_previous_state() {
    let roster = fencers(1);
    let mut comp = competition_for(&roster);
    let before = comp.clone();
    assert!(generate_pools(&mut comp, &roster, &referees(), 1, &EngineConfig::default(), &mut rng(9)).is_err());
    assert_eq!(comp, before);
}
