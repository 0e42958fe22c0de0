//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::NaiveDate;
use fencing_tournament_web::{
    Club, Competition, Competitor, EngineConfig, Referee, Registry, Snapshot, Weapon,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn fencers(n: usize) -> Vec<Competitor> {
    (0..n)
        .map(|i| Competitor::new(format!("F{i}"), Club::new("Club"), format!("{}", 1000 + i), [Weapon::Epee]))
        .collect()
}

pub fn referees() -> Vec<Referee> {
    vec![
        Referee::new("Epee Ref", "2001", [Weapon::Epee]),
        Referee::new("Sabre Ref", "2002", [Weapon::Sabre]),
    ]
}

pub fn competition_for(roster: &[Competitor]) -> Competition {
    let mut c = Competition::new(
        "Test Open",
        "Federation",
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        "Valencia",
        Weapon::Epee,
    );
    c.registered = roster.iter().map(|f| f.id).collect();
    c
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Registry with `n` registered fencers in one competition; returns the competition id too.
pub fn registry_with(n: usize, seed: u64) -> (Registry, uuid::Uuid) {
    let roster = fencers(n);
    let comp = competition_for(&roster);
    let id = comp.id;
    let snapshot = Snapshot {
        competitors: roster,
        referees: referees(),
        competitions: vec![comp],
    };
    (Registry::with_rng(snapshot, EngineConfig::default(), rng(seed)), id)
}
