//! Synthetic roster for a fresh installation.

use crate::config::EngineConfig;
use crate::models::{random_id, Club, Competition, Competitor, Referee, Weapon};
use crate::persistence::Snapshot;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const FIRST_NAMES: &[&str] = &[
    "Juan", "Maria", "Carlos", "Ana", "Pedro", "Lucia", "Diego", "Elena", "Pablo", "Sara", "Luis",
    "Marta", "Jorge", "Laura", "Raul", "Sofia", "Ines", "Javier", "Carmen", "Miguel",
];

const LAST_NAMES: &[&str] = &[
    "Ramirez", "Rodriguez", "Blanco", "Garcia", "Lopez", "Perez", "Martinez", "Sanz", "Gomez",
    "Torres", "Ruiz", "Vidal", "Castro", "Ortiz",
];

const CLUBS: &[&str] = &[
    "Sala de Armas del Ejercito",
    "Club de Esgrima Valencia",
    "Real Club de Esgrima Madrid",
    "Club de Esgrima Tarragona",
];

/// Fixed seed so every fresh installation gets the same roster.
const SEED: u64 = 0x5EED_F00D;

fn random_name(rng: &mut StdRng) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Fencer");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Anon");
    format!("{first} {last}")
}

/// Top the snapshot up to the configured roster minimums and add a sample competition
/// when there is none. Returns true if anything was added.
pub fn ensure_minimum_roster(snapshot: &mut Snapshot, config: &EngineConfig) -> bool {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut changed = false;

    let mut licence = 1000;
    while snapshot.competitors.len() < config.min_seed_competitors {
        licence += 1;
        let licence_str = licence.to_string();
        if snapshot.competitors.iter().any(|c| c.license == licence_str) {
            continue;
        }
        let club = CLUBS.choose(&mut rng).copied().unwrap_or("Independent");
        let weapon = Weapon::ALL[rng.gen_range(0..Weapon::ALL.len())];
        snapshot.competitors.push(Competitor {
            id: random_id(&mut rng),
            name: random_name(&mut rng),
            club: Club::new(club),
            license: licence_str,
            weapons: [weapon].into_iter().collect(),
        });
        changed = true;
    }

    let mut licence = 2000;
    while snapshot.referees.len() < config.min_seed_referees {
        licence += 1;
        let licence_str = licence.to_string();
        if snapshot.referees.iter().any(|r| r.license == licence_str) {
            continue;
        }
        let mut weapons = Weapon::ALL.to_vec();
        weapons.shuffle(&mut rng);
        let count = rng.gen_range(1..=weapons.len());
        snapshot.referees.push(Referee {
            id: random_id(&mut rng),
            name: random_name(&mut rng),
            license: licence_str,
            specialties: weapons.into_iter().take(count).collect(),
        });
        changed = true;
    }

    if snapshot.competitions.is_empty() {
        if let Some(date) = NaiveDate::from_ymd_opt(2025, 1, 25) {
            let mut comp = Competition::new(
                "Opening Tournament 2025",
                "Federation",
                date,
                "Madrid",
                Weapon::Epee,
            );
            comp.id = random_id(&mut rng);
            comp.qualifier_cutoff = config.default_qualifier_cutoff;
            snapshot.competitions.push(comp);
            changed = true;
        }
    }

    if changed {
        log::info!(
            "Seeded roster: {} fencers, {} referees, {} competition(s)",
            snapshot.competitors.len(),
            snapshot.referees.len(),
            snapshot.competitions.len()
        );
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_empty_snapshot_to_minimums() {
        let mut s = Snapshot::default();
        let config = EngineConfig::default();
        assert!(ensure_minimum_roster(&mut s, &config));
        assert_eq!(s.competitors.len(), 32);
        assert_eq!(s.referees.len(), 16);
        assert_eq!(s.competitions.len(), 1);
        assert!(s.referees.iter().all(|r| !r.specialties.is_empty()));
        assert!(!ensure_minimum_roster(&mut s, &config));
    }

    #[test]
    fn seeding_is_deterministic() {
        let config = EngineConfig::default();
        let mut a = Snapshot::default();
        let mut b = Snapshot::default();
        ensure_minimum_roster(&mut a, &config);
        ensure_minimum_roster(&mut b, &config);
        assert_eq!(a, b);
    }
}
