//! Referee assignment: prefer specialists in the competition weapon.

use crate::models::{Referee, RefereeId, Weapon};
use rand::seq::SliceRandom;
use rand::Rng;

/// Uniform pick among referees specialised in `weapon`, falling back to any referee.
/// None only when the referee roster is empty.
pub fn pick_referee<R: Rng + ?Sized>(
    referees: &[Referee],
    weapon: Weapon,
    rng: &mut R,
) -> Option<RefereeId> {
    let specialists: Vec<&Referee> = referees
        .iter()
        .filter(|r| r.specialises_in(weapon))
        .collect();
    if let Some(r) = specialists.choose(rng) {
        return Some(r.id);
    }
    referees.choose(rng).map(|r| r.id)
}
