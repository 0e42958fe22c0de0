//! Ranking: win ratio, index and touches-given over completed bouts.

use crate::models::{Bout, Classification, Competition, Competitor, CompetitorId, Pool};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Default)]
struct Tally {
    wins: u32,
    bouts: u32,
    given: u32,
    received: u32,
}

/// Rank `competitors` over the completed, non-bye `bouts`.
///
/// Order is descending by win ratio, then index, then touches given. The sort is stable, so
/// full ties keep the order of `competitors`. Recomputed from scratch on every call.
pub fn compute_ranking<'a, I>(bouts: I, competitors: &[Competitor]) -> Vec<Classification>
where
    I: IntoIterator<Item = &'a Bout>,
{
    let mut tallies: HashMap<CompetitorId, Tally> = HashMap::new();
    for bout in bouts {
        if !bout.completed || bout.bye {
            continue;
        }
        for id in [bout.fencer_1, bout.fencer_2] {
            let Some((given, received)) = bout.touches_for(id) else {
                continue;
            };
            let t = tallies.entry(id).or_default();
            t.bouts += 1;
            t.given += given;
            t.received += received;
            if given > received {
                t.wins += 1;
            }
        }
    }

    let mut rows: Vec<Classification> = competitors
        .iter()
        .map(|c| {
            let t = tallies.remove(&c.id).unwrap_or_default();
            let win_ratio = if t.bouts == 0 {
                0.0
            } else {
                f64::from(t.wins) / f64::from(t.bouts)
            };
            Classification {
                competitor_id: c.id,
                competitor_name: c.name.clone(),
                wins: t.wins,
                bouts: t.bouts,
                win_ratio,
                touches_given: t.given,
                touches_received: t.received,
                index: i64::from(t.given) - i64::from(t.received),
                position: 0,
            }
        })
        .collect();

    rows.sort_by(compare);
    for (i, row) in rows.iter_mut().enumerate() {
        row.position = i + 1;
    }
    rows
}

fn compare(a: &Classification, b: &Classification) -> Ordering {
    b.win_ratio
        .total_cmp(&a.win_ratio)
        .then_with(|| b.index.cmp(&a.index))
        .then_with(|| b.touches_given.cmp(&a.touches_given))
}

/// Registered fencers in roster order.
pub fn registered_competitors(competition: &Competition, roster: &[Competitor]) -> Vec<Competitor> {
    roster
        .iter()
        .filter(|c| competition.registered.contains(&c.id))
        .cloned()
        .collect()
}

/// Standings after the pools: registered fencers over every pool bout.
pub fn competition_ranking(competition: &Competition, roster: &[Competitor]) -> Vec<Classification> {
    compute_ranking(
        competition.pool_bouts(),
        &registered_competitors(competition, roster),
    )
}

/// Table for a single pool: its members over its own bouts.
pub fn pool_ranking(pool: &Pool, roster: &[Competitor]) -> Vec<Classification> {
    let members = pool.competitors();
    let competitors: Vec<Competitor> = members
        .iter()
        .filter_map(|id| roster.iter().find(|c| c.id == *id).cloned())
        .collect();
    compute_ranking(&pool.bouts, &competitors)
}

/// Whole roster over every pool and elimination bout of every competition.
/// Byes are not counted: a walkover adds neither a bout nor a win.
pub fn global_ranking(competitions: &[Competition], roster: &[Competitor]) -> Vec<Classification> {
    let bouts = competitions
        .iter()
        .flat_map(|c| c.pool_bouts().chain(c.elimination_bouts()));
    compute_ranking(bouts, roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Club, Weapon};
    use uuid::Uuid;

    fn fencer(name: &str) -> Competitor {
        Competitor::new(name, Club::new("Club"), "0", [Weapon::Foil])
    }

    fn scored(a: &Competitor, b: &Competitor, ta: u32, tb: u32) -> Bout {
        let mut bout = Bout::new(Uuid::new_v4(), a.id, b.id, None, 5);
        bout.record_score(ta, tb, true).unwrap();
        bout
    }

    #[test]
    fn ratio_then_index_then_given() {
        let a = fencer("A");
        let b = fencer("B");
        let c = fencer("C");
        let bouts = vec![scored(&a, &b, 5, 4), scored(&b, &c, 5, 0), scored(&c, &a, 5, 3)];
        // Everyone 1/2. Index: A +1-2=-1, B -1+5=+4, C -5+2=-3.
        let ranking = compute_ranking(&bouts, &[a.clone(), b.clone(), c.clone()]);
        let order: Vec<_> = ranking.iter().map(|r| r.competitor_id).collect();
        assert_eq!(order, vec![b.id, a.id, c.id]);
        assert_eq!(ranking[0].index, 4);
        assert_eq!(ranking[0].position, 1);
        assert_eq!(ranking[2].position, 3);
    }

    #[test]
    fn unfinished_and_bye_bouts_are_ignored() {
        let a = fencer("A");
        let b = fencer("B");
        let mut open = Bout::new(Uuid::new_v4(), a.id, b.id, None, 5);
        open.touches_1 = 4;
        let bye = Bout::bye(Uuid::new_v4(), b.id, 15);
        let ranking = compute_ranking(&[open, bye], &[a, b]);
        assert!(ranking.iter().all(|r| r.bouts == 0 && r.win_ratio == 0.0));
    }

    #[test]
    fn full_ties_keep_roster_order() {
        let roster: Vec<_> = (0..4).map(|i| fencer(&format!("F{i}"))).collect();
        let ranking = compute_ranking(std::iter::empty::<&Bout>(), &roster);
        let ids: Vec<_> = ranking.iter().map(|r| r.competitor_id).collect();
        let expected: Vec<_> = roster.iter().map(|c| c.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn tied_score_counts_as_fenced_but_not_won() {
        let a = fencer("A");
        let b = fencer("B");
        let ranking = compute_ranking(&[scored(&a, &b, 4, 4)], &[a, b]);
        assert!(ranking.iter().all(|r| r.bouts == 1 && r.wins == 0));
    }
}
