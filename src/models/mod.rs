//! Data structures for fencing competitions: fencers, referees, bouts, pools, rounds.

mod bout;
mod classification;
mod competition;
mod competitor;

pub(crate) use bout::random_id;
pub use bout::{Bout, BoutId, Side};
pub use classification::Classification;
pub use competition::{
    Competition, CompetitionError, CompetitionId, Phase, Pool, PoolId, Round, RoundId,
};
pub use competitor::{Club, Competitor, CompetitorId, Referee, RefereeId, Weapon};
