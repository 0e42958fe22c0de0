//! Fencing tournament organizer: library with models, progression logic and the registry.

pub mod config;
pub mod import;
pub mod logic;
pub mod models;
pub mod persistence;
pub mod registry;
pub mod seed;

pub use config::EngineConfig;
pub use logic::{
    advance_round, build_pools, competition_ranking, compute_ranking, generate_bracket,
    generate_pools, global_ranking, pool_ranking, round_name, seed_order, simulate_all,
    simulate_pools, simulate_round, update_bout_score,
};
pub use models::{
    Bout, BoutId, Classification, Club, Competition, CompetitionError, CompetitionId,
    Competitor, CompetitorId, Phase, Pool, PoolId, Referee, RefereeId, Round, RoundId, Side,
    Weapon,
};
pub use persistence::{JsonStore, PersistenceError, Snapshot, SnapshotSink};
pub use registry::Registry;
