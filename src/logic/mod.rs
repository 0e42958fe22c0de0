//! Competition logic: ranking, pools, seeding, elimination bracket, simulation.

mod bracket;
mod pools;
mod ranking;
mod referees;
mod seeding;
mod simulation;

pub use bracket::{advance_round, generate_bracket, round_name, update_bout_score};
pub use pools::{build_pools, generate_pools, pool_sizes};
pub use ranking::{
    competition_ranking, compute_ranking, global_ranking, pool_ranking, registered_competitors,
};
pub use referees::pick_referee;
pub use seeding::seed_order;
pub use simulation::{simulate_all, simulate_pools, simulate_round};
