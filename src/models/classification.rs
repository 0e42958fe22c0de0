//! Classification: one row of a ranking table.

use crate::models::competitor::CompetitorId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub competitor_id: CompetitorId,
    pub competitor_name: String,
    pub wins: u32,
    pub bouts: u32,
    /// wins / bouts, 0 when no bouts were fenced.
    pub win_ratio: f64,
    pub touches_given: u32,
    pub touches_received: u32,
    /// touches_given - touches_received.
    pub index: i64,
    /// 1-based rank.
    pub position: usize,
}
