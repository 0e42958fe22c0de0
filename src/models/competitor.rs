//! Competitor (fencer) and Referee records, plus the weapons they specialise in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a competitor (used in bouts and registrations).
pub type CompetitorId = Uuid;

/// Unique identifier for a referee.
pub type RefereeId = Uuid;

/// The three fencing weapons.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weapon {
    Epee,
    Foil,
    Sabre,
}

impl Weapon {
    pub const ALL: [Weapon; 3] = [Weapon::Epee, Weapon::Foil, Weapon::Sabre];
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weapon::Epee => write!(f, "epee"),
            Weapon::Foil => write!(f, "foil"),
            Weapon::Sabre => write!(f, "sabre"),
        }
    }
}

impl FromStr for Weapon {
    type Err = String;

    /// Accepts the English names and the Spanish federation spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "epee" | "épée" | "espada" => Ok(Weapon::Epee),
            "foil" | "florete" => Ok(Weapon::Foil),
            "sabre" | "saber" | "sable" => Ok(Weapon::Sabre),
            other => Err(other.to_string()),
        }
    }
}

/// Club a competitor fences for.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Club {
    pub name: String,
    #[serde(default)]
    pub affiliation_number: String,
}

impl Club {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            affiliation_number: String::new(),
        }
    }
}

/// A registered fencer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub id: CompetitorId,
    pub name: String,
    #[serde(default)]
    pub club: Club,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub weapons: BTreeSet<Weapon>,
}

impl Competitor {
    /// Sentinel opponent used on the empty side of a bye bout. Never part of a roster.
    pub const BYE_ID: CompetitorId = Uuid::nil();

    /// Create a new competitor with a fresh id.
    pub fn new(
        name: impl Into<String>,
        club: Club,
        license: impl Into<String>,
        weapons: impl IntoIterator<Item = Weapon>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            club,
            license: license.into(),
            weapons: weapons.into_iter().collect(),
        }
    }
}

/// A referee; specialties drive specialist assignment.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Referee {
    pub id: RefereeId,
    pub name: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub specialties: BTreeSet<Weapon>,
}

impl Referee {
    pub fn new(
        name: impl Into<String>,
        license: impl Into<String>,
        specialties: impl IntoIterator<Item = Weapon>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            license: license.into(),
            specialties: specialties.into_iter().collect(),
        }
    }

    pub fn specialises_in(&self, weapon: Weapon) -> bool {
        self.specialties.contains(&weapon)
    }
}
