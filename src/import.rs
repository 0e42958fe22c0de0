//! CSV roster import.
//!
//! Competitors: `name,club,license,weapons`. Referees: `name,license,weapons`.
//! Weapons are separated by `;`, e.g. `epee;sabre`.

use crate::models::{Club, Competitor, Referee, Weapon};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unknown weapon '{weapon}' on line {line}")]
    UnknownWeapon { weapon: String, line: usize },
}

#[derive(Deserialize)]
struct CompetitorRow {
    name: String,
    #[serde(default)]
    club: String,
    #[serde(default)]
    license: String,
    #[serde(default)]
    weapons: String,
}

#[derive(Deserialize)]
struct RefereeRow {
    name: String,
    #[serde(default)]
    license: String,
    #[serde(default)]
    weapons: String,
}

fn parse_weapons(field: &str, line: usize) -> Result<BTreeSet<Weapon>, ImportError> {
    field
        .split(';')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(|w| {
            w.parse().map_err(|_| ImportError::UnknownWeapon {
                weapon: w.to_string(),
                line,
            })
        })
        .collect()
}

/// Read competitors from CSV with a header row. Line numbers in errors count the header.
pub fn competitors_from_csv<R: Read>(reader: R) -> Result<Vec<Competitor>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut out = Vec::new();
    for (i, row) in rdr.deserialize::<CompetitorRow>().enumerate() {
        let row = row?;
        let weapons = parse_weapons(&row.weapons, i + 2)?;
        out.push(Competitor::new(row.name, Club::new(row.club), row.license, weapons));
    }
    Ok(out)
}

/// Read referees from CSV with a header row.
pub fn referees_from_csv<R: Read>(reader: R) -> Result<Vec<Referee>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut out = Vec::new();
    for (i, row) in rdr.deserialize::<RefereeRow>().enumerate() {
        let row = row?;
        let weapons = parse_weapons(&row.weapons, i + 2)?;
        out.push(Referee::new(row.name, row.license, weapons));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_competitors() {
        let data = "name,club,license,weapons\n\
                    Ana Garcia, CE Valencia ,1001,epee;foil\n\
                    Luis Ruiz,Sala de Armas,1002,\n";
        let fencers = competitors_from_csv(data.as_bytes()).unwrap();
        assert_eq!(fencers.len(), 2);
        assert_eq!(fencers[0].club.name, "CE Valencia");
        assert_eq!(
            fencers[0].weapons,
            [Weapon::Epee, Weapon::Foil].into_iter().collect()
        );
        assert!(fencers[1].weapons.is_empty());
    }

    #[test]
    fn unknown_weapon_reports_line() {
        let data = "name,license,weapons\nRef One,2001,sabre\nRef Two,2002,lance\n";
        match referees_from_csv(data.as_bytes()) {
            Err(ImportError::UnknownWeapon { weapon, line }) => {
                assert_eq!(weapon, "lance");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
