//! Participant context: level, sex, age at test date, and the derived run distance.

use core::fmt;
use core::str::FromStr;

use chrono::{Datelike, NaiveDate};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::fold_token;

/// Schooling tier; selects which standards table applies.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Level {
    Primary,
    Secondary,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Primary => "primary",
            Level::Secondary => "secondary",
        })
    }
}

impl FromStr for Level {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_token(s).as_str() {
            "primary" | "pri" | "p" => Ok(Level::Primary),
            "secondary" | "sec" | "s" => Ok(Level::Secondary),
            _ => Err(CoreError::UnknownLevel(s.trim().to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sex::Male => "male",
            Sex::Female => "female",
        })
    }
}

impl FromStr for Sex {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_token(s).as_str() {
            "male" | "m" | "boy" | "boys" => Ok(Sex::Male),
            "female" | "f" | "girl" | "girls" => Ok(Sex::Female),
            _ => Err(CoreError::UnknownSex(s.trim().to_string())),
        }
    }
}

/// Assigned distance for the timed run station.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RunDistance {
    #[cfg_attr(feature = "serde", serde(rename = "1.6"))]
    Km1_6,
    #[cfg_attr(feature = "serde", serde(rename = "2.4"))]
    Km2_4,
}

impl RunDistance {
    pub fn km(self) -> f64 {
        match self {
            RunDistance::Km1_6 => 1.6,
            RunDistance::Km2_4 => 2.4,
        }
    }

    /// Distance rule: from `long_run_age` on everyone runs 2.4 km; below it
    /// Primary runs 1.6 km and Secondary 2.4 km.
    pub fn for_participant(level: Level, age: u8, long_run_age: u8) -> Self {
        if age >= long_run_age {
            return RunDistance::Km2_4;
        }
        match level {
            Level::Primary => RunDistance::Km1_6,
            Level::Secondary => RunDistance::Km2_4,
        }
    }
}

impl fmt::Display for RunDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunDistance::Km1_6 => "1.6",
            RunDistance::Km2_4 => "2.4",
        })
    }
}

impl FromStr for RunDistance {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim().trim_end_matches("km").trim();
        let km: f64 = t
            .parse()
            .map_err(|_| CoreError::InvalidRunDistance(s.trim().to_string()))?;
        if (km - 1.6).abs() < 0.05 {
            Ok(RunDistance::Km1_6)
        } else if (km - 2.4).abs() < 0.05 {
            Ok(RunDistance::Km2_4)
        } else {
            Err(CoreError::InvalidRunDistance(s.trim().to_string()))
        }
    }
}

/// Age threshold at which every participant runs 2.4 km.
pub const DEFAULT_LONG_RUN_AGE: u8 = 14;

/// Per-query context. Built fresh for each evaluation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParticipantContext {
    pub level: Level,
    pub sex: Sex,
    pub age: u8,
    pub run_distance: RunDistance,
}

impl ParticipantContext {
    /// Context with the run distance derived by the default age rule.
    pub fn new(level: Level, sex: Sex, age: u8) -> Self {
        Self::with_long_run_age(level, sex, age, DEFAULT_LONG_RUN_AGE)
    }

    pub fn with_long_run_age(level: Level, sex: Sex, age: u8, long_run_age: u8) -> Self {
        Self {
            level,
            sex,
            age,
            run_distance: RunDistance::for_participant(level, age, long_run_age),
        }
    }
}

/// Completed years between `dob` and `on`. `None` if `on` precedes `dob`
/// or the age does not fit a `u8`.
pub fn age_at(dob: NaiveDate, on: NaiveDate) -> Option<u8> {
    if on < dob {
        return None;
    }
    let mut years = on.year() - dob.year();
    if (on.month(), on.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    u8::try_from(years).ok()
}
