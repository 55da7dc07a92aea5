//! Stations and polarity.
//!
//! Polarity is an attribute of the station, not of the call site: lookup,
//! next-target and validation all consult `Station::polarity()`.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::fold_token;

/// Whether larger or smaller raw values are better.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

impl Polarity {
    /// True iff `a` is strictly better than `b`.
    #[inline]
    pub fn better(self, a: f64, b: f64) -> bool {
        match self {
            Polarity::HigherIsBetter => a > b,
            Polarity::LowerIsBetter => a < b,
        }
    }
}

/// One physical test event. Declaration order is the canonical display order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Station {
    #[cfg_attr(feature = "serde", serde(rename = "situps"))]
    SitUps,
    #[cfg_attr(feature = "serde", serde(rename = "broad_jump"))]
    BroadJump,
    #[cfg_attr(feature = "serde", serde(rename = "sit_and_reach"))]
    SitAndReach,
    #[cfg_attr(feature = "serde", serde(rename = "pullups"))]
    PullUps,
    #[cfg_attr(feature = "serde", serde(rename = "shuttle_run"))]
    ShuttleRun,
    #[cfg_attr(feature = "serde", serde(rename = "run"))]
    Run,
}

impl Station {
    pub const ALL: [Station; 6] = [
        Station::SitUps,
        Station::BroadJump,
        Station::SitAndReach,
        Station::PullUps,
        Station::ShuttleRun,
        Station::Run,
    ];

    pub fn polarity(self) -> Polarity {
        match self {
            Station::ShuttleRun | Station::Run => Polarity::LowerIsBetter,
            _ => Polarity::HigherIsBetter,
        }
    }

    /// Integer-domain stations get a dense per-count lookup array.
    pub fn is_discrete(self) -> bool {
        matches!(
            self,
            Station::SitUps | Station::BroadJump | Station::SitAndReach | Station::PullUps
        )
    }

    pub fn is_timed(self) -> bool {
        self.polarity() == Polarity::LowerIsBetter
    }

    /// Wire token (matches the serde name).
    pub fn as_str(self) -> &'static str {
        match self {
            Station::SitUps => "situps",
            Station::BroadJump => "broad_jump",
            Station::SitAndReach => "sit_and_reach",
            Station::PullUps => "pullups",
            Station::ShuttleRun => "shuttle_run",
            Station::Run => "run",
        }
    }

    /// Human label for presentation.
    pub fn label(self) -> &'static str {
        match self {
            Station::SitUps => "Sit-ups",
            Station::BroadJump => "Standing broad jump",
            Station::SitAndReach => "Sit-and-reach",
            Station::PullUps => "Pull-ups",
            Station::ShuttleRun => "Shuttle run",
            Station::Run => "Run",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Station::SitUps | Station::PullUps => "reps",
            Station::BroadJump | Station::SitAndReach => "cm",
            Station::ShuttleRun | Station::Run => "s",
        }
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Station {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_token(s).as_str() {
            "situps" | "situp" => Ok(Station::SitUps),
            "broadjump" | "standingbroadjump" | "sbj" => Ok(Station::BroadJump),
            "sitandreach" | "sitreach" | "sar" => Ok(Station::SitAndReach),
            "pullups" | "pullup" | "inclinedpullups" => Ok(Station::PullUps),
            "shuttlerun" | "shuttle" => Ok(Station::ShuttleRun),
            "run" | "run16" | "run24" | "longrun" => Ok(Station::Run),
            _ => Err(CoreError::UnknownStation(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polarity_by_station() {
        assert_eq!(Station::SitUps.polarity(), Polarity::HigherIsBetter);
        assert_eq!(Station::SitAndReach.polarity(), Polarity::HigherIsBetter);
        assert_eq!(Station::ShuttleRun.polarity(), Polarity::LowerIsBetter);
        assert_eq!(Station::Run.polarity(), Polarity::LowerIsBetter);
        assert!(!Station::ShuttleRun.is_discrete());
    }

    #[test]
    fn parses_loose_tokens() {
        assert_eq!("Sit-Ups".parse::<Station>().unwrap(), Station::SitUps);
        assert_eq!("broad_jump".parse::<Station>().unwrap(), Station::BroadJump);
        assert_eq!("Shuttle Run".parse::<Station>().unwrap(), Station::ShuttleRun);
        assert!("2.4".parse::<Station>().is_err());
    }

    #[test]
    fn better_follows_polarity() {
        assert!(Polarity::HigherIsBetter.better(30.0, 29.0));
        assert!(Polarity::LowerIsBetter.better(10.2, 10.3));
        assert!(!Polarity::LowerIsBetter.better(10.3, 10.3));
    }
}
