//! Grades (A..E) and award kinds.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Band grade. Total order: A > B > C > D > E.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    /// Best first.
    pub const ALL: [Grade; 5] = [Grade::A, Grade::B, Grade::C, Grade::D, Grade::E];

    /// E = 1 … A = 5.
    #[inline]
    pub fn rank(self) -> u8 {
        match self {
            Grade::A => 5,
            Grade::B => 4,
            Grade::C => 3,
            Grade::D => 2,
            Grade::E => 1,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Grade::A => 'A',
            Grade::B => 'B',
            Grade::C => 'C',
            Grade::D => 'D',
            Grade::E => 'E',
        }
    }
}

impl Ord for Grade {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Grade {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Grade {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Grade::A),
            "B" | "b" => Ok(Grade::B),
            "C" | "c" => Ok(Grade::C),
            "D" | "d" => Ok(Grade::D),
            "E" | "e" => Ok(Grade::E),
            other => Err(CoreError::UnknownGrade(other.to_string())),
        }
    }
}

/// Overall classification.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AwardKind {
    Gold,
    Silver,
    Bronze,
    #[cfg_attr(feature = "serde", serde(rename = "No Award"))]
    NoAward,
}

impl AwardKind {
    pub fn label(self) -> &'static str {
        match self {
            AwardKind::Gold => "Gold",
            AwardKind::Silver => "Silver",
            AwardKind::Bronze => "Bronze",
            AwardKind::NoAward => "No Award",
        }
    }
}

impl fmt::Display for AwardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_is_best() {
        assert!(Grade::A > Grade::B);
        assert!(Grade::D > Grade::E);
        let worst = [Grade::B, Grade::E, Grade::A].into_iter().min().unwrap();
        assert_eq!(worst, Grade::E);
    }

    #[test]
    fn parses_letters() {
        assert_eq!("c".parse::<Grade>().unwrap(), Grade::C);
        assert!("F".parse::<Grade>().is_err());
    }
}
