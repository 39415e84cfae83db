use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

/// Contest difficulty tier, inferred from the contest title.
///
/// `Div0` is the sentinel for contests whose title carries no division
/// marker (educational rounds, global rounds and the like).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Division {
    Div0,
    Div1,
    Div2,
    Div3,
    Div4,
}

impl Division {
    /// Infers the division from a contest title.
    ///
    /// Combined contests carry several markers ("Div. 1 + Div. 2"); the
    /// numerically largest one wins, which this dataset's convention reads
    /// as the lower division. Titles without a marker map to [`Division::Div0`].
    pub fn from_contest_name(name: &str) -> Division {
        lazy_static! {
            static ref DIVISION_MARKER: Regex = Regex::new(r"Div\.\s*([1-4])").unwrap();
        }
        DIVISION_MARKER
            .captures_iter(name)
            .filter_map(|caps| caps[1].parse::<u8>().ok())
            .max()
            .map_or(Division::Div0, Division::from_number)
    }

    fn from_number(n: u8) -> Division {
        match n {
            1 => Division::Div1,
            2 => Division::Div2,
            3 => Division::Div3,
            4 => Division::Div4,
            _ => Division::Div0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Division::Div0 => "Div 0",
            Division::Div1 => "Div 1",
            Division::Div2 => "Div 2",
            Division::Div3 => "Div 3",
            Division::Div4 => "Div 4",
        }
    }

    /// Parses a stored division label back into the enum.
    pub fn parse(label: &str) -> Option<Division> {
        match label {
            "Div 0" => Some(Division::Div0),
            "Div 1" => Some(Division::Div1),
            "Div 2" => Some(Division::Div2),
            "Div 3" => Some(Division::Div3),
            "Div 4" => Some(Division::Div4),
            _ => None,
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
