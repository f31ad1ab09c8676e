use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every road segment resolves to exactly one of these. Declared from highest to lowest priority,
/// so the derived `Ord` puts the most important roads first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Service,
    PathOrTrack,
    Unclassified,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Motorway,
        Category::Trunk,
        Category::Primary,
        Category::Secondary,
        Category::Tertiary,
        Category::Residential,
        Category::Service,
        Category::PathOrTrack,
        Category::Unclassified,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Motorway => "motorway",
            Category::Trunk => "trunk",
            Category::Primary => "primary",
            Category::Secondary => "secondary",
            Category::Tertiary => "tertiary",
            Category::Residential => "residential",
            Category::Service => "service",
            Category::PathOrTrack => "path_or_track",
            Category::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for c in Category::ALL {
            if c.as_str() == s {
                return Ok(c);
            }
        }
        Err(format!("unknown road category {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip() {
        for c in Category::ALL {
            assert_eq!(Category::from_str(c.as_str()), Ok(c));
        }
        assert!(Category::from_str("highway").is_err());
    }

    #[test]
    fn ordered_by_priority() {
        let mut sorted = Category::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Category::ALL.to_vec());
        assert!(Category::Motorway < Category::Unclassified);
    }
}
