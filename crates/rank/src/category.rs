use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;

/// Kind of outdoor spot a scrape is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Viewpoints,
    Hiking,
    DogParks,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Viewpoints, Category::Hiking, Category::DogParks];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Viewpoints => "viewpoints",
            Category::Hiking => "hiking",
            Category::DogParks => "dog_parks",
        }
    }
}

impl FromStr for Category {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "viewpoints" | "viewpoint" => Ok(Category::Viewpoints),
            "hiking" | "hiking_trails" | "hiking_spots" | "trails" => Ok(Category::Hiking),
            "dog_parks" => Ok(Category::DogParks),
            _ => Err(PipelineError::UnsupportedCategory(s.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("viewpoint".parse::<Category>().unwrap(), Category::Viewpoints);
        assert_eq!(" Hiking_Trails ".parse::<Category>().unwrap(), Category::Hiking);
        assert_eq!("trails".parse::<Category>().unwrap(), Category::Hiking);
        assert_eq!("dog_parks".parse::<Category>().unwrap(), Category::DogParks);
    }

    #[test]
    fn test_rejects_unknown() {
        let err = "restaurants".parse::<Category>().unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedCategory(ref c) if c == "restaurants"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_round_trips_through_as_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }
}
