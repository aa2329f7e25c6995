// File: ./src/model/item.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::EnumIter;

/// Tag inferred for each activity line. Wire names are lower-case.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Meal,
    Accommodation,
    Sightseeing,
    Travel,
    #[default]
    General,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Meal => "meal",
            ActivityCategory::Accommodation => "accommodation",
            ActivityCategory::Sightseeing => "sightseeing",
            ActivityCategory::Travel => "travel",
            ActivityCategory::General => "general",
        }
    }

    /// Short badge used by the plain-text timeline.
    pub fn badge(&self) -> &'static str {
        match self {
            ActivityCategory::Meal => "[meal]",
            ActivityCategory::Accommodation => "[stay]",
            ActivityCategory::Sightseeing => "[see]",
            ActivityCategory::Travel => "[go]",
            ActivityCategory::General => "[info]",
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ActivityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "meal" => Ok(ActivityCategory::Meal),
            "accommodation" => Ok(ActivityCategory::Accommodation),
            "sightseeing" => Ok(ActivityCategory::Sightseeing),
            "travel" => Ok(ActivityCategory::Travel),
            "general" => Ok(ActivityCategory::General),
            other => Err(format!("Unknown activity category '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub description: String,
    pub category: ActivityCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryDay {
    /// Day number as written in the source; may repeat or skip.
    pub day: u32,
    pub title: String,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl ItineraryDay {
    pub fn new(day: u32, title: impl Into<String>) -> Self {
        Self {
            day,
            title: title.into(),
            activities: Vec::new(),
        }
    }
}

/// Result of turning an itinerary response into a renderable view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedItinerary {
    pub overview: String,
    pub days: Vec<ItineraryDay>,
}

impl ParsedItinerary {
    pub fn is_empty(&self) -> bool {
        self.overview.is_empty() && self.days.is_empty()
    }

    pub fn activity_count(&self) -> usize {
        self.days.iter().map(|d| d.activities.len()).sum()
    }
}
