// File: ./src/model/structured.rs
//! Schema-shaped itinerary responses.
//!
//! When the generator is asked for JSON the response maps straight onto these
//! types and the heuristic text parser is skipped.

use crate::model::category::CategoryRules;
use crate::model::item::{Activity, ActivityCategory, ItineraryDay, ParsedItinerary};
use crate::model::parser::strip_emphasis;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDay {
    pub day: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub morning: String,
    #[serde(default)]
    pub afternoon: String,
    #[serde(default)]
    pub evening: String,
    #[serde(default)]
    pub travel_time: String,
    #[serde(default)]
    pub food: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredItinerary {
    pub itinerary: Vec<StructuredDay>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StructuredShape {
    Wrapped(StructuredItinerary),
    Bare(Vec<StructuredDay>),
}

impl StructuredItinerary {
    /// JSON shape sent alongside structured prompts.
    pub fn schema() -> &'static str {
        r#"{
  "itinerary": [
    {
      "day": number,
      "title": "string",
      "morning": "string",
      "afternoon": "string",
      "evening": "string",
      "travelTime": "string",
      "food": ["string"],
      "tips": ["string"]
    }
  ]
}"#
    }

    /// Accepts the wrapped object or a bare array of days, optionally inside a
    /// Markdown code fence.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let body = strip_code_fence(text);
        serde_json::from_str::<StructuredShape>(body).map(Self::from_shape)
    }

    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value::<StructuredShape>(value).map(Self::from_shape)
    }

    fn from_shape(shape: StructuredShape) -> Self {
        match shape {
            StructuredShape::Wrapped(it) => it,
            StructuredShape::Bare(days) => Self { itinerary: days },
        }
    }

    pub fn to_parsed(&self, rules: &CategoryRules) -> ParsedItinerary {
        let days = self.itinerary.iter().map(|d| d.to_day(rules)).collect();
        ParsedItinerary {
            overview: String::new(),
            days,
        }
    }
}

impl StructuredDay {
    fn to_day(&self, rules: &CategoryRules) -> ItineraryDay {
        let title = self.title.trim();
        let mut day = if title.is_empty() {
            ItineraryDay::new(self.day, format!("Day {}", self.day))
        } else {
            ItineraryDay::new(self.day, title)
        };

        for (label, text) in [
            ("Morning", &self.morning),
            ("Afternoon", &self.afternoon),
            ("Evening", &self.evening),
        ] {
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            day.activities.push(Activity {
                time: Some(label.to_string()),
                description: strip_emphasis(text),
                category: rules.classify(text),
            });
        }

        for dish in self.food.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
            day.activities.push(Activity {
                time: None,
                description: strip_emphasis(dish),
                category: ActivityCategory::Meal,
            });
        }

        let travel = self.travel_time.trim();
        if !travel.is_empty() {
            day.activities.push(Activity {
                time: None,
                description: strip_emphasis(travel),
                category: ActivityCategory::Travel,
            });
        }

        day
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
