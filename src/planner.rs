// File: ./src/planner.rs
/*! Trip requests, prompt building and the generation round-trip.

The text-generation service is an opaque capability (`TextGenerator`). The
planner validates the request, asks for either free text or the structured
JSON shape, and turns whatever comes back into a `ParsedItinerary` while
keeping the raw response for persistence.
*/

use crate::model::category::CategoryRules;
use crate::model::item::ParsedItinerary;
use crate::model::parser::parse_with_rules;
use crate::model::structured::StructuredItinerary;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

pub const DEFAULT_DURATION: u32 = 7;
pub const DEFAULT_MAX_DAYS: u32 = 30;
const MIN_FIELD_CHARS: usize = 3;

#[derive(Debug)]
pub enum PlanError {
    InvalidRequest(String),
    Generation(anyhow::Error),
    EmptyResponse,
    Malformed(String),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::InvalidRequest(msg) => write!(f, "Invalid trip request: {}", msg),
            PlanError::Generation(e) => write!(f, "Failed to generate itinerary: {}", e),
            PlanError::EmptyResponse => write!(f, "The generator returned an empty itinerary"),
            PlanError::Malformed(msg) => write!(f, "Malformed structured itinerary: {}", msg),
        }
    }
}

impl From<serde_json::Error> for PlanError {
    fn from(e: serde_json::Error) -> Self {
        PlanError::Malformed(e.to_string())
    }
}

impl std::error::Error for PlanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlanError::Generation(e) => Some(&**e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Text,
    #[default]
    Structured,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub interests: String,
    pub duration: u32,
    pub locations: String,
    #[serde(default)]
    pub travel_style: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub accommodation_type: Option<String>,
}

impl Default for TripRequest {
    fn default() -> Self {
        Self {
            interests: String::new(),
            duration: DEFAULT_DURATION,
            locations: String::new(),
            travel_style: Some("Balanced".to_string()),
            budget: Some("Mid-range".to_string()),
            accommodation_type: Some("Hotels".to_string()),
        }
    }
}

impl TripRequest {
    pub fn new(locations: impl Into<String>, duration: u32, interests: impl Into<String>) -> Self {
        Self {
            locations: locations.into(),
            duration,
            interests: interests.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self, max_days: u32) -> Result<(), PlanError> {
        if self.interests.trim().chars().count() < MIN_FIELD_CHARS {
            return Err(PlanError::InvalidRequest(
                "Please tell us at least one interest.".to_string(),
            ));
        }
        if self.locations.trim().chars().count() < MIN_FIELD_CHARS {
            return Err(PlanError::InvalidRequest(
                "Please suggest at least one location.".to_string(),
            ));
        }
        if self.duration < 1 {
            return Err(PlanError::InvalidRequest(
                "Duration must be at least 1 day.".to_string(),
            ));
        }
        if self.duration > max_days {
            return Err(PlanError::InvalidRequest(format!(
                "Duration cannot exceed {} days.",
                max_days
            )));
        }
        Ok(())
    }

    /// Display name used when the itinerary is saved.
    pub fn display_name(&self) -> String {
        format!("{} - {} days", self.locations.trim(), self.duration)
    }
}

pub fn build_prompt(request: &TripRequest, format: ResponseFormat) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are a helpful Kerala tourism travel planner.\n");
    prompt.push_str(&format!(
        "Create a detailed {}-day travel itinerary for {} in Kerala.\n",
        request.duration,
        request.locations.trim()
    ));
    prompt.push_str(&format!("Traveller interests: {}.\n", request.interests.trim()));

    let prefs = [
        ("Travel style", &request.travel_style),
        ("Budget", &request.budget),
        ("Accommodation", &request.accommodation_type),
    ];
    for (label, value) in prefs {
        if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            prompt.push_str(&format!("{}: {}.\n", label, v));
        }
    }

    match format {
        ResponseFormat::Text => {
            prompt.push_str(
                "Start with a short overview paragraph. Then, for each day, write a heading \
                 line \"Day N: Title\" followed by one activity per line in the form \
                 \"HH:MM AM - activity\".\n",
            );
        }
        ResponseFormat::Structured => {
            prompt.push_str("Return ONLY a valid JSON object with the following structure:\n");
            prompt.push_str(StructuredItinerary::schema());
            prompt.push('\n');
        }
    }
    prompt
}

#[derive(Debug, Clone, PartialEq)]
pub enum Generated {
    Text(String),
    Structured(serde_json::Value),
}

/// Opaque text-generation capability.
pub trait TextGenerator {
    fn generate(
        &self,
        prompt: &str,
        schema: Option<&str>,
    ) -> impl Future<Output = anyhow::Result<Generated>> + Send;
}

/// What gets persisted: the response as received, never the parsed view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum RawItinerary {
    Text(String),
    Structured(StructuredItinerary),
}

impl RawItinerary {
    pub fn view(&self, rules: &CategoryRules) -> ParsedItinerary {
        match self {
            RawItinerary::Text(text) => parse_with_rules(text, rules),
            RawItinerary::Structured(it) => it.to_parsed(rules),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItinerary {
    pub name: String,
    pub raw: RawItinerary,
    pub view: ParsedItinerary,
}

pub struct Planner<G> {
    generator: G,
    rules: CategoryRules,
    max_days: u32,
}

impl<G: TextGenerator> Planner<G> {
    pub fn new(generator: G, rules: CategoryRules) -> Self {
        Self {
            generator,
            rules,
            max_days: DEFAULT_MAX_DAYS,
        }
    }

    pub fn with_max_days(mut self, max_days: u32) -> Self {
        self.max_days = max_days;
        self
    }

    pub fn rules(&self) -> &CategoryRules {
        &self.rules
    }

    pub async fn plan(
        &self,
        request: &TripRequest,
        format: ResponseFormat,
    ) -> Result<PlannedItinerary, PlanError> {
        request.validate(self.max_days)?;
        log::info!(
            "Requesting {}-day itinerary for '{}' ({:?})",
            request.duration,
            request.locations.trim(),
            format
        );

        let prompt = build_prompt(request, format);
        let schema = match format {
            ResponseFormat::Structured => Some(StructuredItinerary::schema()),
            ResponseFormat::Text => None,
        };

        let generated = self
            .generator
            .generate(&prompt, schema)
            .await
            .map_err(|e| {
                log::warn!("Itinerary generation failed: {:#}", e);
                PlanError::Generation(e)
            })?;

        let raw = self.interpret(generated, format)?;
        let view = raw.view(&self.rules);
        Ok(PlannedItinerary {
            name: request.display_name(),
            raw,
            view,
        })
    }

    fn interpret(
        &self,
        generated: Generated,
        format: ResponseFormat,
    ) -> Result<RawItinerary, PlanError> {
        let raw = match generated {
            Generated::Structured(value) => {
                RawItinerary::Structured(StructuredItinerary::from_value(value)?)
            }
            Generated::Text(text) => {
                if text.trim().is_empty() {
                    log::warn!("Generator returned an empty response");
                    return Err(PlanError::EmptyResponse);
                }
                match format {
                    ResponseFormat::Structured => match StructuredItinerary::from_json(&text) {
                        Ok(it) => RawItinerary::Structured(it),
                        Err(e) => {
                            log::warn!(
                                "Response is not structured JSON ({}); falling back to the text parser",
                                e
                            );
                            RawItinerary::Text(text)
                        }
                    },
                    ResponseFormat::Text => RawItinerary::Text(text),
                }
            }
        };

        if let RawItinerary::Structured(it) = &raw
            && it.itinerary.is_empty()
        {
            log::warn!("Generator returned a structured itinerary with no days");
            return Err(PlanError::EmptyResponse);
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_rules() {
        let ok = TripRequest::new("Munnar", 3, "tea, hiking");
        assert!(ok.validate(DEFAULT_MAX_DAYS).is_ok());

        let short_interest = TripRequest::new("Munnar", 3, "ab");
        assert!(matches!(
            short_interest.validate(DEFAULT_MAX_DAYS),
            Err(PlanError::InvalidRequest(_))
        ));

        let blank_location = TripRequest::new("   ", 3, "beaches");
        assert!(blank_location.validate(DEFAULT_MAX_DAYS).is_err());

        let zero = TripRequest::new("Kochi", 0, "food");
        assert!(zero.validate(DEFAULT_MAX_DAYS).is_err());

        let long = TripRequest::new("Kochi", 31, "food");
        assert!(long.validate(DEFAULT_MAX_DAYS).is_err());
        assert!(long.validate(40).is_ok());
    }

    #[test]
    fn test_defaults_match_form() {
        let r = TripRequest::default();
        assert_eq!(r.duration, 7);
        assert_eq!(r.travel_style.as_deref(), Some("Balanced"));
        assert_eq!(r.budget.as_deref(), Some("Mid-range"));
        assert_eq!(r.accommodation_type.as_deref(), Some("Hotels"));
    }

    #[test]
    fn test_prompt_shapes() {
        let mut r = TripRequest::new("Alleppey", 2, "backwaters");
        r.budget = None;

        let text = build_prompt(&r, ResponseFormat::Text);
        assert!(text.contains("2-day travel itinerary for Alleppey"));
        assert!(text.contains("Day N: Title"));
        assert!(!text.contains("Budget"));
        assert!(text.contains("Travel style: Balanced."));

        let structured = build_prompt(&r, ResponseFormat::Structured);
        assert!(structured.contains("Return ONLY a valid JSON object"));
        assert!(structured.contains("\"travelTime\""));
    }

    #[test]
    fn test_malformed_structured_value() {
        let err: PlanError = StructuredItinerary::from_value(serde_json::json!(42))
            .unwrap_err()
            .into();
        assert!(matches!(err, PlanError::Malformed(_)));
        assert!(err.to_string().starts_with("Malformed structured itinerary"));
    }

    #[test]
    fn test_raw_itinerary_wire_format() {
        let raw = RawItinerary::Text("Day 1: Arrival".to_string());
        let json = serde_json::to_value(&raw).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["data"], "Day 1: Arrival");
    }
}
