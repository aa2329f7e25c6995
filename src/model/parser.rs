// File: src/model/parser.rs
//! Line-oriented parser for free-text itineraries.
//!
//! The scanner keeps two pieces of state: the day currently being filled and
//! whether we are still reading the overview (everything before the first
//! `Day N` heading). It never fails; text it does not understand is dropped.

use crate::model::category::CategoryRules;
use crate::model::item::{Activity, ItineraryDay, ParsedItinerary};
use once_cell::sync::Lazy;
use regex::Regex;

// "## Day 1: Arrival", "**Day 2 - Nature**", "day 3"
static DAY_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:##\s*)?(?:\*\*)?Day ([0-9]+)[:\s]*(?:-)?\s*(.*?)(?:\*\*)?$")
        .expect("day marker pattern is valid")
});

// "9:00 AM - Check in", "14:30: Lunch"
static LEADING_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{1,2}:[0-9]{2}\s*(?:AM|PM|am|pm)?)\s*[-:]\s*(.+)$")
        .expect("leading time pattern is valid")
});

/// Parses `text` with the default category rules.
pub fn parse(text: &str) -> ParsedItinerary {
    parse_with_rules(text, &CategoryRules::default())
}

/// Parses `text`, classifying activities with `rules`.
pub fn parse_with_rules(text: &str, rules: &CategoryRules) -> ParsedItinerary {
    let mut days: Vec<ItineraryDay> = Vec::new();
    let mut current: Option<ItineraryDay> = None;
    let mut in_overview = true;
    let mut overview = String::new();

    for line in text.split('\n') {
        let trimmed = trim_line(line);

        if let Some(day) = parse_day_marker(trimmed) {
            log::trace!("Day marker {} ('{}')", day.day, day.title);
            if let Some(done) = current.take() {
                days.push(done);
            }
            in_overview = false;
            current = Some(day);
        } else if let Some(day) = current.as_mut() {
            if !trimmed.is_empty() {
                day.activities.push(parse_activity(trimmed, rules));
            }
        } else if in_overview && !trimmed.is_empty() {
            overview.push_str(line);
            overview.push('\n');
        }
    }

    if let Some(done) = current {
        days.push(done);
    }

    let parsed = ParsedItinerary {
        overview: trim_line(&overview).to_string(),
        days,
    };
    log::debug!(
        "Parsed itinerary: {} day(s), {} activities, overview {} chars",
        parsed.days.len(),
        parsed.activity_count(),
        parsed.overview.len()
    );
    parsed
}

// Whitespace plus the byte-order mark, which editors leave on the first line.
fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

fn parse_day_marker(trimmed: &str) -> Option<ItineraryDay> {
    let caps = DAY_MARKER.captures(trimmed)?;
    let digits = caps.get(1).map_or("1", |m| m.as_str());
    // Overlong digit runs fall back to day 1.
    let number = digits.parse::<u32>().unwrap_or(1);
    let title = caps.get(2).map_or("", |m| m.as_str()).trim();
    let title = if title.is_empty() {
        format!("Day {}", digits)
    } else {
        title.to_string()
    };
    Some(ItineraryDay::new(number, title))
}

fn parse_activity(trimmed: &str, rules: &CategoryRules) -> Activity {
    let (time, raw) = match LEADING_TIME.captures(trimmed) {
        Some(caps) => (
            caps.get(1).map(|m| m.as_str().to_string()),
            caps.get(2).map_or(trimmed, |m| m.as_str()),
        ),
        None => (None, trimmed),
    };

    // Classification sees the text before emphasis is stripped.
    let category = rules.classify(raw);
    Activity {
        time,
        description: strip_emphasis(raw),
        category,
    }
}

/// Removes Markdown bold/italic asterisks.
pub fn strip_emphasis(text: &str) -> String {
    text.replace('*', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::ActivityCategory;

    #[test]
    fn test_marker_variants() {
        let cases = [
            ("Day 1: Arrival", 1, "Arrival"),
            ("## Day 2 - Backwaters", 2, "Backwaters"),
            ("**Day 3**", 3, "Day 3"),
            ("**Day 4: Munnar**", 4, "Munnar"),
            ("DAY 5", 5, "Day 5"),
            ("day 6 Tea gardens", 6, "Tea gardens"),
            ("##Day 7:", 7, "Day 7"),
        ];
        for (input, n, title) in cases {
            let day = parse_day_marker(input).unwrap_or_else(|| panic!("no marker: {input}"));
            assert_eq!(day.day, n, "{input}");
            assert_eq!(day.title, title, "{input}");
        }
    }

    #[test]
    fn test_non_markers() {
        assert!(parse_day_marker("Daytrip to Kumarakom").is_none());
        assert!(parse_day_marker("Day one").is_none());
        assert!(parse_day_marker("- Day 1").is_none());
        assert!(parse_day_marker("").is_none());
    }

    #[test]
    fn test_overflowing_day_number() {
        let day = parse_day_marker("Day 99999999999999999999: Forever").unwrap();
        assert_eq!(day.day, 1);
        assert_eq!(day.title, "Forever");

        let bare = parse_day_marker("Day 99999999999999999999").unwrap();
        assert_eq!(bare.title, "Day 99999999999999999999");
    }

    #[test]
    fn test_leading_zero_title_keeps_digits() {
        let day = parse_day_marker("Day 03").unwrap();
        assert_eq!(day.day, 3);
        assert_eq!(day.title, "Day 03");
    }

    #[test]
    fn test_activity_time_forms() {
        let rules = CategoryRules::default();

        let a = parse_activity("9:00 AM - Check in to hotel", &rules);
        assert_eq!(a.time.as_deref(), Some("9:00 AM"));
        assert_eq!(a.description, "Check in to hotel");

        let b = parse_activity("14:30: Lunch at Kashi", &rules);
        assert_eq!(b.time.as_deref(), Some("14:30"));
        assert_eq!(b.description, "Lunch at Kashi");
        assert_eq!(b.category, ActivityCategory::Meal);

        let c = parse_activity("7:15pm-Sunset cruise", &rules);
        assert_eq!(c.time.as_deref(), Some("7:15pm"));
        assert_eq!(c.description, "Sunset cruise");

        // No separator after the time: the whole line is the description.
        let d = parse_activity("9:00 AM Breakfast", &rules);
        assert!(d.time.is_none());
        assert_eq!(d.description, "9:00 AM Breakfast");
    }

    #[test]
    fn test_emphasis_stripped_after_classification() {
        let rules = CategoryRules::default();
        let a = parse_activity("10:00 AM - **Explore** *Mattancherry*", &rules);
        assert_eq!(a.description, "Explore Mattancherry");
        assert_eq!(a.category, ActivityCategory::Sightseeing);
    }
}
