// File: ./src/model/display.rs
use crate::model::item::{ItineraryDay, ParsedItinerary};
use unicode_width::UnicodeWidthStr;

pub trait ItineraryDisplay {
    fn to_timeline_string(&self) -> String;
}

impl ItineraryDisplay for ItineraryDay {
    fn to_timeline_string(&self) -> String {
        let mut out = format!(
            "({}) {}  [{} {}]\n",
            self.day,
            self.title,
            self.activities.len(),
            if self.activities.len() == 1 {
                "activity"
            } else {
                "activities"
            }
        );

        let time_width = self
            .activities
            .iter()
            .filter_map(|a| a.time.as_deref())
            .map(UnicodeWidthStr::width)
            .max()
            .unwrap_or(0);

        for activity in &self.activities {
            let time = activity.time.as_deref().unwrap_or("");
            let pad = time_width.saturating_sub(time.width());
            out.push_str("  ");
            if time_width > 0 {
                out.push_str(time);
                out.push_str(&" ".repeat(pad + 2));
            }
            out.push_str(&format!(
                "{:<7} {}\n",
                activity.category.badge(),
                activity.description
            ));
        }
        out
    }
}

impl ItineraryDisplay for ParsedItinerary {
    fn to_timeline_string(&self) -> String {
        let mut out = String::new();
        if !self.overview.is_empty() {
            out.push_str("Overview\n");
            for line in self.overview.lines() {
                out.push_str("  ");
                out.push_str(line.trim_end());
                out.push('\n');
            }
        }
        if !self.days.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("{}-Day Itinerary\n", self.days.len()));
            for day in &self.days {
                out.push('\n');
                out.push_str(&day.to_timeline_string());
            }
        }
        out
    }
}
