// File: ./src/model/mod.rs
pub mod category;
pub mod display;
pub mod item;
pub mod parser;
pub mod structured;

pub use category::{CategoryRule, CategoryRules};
pub use display::ItineraryDisplay;
pub use item::{Activity, ActivityCategory, ItineraryDay, ParsedItinerary};
pub use parser::{parse, parse_with_rules};
pub use structured::{StructuredDay, StructuredItinerary};
