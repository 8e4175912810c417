//! HTML parsing shared by the page-based collectors.
//!
//! This module extracts:
//! - Structured data (JSON-LD, Open Graph, schema.org types)
//! - Social media profile links
//!
//! All DOM parsing is done using CSS selectors via the `scraper` crate.

mod social;
mod structured;

// Re-export public API
pub use social::{extract_social_profiles, SocialProfile};
pub use structured::{extract_structured_data, StructuredData};
