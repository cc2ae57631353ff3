//! Review analysis and venue scoring.
//!
//! This module extracts per-factor sentiment from each review, reduces it
//! into a per-venue amenity profile, and turns that profile into a
//! confidence-smoothed workability index with descriptive tags.

pub mod aggregate;
pub mod analyzer;
pub mod grade;
pub mod lexicon;
pub mod sentiment;
pub mod types;
pub mod utility;
pub mod workability;
