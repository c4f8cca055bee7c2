//! Content-based drama recommendations.
//!
//! Each title is profiled from its synopsis, genres, tags, cast and
//! director, vectorized with TF-IDF, and compared pairwise once per corpus
//! load. Lookups by title return the nearest neighbours, or fuzzy title
//! suggestions when the title is unknown.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
