//! Acquisition settings for lockwright.
//!
//! A small YAML file can stand in for the timing flags of the CLI. Parsing is
//! forward compatible (unknown fields are ignored) and every field is optional.

mod model;
mod operations;


pub use model::Settings;
