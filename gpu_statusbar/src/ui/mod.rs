//! UI module

pub mod components;
pub mod theme;

pub use theme::{Band, BandPolicy, BandThresholds, ColorScheme, Metric};
