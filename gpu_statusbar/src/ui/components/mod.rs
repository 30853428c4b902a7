//! UI components module

pub mod status_line;

pub use status_line::{display_string, draw_segments, Segment, StatusLine};
