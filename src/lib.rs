pub mod batch;
pub mod config;
pub mod decode;
pub mod error;
pub mod models;
pub mod processing;

pub use config::Configurations;
pub use decode::DigitCell;
pub use decode::segments::{Segment, SegmentStates};
pub use error::{Error, Result};
pub use models::{BoundingBox, ContourRegion, Point, Quadrilateral};
pub use processing::MeterReader;
