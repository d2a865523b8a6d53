//! Poise Analysis Model
//!
//! Defines the core data contracts for a behavioral video analysis run:
//! - **Geometry:** Pixel-space points, frame dimensions, bounding boxes
//! - **Frames:** Decoded raster frames and video metadata
//! - **Observations:** What a detector saw in one sampled frame
//! - **Results:** Scored dimensions, recommendations, and history records
//!
//! All coordinates are in pixels of the decoded frame, origin top-left.

pub mod frame;
pub mod geometry;
pub mod observation;
pub mod result;

pub use frame::*;
pub use geometry::*;
pub use observation::*;
pub use result::*;
