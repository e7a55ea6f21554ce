pub mod homography;

pub use homography::*;
