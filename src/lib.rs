pub mod codec;
pub mod collector;
pub mod error;
pub mod frame;
pub mod io;
pub mod optimization;
pub mod projection;
pub mod session;
pub mod solver;
pub mod types;
pub mod visualization;

pub use error::{Error, Result};
