pub mod app;
pub mod error;
pub mod group;
pub mod model;

pub use error::{Error, Result};
