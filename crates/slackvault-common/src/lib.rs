pub mod error;
pub mod payload;

pub use error::{Error, Result};
pub use payload::canonical_json;
