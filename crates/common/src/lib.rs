//! Shared value types for the pickscene workspace.

mod color;
mod types;

pub use color::{Color, ColorParseError};
pub use types::{ObjectId, PickTag, Transform};
