pub mod capabilities;
pub mod display;
pub mod models;
pub mod tree;
pub mod types;

pub use capabilities::{Capability, EditorParams, FilterCapabilities};
pub use display::FilterRow;
pub use models::*;
pub use tree::FilterTree;
pub use types::*;
