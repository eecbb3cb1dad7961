#![allow(clippy::collapsible_if)]

pub mod action;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod services;
pub mod wire;

// Re-export commonly used types
pub use action::{FilterAction, reduce};
pub use core::{ConditionType, EditorParams, FilterCapabilities, FilterNode, FilterPath, FilterTree};
pub use error::FilterTreeError;
pub use services::FilterEditorSession;
pub use wire::{DataView, DataViewMetadata, FilterMetadataProvider, WireFilter};
