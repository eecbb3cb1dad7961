//! Editing session: owns the live filter tree between open and commit/cancel.
//!
//! Every edit goes through [`FilterEditorSession::dispatch`], which gates the action
//! against the current capabilities, reduces it into a new tree and swaps that in.
//! Rejected actions are logged and leave the tree as it was.

use color_eyre::Result;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::action::{FilterAction, reduce};
use crate::core::{ConditionType, EditorParams, FilterCapabilities, FilterNode, FilterPath, FilterRow, FilterTree};
use crate::error::FilterTreeError;
use crate::wire::{DataView, DataViewMetadata, FilterMetadataProvider, WireFilter};

#[derive(Debug)]
pub struct FilterEditorSession<P: FilterMetadataProvider = DataViewMetadata> {
    data_view: DataView,
    provider: P,
    params: EditorParams,
    tree: FilterTree,
}

impl<P: FilterMetadataProvider> FilterEditorSession<P> {
    /// Open an edit over `filters`
    pub fn open(filters: &[WireFilter], data_view: DataView, provider: P, params: EditorParams) -> Self {
        let tree = FilterTree::from_wire(filters, &data_view, &provider);
        info!("Opened filter editor on {} with {} top-level filters", data_view.id, tree.len());
        Self { data_view, provider, params, tree }
    }

    pub fn tree(&self) -> &FilterTree {
        &self.tree
    }

    pub fn params(&self) -> &EditorParams {
        &self.params
    }

    pub fn data_view(&self) -> &DataView {
        &self.data_view
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn resolve(&self, path: &FilterPath) -> Result<&FilterNode, FilterTreeError> {
        self.tree.resolve(path)
    }

    pub fn capabilities(&self, path: &FilterPath) -> Result<FilterCapabilities, FilterTreeError> {
        self.tree.capabilities(path, &self.params)
    }

    pub fn rows(&self) -> Vec<FilterRow> {
        self.tree.rows(&self.params)
    }

    /// Gate, reduce and swap in the next tree
    pub fn try_dispatch(&mut self, action: &FilterAction) -> Result<(), FilterTreeError> {
        if let Some((path, capability)) = action.required_capability() {
            let capabilities = self.tree.capabilities(path, &self.params)?;
            if !capabilities.allows(capability) {
                return Err(FilterTreeError::InvalidMutation {
                    reason: format!("{capability} is disabled at {path}"),
                });
            }
        }
        self.tree = reduce(&self.tree, action)?;
        Ok(())
    }

    /// Apply `action`, logging instead of failing. Returns whether the tree changed hands.
    pub fn dispatch(&mut self, action: FilterAction) -> bool {
        match self.try_dispatch(&action) {
            Ok(()) => {
                debug!("Applied {action}: {}", self.tree);
                true
            }
            Err(e) => {
                warn!("Rejected {action}: {e}");
                false
            }
        }
    }

    /// Add a blank row next to `path`, as the "+ OR" / "+ AND" buttons do
    pub fn add_empty_filter(&mut self, path: &FilterPath, condition_type: ConditionType) -> bool {
        self.dispatch(FilterAction::AddFilter {
            path: path.clone(),
            filter: FilterNode::empty_leaf(),
            condition_type,
        })
    }

    /// Serialize the edited tree back to wire filters, ending the session
    pub fn commit(self) -> Vec<WireFilter> {
        let filters = self.tree.to_wire(&self.data_view, &self.provider);
        info!("Committed {} top-level filters", filters.len());
        filters
    }

    /// Drop the edit without serializing anything
    pub fn cancel(self) {
        info!("Discarded filter edit on {}", self.data_view.id);
    }

    /// Save the current tree to a file as wire-format JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, &self.tree.to_wire(&self.data_view, &self.provider))?;
        Ok(())
    }

    /// Replace the current tree with wire filters read from a file
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path)?;
        let filters: Vec<WireFilter> = serde_json::from_reader(file)?;
        self.tree = FilterTree::from_wire(&filters, &self.data_view, &self.provider);
        Ok(())
    }
}
