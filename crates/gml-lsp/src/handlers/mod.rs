//! LSP request handlers.
//!
//! This module wires handler submodules together.

pub(crate) mod diagnostics;
mod features;
mod lsp_utils;
pub(crate) mod progress;
mod sync;
mod workspace;

pub use features::{completion, goto_definition, hover, references, signature_help};
pub use sync::{did_change, did_close, did_open, did_save};
pub use workspace::{did_change_configuration, index_workspace_background, save_index_snapshot};

#[cfg(test)]
mod tests;
