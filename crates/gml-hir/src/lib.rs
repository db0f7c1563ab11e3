//! `gml-hir` - Semantic analysis and the cross-file symbol index for
//! GameMaker Language.
//!
//! This crate builds on `gml-syntax`:
//!
//! - **Lint cycles**: per-document syntax and semantic diagnostics
//! - **Symbol index**: scripts, objects, variables, macros and uses across
//!   the project, queryable while documents keep changing
//! - **Project**: `.yyp` manifest reading and document classification
//! - **Manual**: built-in function and variable documentation
//! - **Snapshots**: persisting the index between sessions
//!
//! # Example
//!
//! ```
//! use gml_hir::lint::{handler::DiagnosticHandler, options::{LintMode, SemanticsOption}, run_lint_cycle};
//! use gml_hir::{DocumentKind, SymbolIndex, Uri};
//!
//! let index = SymbolIndex::default();
//! let uri = Uri::new("file:///game/objects/obj_player/Create_0.gml");
//! let mut handler = DiagnosticHandler::new(
//!     uri.clone(),
//!     DocumentKind::ObjectEvent { object: "obj_player".into(), event: "Create_0".into() },
//! );
//! handler.set_input("hp = 10;\n");
//!
//! let ticket = index.begin_cycle(&uri);
//! let outcome = run_lint_cycle(&mut handler, &index, &ticket, SemanticsOption::ALL, LintMode::Full);
//! assert!(outcome.diagnostics.is_empty());
//! assert_eq!(index.read().variable_sites("hp").len(), 1);
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod diagnostics;
pub mod error;
pub mod ident;
pub mod index;
pub mod line_index;
pub mod lint;
pub mod manual;
pub mod project;
pub mod reference;
pub mod snapshot;
pub mod symbols;

pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSeverity, DiagnosticSource};
pub use error::{IndexError, ManualError, SnapshotError};
pub use ident::is_valid_resource_name;
pub use index::{CycleTicket, IndexQuery, SymbolIndex, WorkspaceIndexState};
pub use line_index::{LineCol, LineIndex};
pub use manual::Manual;
pub use project::{DocumentKind, ProjectManifest};
pub use reference::Reference;
pub use symbols::{Location, ScopeKind, Uri};
