//! Mutable native document tree for weft.
//!
//! This crate is the "Surface" side of the editor: an arena-backed element tree
//! with attributes, inline style, text nodes and boundary-point positions. The
//! engine reads it during forward sync and rewrites it during reverse sync.
//!
//! ## Modules
//!
//! - [`node`] - Node identifiers and node payloads (elements, text, comments)
//! - [`tree`] - The [`Dom`] arena and its structural operations
//! - [`selection`] - Boundary points, ranges and the native selection shapes
//! - [`normalize`] - Text node merging with position tracking
//! - [`table`] - Grid view of a `<table>` honouring colspan and rowspan
//! - [`spec`] - Declarative tree construction from JSON
//! - [`html`] - HTML serialization

pub mod html;
pub mod node;
pub mod normalize;
pub mod selection;
pub mod spec;
pub mod table;
pub mod tree;

pub use node::{Element, NodeData, NodeId, NodeKind};
pub use selection::{DomPosition, DomRange, DomSelection};
pub use spec::{DomError, NodeSpec};
pub use table::{ParsedTable, ParsedTableCell, parse_table_cells, table_rows};
pub use tree::Dom;
