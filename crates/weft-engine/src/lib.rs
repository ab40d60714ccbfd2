//! Rich-text document model for weft, kept in sync with a native tree.
//!
//! The [`model`] is an owned tree of blocks, block groups and inline segments
//! whose selection state lives on the nodes themselves. Forward sync
//! ([`dom_to_model`]) reads a [`weft_dom::Dom`] subtree and its selection into
//! a model; reverse sync ([`model_to_dom`]) renders a model back, reusing cached
//! native elements for content that has not changed.
//!
//! ## Modules
//!
//! - [`model`] - Node types, formats, paths and builders
//! - [`mutation`] - Cache-invalidating mutable access to model nodes
//! - [`selection`] - Setting, iterating and querying the model selection
//! - [`dom_to_model`] - Forward sync: native tree -> model
//! - [`model_to_dom`] - Reverse sync: model -> native tree
//! - [`normalize`] - Structural clean-up rules
//! - [`cascade`] - Effective segment format at a path
//! - [`indexer`] - Optional native node index fed by both engines
//! - [`text`] - Plain-text projection
//! - [`error`] - Error types

pub mod cascade;
pub mod dom_to_model;
pub mod error;
pub mod indexer;
pub mod model;
pub mod model_to_dom;
pub mod mutation;
pub mod normalize;
pub mod selection;
pub mod text;

pub use cascade::effective_segment_format;
pub use dom_to_model::{DomToModelContext, dom_to_model};
pub use error::ModelError;
pub use indexer::{DomIndexer, NodeIndex};
pub use model::*;
pub use model_to_dom::{ModelToDomContext, model_to_dom};
pub use mutation::{
    clear_cached_elements, ensure_mutable, mutate_block, mutate_format_holder, mutate_group,
    mutate_segment,
};
pub use normalize::normalize_document;
pub use selection::{
    IterateSelectionsOption, iterate_selections, iterate_selections_mut, set_selection,
};
pub use text::model_to_text;
