//! Domain types exchanged over the API
//!
//! These are the wire shapes (camelCase JSON). Table rows live in
//! `db::models` and are converted at the repository boundary.

mod document;
mod meta;
mod page_map;
mod selection;

pub use document::{Document, NewDocument, Projected};
pub use meta::{Meta, MetaFields};
pub use selection::{
    BoundsSelection, CoordinateSelection, Coordinates, Selection, SelectionBound, SelectionKind,
};
