//! SeaORM entity models
//!
//! Table rows for documents, selections and document metadata

mod document;
mod meta;
mod selection;

pub use document::{
    Entity as DocumentEntity,
    Model as DocumentRow,
    ActiveModel as DocumentActiveModel,
    Column as DocumentColumn,
};

pub use selection::{
    Entity as SelectionEntity,
    Model as SelectionRow,
    ActiveModel as SelectionActiveModel,
    Column as SelectionColumn,
};

pub use meta::{
    Entity as MetaEntity,
    Model as MetaRow,
    ActiveModel as MetaActiveModel,
    Column as MetaColumn,
};
