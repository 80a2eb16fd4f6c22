//! Entity module - SeaORM entity definitions for the gate's tables.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod document;
pub mod setting;

pub use document::{
    Column as DocumentColumn, DocumentStatus, Entity as Document, Model as DocumentModel,
};
pub use setting::{Column as SettingColumn, Entity as Setting, Model as SettingModel};
