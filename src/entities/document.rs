//! Document entity - Operator-authored landing pages.
//!
//! Landing documents are shown to anonymous visitors while the site is gated.
//! Only documents in the `publish` state are ever served.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Document type shared by every landing page.
pub const LANDING_DOCUMENT_TYPE: &str = "landing_page";

/// Publication state of a document.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Visible; the only state the gate will serve
    #[sea_orm(string_value = "publish")]
    Publish,
    /// Work in progress
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Awaiting review
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Visible to operators only
    #[sea_orm(string_value = "private")]
    Private,
    /// Soft deleted
    #[sea_orm(string_value = "trash")]
    Trash,
}

/// Document database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// Unique identifier, referenced by the landing document setting
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Content type, always [`LANDING_DOCUMENT_TYPE`] for documents created here
    pub doc_type: String,
    /// Title shown in the settings picker
    pub title: String,
    /// Raw body, passed through the content filters before display
    #[sea_orm(column_type = "Text")]
    pub body: String,
    /// Publication state
    pub status: DocumentStatus,
    /// When the document was created
    pub created_at: DateTime,
    /// When the document was last modified
    pub updated_at: DateTime,
}

impl Model {
    /// Whether the gate may serve this document.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == DocumentStatus::Publish
    }
}

/// Documents have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
