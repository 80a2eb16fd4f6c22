//! Landing document access.
//!
//! Documents are owned by the content host; the gate only reads them. The
//! create and status operations exist for activation and the admin surface.

use crate::{
    entities::{Document, DocumentStatus, document, document::LANDING_DOCUMENT_TYPE},
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Read access to stored documents.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetches a document by id, whatever its status.
    async fn fetch_document(&self, id: i64) -> Result<Option<document::Model>>;

    /// Lists documents of `doc_type`, optionally restricted to one status,
    /// ordered by title.
    async fn list_documents(
        &self,
        doc_type: &str,
        status: Option<DocumentStatus>,
    ) -> Result<Vec<document::Model>>;
}

#[async_trait]
impl ContentStore for DatabaseConnection {
    async fn fetch_document(&self, id: i64) -> Result<Option<document::Model>> {
        Document::find_by_id(id).one(self).await.map_err(Into::into)
    }

    async fn list_documents(
        &self,
        doc_type: &str,
        status: Option<DocumentStatus>,
    ) -> Result<Vec<document::Model>> {
        let mut query = Document::find().filter(document::Column::DocType.eq(doc_type));
        if let Some(status) = status {
            query = query.filter(document::Column::Status.eq(status));
        }
        query
            .order_by_asc(document::Column::Title)
            .order_by_asc(document::Column::Id)
            .all(self)
            .await
            .map_err(Into::into)
    }
}

/// Published landing documents, as offered by the settings picker.
pub async fn published_landing_documents<C>(content: &C) -> Result<Vec<document::Model>>
where
    C: ContentStore + ?Sized,
{
    content
        .list_documents(LANDING_DOCUMENT_TYPE, Some(DocumentStatus::Publish))
        .await
}

/// Creates a new landing document.
///
/// # Errors
/// Returns an error if the title is empty or whitespace-only, or if the
/// insert fails.
pub async fn create_document(
    db: &DatabaseConnection,
    title: &str,
    body: &str,
    status: DocumentStatus,
) -> Result<document::Model> {
    if title.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Document title cannot be empty".to_string(),
        });
    }

    let now = chrono::Utc::now().naive_utc();

    let created = document::ActiveModel {
        doc_type: Set(LANDING_DOCUMENT_TYPE.to_string()),
        title: Set(title.trim().to_string()),
        body: Set(body.to_string()),
        status: Set(status),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created landing document {} ({:?})", created.id, created.status);
    Ok(created)
}

/// Moves a document to another publication state.
///
/// # Errors
/// Returns [`Error::DocumentNotFound`] if no document has this id.
pub async fn set_document_status(
    db: &DatabaseConnection,
    id: i64,
    status: DocumentStatus,
) -> Result<document::Model> {
    let mut active_model: document::ActiveModel = Document::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::DocumentNotFound { id })?
        .into();

    active_model.status = Set(status);
    active_model.updated_at = Set(chrono::Utc::now().naive_utc());

    let updated = active_model.update(db).await?;
    info!("Landing document {} is now {:?}", updated.id, updated.status);
    Ok(updated)
}
