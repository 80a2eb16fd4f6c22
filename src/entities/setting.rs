//! Setting entity - One persisted gate setting.
//!
//! Values are scalar and stored as text: flags as `"0"`/`"1"`, identifiers as
//! decimal integers, the launch date verbatim as submitted by the operator.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Setting database model - a single key/value pair
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Setting name (e.g., `"maintenance_mode_wp_enabled"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Setting value stored as string
    pub value: String,
    /// When this setting was last written
    pub updated_at: DateTime,
}

/// Settings have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
