use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Workflow document row. One table holds every kind; `kind` selects the
/// logical collection and every query is bound to exactly one kind.
///
/// `items` and `totals` are JSON documents that are always replaced whole.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workflow_documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: String,
    pub kind: WorkflowKind,
    pub name: String,
    #[sea_orm(nullable)]
    pub doc_type: Option<String>,
    pub status: DocumentStatus,
    /// Source location (departure shop for transfers)
    #[sea_orm(nullable)]
    pub shop_id: Option<Uuid>,
    #[sea_orm(nullable)]
    pub shop_name: Option<String>,
    /// Arrival shop, transfers only
    #[sea_orm(nullable)]
    pub target_shop_id: Option<Uuid>,
    #[sea_orm(nullable)]
    pub target_shop_name: Option<String>,
    #[sea_orm(nullable)]
    pub comment: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub items: Json,
    #[sea_orm(column_type = "Json")]
    pub totals: Json,
    pub created_by_id: String,
    pub created_by_name: String,
    #[sea_orm(nullable)]
    pub finished_by_id: Option<String>,
    #[sea_orm(nullable)]
    pub finished_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sea_orm(nullable)]
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// The four stock-mutating workflow kinds.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    #[sea_orm(string_value = "transfer")]
    Transfer,
    #[sea_orm(string_value = "write_off")]
    WriteOff,
    #[sea_orm(string_value = "repricing")]
    Repricing,
    #[sea_orm(string_value = "inventory")]
    Inventory,
}

impl WorkflowKind {
    /// Prefix of the kind-specific error codes, e.g. `WRITEOFF_QTY_EXCEEDS_STOCK`.
    pub fn code_prefix(&self) -> &'static str {
        match self {
            WorkflowKind::Transfer => "TRANSFER",
            WorkflowKind::WriteOff => "WRITEOFF",
            WorkflowKind::Repricing => "REPRICING",
            WorkflowKind::Inventory => "INVENTORY",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowKind::Transfer => "transfer",
            WorkflowKind::WriteOff => "write_off",
            WorkflowKind::Repricing => "repricing",
            WorkflowKind::Inventory => "inventory",
        }
    }

    /// Whether approval moves stock (as opposed to prices).
    pub fn affects_stock(&self) -> bool {
        !matches!(self, WorkflowKind::Repricing)
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkflowKind::Transfer => "Transfer",
            WorkflowKind::WriteOff => "Write-off",
            WorkflowKind::Repricing => "Repricing",
            WorkflowKind::Inventory => "Inventory",
        };
        f.write_str(label)
    }
}

/// Stored lifecycle status. `NEW` is the only non-terminal state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    #[sea_orm(string_value = "NEW")]
    New,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl DocumentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DocumentStatus::New)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::New => "NEW",
            DocumentStatus::Approved => "APPROVED",
            DocumentStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_prefixes_match_error_taxonomy() {
        assert_eq!(WorkflowKind::Transfer.code_prefix(), "TRANSFER");
        assert_eq!(WorkflowKind::WriteOff.code_prefix(), "WRITEOFF");
        assert_eq!(WorkflowKind::Repricing.code_prefix(), "REPRICING");
        assert_eq!(WorkflowKind::Inventory.code_prefix(), "INVENTORY");
    }

    #[test]
    fn only_new_is_open() {
        assert!(!DocumentStatus::New.is_terminal());
        assert!(DocumentStatus::Approved.is_terminal());
        assert!(DocumentStatus::Rejected.is_terminal());
    }
}
