use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{BaseRepository, PageRequest, Repository, SortOrder};
use crate::entities::workflow_document::{
    ActiveModel, Column, DocumentStatus, Entity as WorkflowDocument, Model, WorkflowKind,
};
use crate::errors::ServiceError;

/// List filters. Every field is optional; the tenant is not part of the
/// filter because it is a mandatory argument of every repository call.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub shop_id: Option<Uuid>,
    pub status: Option<DocumentStatus>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Name,
    Status,
}

impl SortField {
    fn column(self) -> Column {
        match self {
            SortField::CreatedAt => Column::CreatedAt,
            SortField::UpdatedAt => Column::UpdatedAt,
            SortField::Name => Column::Name,
            SortField::Status => Column::Status,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentSort {
    pub field: SortField,
    pub order: SortOrder,
}

/// Fields written by a terminal transition.
#[derive(Debug, Clone)]
pub struct Finalization<'a> {
    pub status: DocumentStatus,
    pub finished_by_id: &'a str,
    pub finished_by_name: &'a str,
    pub finished_at: DateTime<Utc>,
}

/// Workflow Document Store for a single workflow kind.
///
/// Every query is filtered on `kind` and `tenant_id`, so a handle for one kind
/// can neither see another kind's documents nor another tenant's.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    base: BaseRepository,
    kind: WorkflowKind,
}

impl DocumentRepository {
    pub fn new(db: Arc<DatabaseConnection>, kind: WorkflowKind) -> Self {
        Self {
            base: BaseRepository::new(db),
            kind,
        }
    }

    pub fn kind(&self) -> WorkflowKind {
        self.kind
    }

    fn scoped(&self, tenant_id: &str) -> Select<WorkflowDocument> {
        WorkflowDocument::find()
            .filter(Column::Kind.eq(self.kind))
            .filter(Column::TenantId.eq(tenant_id))
    }

    pub async fn create(&self, mut document: ActiveModel) -> Result<Model, ServiceError> {
        let now = Utc::now();
        document.kind = Set(self.kind);
        document.status = Set(DocumentStatus::New);
        document.created_at = Set(now);
        document.updated_at = Set(now);
        document.finished_at = Set(None);

        document
            .insert(self.base.get_db())
            .await
            .map_err(ServiceError::create_failed(self.kind))
    }

    pub async fn get(&self, id: Uuid, tenant_id: &str) -> Result<Option<Model>, ServiceError> {
        self.get_on(self.base.get_db(), id, tenant_id).await
    }

    pub async fn get_on<C>(
        &self,
        conn: &C,
        id: Uuid,
        tenant_id: &str,
    ) -> Result<Option<Model>, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(self
            .scoped(tenant_id)
            .filter(Column::Id.eq(id))
            .one(conn)
            .await?)
    }

    pub async fn list(
        &self,
        tenant_id: &str,
        filter: &DocumentFilter,
        sort: DocumentSort,
        page: PageRequest,
    ) -> Result<(Vec<Model>, u64), ServiceError> {
        let mut query = self.scoped(tenant_id);
        if let Some(shop_id) = filter.shop_id {
            query = query.filter(
                Column::ShopId
                    .eq(shop_id)
                    .or(Column::TargetShopId.eq(shop_id)),
            );
        }
        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(Column::CreatedAt.lte(to));
        }

        let paginator = query
            .order_by(sort.field.column(), sort.order.into())
            .order_by(Column::Id, sort.order.into())
            .paginate(self.base.get_db(), page.limit);

        let total = paginator.num_items().await?;
        let documents = paginator.fetch_page(page.page - 1).await?;
        Ok((documents, total))
    }

    /// Writes name and/or the item list with its totals, but only while the
    /// document is still `NEW`. Returns whether the write happened.
    pub async fn update_open(
        &self,
        id: Uuid,
        tenant_id: &str,
        name: Option<String>,
        items: Option<(serde_json::Value, serde_json::Value)>,
    ) -> Result<bool, ServiceError> {
        let mut update = WorkflowDocument::update_many()
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()));
        if let Some(name) = name {
            update = update.col_expr(Column::Name, Expr::value(name));
        }
        if let Some((items, totals)) = items {
            update = update
                .col_expr(Column::Items, Expr::value(items))
                .col_expr(Column::Totals, Expr::value(totals));
        }

        let result = update
            .filter(Column::Id.eq(id))
            .filter(Column::Kind.eq(self.kind))
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::Status.eq(DocumentStatus::New))
            .exec(self.base.get_db())
            .await?;
        Ok(result.rows_affected == 1)
    }

    /// Claims the terminal transition. The write is conditional on the
    /// document still being `NEW`, so of two racing finalizations exactly one
    /// sees `true`.
    pub async fn finalize<C>(
        &self,
        conn: &C,
        id: Uuid,
        tenant_id: &str,
        finalization: Finalization<'_>,
    ) -> Result<bool, ServiceError>
    where
        C: ConnectionTrait,
    {
        let result = WorkflowDocument::update_many()
            .col_expr(Column::Status, Expr::value(finalization.status.as_str()))
            .col_expr(
                Column::FinishedById,
                Expr::value(finalization.finished_by_id.to_string()),
            )
            .col_expr(
                Column::FinishedByName,
                Expr::value(finalization.finished_by_name.to_string()),
            )
            .col_expr(Column::FinishedAt, Expr::value(finalization.finished_at))
            .col_expr(Column::UpdatedAt, Expr::value(finalization.finished_at))
            .filter(Column::Id.eq(id))
            .filter(Column::Kind.eq(self.kind))
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::Status.eq(DocumentStatus::New))
            .exec(conn)
            .await?;
        Ok(result.rows_affected == 1)
    }

    /// Hard-deletes a document that is still `NEW`.
    pub async fn delete_open(&self, id: Uuid, tenant_id: &str) -> Result<bool, ServiceError> {
        let result = WorkflowDocument::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::Kind.eq(self.kind))
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::Status.eq(DocumentStatus::New))
            .exec(self.base.get_db())
            .await?;
        Ok(result.rows_affected == 1)
    }
}

impl Repository for DocumentRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
