//! Generic composite-key entity store
//!
//! All tenant-scoped tables share the same key discipline: composite primary
//! key `(account_id, company_id, id)` and a `(account_id, company_id, uuid)`
//! unique secondary key. [`TenantScopedEntity`] exposes those columns so the
//! query surface here can be written once and reused for every entity.
//!
//! The isolation rule is structural: [`select`] is the only way to start a
//! scoped query, and it takes the tenant pair as a mandatory argument. There
//! is no unscoped variant.

use keystone_api_types::{PaginationInput, TenantScope};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Value,
};
use uuid::Uuid;

/// Contract every tenant-scoped SeaORM entity implements.
pub trait TenantScopedEntity: EntityTrait {
    fn account_id_col() -> Self::Column;
    fn company_id_col() -> Self::Column;
    fn id_col() -> Self::Column;
    fn uuid_col() -> Self::Column;
    fn created_at_col() -> Self::Column;

    /// Columns searched by the substring filter in [`list`].
    fn search_columns() -> &'static [Self::Column] {
        &[]
    }
}

/// Start a query over a scoped entity, constrained to one tenant.
pub fn select<E: TenantScopedEntity>(scope: TenantScope) -> Select<E> {
    E::find()
        .filter(E::account_id_col().eq(scope.account_id))
        .filter(E::company_id_col().eq(scope.company_id))
}

/// Single-row lookup by the full composite key.
pub async fn get<E, C>(conn: &C, scope: TenantScope, id: i32) -> Result<Option<E::Model>, DbErr>
where
    E: TenantScopedEntity,
    C: ConnectionTrait,
{
    select::<E>(scope).filter(E::id_col().eq(id)).one(conn).await
}

/// Single-row lookup by the uuid secondary key, same scoping discipline.
pub async fn get_by_uuid<E, C>(
    conn: &C,
    scope: TenantScope,
    uuid: Uuid,
) -> Result<Option<E::Model>, DbErr>
where
    E: TenantScopedEntity,
    C: ConnectionTrait,
{
    select::<E>(scope)
        .filter(E::uuid_col().eq(uuid))
        .one(conn)
        .await
}

pub async fn exists<E, C>(
    conn: &C,
    scope: TenantScope,
    filters: Vec<(E::Column, Value)>,
) -> Result<bool, DbErr>
where
    E: TenantScopedEntity,
    E::Model: FromQueryResult + Send + Sync,
    C: ConnectionTrait,
{
    Ok(count::<E, C>(conn, scope, filters).await? > 0)
}

pub async fn count<E, C>(
    conn: &C,
    scope: TenantScope,
    filters: Vec<(E::Column, Value)>,
) -> Result<u64, DbErr>
where
    E: TenantScopedEntity,
    E::Model: FromQueryResult + Send + Sync,
    C: ConnectionTrait,
{
    let mut query = select::<E>(scope);
    for (column, value) in filters {
        query = query.filter(column.eq(value));
    }
    query.count(conn).await
}

/// Parameters for [`list`]: equality filters, substring search, ordering,
/// pagination.
pub struct ListParams<E: TenantScopedEntity> {
    pub filters: Vec<(E::Column, Value)>,
    pub search: Option<String>,
    pub order_by: Option<E::Column>,
    pub order_desc: bool,
    pub pagination: PaginationInput,
}

impl<E: TenantScopedEntity> Default for ListParams<E> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            search: None,
            // Most-recently-created first unless the caller says otherwise.
            order_by: None,
            order_desc: true,
            pagination: PaginationInput::default(),
        }
    }
}

impl<E: TenantScopedEntity> ListParams<E> {
    pub fn filter(mut self, column: E::Column, value: impl Into<Value>) -> Self {
        self.filters.push((column, value.into()));
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    pub fn order_by(mut self, column: E::Column, desc: bool) -> Self {
        self.order_by = Some(column);
        self.order_desc = desc;
        self
    }

    pub fn paginate(mut self, pagination: PaginationInput) -> Self {
        self.pagination = pagination;
        self
    }
}

/// List rows in one tenant scope with the total count computed independently
/// of the pagination window.
pub async fn list<E, C>(
    conn: &C,
    scope: TenantScope,
    params: ListParams<E>,
) -> Result<(Vec<E::Model>, u64), DbErr>
where
    E: TenantScopedEntity,
    E::Model: FromQueryResult + Send + Sync,
    C: ConnectionTrait,
{
    let mut query = select::<E>(scope);

    for (column, value) in params.filters {
        query = query.filter(column.eq(value));
    }

    if let Some(ref needle) = params.search {
        let searchable = E::search_columns();
        if !searchable.is_empty() {
            let mut any = Condition::any();
            for column in searchable {
                any = any.add(column.contains(needle));
            }
            query = query.filter(any);
        }
    }

    let total = query.clone().count(conn).await?;

    let order_column = params.order_by.unwrap_or_else(E::created_at_col);
    query = if params.order_desc {
        query.order_by_desc(order_column)
    } else {
        query.order_by_asc(order_column)
    };

    let items = query
        .offset(params.pagination.offset())
        .limit(params.pagination.limit())
        .all(conn)
        .await?;

    Ok((items, total))
}
