//! Tenant-local id allocation
//!
//! Row ids are unique only within one `(account_id, company_id)` scope and
//! are assigned as `COALESCE(MAX(id), 0) + 1` over that scope at insert
//! time. The read-then-insert pair is racy by nature; the composite primary
//! key turns a lost race into a unique-constraint violation, and
//! [`insert_with_retry`] re-allocates and re-inserts a bounded number of
//! times instead of surfacing the collision to the caller.

use crate::connection::DatabaseError;
use crate::scoped::{self, TenantScopedEntity};
use keystone_api_types::TenantScope;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityName,
    EntityTrait, IdenStatic, IntoActiveModel, QuerySelect,
};
use tracing::warn;

const MAX_INSERT_ATTEMPTS: usize = 3;

/// Next free tenant-local id for `E` in `scope`. Returns 1 for an empty
/// scope. The value is only as fresh as the read; pair it with a retrying
/// insert.
pub async fn next_id<E, C>(conn: &C, scope: TenantScope) -> Result<i32, DbErr>
where
    E: TenantScopedEntity,
    C: ConnectionTrait,
{
    let max: Option<Option<i32>> = scoped::select::<E>(scope)
        .select_only()
        .column_as(E::id_col().max(), "max_id")
        .into_tuple()
        .one(conn)
        .await?;

    Ok(max.flatten().unwrap_or(0) + 1)
}

/// Allocate an id, build the active model for it, and insert; on a
/// unique-constraint violation of the composite key (a concurrent create in
/// the same scope won the race), re-allocate and retry.
///
/// Only collisions on the composite primary key or the uuid secondary key
/// are retried. A violated business-key index means the row itself is a
/// duplicate; re-allocating an id cannot fix that, so it surfaces as
/// [`DatabaseError::UniqueViolation`] immediately.
pub async fn insert_with_retry<A, C, F>(
    conn: &C,
    scope: TenantScope,
    mut build: F,
) -> Result<<A::Entity as EntityTrait>::Model, DatabaseError>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    A::Entity: TenantScopedEntity,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
    F: FnMut(i32) -> A,
{
    let entity = <A::Entity>::default();
    let table = <A::Entity as EntityName>::table_name(&entity);
    let id_column = format!("{table}.{}", A::Entity::id_col().as_str());
    let uuid_column = format!("{table}.{}", A::Entity::uuid_col().as_str());

    let mut attempt = 0;
    loop {
        attempt += 1;
        let id = next_id::<A::Entity, C>(conn, scope).await?;

        match build(id).insert(conn).await {
            Ok(model) => return Ok(model),
            Err(err) => {
                let err = DatabaseError::DbError(err);
                let Some(columns) = err.unique_violation_columns() else {
                    return Err(err);
                };
                if columns.contains(&id_column) || columns.contains(&uuid_column) {
                    if attempt < MAX_INSERT_ATTEMPTS {
                        warn!(%scope, attempt, "tenant-local id collision on insert, retrying");
                        continue;
                    }
                    return Err(err);
                }
                return Err(DatabaseError::UniqueViolation {
                    constraint: columns.join(", "),
                });
            }
        }
    }
}
