//! Vendor lease repository: leases, terms, and coverages
//!
//! The lease lifecycle (activation, termination, amendment rules) lives in
//! the leasing service. This layer moves rows; methods that take part in
//! multi-row lifecycle steps accept a generic connection so the service can
//! run them in one transaction.

use chrono::{NaiveDate, Utc};
use keystone_api_types::TenantScope;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::allocator;
use crate::connection::{DatabaseConnection, DatabaseError};
use crate::entities::{
    BillingCycle, CoverageScope, LeaseCoverage, LeaseCoverageActiveModel, LeaseCoverageColumn,
    LeaseCoverages, LeaseStatus, LeaseTerm, LeaseTermActiveModel, LeaseTermColumn, LeaseTerms,
    VendorLease, VendorLeaseActiveModel, VendorLeaseColumn, VendorLeases,
};
use crate::repositories::Repository;
use crate::scoped::{self, ListParams};

#[derive(Debug, Clone)]
pub struct NewLease {
    pub vendor_id: i32,
    pub lease_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_amount: Decimal,
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub security_deposit: Option<Decimal>,
    pub notes: Option<String>,
}

/// Partial update of lease commercial fields; None leaves the field
/// unchanged. Only DRAFT leases accept this, enforced by the service.
#[derive(Debug, Clone, Default)]
pub struct LeasePatch {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub rent_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub billing_cycle: Option<BillingCycle>,
    pub security_deposit: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTerm {
    pub lease_id: i32,
    pub term_number: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_amount: Decimal,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCoverage {
    pub lease_id: i32,
    pub scope_type: CoverageScope,
    pub property_id: i32,
    pub unit_id: Option<i32>,
}

#[derive(Clone)]
pub struct LeaseRepository {
    db: DatabaseConnection,
}

impl LeaseRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        scope: TenantScope,
        new: NewLease,
    ) -> Result<VendorLease, DatabaseError> {
        let now = Utc::now();
        allocator::insert_with_retry::<VendorLeaseActiveModel, _, _>(
            self.db.get_connection(),
            scope,
            |id| VendorLeaseActiveModel {
                account_id: Set(scope.account_id),
                company_id: Set(scope.company_id),
                id: Set(id),
                uuid: Set(Uuid::new_v4()),
                vendor_id: Set(new.vendor_id),
                lease_code: Set(new.lease_code.clone()),
                start_date: Set(new.start_date),
                end_date: Set(new.end_date),
                rent_amount: Set(new.rent_amount),
                currency: Set(new.currency.clone()),
                billing_cycle: Set(new.billing_cycle),
                security_deposit: Set(new.security_deposit),
                status: Set(LeaseStatus::Draft),
                termination_reason: Set(None),
                notes: Set(new.notes.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            },
        )
        .await
    }

    pub async fn find_by_id(
        &self,
        scope: TenantScope,
        id: i32,
    ) -> Result<Option<VendorLease>, DatabaseError> {
        self.find_by_id_in(self.db.get_connection(), scope, id).await
    }

    pub async fn find_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        id: i32,
    ) -> Result<Option<VendorLease>, DatabaseError> {
        Ok(scoped::get::<VendorLeases, _>(conn, scope, id).await?)
    }

    pub async fn find_by_uuid(
        &self,
        scope: TenantScope,
        uuid: Uuid,
    ) -> Result<Option<VendorLease>, DatabaseError> {
        Ok(scoped::get_by_uuid::<VendorLeases, _>(self.db.get_connection(), scope, uuid).await?)
    }

    pub async fn code_exists(
        &self,
        scope: TenantScope,
        code: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, DatabaseError> {
        let mut query =
            scoped::select::<VendorLeases>(scope).filter(VendorLeaseColumn::LeaseCode.eq(code));
        if let Some(id) = exclude_id {
            query = query.filter(VendorLeaseColumn::Id.ne(id));
        }
        Ok(query.one(self.db.get_connection()).await?.is_some())
    }

    pub async fn list(
        &self,
        scope: TenantScope,
        params: ListParams<VendorLeases>,
    ) -> Result<(Vec<VendorLease>, u64), DatabaseError> {
        Ok(scoped::list(self.db.get_connection(), scope, params).await?)
    }

    pub async fn vendor_lease_count(
        &self,
        scope: TenantScope,
        vendor_id: i32,
    ) -> Result<u64, DatabaseError> {
        Ok(scoped::count::<VendorLeases, _>(
            self.db.get_connection(),
            scope,
            vec![(VendorLeaseColumn::VendorId, vendor_id.into())],
        )
        .await?)
    }

    pub async fn update(
        &self,
        scope: TenantScope,
        id: i32,
        patch: LeasePatch,
    ) -> Result<Option<VendorLease>, DatabaseError> {
        let Some(existing) = self.find_by_id(scope, id).await? else {
            return Ok(None);
        };

        let mut model: VendorLeaseActiveModel = existing.into();
        if let Some(v) = patch.start_date {
            model.start_date = Set(v);
        }
        if let Some(v) = patch.end_date {
            model.end_date = Set(v);
        }
        if let Some(v) = patch.rent_amount {
            model.rent_amount = Set(v);
        }
        if let Some(v) = patch.currency {
            model.currency = Set(v);
        }
        if let Some(v) = patch.billing_cycle {
            model.billing_cycle = Set(v);
        }
        if let Some(v) = patch.security_deposit {
            model.security_deposit = Set(Some(v));
        }
        if let Some(v) = patch.notes {
            model.notes = Set(Some(v));
        }
        model.updated_at = Set(Utc::now());

        Ok(Some(model.update(self.db.get_connection()).await?))
    }

    pub async fn set_status_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        id: i32,
        status: LeaseStatus,
        termination_reason: Option<String>,
    ) -> Result<Option<VendorLease>, DatabaseError> {
        let Some(existing) = self.find_by_id_in(conn, scope, id).await? else {
            return Ok(None);
        };

        let mut model: VendorLeaseActiveModel = existing.into();
        model.status = Set(status);
        if termination_reason.is_some() {
            model.termination_reason = Set(termination_reason);
        }
        model.updated_at = Set(Utc::now());
        Ok(Some(model.update(conn).await?))
    }

    /// Sync the lease's commercial snapshot after a term is recorded: the
    /// end date only ever extends, the rent follows the newest term.
    pub async fn apply_term_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        id: i32,
        end_date: NaiveDate,
        rent_amount: Decimal,
    ) -> Result<Option<VendorLease>, DatabaseError> {
        let Some(existing) = self.find_by_id_in(conn, scope, id).await? else {
            return Ok(None);
        };

        let mut model: VendorLeaseActiveModel = existing.clone().into();
        if end_date > existing.end_date {
            model.end_date = Set(end_date);
        }
        model.rent_amount = Set(rent_amount);
        model.updated_at = Set(Utc::now());
        Ok(Some(model.update(conn).await?))
    }

    /// Hard delete of a lease with its terms and coverages. Lifecycle
    /// preconditions are the service's job.
    pub async fn delete_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        id: i32,
    ) -> Result<bool, DatabaseError> {
        LeaseCoverages::delete_many()
            .filter(LeaseCoverageColumn::AccountId.eq(scope.account_id))
            .filter(LeaseCoverageColumn::CompanyId.eq(scope.company_id))
            .filter(LeaseCoverageColumn::LeaseId.eq(id))
            .exec(conn)
            .await?;
        LeaseTerms::delete_many()
            .filter(LeaseTermColumn::AccountId.eq(scope.account_id))
            .filter(LeaseTermColumn::CompanyId.eq(scope.company_id))
            .filter(LeaseTermColumn::LeaseId.eq(id))
            .exec(conn)
            .await?;

        let result = VendorLeases::delete_many()
            .filter(VendorLeaseColumn::AccountId.eq(scope.account_id))
            .filter(VendorLeaseColumn::CompanyId.eq(scope.company_id))
            .filter(VendorLeaseColumn::Id.eq(id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    // --- terms ---

    pub async fn create_term_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        new: NewTerm,
    ) -> Result<LeaseTerm, DatabaseError> {
        let now = Utc::now();
        allocator::insert_with_retry::<LeaseTermActiveModel, _, _>(conn, scope, |id| {
            LeaseTermActiveModel {
                account_id: Set(scope.account_id),
                company_id: Set(scope.company_id),
                id: Set(id),
                uuid: Set(Uuid::new_v4()),
                lease_id: Set(new.lease_id),
                term_number: Set(new.term_number),
                start_date: Set(new.start_date),
                end_date: Set(new.end_date),
                rent_amount: Set(new.rent_amount),
                reason: Set(new.reason.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            }
        })
        .await
    }

    /// Highest term number on the lease, 0 when the lease has no terms yet.
    /// Term numbers are contiguous, so the next term is always max + 1.
    pub async fn max_term_number_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        lease_id: i32,
    ) -> Result<i32, DatabaseError> {
        let max: Option<Option<i32>> = scoped::select::<LeaseTerms>(scope)
            .filter(LeaseTermColumn::LeaseId.eq(lease_id))
            .select_only()
            .column_as(LeaseTermColumn::TermNumber.max(), "max_term")
            .into_tuple()
            .one(conn)
            .await?;
        Ok(max.flatten().unwrap_or(0))
    }

    pub async fn list_terms(
        &self,
        scope: TenantScope,
        lease_id: i32,
    ) -> Result<Vec<LeaseTerm>, DatabaseError> {
        Ok(scoped::select::<LeaseTerms>(scope)
            .filter(LeaseTermColumn::LeaseId.eq(lease_id))
            .order_by_asc(LeaseTermColumn::TermNumber)
            .all(self.db.get_connection())
            .await?)
    }

    // --- coverages ---

    pub async fn add_coverage_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        new: NewCoverage,
    ) -> Result<LeaseCoverage, DatabaseError> {
        let now = Utc::now();
        allocator::insert_with_retry::<LeaseCoverageActiveModel, _, _>(conn, scope, |id| {
            LeaseCoverageActiveModel {
                account_id: Set(scope.account_id),
                company_id: Set(scope.company_id),
                id: Set(id),
                uuid: Set(Uuid::new_v4()),
                lease_id: Set(new.lease_id),
                scope_type: Set(new.scope_type),
                property_id: Set(new.property_id),
                unit_id: Set(new.unit_id),
                created_at: Set(now),
                updated_at: Set(now),
            }
        })
        .await
    }

    pub async fn find_coverage(
        &self,
        scope: TenantScope,
        id: i32,
    ) -> Result<Option<LeaseCoverage>, DatabaseError> {
        Ok(scoped::get::<LeaseCoverages, _>(self.db.get_connection(), scope, id).await?)
    }

    pub async fn list_coverages(
        &self,
        scope: TenantScope,
        lease_id: i32,
    ) -> Result<Vec<LeaseCoverage>, DatabaseError> {
        Ok(scoped::select::<LeaseCoverages>(scope)
            .filter(LeaseCoverageColumn::LeaseId.eq(lease_id))
            .order_by_asc(LeaseCoverageColumn::Id)
            .all(self.db.get_connection())
            .await?)
    }

    pub async fn coverage_count_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        lease_id: i32,
    ) -> Result<u64, DatabaseError> {
        Ok(scoped::select::<LeaseCoverages>(scope)
            .filter(LeaseCoverageColumn::LeaseId.eq(lease_id))
            .count(conn)
            .await?)
    }

    /// Whether the lease already covers this exact target.
    pub async fn coverage_exists(
        &self,
        scope: TenantScope,
        lease_id: i32,
        property_id: i32,
        unit_id: Option<i32>,
    ) -> Result<bool, DatabaseError> {
        let mut query = scoped::select::<LeaseCoverages>(scope)
            .filter(LeaseCoverageColumn::LeaseId.eq(lease_id))
            .filter(LeaseCoverageColumn::PropertyId.eq(property_id));
        query = match unit_id {
            Some(unit_id) => query.filter(LeaseCoverageColumn::UnitId.eq(unit_id)),
            None => query.filter(LeaseCoverageColumn::UnitId.is_null()),
        };
        Ok(query.one(self.db.get_connection()).await?.is_some())
    }

    pub async fn remove_coverage_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        id: i32,
    ) -> Result<bool, DatabaseError> {
        let result = LeaseCoverages::delete_many()
            .filter(LeaseCoverageColumn::AccountId.eq(scope.account_id))
            .filter(LeaseCoverageColumn::CompanyId.eq(scope.company_id))
            .filter(LeaseCoverageColumn::Id.eq(id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Whether any non-terminated lease covers the unit. Blocks unit
    /// deletion.
    pub async fn unit_has_open_lease(
        &self,
        scope: TenantScope,
        unit_id: i32,
    ) -> Result<bool, DatabaseError> {
        let lease_ids: Vec<i32> = scoped::select::<LeaseCoverages>(scope)
            .filter(LeaseCoverageColumn::UnitId.eq(unit_id))
            .select_only()
            .column(LeaseCoverageColumn::LeaseId)
            .into_tuple()
            .all(self.db.get_connection())
            .await?;
        if lease_ids.is_empty() {
            return Ok(false);
        }

        let open = scoped::select::<VendorLeases>(scope)
            .filter(VendorLeaseColumn::Id.is_in(lease_ids))
            .filter(VendorLeaseColumn::Status.ne(LeaseStatus::Terminated))
            .count(self.db.get_connection())
            .await?;
        Ok(open > 0)
    }
}

#[async_trait::async_trait(?Send)]
impl Repository for LeaseRepository {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        VendorLeases::find()
            .limit(1)
            .all(self.db.get_connection())
            .await?;
        Ok(())
    }
}
