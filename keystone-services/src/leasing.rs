//! Vendor lease lifecycle
//!
//! Status flow is DRAFT → ACTIVE → TERMINATED. Drafts are freely editable
//! and deletable; activation freezes the commercial terms into term 1 and
//! further changes arrive as numbered amendment terms. Coverages bind a
//! lease to a property or a unit, mutually exclusive per row.

use chrono::NaiveDate;
use keystone_api_types::{ApiError, ApiResult, ListResponse, TenantScope};
use keystone_storage::entities::{
    CoverageScope, LeaseCoverage, LeaseStatus, LeaseTerm, VendorLease, VendorLeases,
};
use keystone_storage::repositories::{
    LeasePatch, NewCoverage, NewLease, NewTerm, RepositoryFactory,
};
use keystone_storage::{DatabaseError, ListParams, TransactionTrait};
use rust_decimal::Decimal;
use tracing::info;

/// An amendment term. `term_number` must be exactly one past the current
/// highest; the gap-free sequence doubles as the amendment history order.
#[derive(Debug, Clone)]
pub struct AddTerm {
    pub term_number: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_amount: Decimal,
    pub reason: Option<String>,
}

/// Coverage target: a whole property or a single unit.
#[derive(Debug, Clone)]
pub struct CoverageInput {
    pub scope_type: CoverageScope,
    pub property_id: Option<i32>,
    pub unit_id: Option<i32>,
}

#[derive(Clone)]
pub struct LeasingService {
    repos: RepositoryFactory,
}

impl LeasingService {
    pub fn new(repos: RepositoryFactory) -> Self {
        Self { repos }
    }

    pub async fn create_lease(&self, scope: TenantScope, new: NewLease) -> ApiResult<VendorLease> {
        self.repos
            .vendors
            .find_by_id(scope, new.vendor_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Vendor", new.vendor_id))?;

        if self
            .repos
            .leases
            .code_exists(scope, &new.lease_code, None)
            .await?
        {
            return Err(ApiError::conflict("Lease", &new.lease_code));
        }
        Self::check_dates(new.start_date, new.end_date)?;

        let lease = self.repos.leases.create(scope, new).await?;
        info!(%scope, lease_id = lease.id, code = %lease.lease_code, "lease created");
        Ok(lease)
    }

    pub async fn get_lease(&self, scope: TenantScope, id: i32) -> ApiResult<VendorLease> {
        self.repos
            .leases
            .find_by_id(scope, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Lease", id))
    }

    pub async fn list_leases(
        &self,
        scope: TenantScope,
        params: ListParams<VendorLeases>,
    ) -> ApiResult<ListResponse<VendorLease>> {
        let pagination = params.pagination;
        let (items, total) = self.repos.leases.list(scope, params).await?;
        Ok(ListResponse::new(items, total, pagination))
    }

    pub async fn update_lease(
        &self,
        scope: TenantScope,
        id: i32,
        patch: LeasePatch,
    ) -> ApiResult<VendorLease> {
        let lease = self.get_lease(scope, id).await?;
        if lease.status != LeaseStatus::Draft {
            return Err(ApiError::validation("only DRAFT leases can be updated"));
        }

        let start = patch.start_date.unwrap_or(lease.start_date);
        let end = patch.end_date.unwrap_or(lease.end_date);
        Self::check_dates(start, end)?;

        self.repos
            .leases
            .update(scope, id, patch)
            .await?
            .ok_or_else(|| ApiError::not_found("Lease", id))
    }

    /// Activate a draft: requires at least one coverage, creates term 1
    /// from the lease's own dates and rent.
    pub async fn activate_lease(&self, scope: TenantScope, id: i32) -> ApiResult<VendorLease> {
        let lease = self.get_lease(scope, id).await?;
        if lease.status != LeaseStatus::Draft {
            return Err(ApiError::validation("only DRAFT leases can be activated"));
        }

        let conn = self.repos.database().get_connection();
        if self.repos.leases.coverage_count_in(conn, scope, id).await? == 0 {
            return Err(ApiError::validation(
                "lease must cover at least one property or unit before activation",
            ));
        }

        let txn = conn.begin().await.map_err(DatabaseError::from)?;
        self.repos
            .leases
            .create_term_in(
                &txn,
                scope,
                NewTerm {
                    lease_id: lease.id,
                    term_number: 1,
                    start_date: lease.start_date,
                    end_date: lease.end_date,
                    rent_amount: lease.rent_amount,
                    reason: Some("Initial term".to_string()),
                },
            )
            .await?;
        let activated = self
            .repos
            .leases
            .set_status_in(&txn, scope, id, LeaseStatus::Active, None)
            .await?
            .ok_or_else(|| ApiError::not_found("Lease", id))?;
        txn.commit().await.map_err(DatabaseError::from)?;

        info!(%scope, lease_id = id, "lease activated");
        Ok(activated)
    }

    /// Record an amendment term on an active lease. Extends the lease end
    /// date when the term reaches past it and moves the rent snapshot to
    /// the term's rent.
    pub async fn add_term(
        &self,
        scope: TenantScope,
        lease_id: i32,
        input: AddTerm,
    ) -> ApiResult<LeaseTerm> {
        let lease = self.get_lease(scope, lease_id).await?;
        if lease.status != LeaseStatus::Active {
            return Err(ApiError::validation("only ACTIVE leases accept new terms"));
        }
        Self::check_dates(input.start_date, input.end_date)?;

        let conn = self.repos.database().get_connection();
        let expected = self
            .repos
            .leases
            .max_term_number_in(conn, scope, lease_id)
            .await?
            + 1;
        if input.term_number != expected {
            return Err(ApiError::validation(format!(
                "term number must be {expected}; terms are numbered without gaps"
            )));
        }

        let txn = conn.begin().await.map_err(DatabaseError::from)?;
        let term = self
            .repos
            .leases
            .create_term_in(
                &txn,
                scope,
                NewTerm {
                    lease_id,
                    term_number: input.term_number,
                    start_date: input.start_date,
                    end_date: input.end_date,
                    rent_amount: input.rent_amount,
                    reason: input.reason,
                },
            )
            .await?;
        self.repos
            .leases
            .apply_term_in(&txn, scope, lease_id, input.end_date, input.rent_amount)
            .await?;
        txn.commit().await.map_err(DatabaseError::from)?;

        info!(%scope, lease_id, term_number = term.term_number, "lease term added");
        Ok(term)
    }

    pub async fn list_terms(&self, scope: TenantScope, lease_id: i32) -> ApiResult<Vec<LeaseTerm>> {
        self.get_lease(scope, lease_id).await?;
        Ok(self.repos.leases.list_terms(scope, lease_id).await?)
    }

    /// Attach a coverage to a DRAFT or ACTIVE lease. A PROPERTY coverage
    /// names a property and no unit; a UNIT coverage names a unit and
    /// derives the owning property from it.
    pub async fn add_coverage(
        &self,
        scope: TenantScope,
        lease_id: i32,
        input: CoverageInput,
    ) -> ApiResult<LeaseCoverage> {
        let lease = self.get_lease(scope, lease_id).await?;
        if lease.status == LeaseStatus::Terminated {
            return Err(ApiError::validation(
                "terminated leases cannot gain coverage",
            ));
        }

        let (property_id, unit_id) = match input.scope_type {
            CoverageScope::Property => {
                if input.unit_id.is_some() {
                    return Err(ApiError::validation(
                        "property coverage must not name a unit",
                    ));
                }
                let property_id = input
                    .property_id
                    .ok_or_else(|| ApiError::validation("property coverage requires a property"))?;
                self.repos
                    .properties
                    .find_by_id(scope, property_id)
                    .await?
                    .ok_or_else(|| ApiError::not_found("Property", property_id))?;
                (property_id, None)
            }
            CoverageScope::Unit => {
                let unit_id = input
                    .unit_id
                    .ok_or_else(|| ApiError::validation("unit coverage requires a unit"))?;
                let unit = self
                    .repos
                    .units
                    .find_by_id(scope, unit_id)
                    .await?
                    .ok_or_else(|| ApiError::not_found("Unit", unit_id))?;
                if let Some(property_id) = input.property_id {
                    if property_id != unit.property_id {
                        return Err(ApiError::validation(
                            "unit does not belong to the given property",
                        ));
                    }
                }
                (unit.property_id, Some(unit_id))
            }
        };

        if self
            .repos
            .leases
            .coverage_exists(scope, lease_id, property_id, unit_id)
            .await?
        {
            return Err(ApiError::validation(
                "coverage for this target already exists on the lease",
            ));
        }

        let conn = self.repos.database().get_connection();
        let coverage = self
            .repos
            .leases
            .add_coverage_in(
                conn,
                scope,
                NewCoverage {
                    lease_id,
                    scope_type: input.scope_type,
                    property_id,
                    unit_id,
                },
            )
            .await?;
        info!(%scope, lease_id, coverage_id = coverage.id, "lease coverage added");
        Ok(coverage)
    }

    pub async fn list_coverages(
        &self,
        scope: TenantScope,
        lease_id: i32,
    ) -> ApiResult<Vec<LeaseCoverage>> {
        self.get_lease(scope, lease_id).await?;
        Ok(self.repos.leases.list_coverages(scope, lease_id).await?)
    }

    /// Remove a coverage from a DRAFT lease. Active leases keep their
    /// coverage history immutable.
    pub async fn remove_coverage(
        &self,
        scope: TenantScope,
        lease_id: i32,
        coverage_id: i32,
    ) -> ApiResult<()> {
        let lease = self.get_lease(scope, lease_id).await?;
        if lease.status != LeaseStatus::Draft {
            return Err(ApiError::validation(
                "coverage can only be removed from DRAFT leases",
            ));
        }

        let coverage = self
            .repos
            .leases
            .find_coverage(scope, coverage_id)
            .await?
            .filter(|c| c.lease_id == lease_id)
            .ok_or_else(|| ApiError::not_found("Lease coverage", coverage_id))?;

        self.repos
            .leases
            .remove_coverage_in(self.repos.database().get_connection(), scope, coverage.id)
            .await?;
        Ok(())
    }

    pub async fn terminate_lease(
        &self,
        scope: TenantScope,
        id: i32,
        reason: String,
    ) -> ApiResult<VendorLease> {
        let lease = self.get_lease(scope, id).await?;
        if lease.status != LeaseStatus::Active {
            return Err(ApiError::validation("only ACTIVE leases can be terminated"));
        }

        let terminated = self
            .repos
            .leases
            .set_status_in(
                self.repos.database().get_connection(),
                scope,
                id,
                LeaseStatus::Terminated,
                Some(reason),
            )
            .await?
            .ok_or_else(|| ApiError::not_found("Lease", id))?;
        info!(%scope, lease_id = id, "lease terminated");
        Ok(terminated)
    }

    /// Delete a DRAFT or TERMINATED lease with its terms and coverages.
    /// Active leases must be terminated first.
    pub async fn delete_lease(&self, scope: TenantScope, id: i32) -> ApiResult<()> {
        let lease = self.get_lease(scope, id).await?;
        if lease.status == LeaseStatus::Active {
            return Err(ApiError::validation("ACTIVE leases cannot be deleted"));
        }

        let conn = self.repos.database().get_connection();
        let txn = conn.begin().await.map_err(DatabaseError::from)?;
        self.repos.leases.delete_in(&txn, scope, id).await?;
        txn.commit().await.map_err(DatabaseError::from)?;
        info!(%scope, lease_id = id, "lease deleted");
        Ok(())
    }

    fn check_dates(start: NaiveDate, end: NaiveDate) -> ApiResult<()> {
        if end < start {
            return Err(ApiError::validation(
                "lease end date must not precede its start date",
            ));
        }
        Ok(())
    }
}
