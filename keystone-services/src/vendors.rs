//! Vendor service: tenant-scoped vendor management

use keystone_api_types::{ApiError, ApiResult, ListResponse, TenantScope};
use keystone_storage::entities::{Vendor, Vendors};
use keystone_storage::repositories::{NewVendor, RepositoryFactory, VendorPatch};
use keystone_storage::ListParams;
use tracing::info;

#[derive(Clone)]
pub struct VendorService {
    repos: RepositoryFactory,
}

impl VendorService {
    pub fn new(repos: RepositoryFactory) -> Self {
        Self { repos }
    }

    pub async fn create_vendor(&self, scope: TenantScope, new: NewVendor) -> ApiResult<Vendor> {
        if self
            .repos
            .vendors
            .code_exists(scope, &new.vendor_code, None)
            .await?
        {
            return Err(ApiError::conflict("Vendor", &new.vendor_code));
        }

        let vendor = self.repos.vendors.create(scope, new).await?;
        info!(%scope, vendor_id = vendor.id, code = %vendor.vendor_code, "vendor created");
        Ok(vendor)
    }

    pub async fn get_vendor(&self, scope: TenantScope, id: i32) -> ApiResult<Vendor> {
        self.repos
            .vendors
            .find_by_id(scope, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Vendor", id))
    }

    pub async fn list_vendors(
        &self,
        scope: TenantScope,
        params: ListParams<Vendors>,
    ) -> ApiResult<ListResponse<Vendor>> {
        let pagination = params.pagination;
        let (items, total) = self.repos.vendors.list(scope, params).await?;
        Ok(ListResponse::new(items, total, pagination))
    }

    pub async fn update_vendor(
        &self,
        scope: TenantScope,
        id: i32,
        patch: VendorPatch,
    ) -> ApiResult<Vendor> {
        self.repos
            .vendors
            .update(scope, id, patch)
            .await?
            .ok_or_else(|| ApiError::not_found("Vendor", id))
    }

    /// Deactivate a vendor. Refused while the vendor still has leases on
    /// record, terminated ones included; lease history must stay attached
    /// to a live vendor row.
    pub async fn delete_vendor(&self, scope: TenantScope, id: i32) -> ApiResult<()> {
        let vendor = self.get_vendor(scope, id).await?;
        let leases = self
            .repos
            .leases
            .vendor_lease_count(scope, vendor.id)
            .await?;
        if leases > 0 {
            return Err(ApiError::validation(
                "vendor has leases on record and cannot be removed",
            ));
        }

        self.repos
            .vendors
            .update(
                scope,
                id,
                VendorPatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await?;
        info!(%scope, vendor_id = id, "vendor deactivated");
        Ok(())
    }
}
