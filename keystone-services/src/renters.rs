//! Renter service: renters, contacts, and KYC document workflow
//!
//! Document mutations re-derive the renter's KYC status inside the same
//! transaction (derive, compare against the stored value, persist only on
//! change).

use chrono::Utc;
use keystone_api_types::{ApiError, ApiResult, ListResponse, TenantScope};
use keystone_storage::entities::{
    DocumentVerificationStatus, KycStatus, Renter, RenterContact, RenterDocument, Renters,
};
use keystone_storage::repositories::{
    ContactPatch, NewContact, NewDocument, NewRenter, RenterPatch, RepositoryFactory,
};
use keystone_storage::{DatabaseError, ListParams, TransactionTrait};
use sea_orm::ConnectionTrait;
use tracing::info;

use crate::kyc::derive_kyc_status;

#[derive(Clone)]
pub struct RenterService {
    repos: RepositoryFactory,
}

impl RenterService {
    pub fn new(repos: RepositoryFactory) -> Self {
        Self { repos }
    }

    pub async fn create_renter(&self, scope: TenantScope, new: NewRenter) -> ApiResult<Renter> {
        if self
            .repos
            .renters
            .code_exists(scope, &new.tenant_code, None)
            .await?
        {
            return Err(ApiError::conflict("Renter", &new.tenant_code));
        }

        let renter = self.repos.renters.create(scope, new).await?;
        info!(%scope, renter_id = renter.id, code = %renter.tenant_code, "renter created");
        Ok(renter)
    }

    pub async fn get_renter(&self, scope: TenantScope, id: i32) -> ApiResult<Renter> {
        self.repos
            .renters
            .find_by_id(scope, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Renter", id))
    }

    pub async fn list_renters(
        &self,
        scope: TenantScope,
        params: ListParams<Renters>,
    ) -> ApiResult<ListResponse<Renter>> {
        let pagination = params.pagination;
        let (items, total) = self.repos.renters.list(scope, params).await?;
        Ok(ListResponse::new(items, total, pagination))
    }

    pub async fn update_renter(
        &self,
        scope: TenantScope,
        id: i32,
        patch: RenterPatch,
    ) -> ApiResult<Renter> {
        self.repos
            .renters
            .update(scope, id, patch)
            .await?
            .ok_or_else(|| ApiError::not_found("Renter", id))
    }

    // --- contacts ---

    pub async fn add_contact(
        &self,
        scope: TenantScope,
        new: NewContact,
    ) -> ApiResult<RenterContact> {
        self.get_renter(scope, new.renter_id).await?;
        Ok(self.repos.renters.add_contact(scope, new).await?)
    }

    pub async fn list_contacts(
        &self,
        scope: TenantScope,
        renter_id: i32,
    ) -> ApiResult<Vec<RenterContact>> {
        self.get_renter(scope, renter_id).await?;
        Ok(self.repos.renters.list_contacts(scope, renter_id).await?)
    }

    pub async fn update_contact(
        &self,
        scope: TenantScope,
        contact_id: i32,
        patch: ContactPatch,
    ) -> ApiResult<RenterContact> {
        self.repos
            .renters
            .update_contact(scope, contact_id, patch)
            .await?
            .ok_or_else(|| ApiError::not_found("Renter contact", contact_id))
    }

    pub async fn remove_contact(&self, scope: TenantScope, contact_id: i32) -> ApiResult<()> {
        if !self.repos.renters.remove_contact(scope, contact_id).await? {
            return Err(ApiError::not_found("Renter contact", contact_id));
        }
        Ok(())
    }

    // --- documents ---

    /// Upload a document. The document type must be active and applicable
    /// to the renter's type; the renter's KYC status is re-derived (a first
    /// upload moves PENDING to IN_PROGRESS).
    pub async fn add_document(
        &self,
        scope: TenantScope,
        new: NewDocument,
    ) -> ApiResult<RenterDocument> {
        let renter = self.get_renter(scope, new.renter_id).await?;
        let doc_type = self
            .repos
            .catalog
            .find_document_type_by_id(new.document_type_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| ApiError::not_found("Document type", new.document_type_id))?;
        if let Some(applicable_to) = doc_type.applicable_to {
            if applicable_to != renter.renter_type {
                return Err(ApiError::validation(format!(
                    "document type '{}' does not apply to this renter",
                    doc_type.code
                )));
            }
        }

        let conn = self.repos.database().get_connection();
        let txn = conn.begin().await.map_err(DatabaseError::from)?;
        let document = self.repos.renters.add_document_in(&txn, scope, new).await?;
        self.refresh_kyc(&txn, scope, &renter).await?;
        txn.commit().await.map_err(DatabaseError::from)?;

        info!(%scope, renter_id = renter.id, document_id = document.id, "renter document added");
        Ok(document)
    }

    pub async fn list_documents(
        &self,
        scope: TenantScope,
        renter_id: i32,
    ) -> ApiResult<Vec<RenterDocument>> {
        self.get_renter(scope, renter_id).await?;
        Ok(self.repos.renters.list_documents(scope, renter_id).await?)
    }

    pub async fn verify_document(
        &self,
        scope: TenantScope,
        document_id: i32,
    ) -> ApiResult<RenterDocument> {
        self.review_document(scope, document_id, DocumentVerificationStatus::Verified, None)
            .await
    }

    pub async fn reject_document(
        &self,
        scope: TenantScope,
        document_id: i32,
        reason: String,
    ) -> ApiResult<RenterDocument> {
        self.review_document(
            scope,
            document_id,
            DocumentVerificationStatus::Rejected,
            Some(reason),
        )
        .await
    }

    async fn review_document(
        &self,
        scope: TenantScope,
        document_id: i32,
        status: DocumentVerificationStatus,
        rejection_reason: Option<String>,
    ) -> ApiResult<RenterDocument> {
        let existing = self
            .repos
            .renters
            .find_document(scope, document_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Renter document", document_id))?;
        let renter = self.get_renter(scope, existing.renter_id).await?;

        let conn = self.repos.database().get_connection();
        let txn = conn.begin().await.map_err(DatabaseError::from)?;
        let document = self
            .repos
            .renters
            .set_document_status_in(&txn, scope, document_id, status, rejection_reason)
            .await?
            .ok_or_else(|| ApiError::not_found("Renter document", document_id))?;
        self.refresh_kyc(&txn, scope, &renter).await?;
        txn.commit().await.map_err(DatabaseError::from)?;

        info!(
            %scope,
            renter_id = renter.id,
            document_id,
            status = ?document.verification_status,
            "renter document reviewed"
        );
        Ok(document)
    }

    /// Derive the renter's KYC status from their current documents and
    /// persist it when it differs from the stored value.
    async fn refresh_kyc<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        renter: &Renter,
    ) -> ApiResult<()> {
        let documents = self
            .repos
            .renters
            .list_documents_in(conn, scope, renter.id)
            .await?;
        let mandatory: Vec<i32> = self
            .repos
            .catalog
            .mandatory_document_types(renter.renter_type)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();

        let now = Utc::now();
        let derived = derive_kyc_status(&documents, &mandatory, now.date_naive());
        if derived != renter.kyc_status {
            let verified_at = match derived {
                KycStatus::Verified => Some(now),
                _ => None,
            };
            self.repos
                .renters
                .set_kyc_status_in(conn, scope, renter.id, derived, verified_at)
                .await?;
        }
        Ok(())
    }
}
