//! Renter repository: renters, their contacts, and KYC documents

use chrono::{DateTime, NaiveDate, Utc};
use keystone_api_types::TenantScope;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::allocator;
use crate::connection::{DatabaseConnection, DatabaseError};
use crate::entities::{
    DocumentVerificationStatus, KycStatus, Renter, RenterActiveModel, RenterColumn, RenterContact,
    RenterContactActiveModel, RenterContactColumn, RenterContacts, RenterDocument,
    RenterDocumentActiveModel, RenterDocumentColumn, RenterDocuments, RenterStatus, RenterType,
    Renters,
};
use crate::repositories::Repository;
use crate::scoped::{self, ListParams};

#[derive(Debug, Clone)]
pub struct NewRenter {
    pub tenant_code: String,
    pub renter_type: RenterType,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RenterPatch {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<RenterStatus>,
}

#[derive(Debug, Clone)]
pub struct NewContact {
    pub renter_id: i32,
    pub full_name: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub renter_id: i32,
    pub document_type_id: i32,
    pub file_ref: Option<String>,
    pub issued_at: Option<NaiveDate>,
    pub expires_at: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct RenterRepository {
    db: DatabaseConnection,
}

impl RenterRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        scope: TenantScope,
        new: NewRenter,
    ) -> Result<Renter, DatabaseError> {
        let now = Utc::now();
        allocator::insert_with_retry::<RenterActiveModel, _, _>(
            self.db.get_connection(),
            scope,
            |id| RenterActiveModel {
                account_id: Set(scope.account_id),
                company_id: Set(scope.company_id),
                id: Set(id),
                uuid: Set(Uuid::new_v4()),
                tenant_code: Set(new.tenant_code.clone()),
                renter_type: Set(new.renter_type),
                display_name: Set(new.display_name.clone()),
                email: Set(new.email.clone()),
                phone: Set(new.phone.clone()),
                kyc_status: Set(KycStatus::NotStarted),
                kyc_verified_at: Set(None),
                status: Set(RenterStatus::Active),
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
    ) -> Result<Option<Renter>, DatabaseError> {
        self.find_by_id_in(self.db.get_connection(), scope, id).await
    }

    pub async fn find_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        id: i32,
    ) -> Result<Option<Renter>, DatabaseError> {
        Ok(scoped::get::<Renters, _>(conn, scope, id).await?)
    }

    pub async fn find_by_uuid(
        &self,
        scope: TenantScope,
        uuid: Uuid,
    ) -> Result<Option<Renter>, DatabaseError> {
        Ok(scoped::get_by_uuid::<Renters, _>(self.db.get_connection(), scope, uuid).await?)
    }

    pub async fn code_exists(
        &self,
        scope: TenantScope,
        code: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, DatabaseError> {
        let mut query =
            scoped::select::<Renters>(scope).filter(RenterColumn::TenantCode.eq(code));
        if let Some(id) = exclude_id {
            query = query.filter(RenterColumn::Id.ne(id));
        }
        Ok(query.one(self.db.get_connection()).await?.is_some())
    }

    pub async fn list(
        &self,
        scope: TenantScope,
        params: ListParams<Renters>,
    ) -> Result<(Vec<Renter>, u64), DatabaseError> {
        Ok(scoped::list(self.db.get_connection(), scope, params).await?)
    }

    pub async fn update(
        &self,
        scope: TenantScope,
        id: i32,
        patch: RenterPatch,
    ) -> Result<Option<Renter>, DatabaseError> {
        let Some(existing) = self.find_by_id(scope, id).await? else {
            return Ok(None);
        };

        let mut model: RenterActiveModel = existing.into();
        if let Some(v) = patch.display_name {
            model.display_name = Set(v);
        }
        if let Some(v) = patch.email {
            model.email = Set(Some(v));
        }
        if let Some(v) = patch.phone {
            model.phone = Set(Some(v));
        }
        if let Some(v) = patch.status {
            model.status = Set(v);
        }
        model.updated_at = Set(Utc::now());

        Ok(Some(model.update(self.db.get_connection()).await?))
    }

    /// Persist the derived KYC status. Only the KYC service calls this.
    pub async fn set_kyc_status_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        id: i32,
        status: KycStatus,
        verified_at: Option<DateTime<Utc>>,
    ) -> Result<(), DatabaseError> {
        let Some(existing) = self.find_by_id_in(conn, scope, id).await? else {
            return Ok(());
        };
        let mut model: RenterActiveModel = existing.into();
        model.kyc_status = Set(status);
        model.kyc_verified_at = Set(verified_at);
        model.updated_at = Set(Utc::now());
        model.update(conn).await?;
        Ok(())
    }

    // --- contacts ---

    /// Add a contact. A new primary contact demotes any existing primary in
    /// the same renter first.
    pub async fn add_contact(
        &self,
        scope: TenantScope,
        new: NewContact,
    ) -> Result<RenterContact, DatabaseError> {
        if new.is_primary {
            RenterContacts::update_many()
                .col_expr(RenterContactColumn::IsPrimary, Expr::value(false))
                .filter(RenterContactColumn::AccountId.eq(scope.account_id))
                .filter(RenterContactColumn::CompanyId.eq(scope.company_id))
                .filter(RenterContactColumn::RenterId.eq(new.renter_id))
                .filter(RenterContactColumn::IsPrimary.eq(true))
                .exec(self.db.get_connection())
                .await?;
        }

        let now = Utc::now();
        allocator::insert_with_retry::<RenterContactActiveModel, _, _>(
            self.db.get_connection(),
            scope,
            |id| RenterContactActiveModel {
                account_id: Set(scope.account_id),
                company_id: Set(scope.company_id),
                id: Set(id),
                uuid: Set(Uuid::new_v4()),
                renter_id: Set(new.renter_id),
                full_name: Set(new.full_name.clone()),
                role: Set(new.role.clone()),
                email: Set(new.email.clone()),
                phone: Set(new.phone.clone()),
                is_primary: Set(new.is_primary),
                created_at: Set(now),
                updated_at: Set(now),
            },
        )
        .await
    }

    pub async fn list_contacts(
        &self,
        scope: TenantScope,
        renter_id: i32,
    ) -> Result<Vec<RenterContact>, DatabaseError> {
        Ok(scoped::select::<RenterContacts>(scope)
            .filter(RenterContactColumn::RenterId.eq(renter_id))
            .order_by_desc(RenterContactColumn::IsPrimary)
            .order_by_asc(RenterContactColumn::FullName)
            .all(self.db.get_connection())
            .await?)
    }

    pub async fn find_contact(
        &self,
        scope: TenantScope,
        id: i32,
    ) -> Result<Option<RenterContact>, DatabaseError> {
        Ok(scoped::select::<RenterContacts>(scope)
            .filter(RenterContactColumn::Id.eq(id))
            .one(self.db.get_connection())
            .await?)
    }

    /// Update a contact. Promoting one to primary demotes the renter's
    /// current primary first, same as `add_contact`.
    pub async fn update_contact(
        &self,
        scope: TenantScope,
        id: i32,
        patch: ContactPatch,
    ) -> Result<Option<RenterContact>, DatabaseError> {
        let Some(existing) = self.find_contact(scope, id).await? else {
            return Ok(None);
        };

        if patch.is_primary == Some(true) && !existing.is_primary {
            RenterContacts::update_many()
                .col_expr(RenterContactColumn::IsPrimary, Expr::value(false))
                .filter(RenterContactColumn::AccountId.eq(scope.account_id))
                .filter(RenterContactColumn::CompanyId.eq(scope.company_id))
                .filter(RenterContactColumn::RenterId.eq(existing.renter_id))
                .filter(RenterContactColumn::IsPrimary.eq(true))
                .exec(self.db.get_connection())
                .await?;
        }

        let mut model: RenterContactActiveModel = existing.into();
        if let Some(v) = patch.full_name {
            model.full_name = Set(v);
        }
        if let Some(v) = patch.role {
            model.role = Set(Some(v));
        }
        if let Some(v) = patch.email {
            model.email = Set(Some(v));
        }
        if let Some(v) = patch.phone {
            model.phone = Set(Some(v));
        }
        if let Some(v) = patch.is_primary {
            model.is_primary = Set(v);
        }
        model.updated_at = Set(Utc::now());

        Ok(Some(model.update(self.db.get_connection()).await?))
    }

    pub async fn remove_contact(
        &self,
        scope: TenantScope,
        id: i32,
    ) -> Result<bool, DatabaseError> {
        let result = RenterContacts::delete_many()
            .filter(RenterContactColumn::AccountId.eq(scope.account_id))
            .filter(RenterContactColumn::CompanyId.eq(scope.company_id))
            .filter(RenterContactColumn::Id.eq(id))
            .exec(self.db.get_connection())
            .await?;
        Ok(result.rows_affected > 0)
    }

    // --- documents ---

    pub async fn add_document_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        new: NewDocument,
    ) -> Result<RenterDocument, DatabaseError> {
        let now = Utc::now();
        allocator::insert_with_retry::<RenterDocumentActiveModel, _, _>(conn, scope, |id| {
            RenterDocumentActiveModel {
                account_id: Set(scope.account_id),
                company_id: Set(scope.company_id),
                id: Set(id),
                uuid: Set(Uuid::new_v4()),
                renter_id: Set(new.renter_id),
                document_type_id: Set(new.document_type_id),
                file_ref: Set(new.file_ref.clone()),
                issued_at: Set(new.issued_at),
                expires_at: Set(new.expires_at),
                verification_status: Set(DocumentVerificationStatus::Pending),
                verified_at: Set(None),
                rejection_reason: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
        })
        .await
    }

    pub async fn find_document(
        &self,
        scope: TenantScope,
        id: i32,
    ) -> Result<Option<RenterDocument>, DatabaseError> {
        Ok(scoped::get::<RenterDocuments, _>(self.db.get_connection(), scope, id).await?)
    }

    /// All documents of a renter, newest first so "latest per type" reads
    /// off the front.
    pub async fn list_documents_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        renter_id: i32,
    ) -> Result<Vec<RenterDocument>, DatabaseError> {
        Ok(scoped::select::<RenterDocuments>(scope)
            .filter(RenterDocumentColumn::RenterId.eq(renter_id))
            .order_by_desc(RenterDocumentColumn::Id)
            .all(conn)
            .await?)
    }

    pub async fn list_documents(
        &self,
        scope: TenantScope,
        renter_id: i32,
    ) -> Result<Vec<RenterDocument>, DatabaseError> {
        self.list_documents_in(self.db.get_connection(), scope, renter_id)
            .await
    }

    pub async fn set_document_status_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        id: i32,
        status: DocumentVerificationStatus,
        rejection_reason: Option<String>,
    ) -> Result<Option<RenterDocument>, DatabaseError> {
        let Some(existing) = scoped::get::<RenterDocuments, _>(conn, scope, id).await? else {
            return Ok(None);
        };

        let mut model: RenterDocumentActiveModel = existing.into();
        model.verification_status = Set(status);
        model.verified_at = Set(match status {
            DocumentVerificationStatus::Verified => Some(Utc::now()),
            _ => None,
        });
        model.rejection_reason = Set(rejection_reason);
        model.updated_at = Set(Utc::now());
        Ok(Some(model.update(conn).await?))
    }
}

#[async_trait::async_trait(?Send)]
impl Repository for RenterRepository {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Renters::find()
            .limit(1)
            .all(self.db.get_connection())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{create_scope, create_test_db, seed_document_types};

    fn new_renter(code: &str) -> NewRenter {
        NewRenter {
            tenant_code: code.to_string(),
            renter_type: RenterType::Individual,
            display_name: format!("Renter {code}"),
            email: None,
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_renter_starts_without_kyc() {
        let db = create_test_db().await.unwrap();
        let scope = create_scope(&db, "acme", "Acme Dubai").await.unwrap();
        let repo = RenterRepository::new(db);

        let renter = repo.create(scope, new_renter("T-001")).await.unwrap();
        assert_eq!(renter.kyc_status, KycStatus::NotStarted);
        assert_eq!(renter.status, RenterStatus::Active);
        assert_eq!(renter.id, 1);
    }

    #[tokio::test]
    async fn test_primary_contact_is_exclusive() {
        let db = create_test_db().await.unwrap();
        let scope = create_scope(&db, "acme", "Acme Dubai").await.unwrap();
        let repo = RenterRepository::new(db);
        let renter = repo.create(scope, new_renter("T-001")).await.unwrap();

        let contact = |name: &str, primary: bool| NewContact {
            renter_id: renter.id,
            full_name: name.to_string(),
            role: None,
            email: None,
            phone: None,
            is_primary: primary,
        };

        repo.add_contact(scope, contact("First", true)).await.unwrap();
        repo.add_contact(scope, contact("Second", true)).await.unwrap();

        let contacts = repo.list_contacts(scope, renter.id).await.unwrap();
        let primaries: Vec<_> = contacts.iter().filter(|c| c.is_primary).collect();
        assert_eq!(primaries.len(), 1);
        assert_eq!(primaries[0].full_name, "Second");
    }

    #[tokio::test]
    async fn test_document_status_transitions() {
        let db = create_test_db().await.unwrap();
        let scope = create_scope(&db, "acme", "Acme Dubai").await.unwrap();
        let types = seed_document_types(&db).await.unwrap();
        let repo = RenterRepository::new(db.clone());
        let conn = db.get_connection();

        let renter = repo.create(scope, new_renter("T-001")).await.unwrap();
        let doc = repo
            .add_document_in(
                conn,
                scope,
                NewDocument {
                    renter_id: renter.id,
                    document_type_id: types[0].id,
                    file_ref: None,
                    issued_at: None,
                    expires_at: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(doc.verification_status, DocumentVerificationStatus::Pending);

        let verified = repo
            .set_document_status_in(
                conn,
                scope,
                doc.id,
                DocumentVerificationStatus::Verified,
                None,
            )
            .await
            .unwrap()
            .unwrap();
        assert!(verified.verified_at.is_some());

        let rejected = repo
            .set_document_status_in(
                conn,
                scope,
                doc.id,
                DocumentVerificationStatus::Rejected,
                Some("blurry scan".to_string()),
            )
            .await
            .unwrap()
            .unwrap();
        assert!(rejected.verified_at.is_none());
        assert_eq!(rejected.rejection_reason.as_deref(), Some("blurry scan"));
    }
}
