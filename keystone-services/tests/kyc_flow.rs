//! Renter onboarding and KYC document workflow

use chrono::{Duration, Utc};
use keystone_api_types::{ApiError, TenantScope};
use keystone_storage::entities::{
    DocumentType, DocumentVerificationStatus, KycStatus, RenterType,
};
use keystone_storage::repositories::{
    ContactPatch, NewContact, NewDocument, NewRenter, RepositoryFactory,
};
use keystone_storage::testing::{create_scope, create_test_db, seed_document_types};
use keystone_services::RenterService;

struct Fixture {
    renters: RenterService,
    scope: TenantScope,
    document_types: Vec<DocumentType>,
}

impl Fixture {
    fn doc_type(&self, code: &str) -> i32 {
        self.document_types
            .iter()
            .find(|t| t.code == code)
            .unwrap()
            .id
    }

    fn renter(&self, code: &str, renter_type: RenterType) -> NewRenter {
        NewRenter {
            tenant_code: code.to_string(),
            renter_type,
            display_name: format!("Renter {code}"),
            email: None,
            phone: None,
        }
    }

    fn document(&self, renter_id: i32, type_code: &str) -> NewDocument {
        NewDocument {
            renter_id,
            document_type_id: self.doc_type(type_code),
            file_ref: Some(format!("s3://docs/{type_code}.pdf")),
            issued_at: Some(Utc::now().date_naive()),
            expires_at: None,
        }
    }
}

async fn setup() -> Fixture {
    let db = create_test_db().await.unwrap();
    let scope = create_scope(&db, "acme", "Acme Dubai").await.unwrap();
    let document_types = seed_document_types(&db).await.unwrap();
    Fixture {
        renters: RenterService::new(RepositoryFactory::new(db)),
        scope,
        document_types,
    }
}

#[tokio::test]
async fn duplicate_tenant_code_is_rejected() {
    let f = setup().await;

    let renter = f
        .renters
        .create_renter(f.scope, f.renter("T-001", RenterType::Individual))
        .await
        .unwrap();
    assert_eq!(renter.kyc_status, KycStatus::NotStarted);

    let err = f
        .renters
        .create_renter(f.scope, f.renter("T-001", RenterType::Entity))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }));
}

#[tokio::test]
async fn document_type_must_apply_to_the_renter_type() {
    let f = setup().await;
    let renter = f
        .renters
        .create_renter(f.scope, f.renter("T-001", RenterType::Individual))
        .await
        .unwrap();

    // TRADE_LICENSE applies to entities only.
    let err = f
        .renters
        .add_document(f.scope, f.document(renter.id, "TRADE_LICENSE"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("does not apply"));
}

#[tokio::test]
async fn upload_and_verification_walk_the_kyc_ladder() {
    let f = setup().await;
    let renter = f
        .renters
        .create_renter(f.scope, f.renter("T-001", RenterType::Individual))
        .await
        .unwrap();

    let document = f
        .renters
        .add_document(f.scope, f.document(renter.id, "NATIONAL_ID"))
        .await
        .unwrap();
    assert_eq!(
        document.verification_status,
        DocumentVerificationStatus::Pending
    );

    let renter = f.renters.get_renter(f.scope, renter.id).await.unwrap();
    assert_eq!(renter.kyc_status, KycStatus::InProgress);
    assert!(renter.kyc_verified_at.is_none());

    // The individual's only mandatory type is NATIONAL_ID, so verifying it
    // completes KYC.
    let verified = f
        .renters
        .verify_document(f.scope, document.id)
        .await
        .unwrap();
    assert_eq!(
        verified.verification_status,
        DocumentVerificationStatus::Verified
    );
    assert!(verified.verified_at.is_some());

    let renter = f.renters.get_renter(f.scope, renter.id).await.unwrap();
    assert_eq!(renter.kyc_status, KycStatus::Verified);
    assert!(renter.kyc_verified_at.is_some());
}

#[tokio::test]
async fn entities_need_every_mandatory_type_verified() {
    let f = setup().await;
    let renter = f
        .renters
        .create_renter(f.scope, f.renter("T-001", RenterType::Entity))
        .await
        .unwrap();

    let id_doc = f
        .renters
        .add_document(f.scope, f.document(renter.id, "NATIONAL_ID"))
        .await
        .unwrap();
    f.renters.verify_document(f.scope, id_doc.id).await.unwrap();

    // TRADE_LICENSE is still missing.
    let renter = f.renters.get_renter(f.scope, renter.id).await.unwrap();
    assert_eq!(renter.kyc_status, KycStatus::InProgress);

    let license = f
        .renters
        .add_document(f.scope, f.document(renter.id, "TRADE_LICENSE"))
        .await
        .unwrap();
    f.renters
        .verify_document(f.scope, license.id)
        .await
        .unwrap();

    let renter = f.renters.get_renter(f.scope, renter.id).await.unwrap();
    assert_eq!(renter.kyc_status, KycStatus::Verified);
}

#[tokio::test]
async fn rejection_marks_the_renter_until_a_new_upload_supersedes() {
    let f = setup().await;
    let renter = f
        .renters
        .create_renter(f.scope, f.renter("T-001", RenterType::Individual))
        .await
        .unwrap();

    let document = f
        .renters
        .add_document(f.scope, f.document(renter.id, "NATIONAL_ID"))
        .await
        .unwrap();
    let rejected = f
        .renters
        .reject_document(f.scope, document.id, "illegible scan".to_string())
        .await
        .unwrap();
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some("illegible scan")
    );

    let renter = f.renters.get_renter(f.scope, renter.id).await.unwrap();
    assert_eq!(renter.kyc_status, KycStatus::Rejected);

    // A fresh upload of the same type supersedes the rejected one.
    let replacement = f
        .renters
        .add_document(f.scope, f.document(renter.id, "NATIONAL_ID"))
        .await
        .unwrap();
    let renter = f.renters.get_renter(f.scope, renter.id).await.unwrap();
    assert_eq!(renter.kyc_status, KycStatus::InProgress);

    f.renters
        .verify_document(f.scope, replacement.id)
        .await
        .unwrap();
    let renter = f.renters.get_renter(f.scope, renter.id).await.unwrap();
    assert_eq!(renter.kyc_status, KycStatus::Verified);

    // Documents come back newest first.
    let documents = f
        .renters
        .list_documents(f.scope, renter.id)
        .await
        .unwrap();
    assert_eq!(documents[0].id, replacement.id);
}

#[tokio::test]
async fn verified_but_lapsed_documents_expire_the_kyc() {
    let f = setup().await;
    let renter = f
        .renters
        .create_renter(f.scope, f.renter("T-001", RenterType::Individual))
        .await
        .unwrap();

    let mut stale = f.document(renter.id, "NATIONAL_ID");
    stale.expires_at = Some(Utc::now().date_naive() - Duration::days(1));
    let document = f.renters.add_document(f.scope, stale).await.unwrap();
    f.renters
        .verify_document(f.scope, document.id)
        .await
        .unwrap();

    let renter = f.renters.get_renter(f.scope, renter.id).await.unwrap();
    assert_eq!(renter.kyc_status, KycStatus::Expired);
}

#[tokio::test]
async fn primary_contact_is_exclusive() {
    let f = setup().await;
    let renter = f
        .renters
        .create_renter(f.scope, f.renter("T-001", RenterType::Entity))
        .await
        .unwrap();

    let first = f
        .renters
        .add_contact(
            f.scope,
            NewContact {
                renter_id: renter.id,
                full_name: "Amira Hassan".to_string(),
                role: Some("Finance".to_string()),
                email: None,
                phone: None,
                is_primary: true,
            },
        )
        .await
        .unwrap();
    let second = f
        .renters
        .add_contact(
            f.scope,
            NewContact {
                renter_id: renter.id,
                full_name: "Omar Khalid".to_string(),
                role: None,
                email: None,
                phone: None,
                is_primary: true,
            },
        )
        .await
        .unwrap();
    assert!(second.is_primary);

    let contacts = f.renters.list_contacts(f.scope, renter.id).await.unwrap();
    assert_eq!(contacts.len(), 2);
    // The primary sorts first and there is exactly one of them.
    assert_eq!(contacts[0].id, second.id);
    assert_eq!(contacts.iter().filter(|c| c.is_primary).count(), 1);

    // Promoting the other contact via update demotes the current primary.
    let first = f
        .renters
        .update_contact(
            f.scope,
            first.id,
            ContactPatch {
                is_primary: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(first.is_primary);
    let contacts = f.renters.list_contacts(f.scope, renter.id).await.unwrap();
    assert_eq!(contacts[0].id, first.id);
    assert_eq!(contacts.iter().filter(|c| c.is_primary).count(), 1);

    f.renters.remove_contact(f.scope, first.id).await.unwrap();
    let err = f
        .renters
        .remove_contact(f.scope, first.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}
