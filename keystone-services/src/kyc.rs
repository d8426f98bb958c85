//! Renter KYC status derivation
//!
//! The persisted `kyc_status` is a cache of a pure function over the
//! renter's current documents. It is re-derived after every document
//! mutation and compared against the stored value before writing; there are
//! no triggers or hooks.

use chrono::NaiveDate;
use keystone_storage::entities::{DocumentVerificationStatus, KycStatus, RenterDocument};
use std::collections::HashMap;

/// Derive the KYC status from the renter's documents and the set of
/// mandatory document type ids for their renter type.
///
/// Only the latest document per mandatory type counts; older uploads are
/// superseded. Precedence: any rejected latest document wins, then any
/// expired one, then full verification; otherwise the renter is in progress
/// once anything has been uploaded and pending before that.
pub fn derive_kyc_status(
    documents: &[RenterDocument],
    mandatory_type_ids: &[i32],
    today: NaiveDate,
) -> KycStatus {
    // Latest per type; documents arrive newest-first or not, so pick max id.
    let mut latest: HashMap<i32, &RenterDocument> = HashMap::new();
    for doc in documents {
        latest
            .entry(doc.document_type_id)
            .and_modify(|held| {
                if doc.id > held.id {
                    *held = doc;
                }
            })
            .or_insert(doc);
    }

    let mut any_rejected = false;
    let mut any_expired = false;
    let mut all_verified = true;

    for type_id in mandatory_type_ids {
        match latest.get(type_id) {
            None => all_verified = false,
            Some(doc) => match doc.verification_status {
                DocumentVerificationStatus::Rejected => any_rejected = true,
                DocumentVerificationStatus::Expired => any_expired = true,
                DocumentVerificationStatus::Verified => {
                    if doc.is_expired(today) {
                        any_expired = true;
                    }
                }
                DocumentVerificationStatus::Pending => all_verified = false,
            },
        }
    }

    if any_rejected {
        KycStatus::Rejected
    } else if any_expired {
        KycStatus::Expired
    } else if all_verified && !mandatory_type_ids.is_empty() {
        // Verification means every mandatory type is covered; with nothing
        // mandatory there is nothing to verify against.
        KycStatus::Verified
    } else if documents.is_empty() {
        KycStatus::Pending
    } else {
        KycStatus::InProgress
    }
}
