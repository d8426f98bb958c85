//! Business services for the Keystone property back office
//!
//! Services own the domain rules (hierarchy structure, lease lifecycle, KYC
//! derivation) and compose repository calls, opening a transaction whenever
//! a rule spans more than one row. All lookups are tenant-scoped through the
//! storage layer; a row outside the caller's scope is reported as not found.

pub mod hierarchy;
pub mod kyc;
pub mod leasing;
pub mod properties;
pub mod renters;
pub mod vendors;

pub use hierarchy::{
    CreateUnit, HierarchyService, LeasableUnit, UnitTree, UpdateUnit, MAX_UNIT_DEPTH,
};
pub use kyc::derive_kyc_status;
pub use leasing::{AddTerm, CoverageInput, LeasingService};
pub use properties::PropertyService;
pub use renters::RenterService;
pub use vendors::VendorService;
