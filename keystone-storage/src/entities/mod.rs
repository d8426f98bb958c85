pub mod accounts;
pub mod companies;
pub mod document_types;
pub mod properties;
pub mod renter_contacts;
pub mod renter_documents;
pub mod renters;
pub mod unit_categories;
pub mod units;
pub mod vendor_lease_coverages;
pub mod vendor_lease_terms;
pub mod vendor_leases;
pub mod vendors;

// Global tenancy + lookup entities
pub use accounts::{
    ActiveModel as AccountActiveModel, Column as AccountColumn, Entity as Accounts, Model as Account,
};
pub use companies::{
    ActiveModel as CompanyActiveModel, Column as CompanyColumn, Entity as Companies, Model as Company,
};
pub use document_types::{
    ActiveModel as DocumentTypeActiveModel, Column as DocumentTypeColumn, Entity as DocumentTypes,
    Model as DocumentType,
};
pub use unit_categories::{
    ActiveModel as UnitCategoryActiveModel, Column as UnitCategoryColumn, Entity as UnitCategories,
    Model as UnitCategory,
};

// Tenant-scoped entities
pub use properties::{
    ActiveModel as PropertyActiveModel, Column as PropertyColumn, Entity as Properties,
    Model as Property, PropertyStatus, PropertyUsageType,
};
pub use renter_contacts::{
    ActiveModel as RenterContactActiveModel, Column as RenterContactColumn,
    Entity as RenterContacts, Model as RenterContact,
};
pub use renter_documents::{
    ActiveModel as RenterDocumentActiveModel, Column as RenterDocumentColumn,
    DocumentVerificationStatus, Entity as RenterDocuments, Model as RenterDocument,
};
pub use renters::{
    ActiveModel as RenterActiveModel, Column as RenterColumn, Entity as Renters, KycStatus,
    Model as Renter, RenterStatus, RenterType,
};
pub use units::{
    ActiveModel as UnitActiveModel, Column as UnitColumn, Entity as Units, Model as Unit,
    UnitStatus,
};
pub use vendor_lease_coverages::{
    ActiveModel as LeaseCoverageActiveModel, Column as LeaseCoverageColumn, CoverageScope,
    Entity as LeaseCoverages, Model as LeaseCoverage,
};
pub use vendor_lease_terms::{
    ActiveModel as LeaseTermActiveModel, Column as LeaseTermColumn, Entity as LeaseTerms,
    Model as LeaseTerm,
};
pub use vendor_leases::{
    ActiveModel as VendorLeaseActiveModel, BillingCycle, Column as VendorLeaseColumn,
    Entity as VendorLeases, LeaseStatus, Model as VendorLease,
};
pub use vendors::{
    ActiveModel as VendorActiveModel, Column as VendorColumn, Entity as Vendors, Model as Vendor,
};
