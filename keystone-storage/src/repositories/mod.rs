pub mod account_repository;
pub mod catalog_repository;
pub mod lease_repository;
pub mod property_repository;
pub mod renter_repository;
pub mod unit_repository;
pub mod vendor_repository;

pub use account_repository::AccountRepository;
pub use catalog_repository::CatalogRepository;
pub use lease_repository::{LeasePatch, LeaseRepository, NewCoverage, NewLease, NewTerm};
pub use property_repository::{NewProperty, PropertyPatch, PropertyRepository};
pub use renter_repository::{
    ContactPatch, NewContact, NewDocument, NewRenter, RenterPatch, RenterRepository,
};
pub use unit_repository::{NewUnit, UnitPatch, UnitRepository};
pub use vendor_repository::{NewVendor, VendorPatch, VendorRepository};

use crate::connection::{DatabaseConnection, DatabaseError};
use async_trait::async_trait;

/// Common repository trait for all database operations
#[async_trait(?Send)]
pub trait Repository {
    /// Health check for the repository
    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Repository factory for creating all repositories with shared connection
#[derive(Clone)]
pub struct RepositoryFactory {
    pub accounts: AccountRepository,
    pub catalog: CatalogRepository,
    pub properties: PropertyRepository,
    pub units: UnitRepository,
    pub vendors: VendorRepository,
    pub leases: LeaseRepository,
    pub renters: RenterRepository,
    db: DatabaseConnection,
}

impl RepositoryFactory {
    /// Create a new repository factory with shared database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            accounts: AccountRepository::new(db.clone()),
            catalog: CatalogRepository::new(db.clone()),
            properties: PropertyRepository::new(db.clone()),
            units: UnitRepository::new(db.clone()),
            vendors: VendorRepository::new(db.clone()),
            leases: LeaseRepository::new(db.clone()),
            renters: RenterRepository::new(db.clone()),
            db,
        }
    }

    /// Get the database connection
    pub fn database(&self) -> &DatabaseConnection {
        &self.db
    }
}
