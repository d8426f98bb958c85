//! Global lookup data: unit categories and document types
//!
//! Catalog rows are shared by every tenant and therefore carry plain
//! auto-increment keys, not the composite key.

use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::connection::{DatabaseConnection, DatabaseError};
use crate::entities::{
    DocumentType, DocumentTypeColumn, DocumentTypes, RenterType, UnitCategories, UnitCategory,
    UnitCategoryColumn,
};
use crate::repositories::Repository;

#[derive(Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_category_by_id(
        &self,
        id: i32,
    ) -> Result<Option<UnitCategory>, DatabaseError> {
        Ok(UnitCategories::find_by_id(id)
            .one(self.db.get_connection())
            .await?)
    }

    pub async fn find_category_by_code(
        &self,
        code: &str,
    ) -> Result<Option<UnitCategory>, DatabaseError> {
        Ok(UnitCategories::find()
            .filter(UnitCategoryColumn::Code.eq(code))
            .one(self.db.get_connection())
            .await?)
    }

    pub async fn list_categories(&self) -> Result<Vec<UnitCategory>, DatabaseError> {
        Ok(UnitCategories::find()
            .filter(UnitCategoryColumn::IsActive.eq(true))
            .order_by_asc(UnitCategoryColumn::Code)
            .all(self.db.get_connection())
            .await?)
    }

    pub async fn find_document_type_by_id(
        &self,
        id: i32,
    ) -> Result<Option<DocumentType>, DatabaseError> {
        Ok(DocumentTypes::find_by_id(id)
            .one(self.db.get_connection())
            .await?)
    }

    pub async fn find_document_type_by_code(
        &self,
        code: &str,
    ) -> Result<Option<DocumentType>, DatabaseError> {
        Ok(DocumentTypes::find()
            .filter(DocumentTypeColumn::Code.eq(code))
            .one(self.db.get_connection())
            .await?)
    }

    pub async fn list_document_types(&self) -> Result<Vec<DocumentType>, DatabaseError> {
        Ok(DocumentTypes::find()
            .filter(DocumentTypeColumn::IsActive.eq(true))
            .order_by_asc(DocumentTypeColumn::Code)
            .all(self.db.get_connection())
            .await?)
    }

    /// Active mandatory document types that apply to the given renter type.
    /// A NULL `applicable_to` means the type applies to everyone. This set
    /// drives the KYC status derivation.
    pub async fn mandatory_document_types(
        &self,
        renter_type: RenterType,
    ) -> Result<Vec<DocumentType>, DatabaseError> {
        Ok(DocumentTypes::find()
            .filter(DocumentTypeColumn::IsActive.eq(true))
            .filter(DocumentTypeColumn::IsMandatory.eq(true))
            .filter(
                Condition::any()
                    .add(DocumentTypeColumn::ApplicableTo.is_null())
                    .add(DocumentTypeColumn::ApplicableTo.eq(renter_type)),
            )
            .order_by_asc(DocumentTypeColumn::Code)
            .all(self.db.get_connection())
            .await?)
    }
}

#[async_trait::async_trait(?Send)]
impl Repository for CatalogRepository {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        UnitCategories::find()
            .limit(1)
            .all(self.db.get_connection())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{create_test_db, seed_document_types, seed_unit_categories};

    #[tokio::test]
    async fn test_mandatory_types_respect_renter_type() {
        let db = create_test_db().await.unwrap();
        seed_document_types(&db).await.unwrap();
        let repo = CatalogRepository::new(db);

        let individual = repo
            .mandatory_document_types(RenterType::Individual)
            .await
            .unwrap();
        assert_eq!(
            individual.iter().map(|d| d.code.as_str()).collect::<Vec<_>>(),
            vec!["NATIONAL_ID"]
        );

        let entity = repo
            .mandatory_document_types(RenterType::Entity)
            .await
            .unwrap();
        assert_eq!(
            entity.iter().map(|d| d.code.as_str()).collect::<Vec<_>>(),
            vec!["NATIONAL_ID", "TRADE_LICENSE"]
        );
    }

    #[tokio::test]
    async fn test_category_lookup_by_code() {
        let db = create_test_db().await.unwrap();
        seed_unit_categories(&db).await.unwrap();
        let repo = CatalogRepository::new(db);

        let floor = repo.find_category_by_code("FLOOR").await.unwrap().unwrap();
        assert!(floor.allowed_parents().is_empty());

        let bedspace = repo
            .find_category_by_code("BEDSPACE")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bedspace.allowed_parents(), vec!["APARTMENT"]);
    }
}
