//! Accounts and companies: the two tenancy levels above the composite key

use keystone_api_types::TenantScope;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::connection::{DatabaseConnection, DatabaseError};
use crate::entities::{
    Account, AccountActiveModel, Accounts, Company, CompanyActiveModel, CompanyColumn, Companies,
};
use crate::repositories::Repository;

#[derive(Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_account(&self, name: &str) -> Result<Account, DatabaseError> {
        let model = AccountActiveModel {
            name: Set(name.to_string()),
            ..AccountActiveModel::new()
        }
        .insert(self.db.get_connection())
        .await?;
        Ok(model)
    }

    pub async fn find_account_by_id(&self, id: i32) -> Result<Option<Account>, DatabaseError> {
        Ok(Accounts::find_by_id(id).one(self.db.get_connection()).await?)
    }

    pub async fn create_company(
        &self,
        account_id: i32,
        name: &str,
    ) -> Result<Company, DatabaseError> {
        let model = CompanyActiveModel {
            account_id: Set(account_id),
            name: Set(name.to_string()),
            ..CompanyActiveModel::new()
        }
        .insert(self.db.get_connection())
        .await?;
        Ok(model)
    }

    pub async fn find_company_by_id(&self, id: i32) -> Result<Option<Company>, DatabaseError> {
        Ok(Companies::find_by_id(id).one(self.db.get_connection()).await?)
    }

    pub async fn list_companies(&self, account_id: i32) -> Result<Vec<Company>, DatabaseError> {
        Ok(Companies::find()
            .filter(CompanyColumn::AccountId.eq(account_id))
            .order_by_asc(CompanyColumn::Name)
            .all(self.db.get_connection())
            .await?)
    }

    /// Resolve an `(account_id, company_id)` pair into a usable tenant
    /// scope. Returns None unless the company exists, belongs to the
    /// account, and both sides are active. Callers treat None as
    /// "not found" without distinguishing which leg failed.
    pub async fn resolve_scope(
        &self,
        account_id: i32,
        company_id: i32,
    ) -> Result<Option<TenantScope>, DatabaseError> {
        let Some(account) = self.find_account_by_id(account_id).await? else {
            return Ok(None);
        };
        let Some(company) = self.find_company_by_id(company_id).await? else {
            return Ok(None);
        };

        if company.account_id != account_id || !account.is_active || !company.is_active {
            return Ok(None);
        }

        Ok(Some(TenantScope::new(account_id, company_id)))
    }
}

#[async_trait::async_trait(?Send)]
impl Repository for AccountRepository {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Accounts::find()
            .limit(1)
            .all(self.db.get_connection())
            .await?;
        Ok(())
    }
}
