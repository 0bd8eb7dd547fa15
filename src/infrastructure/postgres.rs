//! Postgres-backed collaborators. Aggregates are stored as JSONB documents.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;

use crate::domain::aggregates::{Address, AddressBook, CustomerProfile, ListKind, Order, Organization, ShopperList};
use crate::domain::value_objects::PartyRef;
use crate::ports::{CatalogClient, CatalogItem, ClientError, MemberClient, OrderClient, SettingsClient, ShopperListStore};

#[derive(Clone)]
pub struct PgAccountStore { pool: PgPool }

impl PgAccountStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new().max_connections(max_connections).connect(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

fn owner_key(owner: &PartyRef) -> (&'static str, &str) {
    match owner {
        PartyRef::Customer(id) => ("customer", id.as_str()),
        PartyRef::Organization(id) => ("organization", id.as_str()),
    }
}

/// `LIMIT` bind value; absent or oversized limits mean no limit.
fn sql_limit(limit: Option<usize>) -> i64 {
    limit.map_or(i64::MAX, |l| i64::try_from(l).unwrap_or(i64::MAX))
}

fn list_kind_key(kind: ListKind) -> &'static str {
    match kind { ListKind::Cart => "cart", ListKind::WishList => "wish_list", ListKind::CompareList => "compare_list" }
}

#[async_trait]
impl OrderClient for PgAccountStore {
    async fn get_customer_order(&self, customer_id: &str, order_id: &str) -> Result<Option<Order>, ClientError> {
        let row = sqlx::query_as::<_, (Json<Order>,)>("SELECT document FROM account_orders WHERE id = $1 AND customer_id = $2")
            .bind(order_id).bind(customer_id).fetch_optional(&self.pool).await?;
        Ok(row.map(|(Json(order),)| order))
    }

    async fn list_customer_orders(&self, customer_id: &str, store_id: &str, limit: Option<usize>) -> Result<Vec<Order>, ClientError> {
        let rows = sqlx::query_as::<_, (Json<Order>,)>("SELECT document FROM account_orders WHERE customer_id = $1 AND store_id = $2 ORDER BY created_at DESC LIMIT $3")
            .bind(customer_id).bind(store_id).bind(sql_limit(limit)).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(Json(order),)| order).collect())
    }

    async fn save_order(&self, order: &Order) -> Result<(), ClientError> {
        let next = order.clone().with_version(order.version() + 1);
        let result = sqlx::query("INSERT INTO account_orders (id, customer_id, store_id, created_at, version, document) VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (id) DO UPDATE SET document = EXCLUDED.document, version = EXCLUDED.version WHERE account_orders.version = $7")
            .bind(next.id()).bind(next.customer_id()).bind(next.store_id()).bind(next.created_at()).bind(next.version()).bind(Json(&next)).bind(order.version())
            .execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(ClientError::Conflict { entity: "order", id: order.id().to_string() });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogClient for PgAccountStore {
    async fn get_item(&self, catalog_item_id: &str) -> Result<Option<CatalogItem>, ClientError> {
        let row = sqlx::query_as::<_, (Json<CatalogItem>,)>("SELECT document FROM catalog_items WHERE id = $1")
            .bind(catalog_item_id).fetch_optional(&self.pool).await?;
        Ok(row.map(|(Json(item),)| item))
    }
}

#[async_trait]
impl SettingsClient for PgAccountStore {
    async fn get_settings(&self, name: &str) -> Result<Vec<String>, ClientError> {
        let row = sqlx::query_as::<_, (Json<Vec<String>>,)>("SELECT setting_values FROM store_settings WHERE name = $1")
            .bind(name).fetch_optional(&self.pool).await?;
        Ok(row.map(|(Json(values),)| values).unwrap_or_default())
    }
}

#[async_trait]
impl MemberClient for PgAccountStore {
    async fn get_customer(&self, customer_id: &str) -> Result<Option<CustomerProfile>, ClientError> {
        let row = sqlx::query_as::<_, (Json<CustomerProfile>,)>("SELECT document FROM customers WHERE id = $1")
            .bind(customer_id).fetch_optional(&self.pool).await?;
        Ok(row.map(|(Json(c),)| c))
    }

    async fn save_customer(&self, customer: &CustomerProfile) -> Result<(), ClientError> {
        sqlx::query("INSERT INTO customers (id, document) VALUES ($1, $2) ON CONFLICT (id) DO UPDATE SET document = EXCLUDED.document")
            .bind(&customer.id).bind(Json(customer)).execute(&self.pool).await?;
        Ok(())
    }

    async fn get_organization(&self, organization_id: &str) -> Result<Option<Organization>, ClientError> {
        let row = sqlx::query_as::<_, (Json<Organization>,)>("SELECT document FROM organizations WHERE id = $1")
            .bind(organization_id).fetch_optional(&self.pool).await?;
        Ok(row.map(|(Json(o),)| o))
    }

    async fn save_organization(&self, organization: &Organization) -> Result<(), ClientError> {
        sqlx::query("INSERT INTO organizations (id, document) VALUES ($1, $2) ON CONFLICT (id) DO UPDATE SET document = EXCLUDED.document")
            .bind(&organization.id).bind(Json(organization)).execute(&self.pool).await?;
        Ok(())
    }

    async fn organizations_for(&self, customer_id: &str) -> Result<Vec<Organization>, ClientError> {
        let rows = sqlx::query_as::<_, (Json<Organization>,)>("SELECT o.document FROM organizations o JOIN organization_members m ON m.organization_id = o.id WHERE m.customer_id = $1 ORDER BY o.id")
            .bind(customer_id).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(Json(o),)| o).collect())
    }

    async fn load_address_book(&self, owner: &PartyRef) -> Result<AddressBook, ClientError> {
        let (kind, id) = owner_key(owner);
        let row = sqlx::query_as::<_, (Json<Vec<Address>>,)>("SELECT addresses FROM address_books WHERE owner_kind = $1 AND owner_id = $2")
            .bind(kind).bind(id).fetch_optional(&self.pool).await?;
        Ok(match row {
            Some((Json(addresses),)) => AddressBook::from_parts(owner.clone(), addresses),
            None => AddressBook::new(owner.clone()),
        })
    }

    async fn save_address_book(&self, book: &AddressBook) -> Result<(), ClientError> {
        let (kind, id) = owner_key(book.owner());
        sqlx::query("INSERT INTO address_books (owner_kind, owner_id, addresses, updated_at) VALUES ($1, $2, $3, NOW()) ON CONFLICT (owner_kind, owner_id) DO UPDATE SET addresses = EXCLUDED.addresses, updated_at = NOW()")
            .bind(kind).bind(id).bind(Json(book.addresses())).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ShopperListStore for PgAccountStore {
    async fn load(&self, customer_id: &str, kind: ListKind) -> Result<Option<ShopperList>, ClientError> {
        let row = sqlx::query_as::<_, (Json<ShopperList>,)>("SELECT document FROM shopper_lists WHERE customer_id = $1 AND kind = $2")
            .bind(customer_id).bind(list_kind_key(kind)).fetch_optional(&self.pool).await?;
        Ok(row.map(|(Json(list),)| list))
    }

    async fn save(&self, list: &ShopperList) -> Result<(), ClientError> {
        sqlx::query("INSERT INTO shopper_lists (customer_id, kind, document, updated_at) VALUES ($1, $2, $3, NOW()) ON CONFLICT (customer_id, kind) DO UPDATE SET document = EXCLUDED.document, updated_at = NOW()")
            .bind(list.customer_id()).bind(list_kind_key(list.kind())).bind(Json(list)).execute(&self.pool).await?;
        Ok(())
    }

    async fn delete(&self, customer_id: &str, kind: ListKind) -> Result<(), ClientError> {
        sqlx::query("DELETE FROM shopper_lists WHERE customer_id = $1 AND kind = $2")
            .bind(customer_id).bind(list_kind_key(kind)).execute(&self.pool).await?;
        Ok(())
    }
}
