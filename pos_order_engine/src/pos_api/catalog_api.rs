//! Product and category management.

use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Category, NewProduct, Product, ProductId, ProductUpdate},
    traits::{CatalogManagement, OrderFlowError},
};

pub struct CatalogApi<B> {
    db: B,
}

impl<B: Debug> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi ({:?})", self.db)
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn products(&self) -> Result<Vec<Product>, OrderFlowError> {
        self.db.fetch_products().await
    }

    pub async fn product(&self, id: ProductId) -> Result<Product, OrderFlowError> {
        self.db.fetch_product(id).await?.ok_or(OrderFlowError::ProductNotFound(id))
    }

    pub async fn categories(&self) -> Result<Vec<Category>, OrderFlowError> {
        self.db.fetch_categories().await
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, OrderFlowError> {
        product.validate()?;
        let product = self.db.insert_product(product).await?;
        info!("🗃️ Product {} '{}' created at {} with {} in stock", product.id, product.name, product.price, product.stock);
        Ok(product)
    }

    /// Changes a product's details. Setting `stock` here overwrites the stock level outright (e.g. after a delivery).
    pub async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product, OrderFlowError> {
        update.validate()?;
        let product = self.db.update_product(id, update).await?;
        debug!("🗃️ Product {id} updated");
        Ok(product)
    }

    /// Removes a product that has never been ordered. Ordered products should be marked unavailable instead.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), OrderFlowError> {
        self.db.delete_product(id).await?;
        info!("🗃️ Product {id} deleted");
        Ok(())
    }
}
