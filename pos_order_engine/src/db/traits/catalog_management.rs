use crate::{
    db_types::{Category, NewProduct, Product, ProductId, ProductUpdate},
    traits::OrderFlowError,
};

/// The `CatalogManagement` trait defines typed access to the product catalog.
///
/// None of these methods may decrement stock on behalf of an order. Stock only goes down through
/// [`crate::traits::OrderLedgerDatabase::commit_order`].
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Fetches the product with the given id, or `None` if it does not exist.
    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, OrderFlowError>;

    /// Fetches every product in the catalog, ordered by id.
    async fn fetch_products(&self) -> Result<Vec<Product>, OrderFlowError>;

    /// Fetches every product category, ordered by name.
    async fn fetch_categories(&self) -> Result<Vec<Category>, OrderFlowError>;

    /// Adds a product to the catalog and returns the stored record.
    async fn insert_product(&self, product: NewProduct) -> Result<Product, OrderFlowError>;

    /// Applies the given changes to a product and returns the updated record.
    ///
    /// Returns `OrderFlowError::ProductNotFound` if the product does not exist.
    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product, OrderFlowError>;

    /// Removes a product from the catalog.
    ///
    /// Products that appear on any order cannot be removed (`OrderFlowError::ProductInUse`); mark them unavailable
    /// instead.
    async fn delete_product(&self, id: ProductId) -> Result<(), OrderFlowError>;
}
