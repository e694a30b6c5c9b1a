use mockall::mock;
use pos_order_engine::{
    db_types::{Category, NewProduct, Product, ProductId, ProductUpdate},
    traits::{CatalogManagement, OrderFlowError},
};

mock! {
    pub CatalogManager {}
    impl CatalogManagement for CatalogManager {
        async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, OrderFlowError>;
        async fn fetch_products(&self) -> Result<Vec<Product>, OrderFlowError>;
        async fn fetch_categories(&self) -> Result<Vec<Category>, OrderFlowError>;
        async fn insert_product(&self, product: NewProduct) -> Result<Product, OrderFlowError>;
        async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product, OrderFlowError>;
        async fn delete_product(&self, id: ProductId) -> Result<(), OrderFlowError>;
    }
}
