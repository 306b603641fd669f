use async_trait::async_trait;

use crate::domain::ProductRef;

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Current product list projected to id and name, in upstream order.
    async fn list_products(&self) -> Result<Vec<ProductRef>, CatalogError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
