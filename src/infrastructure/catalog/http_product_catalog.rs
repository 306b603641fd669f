use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{CatalogError, ProductCatalog};
use crate::domain::{ProductId, ProductRef};

/// Reads the product list from a remote JSON endpoint on every call.
pub struct HttpProductCatalog {
    client: reqwest::Client,
    products_url: String,
}

impl HttpProductCatalog {
    pub fn new(products_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            products_url: products_url.into(),
        }
    }
}

// Upstream records carry more fields; serde drops everything but these two.
#[derive(Deserialize)]
struct ProductRecord {
    #[serde(rename = "_id")]
    id: ProductId,
    name: String,
}

#[async_trait]
impl ProductCatalog for HttpProductCatalog {
    async fn list_products(&self) -> Result<Vec<ProductRef>, CatalogError> {
        tracing::debug!(url = %self.products_url, "Fetching product catalog");

        let response = self
            .client
            .get(&self.products_url)
            .send()
            .await
            .map_err(|e| CatalogError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let records: Vec<ProductRecord> = response
            .json()
            .await
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;

        let products: Vec<ProductRef> = records
            .into_iter()
            .map(|r| ProductRef {
                id: r.id,
                name: r.name,
            })
            .collect();

        tracing::debug!(count = products.len(), "Product catalog fetched");

        Ok(products)
    }
}
