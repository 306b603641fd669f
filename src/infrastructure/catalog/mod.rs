mod http_product_catalog;

pub use http_product_catalog::HttpProductCatalog;
