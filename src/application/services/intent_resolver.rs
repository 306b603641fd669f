use std::collections::HashSet;
use std::sync::Arc;

use futures::StreamExt;

use crate::application::ports::{GenerationParams, GenerationRequest, LlmClient, LlmClientError};
use crate::domain::{ProductId, ProductQuantity, ProductRef, Transcript};
use crate::application::sanitize_for_log;

const INSTRUCTION_TEMPLATE: &str = r#"
You are given a user input describing products with quantities in natural language.
You also have a list of available products with _id.

Your task:
- Match the products mentioned in the user input to the available products.
- Return a JSON array of objects with the following format:
  [{ "_id": <product_id>, "count": <quantity> }]
- If a product is not mentioned or not found, it should not appear.
- If words are similar, match the most similar one.
- DO NOT return anything else besides valid JSON.

Products list: {catalog}
"#;

/// Maps a transcript onto catalog entries by asking a language model.
///
/// Never fails: a model that cannot be reached or answers with anything other
/// than a JSON array yields an empty list. Array entries that are not
/// `{"_id", "count"}` objects are dropped one by one.
pub struct IntentResolver {
    llm_client: Arc<dyn LlmClient>,
    params: GenerationParams,
    drop_unknown_products: bool,
}

impl IntentResolver {
    pub fn new(llm_client: Arc<dyn LlmClient>, params: GenerationParams) -> Self {
        Self {
            llm_client,
            params,
            drop_unknown_products: false,
        }
    }

    /// Discard resolved entries whose id is absent from the catalog snapshot.
    pub fn with_unknown_product_filter(mut self, enabled: bool) -> Self {
        self.drop_unknown_products = enabled;
        self
    }

    pub async fn resolve(
        &self,
        transcript: &Transcript,
        catalog: &[ProductRef],
    ) -> Vec<ProductQuantity> {
        let request = GenerationRequest {
            system_instruction: build_system_instruction(catalog),
            user_text: transcript.as_str().to_string(),
            params: self.params.clone(),
        };

        let raw = match self.collect_output(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "Language model call failed, returning no products");
                return Vec::new();
            }
        };

        let products = match parse_model_output(&raw) {
            Ok(products) => products,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    raw_output = %sanitize_for_log(&raw),
                    "Failed to parse language model response"
                );
                return Vec::new();
            }
        };

        if self.drop_unknown_products {
            retain_known(products, catalog)
        } else {
            products
        }
    }

    async fn collect_output(&self, request: &GenerationRequest) -> Result<String, LlmClientError> {
        let mut stream = self.llm_client.complete_stream(request).await?;
        let mut output = String::new();
        let mut chunks = 0usize;

        while let Some(chunk) = stream.next().await {
            output.push_str(&chunk?);
            chunks += 1;
        }

        tracing::debug!(chunks, chars = output.len(), "Language model stream drained");
        Ok(output)
    }
}

pub fn build_system_instruction(catalog: &[ProductRef]) -> String {
    let serialized = serde_json::to_string(catalog).unwrap_or_else(|_| "[]".to_string());
    INSTRUCTION_TEMPLATE.replace("{catalog}", &serialized)
}

/// Parses the model's answer entry by entry.
///
/// Only text that is not a JSON array fails as a whole. Entries lacking a
/// usable `_id` or `count` are logged and skipped so the rest of the order
/// survives.
pub fn parse_model_output(raw: &str) -> Result<Vec<ProductQuantity>, IntentResolutionError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(IntentResolutionError::MalformedOutput)?;
    let serde_json::Value::Array(entries) = value else {
        return Err(IntentResolutionError::NotAnArray);
    };

    let products = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            match serde_json::from_value::<ProductQuantity>(entry) {
                Ok(product) => Some(product),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping unusable model entry");
                    None
                }
            }
        })
        .collect();
    Ok(products)
}

fn retain_known(products: Vec<ProductQuantity>, catalog: &[ProductRef]) -> Vec<ProductQuantity> {
    let known: HashSet<&ProductId> = catalog.iter().map(|p| &p.id).collect();
    products
        .into_iter()
        .filter(|p| {
            let keep = known.contains(&p.id);
            if !keep {
                tracing::warn!(product_id = %p.id, "Dropping product absent from catalog");
            }
            keep
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum IntentResolutionError {
    #[error("malformed model output: {0}")]
    MalformedOutput(serde_json::Error),
    #[error("model output is not a JSON array")]
    NotAnArray,
}
