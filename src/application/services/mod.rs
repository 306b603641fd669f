mod intent_resolver;
mod order_pipeline;

pub use intent_resolver::{
    IntentResolutionError, IntentResolver, build_system_instruction, parse_model_output,
};
pub use order_pipeline::{OrderPipeline, PipelineError, PipelineResponse};
