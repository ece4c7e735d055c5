pub mod inference_client;
pub mod model_catalog;

pub use inference_client::{InferenceClient, OpenAiVisionClient};
pub use model_catalog::ModelCatalog;
