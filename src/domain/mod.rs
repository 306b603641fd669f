mod audio_upload;
mod product;
mod transcript;

pub use audio_upload::AudioUpload;
pub use product::{ProductId, ProductQuantity, ProductRef};
pub use transcript::Transcript;
