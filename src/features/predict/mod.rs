pub mod decoder;
pub mod handler;
pub mod models;

pub use decoder::{DecodeError, PixelArray, decode_base64_image};
pub use handler::create_predict_router;
pub use models::{PredictRequest, PredictResponse};
