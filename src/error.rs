use thiserror::Error;

/// Failure to turn a request payload into pixels. Fatal to the request.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("empty image payload")]
    Empty,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}
