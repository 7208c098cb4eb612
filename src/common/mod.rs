pub mod address;
pub mod error;

pub use address::normalize_address;
pub use error::{ApiError, ApiErrorResponse, Error, Result};
