mod error;

pub use error::{DdfError, DdfResult, GenericError};
