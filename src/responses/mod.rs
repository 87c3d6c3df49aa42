pub mod errors;
pub mod files;
pub mod json;

pub use errors::{error_to_response, json_error_response, ResultResp};
pub use files::file_response;
pub use json::{created, ok};
