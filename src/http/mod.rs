//! HTTP protocol layer module
//!
//! Response builders shared by the operation handlers and the error type.

pub mod response;

pub use response::{
    build_health_response, build_json_response, build_text_response, with_server_header,
};
