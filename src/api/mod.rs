//! HTTP client wrapper and wire types

pub mod client;
pub mod request;

pub use client::{ApiClient, HttpTransport, Transport};
pub use request::{
    ApiRequest, ApiResponse, BinaryBody, Method, MultipartBody, Part, PartValue, PreparedRequest,
    RawResponse, RequestBody, ResponseKind,
};
