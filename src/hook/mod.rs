//! Transport normalization, body decoding and response aggregation.
//!
//! # Data Flow
//! ```text
//! transport request
//!     → raw.rs (RawRequest: headers, query, body, base64 flag)
//!     → query.rs (fixed fields + custom params)
//!     → decode.rs (BodyEncoding policy)
//!     → data.rs (HookData)
//!     → [provider normalize + delivery]
//!     → response.rs (ErrorInfo[] → ResponseInfo)
//! ```
//!
//! # Design Decisions
//! - Everything here is a pure function of its inputs
//! - Malformed input degrades to empty values; nothing here returns an error
//! - No state is shared between calls

pub mod data;
pub mod decode;
pub mod encoding;
pub mod query;
pub mod raw;
pub mod response;

pub use data::HookData;
pub use decode::decode_body;
pub use encoding::BodyEncoding;
pub use query::{extract_query_params, CustomQueryParams, FixedParams};
pub use raw::{QueryParams, RawRequest, RequestSource};
pub use response::{aggregate, max_status_code, ErrorInfo, ResponseInfo};
