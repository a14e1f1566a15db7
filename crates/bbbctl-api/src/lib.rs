#![forbid(unsafe_code)]
#![deny(
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Client primitives for the BigBlueButton administrative API.
//!
//! Layout:
//! - `checksum.rs`: request signing over command, query, and shared secret
//! - `request.rs`: ordered query parameters and URL assembly
//! - `element.rs`: generic XML element tree, parser, and serializer
//! - `client.rs`: HTTP transport and typed API operations
//! - `error.rs`: parse, API, and transport error taxonomy

pub mod checksum;
pub mod client;
pub mod element;
pub mod error;
pub mod request;

pub use checksum::{ChecksumAlgorithm, sign};
pub use client::{BbbClient, TlsPolicy};
pub use element::{Element, RETURNCODE_SUCCESS};
pub use error::{ApiError, BbbError, BbbResult, ParseError, TransportError};
pub use request::{QueryParams, build_url, encode_query};
