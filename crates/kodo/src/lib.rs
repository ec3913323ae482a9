//! kc-kodo: Kodo control-plane adapter for the kc client
//!
//! This crate provides the implementation of the ObjectStore trait over
//! the Kodo management HTTP API. It is the only crate that speaks HTTP
//! or knows how requests are signed.

pub mod auth;
pub mod batch;
pub mod client;
pub mod listing;
pub mod manager;
pub mod region;
pub mod signed_url;
pub mod transport;
pub mod uri;

pub use auth::Credentials;
pub use batch::MAX_BATCH_OPS;
pub use client::KodoClient;
pub use listing::MAX_LIST_LIMIT;
pub use manager::BucketManager;
pub use region::RegionResolver;
pub use signed_url::{
    deadline_after, make_private_url, make_private_url_v2, make_private_url_v2_with_query,
    make_private_url_v2_with_query_string, make_public_url, make_public_url_v2,
    make_public_url_v2_with_query, make_public_url_v2_with_query_string, url_encode_query,
};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
