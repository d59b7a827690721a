//! lookout-client: talks to cluster nodes on lookout's behalf.
//!
//! [`StatusClient`] is the contract the reconciliation engine polls
//! through. [`RespStatusClient`] implements it over plain TCP, opening a
//! short-lived [`Connection`] per call.

mod connection;
mod error;
mod info;
mod status;

pub use connection::Connection;
pub use error::ClientError;
pub use info::InfoSection;
pub use status::{RespStatusClient, StatusClient};
