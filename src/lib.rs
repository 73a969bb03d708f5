//! Rust client library for the Fio banking API.
//!
//! This crate provides a typed client for downloading account statements
//! from [Fio banka](https://www.fio.cz/) through its token-authenticated
//! REST export API.
//!
//! - [`parser`] decodes the XML statement format into [`models::Statement`].
//! - [`client`] performs the HTTP calls: date-range and statement queries,
//!   the server-side "last download" cursor, and raw exports in any of
//!   the server's formats.
//! - [`context`] carries cancellation and deadlines for each call.

#[cfg(feature = "async")]
pub mod client;
#[cfg(feature = "async")]
pub mod context;
pub mod error;
pub mod models;
pub mod parser;
