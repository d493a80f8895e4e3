#![deny(missing_debug_implementations)]
#![cfg_attr(test, deny(rust_2018_idioms))]

//! # mercury
//!
//! A byte-level, incremental HTTP/1.x message parser and composer.
//!
//! `mercury` is a sans-I/O library: the hard part, [`proto::h1::Parser`], is a
//! state machine that you feed arbitrary fragments of bytes and that hands
//! back fully validated [`Request`](message::Request)s or
//! [`Response`](message::Response)s. It never touches a socket itself.
//!
//! Sockets, TLS, event loops, and content codecs are external collaborators.
//! A thin `tokio`-based glue layer over the state machine is available behind
//! the `runtime` feature as [`server`] and [`client`].
//!
//! # Stability
//!
//! This crate covers HTTP/1.x message parsing and composition only. HTTP/2,
//! HTTP/3, persistent-connection pooling, and content-codec implementations
//! (gzip, deflate, ...) are out of scope; the body model exposes a hook for
//! a caller-supplied codec registry instead.

pub mod body;
pub mod buf;
pub mod config;
pub mod date;
pub mod error;
pub mod header;
pub mod message;
pub mod method;
pub mod proto;
pub mod status;
pub mod uri;
pub mod version;

#[cfg(feature = "runtime")]
pub mod client;
#[cfg(feature = "runtime")]
pub mod server;

pub use crate::config::ParserConfig;
pub use crate::error::{Error, Result};
pub use crate::message::{Request, Response};
pub use crate::method::Method;
pub use crate::status::Status;
pub use crate::uri::Uri;
pub use crate::version::Version;
