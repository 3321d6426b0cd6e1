//! # docstore
//!
//! A client for document stores: connect to a named database, resolve
//! collections into handles, insert ordered schemaless documents and read
//! them back through lazy, batched cursors.
//!
//! ## Quick Start
//!
//! ```rust
//! use docstore::doc;
//! use docstore::filter::{all, field};
//! use docstore::store::InMemoryServer;
//! use docstore::DocStoreClient;
//!
//! let server = InMemoryServer::new();
//! let client = DocStoreClient::connect(server, "test").unwrap();
//!
//! let collection = client.collection("t1").unwrap();
//! collection.clear().unwrap();
//!
//! let mut document = doc! { a: 1 };
//! collection.insert(&document).unwrap();
//! document.put("a", 2).unwrap();
//! collection.insert(&document).unwrap();
//!
//! for document in collection.find(all()).unwrap() {
//!     println!("{}", document.unwrap());
//! }
//! assert_eq!(collection.count_matching(field("a").gt(1)).unwrap(), 1);
//! ```
//!
//! ## Design
//!
//! The client, collection handles and servers are thin `Arc` wrappers around
//! their implementation, so clones are cheap and share state. A server is any
//! [ServerProvider](store::ServerProvider); the crate ships an
//! [InMemoryServer](store::InMemoryServer) that keeps everything in process
//! memory and can be switched off to simulate a lost connection.
//!
//! ## Module Organization
//!
//! - [`client`] - connection to a database
//! - [`client_builder`] / [`client_config`] - client settings
//! - [`collection`] - documents, collection handles and operation options
//! - [`common`] - values, cursors and shared utilities
//! - [`errors`] - error types and result alias
//! - [`filter`] - query filters
//! - [`store`] - the server contract and the in-memory server

use crate::collection::ObjectIdGenerator;
use std::sync::LazyLock;

pub mod client;
pub mod client_builder;
pub mod client_config;
pub mod collection;
pub mod common;
pub mod errors;
pub mod filter;
pub mod store;

pub use client::DocStoreClient;
pub use client_builder::ClientBuilder;
pub use client_config::ClientConfig;
pub use collection::{
    CollectionMode, CollectionOptions, DocStoreCollection, Document, DocumentLike, ObjectId,
};
pub use common::{CursorState, DocumentCursor, Value};
pub use errors::{DocStoreError, DocStoreResult, ErrorKind};

pub(crate) static ID_GENERATOR: LazyLock<ObjectIdGenerator> = LazyLock::new(ObjectIdGenerator::new);
