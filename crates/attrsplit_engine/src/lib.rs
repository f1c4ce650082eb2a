//! The service attribute CRUD split.
//!
//! This crate provides:
//! - [`DeclIndex`] - Resolution of the `Process`, `Register`, `Read` and `New*` anchors
//! - [`synthesize_crud`] - `Create`, `Update` and `Delete` from the `Process` diff loops
//! - [`synthesize_get_schema`] - `GetSchema` from the schema assignment in `Register`
//! - [`rewrite_read`] - Rebinding `Read` to the service version parameter
//! - [`wrap_ctor_returns`] - Wrapping constructor returns in the definition adapter
//! - [`emit_key`] - The `Key` accessor
//! - [`Refactorer`] - The whole pipeline for one file

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod anchors;
pub mod conventions;
pub mod crud;
pub mod ctor;
pub mod key;
pub mod read;
pub mod rewrite;
pub mod schema;


pub use anchors::{Anchor, AnchorPolicy, DeclIndex, find_anchor, handler_type};
pub use conventions::{Conventions, MapParam};
pub use crud::{BodyEdits, CrudMethod, Operation, derive_body, synthesize_crud};
pub use ctor::wrap_ctor_returns;
pub use key::emit_key;
pub use read::rewrite_read;
pub use rewrite::{Refactorer, Report};
pub use schema::synthesize_get_schema;
