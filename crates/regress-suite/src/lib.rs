//! Query suite model and baseline storage for query-regress.
//!
//! A [`Suite`] is the ordered list of filter queries a regression run issues
//! against the analyzer. After a run every [`Query`] carries the number of
//! records its subscription streamed back. The same structure, minus the
//! transient record identifiers, is what gets persisted as the baseline.
//!
//! # Architecture
//!
//! - [`Query`] / [`Suite`] - the data model shared by runner and comparator
//! - [`BaselineStore`] - storage-agnostic load/save of a baseline snapshot
//! - [`FilesystemStore`] - stores the baseline as a pretty-printed JSON file
//! - [`QueryCatalog`] - the list of queries to run (built-in or YAML-defined)
//!
//! # File Format
//!
//! ```json
//! {
//!   "queries": [
//!     {
//!       "query": "amqp",
//!       "number_of_records": 42,
//!       "consistent": true
//!     }
//!   ]
//! }
//! ```

mod catalog;
mod filesystem;
mod query;
pub mod store;


pub use catalog::{CatalogEntry, QueryCatalog, DEFAULT_QUERIES};
pub use filesystem::FilesystemStore;
pub use query::{Query, Suite};
pub use store::{BaselineError, BaselineStore};
