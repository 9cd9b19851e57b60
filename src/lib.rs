// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # golr-assoc
//!
//! A query facade over Golr-schema Solr indexes holding subject–relation–object
//! associations with evidence and provenance.
//!
//! ## Architecture
//!
//! - **Field dictionary** (`field`): canonical field names shared by every module
//! - **Schema mapper** (`schema`): per-backend field tables and dialect quirks
//! - **Query compiler** (`compile`): typed [`QueryRequest`](query::QueryRequest) → Solr parameters
//! - **Backend client** (`backend`): endpoint routing and HTTP execution via `ureq`
//! - **Result translator** (`translate`): rows and facets → associations, groups, counts
//! - **Service** (`service`): searches, distinct listings, slims, information content
//!
//! ## Library usage
//!
//! ```no_run
//! use golr_assoc::config::GolrConfig;
//! use golr_assoc::query::QueryRequest;
//! use golr_assoc::service::AssociationService;
//!
//! let service = AssociationService::connect(&GolrConfig::default()).unwrap();
//! let req = QueryRequest::for_subject("HGNC:11025").with_categories("gene", "phenotype");
//! let results = service.search_associations(&req).unwrap();
//! for assoc in &results.associations {
//!     println!("{:?} -> {:?}", assoc.subject, assoc.object);
//! }
//! ```

pub mod backend;
pub mod compile;
pub mod config;
pub mod error;
pub mod field;
pub mod query;
pub mod schema;
pub mod service;
pub mod translate;
