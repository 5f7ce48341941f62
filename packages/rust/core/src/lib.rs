//! Core workflows for Folio.
//!
//! This crate ties the content-store and captioning clients together into the
//! artwork backfill (`ingest`), and holds the site-facing gallery and contact
//! logic.

pub mod contact;
pub mod dedupe;
pub mod gallery;
pub mod ingest;
pub mod lister;
pub mod publisher;
pub mod store;
