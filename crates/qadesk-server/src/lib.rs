//! HTTP surface for qadesk
//!
//! Every handler shares one `QaService` through an `Arc`; the service is
//! read-only apart from its journals, so no request-level locking is needed.

pub mod server;

pub use server::QaServer;
