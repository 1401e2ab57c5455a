//! CI platform collaborators.
//!
//! The only network touchpoint: fetching a job's log (trace) from the CI
//! platform. Analysis itself never performs I/O beyond local file reads.

pub mod trace;

pub use trace::TraceClient;
