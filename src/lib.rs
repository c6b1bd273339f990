//! Tollgate - Distributed Fixed-Window Rate Limiting
//!
//! This crate implements the storage-facing core of a distributed rate
//! limiter: policy and counter persistence over a shared key-value store,
//! plus the request-processing strategy that performs an atomic
//! check-and-increment under a per-key distributed lock. The surrounding
//! HTTP middleware classifies requests into a client identity, matches a
//! rule, and compares the returned counter against the rule's limit.

pub mod config;
pub mod error;
pub mod ratelimit;
pub mod store;
