// wcf-core/src/lib.rs

#![allow(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (interfaces/traits): the contracts (Connector, Processor, Exporter...).
pub mod ports;

// 2. Domain: graph, schema, runbook model, registry. Depends on nothing else.
pub mod domain;

// 3. Infrastructure (adapters): fs, parsing, config, schema path resolution.
// Depends on domain and ports.
pub mod infrastructure;

// 4. Application (use cases): flattener, planner, executor, export builder.
// Depends on domain, infrastructure, and ports.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::WcfError;
