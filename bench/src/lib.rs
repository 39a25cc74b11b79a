//! Benchmark utilities for the dispatch engine.
//!
//! The benchmarks drive complete engine lifecycles (add, start, shutdown, await termination) so
//! they measure queueing, dispatch and worker hand-off together:
//!
//! - **Overhead**: empty commands, dominated by queue and channel costs
//! - **CPU bound**: commands spinning for a fixed number of iterations
//! - **Latency bound**: sleeping commands, where parallel mode should scale with worker count
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench -p dispatch_bench
//!
//! # Run specific benchmark group
//! cargo bench -p dispatch_bench -- overhead
//! ```

pub mod workloads;
