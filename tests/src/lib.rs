//! # Roam-Sync Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/   # Store + registry + propagation end to end
//! │   ├── flows.rs       # Read/write, registration, delivery per context
//! │   └── concurrency.rs # Threads racing registration against sweeps
//! │
//! └── benches/           # criterion: registration and sweep cost
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p roam-tests
//! cargo test -p roam-tests integration::flows
//!
//! # Benchmarks
//! cargo bench -p roam-tests
//! ```

pub mod integration;
