//! # Edge Broker Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks (matching, fan-out)
//! └── src/integration/  # Cross-subsystem flows
//!     ├── support.rs       # Shared fixtures
//!     ├── replication.rs   # Registry convergence across replicas
//!     ├── delivery.rs      # Subscribe → push → live channel
//!     ├── gateway.rs       # Full HTTP flows through the router
//!     └── live_channel.rs  # WebSocket clients against a bound server
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p eb-tests
//! cargo test -p eb-tests integration::replication
//! cargo bench -p eb-tests
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod integration;
