// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Warden Integration Tests
//!
//! Shared fixtures and mocks, plus the cross-component test suites under
//! `tests/`.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Gateways and routers on a manual clock, request helpers
//!   - `mocks`: A scripted, call-counting introspector
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p warden-tests
//! cargo test -p warden-tests --test integration_gateway
//! ```
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use warden_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let stub = StubIntrospector::active("read write");
//!     let fixture = GatewayFixture::with_introspector(stub.clone());
//!     let decision = fixture.gateway.check(&bearer_headers("opaque"), "write").await;
//!     assert!(decision.allowed);
//!     assert_eq!(stub.calls(), 1);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::mocks::*;
    pub use crate::common::init_test_logging;
}
