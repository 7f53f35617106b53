//! Application service tests
//!
//! Tests for the client panel: session control, path editing, change
//! detection and commits against a mock persistence service.

mod commit;
