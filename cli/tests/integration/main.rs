//! Integration tests for agentctl
//!
//! These tests spawn the actual binary against a config whose every path
//! lives in a temp dir. No test reaches the host supervisor.

mod cli_tests;
