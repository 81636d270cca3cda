//! Scenario tests for the collision engine

mod registry_consistency;
