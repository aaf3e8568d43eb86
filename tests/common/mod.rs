//! Common test infrastructure
//!
//! This module provides the fixture database the end-to-end migration tests
//! run against. Tests should only import from this module.

mod fixtures;

// Public API - this is what tests import
pub use fixtures::{
    insert_album, insert_membership, insert_rating, insert_tag, FixtureDb,
};
