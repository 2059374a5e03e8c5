//! Internal test modules - whitebox tests with crate access
//!
//! Tests here run the whole pipeline over fixture logs and can reach
//! crate-private items.
