//! # Unit Components
//!
//! Groups the tests for the policy, the reference cache model, configuration
//! loading, and statistics.



/// Policy and cache counter tests.
pub mod stats;
