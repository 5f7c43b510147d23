//! Property-based tests for IR structures.
//!
//! Uses proptest to verify invariants across wide input spaces.
