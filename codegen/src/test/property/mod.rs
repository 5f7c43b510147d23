//! Property-based tests for binding parameters.

mod binding_props;
