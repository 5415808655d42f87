//! Property-based tests for category resolution.
//!
//! Graphs are generated as DAGs (a category may only depend on categories
//! with a lower index) and then declared in shuffled order, so dependencies
//! are often declared after the categories that need them.
