//! Unit tests for the store, aggregation and report pipeline

mod store_tests;
