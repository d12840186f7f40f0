//! Integration tests driving the tracker end to end

mod tracker_tests;
