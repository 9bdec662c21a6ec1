// File: discolytics-core/tests/unit/mod.rs

#[path = "../test_utils/helpers.rs"]
mod helpers;

mod command_timer_tests;
mod identity_tests;
