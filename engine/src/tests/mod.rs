mod common_test;
mod sequencer_tests;
mod state_based_tests;
mod targeting_tests;
mod trigger_tests;
