//! Integration test suite for the Flock server and client.

mod helpers;

mod consumer_test;
mod reconnect_test;
mod stream_test;
