//! Test suites for the console runtime.
