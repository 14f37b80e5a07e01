//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the driver end to end
//! against the scripted [`mock_board::MockBoard`].  All tests run on the
//! host with no serial hardware required.

mod mock_board;
mod status_tests;
mod write_tests;
