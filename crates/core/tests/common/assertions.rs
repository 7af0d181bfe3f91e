//! Custom assertion helpers.

use super::mock_runner::RecordedCall;
use pipeline_core::executor::RunOptions;

/// Assert that a recorded call is a single command with the given exec form,
/// returning its options.
#[allow(dead_code)]
pub fn assert_single_call<'a>(call: &'a RecordedCall, expected: &[&str]) -> &'a RunOptions {
    match call {
        RecordedCall::Single { command, options } => {
            assert_eq!(
                command.exec_form(),
                expected,
                "Unexpected command {command}"
            );
            options
        }
        RecordedCall::Parallel(commands) => {
            panic!("Expected a single command, got parallel batch {commands:?}")
        }
    }
}

/// Assert that `args` contains `flag` immediately followed by `value`.
#[allow(dead_code)]
pub fn assert_flag_value(args: &[String], flag: &str, value: &str) {
    let position = args
        .iter()
        .position(|arg| arg == flag)
        .unwrap_or_else(|| panic!("Flag {flag} missing from {args:?}"));
    assert_eq!(
        args.get(position + 1).map(String::as_str),
        Some(value),
        "Unexpected value for {flag} in {args:?}"
    );
}
