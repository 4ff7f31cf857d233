pub mod assign;
pub mod completions;
pub mod create;
pub mod dashboard;
pub mod list;
pub mod login;
pub mod logout;
pub mod routes;
pub mod show;
pub mod status;
pub mod whoami;

use std::str::FromStr;

use petitions_core::error::ErrorCode;
use petitions_core::model::ParseEnumError;
use petitions_core::view::ActionError;

use crate::output::{CliError, OutputMode, fail};

/// Map a view's action error onto a CLI error with its stable code.
pub fn action_cli_error(err: &ActionError) -> CliError {
    CliError::from_code(err.code(), err.to_string())
}

/// Parse a status/department/role argument, reporting `E2003` on failure.
pub fn parse_enum<T>(output: OutputMode, raw: &str) -> anyhow::Result<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    match raw.parse() {
        Ok(value) => Ok(value),
        Err(e) => fail(output, &CliError::from_code(ErrorCode::InvalidEnumValue, e.to_string())),
    }
}

/// Report a failed view load with the view's message and failure code.
pub fn load_failed<T>(output: OutputMode, message: &str, code: Option<ErrorCode>) -> anyhow::Result<T> {
    fail(
        output,
        &CliError::from_code(code.unwrap_or(ErrorCode::ServerRejected), message),
    )
}
