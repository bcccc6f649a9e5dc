//! Output and exit-status helpers for CLI commands.

use launcher_common::constants::RETRY_EXIT_CODE;
use launcher_common::error::LauncherError;

/// Process exit status for a failed command.
///
/// A failed external command passes its own exit code through, so a
/// supervisor can tell the retry code apart from ordinary failures.
pub fn exit_status(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<LauncherError>())
        .and_then(LauncherError::exit_code)
        .and_then(|code| u8::try_from(code).ok())
        .filter(|&code| code != 0)
        .unwrap_or(1)
}

/// Whether `err` asks the caller to retry the launch.
pub fn is_retry(err: &anyhow::Error) -> bool {
    i32::from(exit_status(err)) == RETRY_EXIT_CODE
}

/// Renders a two-column listing with the first column padded to fit.
pub fn columns<'a>(rows: impl IntoIterator<Item = (&'a str, String)>) -> String {
    let rows: Vec<_> = rows.into_iter().collect();
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| format!("  {label:<width$}  {value}\n"))
        .collect()
}
