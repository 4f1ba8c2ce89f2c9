pub mod board;
pub mod import;
pub mod move_cmd;
pub mod tasks;

use std::path::Path;

use chrono::NaiveDate;
use clientdesk_core::config::{ProjectConfig, load_project_config};
use clientdesk_core::dates::{Clock, DateParseError, FixedClock, SystemClock};
use clientdesk_core::error::ErrorCode;
use clientdesk_core::model::ParseEnumError;

use crate::output::{CliError, OutputMode, fail};
use crate::store::JsonFileSource;

/// `--today` pins the clock; otherwise the local date is used.
pub fn resolve_today(flag: Option<NaiveDate>) -> NaiveDate {
    let clock: Box<dyn Clock> = match flag {
        Some(date) => Box::new(FixedClock(date)),
        None => Box::new(SystemClock),
    };
    clock.today()
}

/// Open the task file, rendering a coded error when it is missing or holds a bad field.
pub fn open_source(path: &Path, output: OutputMode) -> anyhow::Result<JsonFileSource> {
    if !path.exists() {
        return Err(fail(
            output,
            &CliError::coded(
                ErrorCode::TaskFileMissing,
                format!("task file not found: {}", path.display()),
            ),
        ));
    }
    JsonFileSource::open(path).map_err(|e| fail(output, &task_file_error(&e)))
}

/// Attach the field-level code when a task file holds a bad date or enum value.
fn task_file_error(err: &anyhow::Error) -> CliError {
    let message = format!("{err:#}");
    let code = err
        .downcast_ref::<DateParseError>()
        .map(DateParseError::code)
        .or_else(|| {
            err.downcast_ref::<ParseEnumError>()
                .map(|_| ParseEnumError::CODE)
        });
    match code {
        Some(code) => CliError::coded(code, message),
        None => CliError::new(message),
    }
}

/// Load `.clientdesk/config.toml` from the working directory.
pub fn project_config(output: OutputMode) -> anyhow::Result<ProjectConfig> {
    let root = std::env::current_dir()?;
    load_project_config(&root).map_err(|e| {
        fail(
            output,
            &CliError::coded(ErrorCode::ConfigParseError, format!("{e:#}")),
        )
    })
}
