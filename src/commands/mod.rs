use std::io::Read;
use std::path::PathBuf;

use excise::surgery::SurgeryPlan;

pub type CmdResult<T> = excise::Result<(T, i32)>;

// ============================================================================
// Plan Input Parsing (CLI layer)
// ============================================================================

/// Read a plan spec from string, file (@path), or stdin (-).
fn read_json_spec_to_string(spec: &str) -> excise::Result<String> {
    if spec.trim() == "-" {
        let mut buf = String::new();
        if crate::tty::is_stdin_tty() {
            return Err(excise::Error::validation_invalid_argument(
                "plan",
                "Cannot read plan from stdin when stdin is a TTY",
            ));
        }
        std::io::stdin().read_to_string(&mut buf).map_err(|e| {
            excise::Error::internal_io(e.to_string(), Some("read stdin".to_string()))
        })?;
        return Ok(buf);
    }

    if let Some(path) = spec.strip_prefix('@') {
        if path.trim().is_empty() {
            return Err(excise::Error::validation_invalid_argument(
                "plan",
                "Invalid plan spec '@' (missing file path)",
            ));
        }
        let path = excise::io::resolve_path(path)?;
        return excise::io::read_file(&path, &format!("read {}", path.display()));
    }

    Ok(spec.to_string())
}

/// Load a surgery plan from any supported spec form.
pub(crate) fn load_plan(spec: &str) -> excise::Result<SurgeryPlan> {
    let raw = read_json_spec_to_string(spec)?;
    SurgeryPlan::from_json(&raw)
}

/// Resolve the target file argument and make sure it is a regular file.
pub(crate) fn target_file(raw: &str) -> excise::Result<PathBuf> {
    let path = excise::io::resolve_path(raw)?;
    if !path.is_file() {
        return Err(excise::Error::validation_invalid_argument(
            "file",
            format!("Not a file: {}", path.display()),
        ));
    }
    Ok(path)
}

pub mod apply;
pub mod scan;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (excise::Result<serde_json::Value>, i32) {
    crate::tty::status("excise is working...");

    match command {
        crate::Commands::Scan(args) => dispatch!(args, scan),
        crate::Commands::Apply(args) => dispatch!(args, apply),
    }
}
