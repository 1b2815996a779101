//! JSON output for CLI commands
//!
//! A command prints exactly one line:
//! `{"status":"ok","data":...}` or `{"status":"error","code":...,"message":...}`.

use std::io::{self, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    write_line(out, &json!({ "status": "ok", "data": data }))
}

pub fn write_error<W: Write>(out: &mut W, err: &CliError) -> CliResult<()> {
    write_line(
        out,
        &json!({ "status": "error", "code": err.code(), "message": err.to_string() }),
    )
}

pub fn stdout() -> io::StdoutLock<'static> {
    io::stdout().lock()
}

fn write_line<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
