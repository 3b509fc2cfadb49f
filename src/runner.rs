use super::{Result, TabplotError};
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::{debug, info};

fn temp_err(source: io::Error) -> TabplotError {
    TabplotError::Io {
        path: std::env::temp_dir(),
        source,
    }
}

/// Copies `input` to a temporary file so gnuplot can read it by name,
/// the file lives as long as the returned handle.
pub fn stage_input(mut input: impl Read) -> Result<NamedTempFile> {
    let mut staged = NamedTempFile::new().map_err(TabplotError::Stdin)?;
    io::copy(&mut input, &mut staged).map_err(TabplotError::Stdin)?;
    staged.flush().map_err(TabplotError::Stdin)?;
    debug!(path = %staged.path().display(), "staged standard input");
    Ok(staged)
}

/// writes the script to a temporary file that is removed when dropped
pub fn write_script(script: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("tabplot")
        .suffix(".gp")
        .tempfile()
        .map_err(temp_err)?;
    file.write_all(script.as_bytes()).map_err(temp_err)?;
    file.flush().map_err(temp_err)?;
    Ok(file)
}

/// Runs `program` on the script file and returns what it printed on stdout.
/// A non-zero exit becomes `PlotterFailed` carrying the exit code and stderr.
pub fn run_plotter(program: &str, script: &Path) -> Result<Vec<u8>> {
    info!(program, script = %script.display(), "running plotter");
    let output = Command::new(program)
        .arg(script)
        .output()
        .map_err(|source| TabplotError::Spawn {
            program: program.to_string(),
            source,
        })?;
    if !output.status.success() {
        // killed by a signal, no code
        let code = output.status.code().unwrap_or(1);
        return Err(TabplotError::PlotterFailed {
            program: program.to_string(),
            code,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(output.stdout)
}

/// Writes the script to a temporary file, runs the plotter on it, and relays
/// its output to `out`. In verbose mode the script and the command line go
/// to `out` first.
pub fn plot(program: &str, script: &str, verbose: bool, mut out: impl Write) -> Result<()> {
    let file = write_script(script)?;
    let write_err = |source| TabplotError::Io {
        path: "<stdout>".into(),
        source,
    };
    if verbose {
        write!(out, "{}", script).map_err(write_err)?;
        writeln!(out, "{} {}", program, file.path().display()).map_err(write_err)?;
    }
    let stdout = run_plotter(program, file.path())?;
    if !stdout.is_empty() {
        out.write_all(&stdout).map_err(write_err)?;
        out.flush().map_err(write_err)?;
    }
    Ok(())
}
