//! Glue between the command line, the scanner, the script builder and gnuplot.

use super::cli::{self, Options};
use super::column::{self, ColumnSpec};
use super::metadata::{self, SetMetadata};
use super::script::{PlotRequest, Script, Terminal};
use super::{logging, runner};
use super::{Result, TabplotError, Variant};
use super::{DEFAULT_TERM_COLUMNS, GNUPLOT, GNUPLOT_ENV, TERM_COLUMNS_ENV};
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info, warn};

/// Settings taken from the environment rather than the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub program: String,
    pub term_columns: u32,
}

impl Settings {
    pub fn from_env() -> Settings {
        let program = std::env::var(GNUPLOT_ENV).unwrap_or_else(|_| GNUPLOT.to_string());
        Settings {
            program,
            term_columns: terminal_columns(std::env::var(TERM_COLUMNS_ENV).ok().as_deref()),
        }
    }
}

/// width of the text plot, from the `COLUMNS` value if it is a positive number
pub fn terminal_columns(columns: Option<&str>) -> u32 {
    match columns.map(|c| c.trim().parse::<u32>()) {
        Some(Ok(c)) if c > 0 => c,
        Some(_) => {
            warn!(?columns, "unusable terminal width, using {}", DEFAULT_TERM_COLUMNS);
            DEFAULT_TERM_COLUMNS
        }
        None => DEFAULT_TERM_COLUMNS,
    }
}

fn resolve_all(specs: &[String], reference: &SetMetadata) -> Result<Vec<ColumnSpec>> {
    specs
        .iter()
        .map(|s| column::resolve(s, reference))
        .collect()
}

fn single_label(columns: &[ColumnSpec]) -> Option<String> {
    match columns {
        [only] => only.label.clone(),
        _ => None,
    }
}

fn select_sets(requested: &[usize], sets: &[SetMetadata]) -> Result<Vec<usize>> {
    if requested.is_empty() {
        return Ok((0..sets.len()).collect());
    }
    for &set in requested {
        if set >= sets.len() {
            return Err(TabplotError::SetOutOfRange {
                set,
                sets: sets.len(),
            });
        }
    }
    Ok(requested.to_vec())
}

/// Builds the gnuplot script for `sets` read from `source`.
/// Columns are resolved against the first set; y defaults to the column after x.
pub fn build_script(
    variant: Variant,
    options: &Options,
    sets: &[SetMetadata],
    source: &Path,
    source_name: Option<&str>,
    term_columns: u32,
) -> Result<Script> {
    let reference = sets.first().ok_or(TabplotError::NoData)?;
    let x = column::resolve(&options.x, reference)?;
    let y = if options.y.is_empty() {
        vec![x.next(reference)?]
    } else {
        resolve_all(&options.y, reference)?
    };
    let y2 = resolve_all(&options.y2, reference)?;
    let indices = select_sets(&options.sets, sets)?;

    let terminal = Terminal::select(
        options.format,
        options.output.as_deref(),
        (options.width, options.height),
        term_columns,
    )?;
    info!(terminal = %terminal.directive(), "selected terminal");

    let source = source.display().to_string();
    let request = PlotRequest {
        source: &source,
        source_name,
        sets,
        indices: &indices,
        x: &x,
        y: &y,
        y2: &y2,
        style: variant.style,
    };
    let mut script = Script::new(terminal);
    script.output = options.output.as_ref().map(|p| p.display().to_string());
    script.title = options.title.clone();
    script.xlabel = x.label.clone();
    script.ylabel = single_label(&y);
    script.y2label = single_label(&y2);
    script.clauses = request.clauses();
    debug!(clauses = script.clauses.len(), "built script");
    Ok(script)
}

/// Scans the input (a file, or `stdin` staged to a temporary file),
/// then either lists its metadata or plots it, writing to `out`.
pub fn run(
    variant: Variant,
    options: &Options,
    settings: &Settings,
    stdin: impl Read,
    mut out: impl Write,
) -> Result<()> {
    let staged = match &options.input {
        Some(_) => None,
        None => Some(runner::stage_input(stdin)?),
    };
    let (source, source_name) = match (&options.input, &staged) {
        (Some(path), _) => (path.as_path(), path.file_name().and_then(|n| n.to_str())),
        (None, Some(file)) => (file.path(), None),
        (None, None) => return Err(TabplotError::NoData),
    };

    let sets = metadata::scan_file(source)?;
    if options.list_metadata {
        return metadata::render_listing(&sets, &mut out).map_err(|source| TabplotError::Io {
            path: "<stdout>".into(),
            source,
        });
    }

    let script = build_script(
        variant,
        options,
        &sets,
        source,
        source_name,
        settings.term_columns,
    )?;
    runner::plot(&settings.program, &script.render(), options.verbose, out)
}

/// Entry point shared by the binaries.
pub fn main_with(variant: Variant) -> ExitCode {
    if let Err(err) = logging::init_logging() {
        eprintln!("{}: failed to initialize logging: {}", variant.name, err);
        return ExitCode::FAILURE;
    }

    let options = match cli::parse_cli(variant) {
        Ok(o) => o,
        Err(TabplotError::Usage(e)) => e.exit(),
        Err(e) => {
            eprintln!("{}: {}", variant.name, e);
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    match run(
        variant,
        &options,
        &Settings::from_env(),
        io::stdin(),
        stdout.lock(),
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(TabplotError::PlotterFailed { program, code, stderr }) => {
            debug!(program = %program, code, "plotter failed");
            eprint!("{}", stderr);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
        Err(e) => {
            eprintln!("{}: {}", variant.name, e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    fn options(args: &[&str]) -> Options {
        let mut full = vec!["tabplot"];
        full.extend_from_slice(args);
        cli::parse_cli_from(Variant::LINES, full).expect("valid arguments")
    }

    fn sets() -> Vec<SetMetadata> {
        vec![
            SetMetadata {
                name: Some("a".into()),
                columns: vec!["t".into(), "v".into(), "w".into()],
            },
            SetMetadata {
                name: Some("b".into()),
                columns: vec!["t".into(), "v".into(), "w".into()],
            },
        ]
    }

    fn build(variant: Variant, args: &[&str]) -> Result<Script> {
        build_script(
            variant,
            &options(args),
            &sets(),
            Path::new("in.dat"),
            Some("in.dat"),
            80,
        )
    }

    #[rstest]
    #[case::unset(None, 80)]
    #[case::set(Some("132"), 132)]
    #[case::padded(Some(" 100 "), 100)]
    #[case::zero(Some("0"), 80)]
    #[case::garbage(Some("wide"), 80)]
    fn terminal_width(#[case] raw: Option<&str>, #[case] expected: u32) {
        assert_eq!(terminal_columns(raw), expected);
    }

    #[test]
    fn default_plot_has_one_clause_per_set() {
        let script = build(Variant::LINES, &[]).expect("valid script");
        let summary: Vec<(usize, usize, usize)> =
            script.clauses.iter().map(|c| (c.index, c.x, c.y)).collect();
        assert_eq!(summary, vec![(0, 1, 2), (1, 1, 2)]);
        assert_eq!(script.xlabel.as_deref(), Some("t"));
        assert_eq!(script.ylabel.as_deref(), Some("v"));
        assert_eq!(script.terminal, Terminal::Dumb { columns: 80, rows: 20 });
    }

    #[test]
    fn points_variant_defaults_to_row_numbers() {
        let script = build(Variant::POINTS, &[]).expect("valid script");
        assert_eq!(script.clauses[0].x, 0);
        assert_eq!(script.clauses[0].y, 1);
        assert_eq!(script.xlabel, None);
        assert!(script.render().contains("with points"));
    }

    #[test]
    fn selected_sets_and_secondary_axis() {
        let script = build(
            Variant::LINES,
            &["-s", "1", "-y", "v", "-y", "3=W", "-y2", "w", "-o", "p.svg"],
        )
        .expect("valid script");
        assert_eq!(script.clauses.len(), 3);
        assert!(script.clauses.iter().all(|c| c.index == 1));
        assert_eq!(script.ylabel, None);
        assert_eq!(script.y2label.as_deref(), Some("w"));
        assert_eq!(script.output.as_deref(), Some("p.svg"));
        assert_eq!(
            script.terminal,
            Terminal::Svg {
                width: 1000,
                height: 500
            }
        );
    }

    #[rstest]
    #[case::set_out_of_range(&["-s", "2"])]
    #[case::bad_y(&["-y", "x=v"])]
    #[case::unknown_y2(&["-y2", "pressure"])]
    #[case::no_column_after_x(&["-x", "3"])]
    #[case::unknown_extension(&["-o", "plot.pdf"])]
    fn rejects(#[case] args: &[&str]) {
        assert!(build(Variant::LINES, args).is_err());
    }

    #[test]
    fn lists_metadata_without_plotting() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path: PathBuf = dir.path().join("in.dat");
        std::fs::write(&path, "# a\n# t v\n1 2\n").expect("write data");
        let mut opts = options(&["-l"]);
        opts.input = Some(path);
        let settings = Settings {
            program: "tabplot-no-such-plotter".into(),
            term_columns: 80,
        };
        let mut out = Vec::new();
        run(Variant::LINES, &opts, &settings, io::empty(), &mut out).expect("listing works");
        assert_eq!(String::from_utf8(out).expect("utf8"), "set 0: a\n  1: t\n  2: v\n");
    }
}
