use std::io;
use std::path::PathBuf;
use thiserror::Error;
pub mod app;
pub mod cli;
pub mod column;
pub mod logging;
pub mod metadata;
pub mod runner;
pub mod script;

pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

/// plotting binary, overridden by the `TABPLOT_GNUPLOT` environment variable
pub const GNUPLOT: &str = "gnuplot";
pub const GNUPLOT_ENV: &str = "TABPLOT_GNUPLOT";

/// image size used by the svg and png terminals
pub const DEFAULT_WIDTH: u32 = 1000;
pub const DEFAULT_HEIGHT: u32 = 500;

/// text terminal width when `COLUMNS` is missing or unusable
pub const DEFAULT_TERM_COLUMNS: u32 = 80;
pub const TERM_COLUMNS_ENV: &str = "COLUMNS";

/// How a series is drawn in the plot statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Lines,
    Points,
}

impl Style {
    pub fn as_str(self) -> &'static str {
        match self {
            Style::Lines => "lines",
            Style::Points => "points",
        }
    }
}

/// The two flavours of the tool, one per binary.
/// They share everything but these few defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub name: &'static str,
    pub default_x: &'static str,
    pub style: Style,
    pub list_metadata: bool,
}

impl Variant {
    /// x defaults to the first column, series drawn with lines
    pub const LINES: Variant = Variant {
        name: "tabplot",
        default_x: "1",
        style: Style::Lines,
        list_metadata: true,
    };

    /// x defaults to gnuplot's row number pseudo-column, series drawn with points
    pub const POINTS: Variant = Variant {
        name: "tabplot_points",
        default_x: "0",
        style: Style::Points,
        list_metadata: false,
    };
}

/// Every way a run can abort.
#[derive(Debug, Error)]
pub enum TabplotError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not stage standard input: {0}")]
    Stdin(#[source] io::Error),
    #[error("no data found")]
    NoData,
    #[error("bad column number: {0}")]
    BadColumnNumber(String),
    #[error("column out of range: {column} (data has {columns} columns)")]
    ColumnOutOfRange { column: usize, columns: usize },
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("data set out of range: {set} (data has {sets} sets)")]
    SetOutOfRange { set: usize, sets: usize },
    #[error("invalid {what}: {value}")]
    InvalidNumber { what: &'static str, value: String },
    #[error("unknown output format: {0}")]
    UnknownFormat(String),
    #[error("can't guess format of {}, use --output-format", .0.display())]
    CannotGuessFormat(PathBuf),
    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with code {code}")]
    PlotterFailed {
        program: String,
        code: i32,
        stderr: String,
    },
    #[error(transparent)]
    Usage(#[from] clap::Error),
}

pub type Result<T> = std::result::Result<T, TabplotError>;
