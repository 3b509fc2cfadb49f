use super::column::ColumnSpec;
use super::metadata::SetMetadata;
use super::{Result, Style, TabplotError};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Quoted global fields of a script, in the order they are written.
pub const FIELDS: [&str; 5] = ["output", "title", "xlabel", "ylabel", "y2label"];

/// Wraps `value` in single quotes, doubling any quote inside it.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `set <field> '<value>'`
pub fn set_quoted(field: &str, value: &str) -> String {
    format!("set {} {}", field, quote(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Txt,
    Svg,
    Png,
}

impl OutputFormat {
    /// guess the format from the extension of the output file
    pub fn from_path(path: &Path) -> Result<OutputFormat> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            _ => Err(TabplotError::CannotGuessFormat(path.to_path_buf())),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = TabplotError;

    fn from_str(s: &str) -> Result<OutputFormat> {
        match s {
            "txt" => Ok(OutputFormat::Txt),
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            other => Err(TabplotError::UnknownFormat(other.to_string())),
        }
    }
}

/// The rendering backend and its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Dumb { columns: u32, rows: u32 },
    Svg { width: u32, height: u32 },
    Png { width: u32, height: u32 },
}

impl Terminal {
    /// An explicit format wins, otherwise it is guessed from the output path.
    /// Without either, plot as text as wide as the terminal and a quarter as tall.
    pub fn select(
        format: Option<OutputFormat>,
        output: Option<&Path>,
        (width, height): (u32, u32),
        term_columns: u32,
    ) -> Result<Terminal> {
        let format = match (format, output) {
            (Some(f), _) => f,
            (None, Some(path)) => OutputFormat::from_path(path)?,
            (None, None) => OutputFormat::Txt,
        };
        let terminal = match format {
            OutputFormat::Txt => Terminal::Dumb {
                columns: term_columns,
                rows: (term_columns / 4).max(1),
            },
            OutputFormat::Svg => Terminal::Svg { width, height },
            OutputFormat::Png => Terminal::Png { width, height },
        };
        Ok(terminal)
    }

    pub fn directive(&self) -> String {
        match self {
            Terminal::Dumb { columns, rows } => {
                format!("set terminal dumb size {},{}", columns, rows)
            }
            Terminal::Svg { width, height } => format!("set terminal svg size {},{}", width, height),
            Terminal::Png { width, height } => format!("set terminal png size {},{}", width, height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axes {
    X1Y1,
    X1Y2,
}

impl Axes {
    pub fn as_str(self) -> &'static str {
        match self {
            Axes::X1Y1 => "x1y1",
            Axes::X1Y2 => "x1y2",
        }
    }
}

/// One series of the plot statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotClause {
    pub source: String,
    pub index: usize,
    pub x: usize,
    pub y: usize,
    pub axes: Axes,
    pub title: Option<String>,
    pub style: Style,
}

impl PlotClause {
    pub fn render(&self) -> String {
        let mut clause = format!(
            "{} index {} using {}:{} axes {}",
            quote(&self.source),
            self.index,
            self.x,
            self.y,
            self.axes.as_str()
        );
        match &self.title {
            Some(t) => {
                clause.push_str(" title ");
                clause.push_str(&quote(t));
            }
            None => clause.push_str(" notitle"),
        }
        clause.push_str(" with ");
        clause.push_str(self.style.as_str());
        clause
    }
}

/// Title of a series: the set name (or the input file name)
/// followed by the column label (or name, or number).
pub fn clause_title(
    set: &SetMetadata,
    source_name: Option<&str>,
    column: &ColumnSpec,
) -> String {
    let set_part = set.name.as_deref().or(source_name);
    let column_part = match &column.label {
        Some(l) => l.clone(),
        None => match set.column_name(column.column) {
            Some(n) => n.to_string(),
            None => format!("column {}", column.column),
        },
    };
    match set_part {
        Some(s) => format!("{} {}", s, column_part),
        None => column_part,
    }
}

/// What to plot: the data file, which of its sets and which columns.
#[derive(Debug, Clone)]
pub struct PlotRequest<'a> {
    pub source: &'a str,
    pub source_name: Option<&'a str>,
    pub sets: &'a [SetMetadata],
    pub indices: &'a [usize],
    pub x: &'a ColumnSpec,
    pub y: &'a [ColumnSpec],
    pub y2: &'a [ColumnSpec],
    pub style: Style,
}

impl<'a> PlotRequest<'a> {
    /// one clause per set and y column, secondary axis columns after the primary ones
    pub fn clauses(&self) -> Vec<PlotClause> {
        let mut clauses = Vec::with_capacity(self.indices.len() * (self.y.len() + self.y2.len()));
        for &index in self.indices {
            let set = match self.sets.get(index) {
                Some(s) => s,
                None => continue,
            };
            let on_y1 = self.y.iter().map(|c| (c, Axes::X1Y1));
            let on_y2 = self.y2.iter().map(|c| (c, Axes::X1Y2));
            for (column, axes) in on_y1.chain(on_y2) {
                clauses.push(PlotClause {
                    source: self.source.to_string(),
                    index,
                    x: self.x.column,
                    y: column.column,
                    axes,
                    title: Some(clause_title(set, self.source_name, column)),
                    style: self.style,
                });
            }
        }
        clauses
    }
}

/// A complete gnuplot script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub terminal: Terminal,
    pub output: Option<String>,
    pub title: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub y2label: Option<String>,
    pub clauses: Vec<PlotClause>,
}

impl Script {
    pub fn new(terminal: Terminal) -> Script {
        Script {
            terminal,
            output: None,
            title: None,
            xlabel: None,
            ylabel: None,
            y2label: None,
            clauses: Vec::new(),
        }
    }

    /// global fields paired with their names, see [`FIELDS`]
    pub fn fields(&self) -> [(&'static str, Option<&str>); 5] {
        [
            (FIELDS[0], self.output.as_deref()),
            (FIELDS[1], self.title.as_deref()),
            (FIELDS[2], self.xlabel.as_deref()),
            (FIELDS[3], self.ylabel.as_deref()),
            (FIELDS[4], self.y2label.as_deref()),
        ]
    }

    fn uses_y2(&self) -> bool {
        self.clauses.iter().any(|c| c.axes == Axes::X1Y2)
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.terminal.directive())?;
        for (field, value) in self.fields() {
            if let Some(v) = value.filter(|v| !v.is_empty()) {
                writeln!(f, "{}", set_quoted(field, v))?;
            }
        }
        if self.uses_y2() {
            writeln!(f, "set y2tics")?;
            writeln!(f, "set ytics nomirror")?;
        }
        let clauses: Vec<String> = self.clauses.iter().map(PlotClause::render).collect();
        writeln!(f, "plot {}", clauses.join(", "))
    }
}
