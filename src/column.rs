use super::metadata::SetMetadata;
use super::{Result, TabplotError};
use tracing::debug;

/// A column picked on the command line, with the label shown for it.
/// Column 0 is gnuplot's row number pseudo-column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub column: usize,
    pub label: Option<String>,
}

impl ColumnSpec {
    /// column by number, labelled with its name in `set`
    pub fn numbered(column: usize, set: &SetMetadata) -> Result<ColumnSpec> {
        check_range(column, set)?;
        Ok(ColumnSpec {
            column,
            label: set.column_name(column).map(String::from),
        })
    }

    /// the column right after this one, the default y of a plot
    pub fn next(&self, set: &SetMetadata) -> Result<ColumnSpec> {
        ColumnSpec::numbered(self.column + 1, set)
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn check_range(column: usize, set: &SetMetadata) -> Result<()> {
    if column > set.column_count() {
        return Err(TabplotError::ColumnOutOfRange {
            column,
            columns: set.column_count(),
        });
    }
    Ok(())
}

fn parse_column(s: &str) -> Result<usize> {
    if !is_digits(s) {
        return Err(TabplotError::BadColumnNumber(s.to_string()));
    }
    s.parse::<usize>()
        .map_err(|_| TabplotError::BadColumnNumber(s.to_string()))
}

/// Resolves `COLUMN=LABEL`, `COLUMN` or `LABEL` against the columns of `set`.
/// An empty label after `=` falls back to the column name.
pub fn resolve(spec: &str, set: &SetMetadata) -> Result<ColumnSpec> {
    let resolved = match spec.split_once('=') {
        Some((column, label)) => {
            let column = parse_column(column)?;
            check_range(column, set)?;
            let label = match label {
                "" => set.column_name(column).map(String::from),
                l => Some(l.to_string()),
            };
            ColumnSpec { column, label }
        }
        None if is_digits(spec) => ColumnSpec::numbered(parse_column(spec)?, set)?,
        None => match set.column_index(spec) {
            Some(column) => ColumnSpec {
                column,
                label: Some(spec.to_string()),
            },
            None => return Err(TabplotError::ColumnNotFound(spec.to_string())),
        },
    };
    debug!(spec, column = resolved.column, label = ?resolved.label, "resolved column");
    Ok(resolved)
}
