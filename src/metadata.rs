use super::{Result, TabplotError};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use tracing::debug;

/// Name and columns of one data set (a gnuplot `index` block).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetMetadata {
    pub name: Option<String>,
    pub columns: Vec<String>,
}

impl SetMetadata {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// name of the 1-based `column`, none for the pseudo-column 0 or past the end
    pub fn column_name(&self, column: usize) -> Option<&str> {
        column
            .checked_sub(1)
            .and_then(|i| self.columns.get(i))
            .map(String::as_str)
    }

    /// 1-based position of the column called `label`
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label).map(|i| i + 1)
    }
}

/// Per-block state while scanning.
#[derive(Debug, Default)]
struct Block {
    comments: usize,
    name: Option<String>,
    columns: Option<Vec<String>>,
    done: bool,
}

impl Block {
    fn comment(&mut self, text: &str) {
        self.comments += 1;
        match self.comments {
            1 => self.name = text.split_whitespace().next().map(String::from),
            2 => {
                let columns: Vec<String> = text.split_whitespace().map(String::from).collect();
                if !columns.is_empty() {
                    self.columns = Some(columns);
                }
            }
            _ => {}
        }
    }

    /// the first data line fixes the columns of the block
    fn finish(&mut self, data_line: &str) -> SetMetadata {
        self.done = true;
        let columns = match self.columns.take() {
            Some(c) => c,
            None => synthesize_columns(data_line.split_whitespace().count()),
        };
        SetMetadata {
            name: self.name.take(),
            columns,
        }
    }
}

pub fn synthesize_columns(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Column {}", i)).collect()
}

/// Scans the data line by line and returns one SetMetadata per data set.
/// Sets are separated by two or more blank lines, a single blank line does not split them.
/// Within a set, the first leading comment gives the set name (its first word)
/// and the second one the column names.
/// Comments after the first data line are ignored, blocks without data lines are dropped.
pub fn scan_reader<R: BufRead>(reader: R) -> io::Result<Vec<SetMetadata>> {
    let mut sets: Vec<SetMetadata> = Vec::new();
    let mut blanks: usize = 0;
    let mut in_block = false;
    let mut block = Block::default();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            blanks += 1;
            if blanks >= 2 {
                in_block = false;
            }
            continue;
        }
        blanks = 0;
        if !in_block {
            in_block = true;
            block = Block::default();
        }
        if block.done {
            continue;
        }
        match line.strip_prefix('#') {
            Some(comment) => block.comment(comment),
            None => {
                let set = block.finish(line);
                debug!(
                    index = sets.len(),
                    name = ?set.name,
                    columns = set.column_count(),
                    "found data set"
                );
                sets.push(set);
            }
        }
    }
    Ok(sets)
}

/// Scans the file at `path`, failing when it holds no data at all.
pub fn scan_file(path: &Path) -> Result<Vec<SetMetadata>> {
    let io_err = |source| TabplotError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let sets = scan_reader(BufReader::new(file)).map_err(io_err)?;
    if sets.is_empty() {
        return Err(TabplotError::NoData);
    }
    Ok(sets)
}

/// writes the sets and their columns, one column per line
pub fn render_listing(sets: &[SetMetadata], mut writer: impl Write) -> io::Result<()> {
    for (i, set) in sets.iter().enumerate() {
        match &set.name {
            Some(name) => writeln!(writer, "set {}: {}", i, name)?,
            None => writeln!(writer, "set {}", i)?,
        }
        for (c, column) in set.columns.iter().enumerate() {
            writeln!(writer, "  {}: {}", c + 1, column)?;
        }
    }
    Ok(())
}
