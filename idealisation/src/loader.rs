use dwell_idealisation::{IdealisationError, Interval};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    num::{ParseFloatError, ParseIntError},
    path::Path,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum LoadError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line {line}: expected duration,amplitude,quality but found {found} fields")]
    FieldCount { line: usize, found: usize },
    #[error("Line {line}: {source}")]
    Float { line: usize, source: ParseFloatError },
    #[error("Line {line}: {source}")]
    Code { line: usize, source: ParseIntError },
    #[error("Line {line}: {source}")]
    Interval { line: usize, source: IdealisationError },
}

fn parse_line(line: usize, text: &str) -> Result<Interval, LoadError> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    let [duration, amplitude, code] = fields.as_slice() else {
        return Err(LoadError::FieldCount {
            line,
            found: fields.len(),
        });
    };
    let duration = duration
        .parse::<f64>()
        .map_err(|source| LoadError::Float { line, source })?;
    let amplitude = amplitude
        .parse::<f64>()
        .map_err(|source| LoadError::Float { line, source })?;
    let code = code
        .parse::<i32>()
        .map_err(|source| LoadError::Code { line, source })?;
    Interval::try_from((duration, amplitude, code))
        .map_err(|source| LoadError::Interval { line, source })
}

/// Reads one interval per line, in the form written by `Interval`'s `Display`.
/// Blank lines and lines starting with `#` are skipped.
pub(crate) fn read_record<R: BufRead>(reader: R) -> Result<Vec<Interval>, LoadError> {
    let mut intervals = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        intervals.push(parse_line(index + 1, text)?);
    }
    Ok(intervals)
}

pub(crate) fn load_record(path: &Path) -> Result<Vec<Interval>, LoadError> {
    read_record(BufReader::new(File::open(path)?))
}
