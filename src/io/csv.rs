//! Plain-text per-vertex values.
//!
//! Distance fields are written as `vertex,<name>` rows. Value files read
//! back either one number per line or `vertex,value` rows; a first line
//! that parses as neither is treated as a header.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{MeshError, Result};

/// Write one `vertex,value` row per entry under a `vertex,<name>` header.
pub fn save_values<P: AsRef<Path>>(name: &str, values: &[f64], path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "vertex,{}", name)?;
    for (i, v) in values.iter().enumerate() {
        writeln!(writer, "{},{}", i, v)?;
    }

    writer.flush()?;
    Ok(())
}

/// Read per-vertex values, such as propagation weights.
///
/// Lines hold either a bare value, taken in file order, or a `vertex,value`
/// row, placed at that vertex. Indexed rows may come in any order but must
/// cover every vertex from 0 up to the largest index exactly once.
///
/// # Example
///
/// ```no_run
/// use fastmarch::io::csv;
///
/// let weights = csv::load_values("weights.csv").unwrap();
/// ```
pub fn load_values<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let load_error = |message: String| MeshError::LoadError {
        path: path.to_path_buf(),
        message,
    };

    let mut bare = Vec::new();
    let mut indexed: Vec<Option<f64>> = Vec::new();
    let mut indexed_rows = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let row = match parse_row(line) {
            Some(row) => row,
            None if line_no == 0 => continue,
            None => {
                return Err(load_error(format!(
                    "line {}: '{}' is not a value or a vertex,value row",
                    line_no + 1,
                    line
                )))
            }
        };

        match row {
            (None, value) => bare.push(value),
            (Some(vertex), value) => {
                if vertex >= indexed.len() {
                    indexed.resize(vertex + 1, None);
                }
                if indexed[vertex].replace(value).is_some() {
                    return Err(load_error(format!(
                        "line {}: vertex {} appears twice",
                        line_no + 1,
                        vertex
                    )));
                }
                indexed_rows += 1;
            }
        }
    }

    if indexed_rows == 0 {
        return Ok(bare);
    }
    if !bare.is_empty() {
        return Err(load_error("mixes bare values with vertex,value rows".to_string()));
    }
    if let Some(missing) = indexed.iter().position(Option::is_none) {
        return Err(load_error(format!("no value for vertex {}", missing)));
    }
    Ok(indexed.into_iter().flatten().collect())
}

fn parse_row(line: &str) -> Option<(Option<usize>, f64)> {
    let mut fields = line.split(',').map(str::trim);
    let first = fields.next()?;
    match (fields.next(), fields.next()) {
        (None, _) => Some((None, first.parse().ok()?)),
        (Some(value), None) => Some((Some(first.parse().ok()?), value.parse().ok()?)),
        (Some(_), Some(_)) => None,
    }
}
