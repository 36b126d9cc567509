use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use textvec::{sparse, CsMat};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// `index:value` pairs for the non-zero entries, one document per line (default)
    Pairs,
    /// Every column, space separated, one document per line
    Dense,
    /// JSON array of `{row, indices, values}` objects
    Json,
}

/// Non-zero entries of a batch of vectors sharing one width.
pub struct VectorRows {
    pub cols: usize,
    pub rows: Vec<Vec<(usize, f64)>>,
}

impl VectorRows {
    pub fn new(cols: usize) -> Self {
        Self {
            cols,
            rows: Vec::new(),
        }
    }

    pub fn extend_from(&mut self, matrix: &CsMat<f64>) {
        for row in 0..matrix.rows() {
            self.rows.push(sparse::row_pairs(matrix, row));
        }
    }
}

pub fn write_rows(out: &mut impl Write, rows: &VectorRows, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Pairs => {
            for row in &rows.rows {
                let line = row
                    .iter()
                    .map(|(idx, value)| format!("{idx}:{value}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                writeln!(out, "{line}")?;
            }
        }
        OutputFormat::Dense => {
            for row in &rows.rows {
                let mut dense = vec![0.0; rows.cols];
                for &(idx, value) in row {
                    dense[idx] = value;
                }
                let line = dense
                    .iter()
                    .map(f64::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                writeln!(out, "{line}")?;
            }
        }
        OutputFormat::Json => {
            let json_array: Vec<_> = rows
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    serde_json::json!({
                        "row": i,
                        "indices": row.iter().map(|(idx, _)| *idx).collect::<Vec<_>>(),
                        "values": row.iter().map(|(_, value)| *value).collect::<Vec<_>>(),
                    })
                })
                .collect();
            writeln!(out, "{}", serde_json::to_string(&json_array)?)?;
        }
    }
    Ok(())
}
