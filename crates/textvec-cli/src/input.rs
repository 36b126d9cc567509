use std::{
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Args;

use crate::output::OutputFormat;

/// Where the documents to vectorize come from.
#[derive(Args)]
pub struct InputArgs {
    /// Text to vectorize (if not provided, reads from stdin)
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    /// Read a single document from file
    #[arg(short, long, value_name = "PATH", conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Batch process documents (one per line)
    #[arg(short, long, value_name = "PATH", conflicts_with_all = ["text", "file"])]
    pub batch: Option<PathBuf>,

    /// Batch process from JSON array of strings
    #[arg(long, value_name = "PATH", conflicts_with_all = ["text", "file", "batch"])]
    pub batch_json: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "pairs")]
    pub format: OutputFormat,
}

impl InputArgs {
    /// Resolve the documents. Priority: text arg > file > batch > batch_json > stdin
    pub fn read_documents(&self) -> Result<Vec<String>> {
        if let Some(text) = &self.text {
            return Ok(vec![text.clone()]);
        }

        if let Some(path) = &self.file {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            return Ok(vec![text]);
        }

        if let Some(path) = &self.batch {
            return read_lines(path);
        }

        if let Some(path) = &self.batch_json {
            return read_json_array(path);
        }

        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(vec![buffer])
    }
}

/// One document per line.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file: {}", path.display()))?;
    Ok(contents.lines().map(String::from).collect())
}

pub fn read_json_array(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON batch file: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse JSON array in {}", path.display()))
}
