//! Library entry for aln-cli used by integration tests and embedding.

pub mod commands;

use aln_core::ParserConfig;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read};

/// Load framing parameters from a JSON file, or the defaults
pub fn load_config(path: Option<&str>) -> Result<ParserConfig> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            serde_json::from_str::<ParserConfig>(&content)
                .with_context(|| format!("Failed to parse config file: {}", path))?
        }
        None => ParserConfig::default(),
    };

    config.validate().context("Invalid framing config")?;
    Ok(config)
}

/// Read a capture from a file, or from stdin when `input` is "-"
pub fn read_input(input: &str) -> Result<Vec<u8>> {
    if input == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(input).with_context(|| format!("Failed to read input file: {}", input))
    }
}
