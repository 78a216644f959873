use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use polymask::format;

#[derive(Args)]
pub struct ConvertArgs {
    /// Mask file to convert
    pub file: PathBuf,

    /// Value written for every set mask pixel
    pub value: u8,
}

pub fn run(args: &ConvertArgs) -> Result<()> {
    let output = format::convert_mask_values(&args.file, args.value)
        .with_context(|| format!("Failed to convert {}", args.file.display()))?;
    println!("Saved {}", output.display());
    Ok(())
}
