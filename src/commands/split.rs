use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use polymask::format;

#[derive(Args)]
pub struct SplitArgs {
    /// Mask files holding several images
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub fn run(args: &SplitArgs) -> Result<()> {
    for file in &args.files {
        let written = format::split_document(file)
            .with_context(|| format!("Failed to split {}", file.display()))?;
        println!("{}: {} files", file.display(), written.len());
        for path in written {
            println!("  {}", path.display());
        }
    }
    Ok(())
}
