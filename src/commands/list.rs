use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use polymask::AppConfig;

#[derive(Args)]
pub struct ListArgs {
    /// Input image
    pub image: PathBuf,
}

pub fn run(args: &ListArgs, config: &AppConfig) -> Result<()> {
    let session = super::open_session(&args.image, config)?;

    println!("Image:   {}", session.image().name());
    println!(
        "Size:    {}x{}",
        session.image().width(),
        session.image().height()
    );
    println!("File:    {}", session.mask_file_path().display());
    println!("Masks:   {}", session.store().len());

    for (i, entry) in session.store().iter().enumerate() {
        let b = entry.bbox;
        println!(
            "  {:>3}  {:<16} [{}, {}, {}, {}]  {} px",
            i,
            entry.label,
            b.x1,
            b.y1,
            b.x2,
            b.y2,
            entry.area()
        );
    }
    Ok(())
}
