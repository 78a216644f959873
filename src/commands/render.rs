use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use polymask::AppConfig;

#[derive(Args)]
pub struct RenderArgs {
    /// Input image
    pub image: PathBuf,

    /// Output PNG file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Output width (defaults to the image width, or keeps the aspect ratio with --height)
    #[arg(long)]
    pub width: Option<u32>,

    /// Output height (defaults to the image height, or keeps the aspect ratio with --width)
    #[arg(long)]
    pub height: Option<u32>,

    /// Zoom so that the region x,y,w,h fills the view
    #[arg(long, conflicts_with = "focus")]
    pub viewport: Option<String>,

    /// Zoom to the mask with this index and highlight it
    #[arg(long)]
    pub focus: Option<usize>,

    /// Highlight the mask with this index
    #[arg(long)]
    pub highlight: Option<usize>,

    /// Do not draw mask bounding boxes
    #[arg(long)]
    pub no_boxes: bool,
}

pub fn run(args: &RenderArgs, config: &AppConfig) -> Result<()> {
    let mut session = super::open_session(&args.image, config)?;

    let (width, height) = output_size(
        session.image().width(),
        session.image().height(),
        args.width,
        args.height,
    );
    session.set_surface_size(width, height);
    session.set_draw_mask_boxes(!args.no_boxes);

    if let Some(ref spec) = args.viewport {
        let rect = super::parse_rect(spec)?;
        session.viewport_mut().set_viewport_to_cover(rect);
    }
    if let Some(index) = args.focus {
        session
            .focus_mask(index)
            .with_context(|| format!("Cannot focus mask {}", index))?;
    }
    if let Some(index) = args.highlight {
        session
            .highlight_mask(index)
            .with_context(|| format!("Cannot highlight mask {}", index))?;
    }

    let frame = session.render()?;
    frame
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let view = session.viewport().view();
    println!(
        "Rendered {} ({} masks, view {},{} {}x{}) to {}",
        session.image().name(),
        session.store().len(),
        view.x,
        view.y,
        view.width,
        view.height,
        args.output.display()
    );
    Ok(())
}

fn output_size(
    image_width: u32,
    image_height: u32,
    width: Option<u32>,
    height: Option<u32>,
) -> (u32, u32) {
    let scaled = |value: u32, from: u32, to: u32| {
        ((u64::from(value) * u64::from(to) / u64::from(from.max(1))) as u32).max(1)
    };
    match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, scaled(w, image_width, image_height)),
        (None, Some(h)) => (scaled(h, image_height, image_width), h),
        (None, None) => (image_width, image_height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_size_keeps_aspect() {
        assert_eq!(output_size(1000, 800, None, None), (1000, 800));
        assert_eq!(output_size(1000, 800, Some(500), None), (500, 400));
        assert_eq!(output_size(1000, 800, None, Some(200)), (250, 200));
        assert_eq!(output_size(1000, 800, Some(10), Some(10)), (10, 10));
    }
}
