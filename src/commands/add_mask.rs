use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use polymask::AppConfig;

#[derive(Args)]
pub struct AddMaskArgs {
    /// Input image
    pub image: PathBuf,

    /// Label for the new mask (defaults to the first configured label)
    #[arg(short, long)]
    pub label: Option<String>,

    /// Polygon vertices in image pixels, e.g. "10,10 90,10 90,90"
    #[arg(short, long)]
    pub points: String,
}

pub fn run(args: &AddMaskArgs, config: &AppConfig) -> Result<()> {
    let points = super::parse_points(&args.points)?;

    let mut session = super::open_session(&args.image, config)?;
    let image = session.image();
    check_points(&points, image.width(), image.height())?;

    if let Some(ref label) = args.label {
        if !config.labels.contains(label) {
            log::warn!("Label '{}' is not in the configured labels", label);
        }
        session.set_active_label(label.clone());
    }
    for (x, y) in points {
        session.add_point(x, y);
    }

    let index = session.commit_polygon().context("Failed to rasterize polygon")?;
    let path = session.save_masks()?;

    let entry = session.store().query(index)?;
    println!(
        "Added mask {} '{}' bbox {:?} ({} pixels) to {}",
        index,
        entry.label,
        <[i32; 4]>::from(entry.bbox),
        entry.area(),
        path.display()
    );
    Ok(())
}

/// Reject points outside the image. Vertices may sit on the right and bottom
/// border, which closes a polygon around the last pixel column or row.
fn check_points(points: &[(i32, i32)], width: u32, height: u32) -> Result<()> {
    for &(x, y) in points {
        let inside_x = u32::try_from(x).is_ok_and(|x| x <= width);
        let inside_y = u32::try_from(y).is_ok_and(|y| y <= height);
        if !(inside_x && inside_y) {
            bail!("Point {},{} is outside the {}x{} image", x, y, width, height);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_points_accepts_border_vertices() {
        assert!(check_points(&[(0, 0), (100, 0), (100, 80), (0, 80)], 100, 80).is_ok());
        assert!(check_points(&[], 100, 80).is_ok());
    }

    #[test]
    fn test_check_points_rejects_outside() {
        assert!(check_points(&[(0, 0), (101, 0), (0, 5)], 100, 80).is_err());
        assert!(check_points(&[(-1, 0)], 100, 80).is_err());
        assert!(check_points(&[(0, 81)], 100, 80).is_err());
        assert!(check_points(&[(-2_000_000_000, 0), (2_000_000_000, 0)], 100, 80).is_err());
    }
}
