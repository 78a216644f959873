pub mod add_mask;
pub mod convert;
pub mod list;
pub mod render;
pub mod split;

use std::path::Path;

use anyhow::{Context, Result, bail};
use polymask::data::is_supported_file;
use polymask::{AnnotationSession, AppConfig, ViewRect};

/// Open an annotation session for the image at `path`.
pub fn open_session(path: &Path, config: &AppConfig) -> Result<AnnotationSession> {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    if !is_supported_file(&name) {
        log::warn!("{} does not have a known image extension", path.display());
    }
    AnnotationSession::open(path, config)
        .with_context(|| format!("Failed to open {}", path.display()))
}

/// Parse comma-separated integers, requiring exactly `count` of them.
fn parse_numbers<T: std::str::FromStr>(text: &str, count: usize, what: &str) -> Result<Vec<T>> {
    let values = text
        .split(',')
        .map(|part| part.trim().parse::<T>().ok())
        .collect::<Option<Vec<T>>>()
        .with_context(|| format!("Invalid {} '{}'", what, text))?;
    if values.len() != count {
        bail!("{} requires exactly {} values, got '{}'", what, count, text);
    }
    Ok(values)
}

/// Parse `"x,y x,y ..."` into image points.
pub fn parse_points(text: &str) -> Result<Vec<(i32, i32)>> {
    text.split_whitespace()
        .map(|pair| parse_numbers::<i32>(pair, 2, "point").map(|v| (v[0], v[1])))
        .collect()
}

/// Parse `"x,y,w,h"` into a view rectangle.
pub fn parse_rect(text: &str) -> Result<ViewRect> {
    let v = parse_numbers::<u32>(text, 4, "viewport")?;
    Ok(ViewRect::new(v[0], v[1], v[2], v[3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_points() {
        assert_eq!(
            parse_points("10,10 90,10  90,90").unwrap(),
            vec![(10, 10), (90, 10), (90, 90)]
        );
        assert!(parse_points("").unwrap().is_empty());
        assert!(parse_points("1,2,3").is_err());
        assert!(parse_points("a,b").is_err());
    }

    #[test]
    fn test_parse_rect() {
        assert_eq!(parse_rect("1, 2, 30, 40").unwrap(), ViewRect::new(1, 2, 30, 40));
        assert!(parse_rect("1,2,3").is_err());
        assert!(parse_rect("-1,2,3,4").is_err());
    }
}
