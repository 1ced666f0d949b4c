use crate::error::{GameError, Result};
use log::{debug, info};
use std::path::Path;

/// Where an image reference in a config points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSource {
    DataUri,
    Remote,
    LocalFile,
}

pub fn classify(image_ref: &str) -> ImageSource {
    let r = image_ref.trim_start();
    if r.starts_with("data:") {
        ImageSource::DataUri
    } else if r.starts_with("http://") || r.starts_with("https://") {
        ImageSource::Remote
    } else {
        ImageSource::LocalFile
    }
}

/// Natural pixel size of a local image, `None` for data URIs and URLs which
/// are measured by whatever displays them. Relative paths resolve against `base`.
pub fn probe_dimensions(image_ref: &str, base: &Path) -> Result<Option<(u32, u32)>> {
    match classify(image_ref) {
        ImageSource::DataUri | ImageSource::Remote => {
            debug!("Skipping probe for non-local image reference.");
            Ok(None)
        }
        ImageSource::LocalFile => {
            let trimmed = image_ref.trim().trim_start_matches('/');
            let path = base.join(trimmed);
            let dims = image::image_dimensions(&path).map_err(|e| GameError::ImageProbe {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            info!("Image '{}' is {}x{}.", path.display(), dims.0, dims.1);
            Ok(Some(dims))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_references() {
        assert_eq!(classify("data:image/png;base64,AAAA"), ImageSource::DataUri);
        assert_eq!(classify("https://example.com/a.jpg"), ImageSource::Remote);
        assert_eq!(classify("/images/forest.jpg"), ImageSource::LocalFile);
    }

    #[test]
    fn non_local_refs_are_not_probed() {
        let base = Path::new(".");
        assert_eq!(probe_dimensions("data:image/png;base64,AAAA", base).unwrap(), None);
        assert_eq!(probe_dimensions("http://example.com/x.png", base).unwrap(), None);
    }

    #[test]
    fn probes_local_png() {
        let dir = std::env::temp_dir().join(format!("spotdiff-probe-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tiny.png");
        image::RgbImage::new(7, 3).save(&path).unwrap();

        assert_eq!(probe_dimensions("tiny.png", &dir).unwrap(), Some((7, 3)));
        assert!(matches!(
            probe_dimensions("missing.png", &dir),
            Err(GameError::ImageProbe { .. })
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
