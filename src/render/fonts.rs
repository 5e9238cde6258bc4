use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use plotters::style::{register_font, FontStyle};

use crate::error::RenderError;

/// Regular/bold pairs tried in order when no font is given.
const SYSTEM_FONTS: &[(&str, Option<&str>)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        Some("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
    ),
    (
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        Some("/usr/share/fonts/TTF/DejaVuSans-Bold.ttf"),
    ),
    (
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        Some("/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf"),
    ),
    (
        "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
        Some("/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf"),
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        Some("/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf"),
    ),
    (
        "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
        Some("/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf"),
    ),
    (
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        Some("/System/Library/Fonts/Supplemental/Arial Bold.ttf"),
    ),
    ("/Library/Fonts/Arial.ttf", None),
    ("C:\\Windows\\Fonts\\arial.ttf", Some("C:\\Windows\\Fonts\\arialbd.ttf")),
];

/// The font currently registered for this process, if any.
static REGISTERED: Mutex<Option<PathBuf>> = Mutex::new(None);

/// First system font that exists on this machine.
pub fn find_system_font() -> Option<(PathBuf, Option<PathBuf>)> {
    find_font_in(SYSTEM_FONTS)
}

fn find_font_in(candidates: &[(&str, Option<&str>)]) -> Option<(PathBuf, Option<PathBuf>)> {
    candidates.iter().find_map(|&(regular, bold)| {
        let regular = Path::new(regular);
        regular.is_file().then(|| {
            let bold = bold.map(PathBuf::from).filter(|b| b.is_file());
            (regular.to_path_buf(), bold)
        })
    })
}

/// Regular and bold font files to use: the explicit one, else the first
/// candidate found.
fn locate(
    font: Option<&Path>,
    candidates: &[(&str, Option<&str>)],
) -> Result<(PathBuf, Option<PathBuf>), RenderError> {
    match font {
        Some(path) => Ok((path.to_path_buf(), None)),
        None => find_font_in(candidates).ok_or(RenderError::FontUnavailable),
    }
}

/// Make `sans-serif` (normal and bold) available to the bitmap backend.
///
/// A system font is registered once per process. An explicit font replaces
/// whatever is registered unless it is already the one in use.
pub fn ensure_registered(font: Option<&Path>) -> Result<PathBuf, RenderError> {
    let mut registered = REGISTERED.lock().unwrap_or_else(PoisonError::into_inner);
    match (font, registered.as_ref()) {
        (None, Some(current)) => return Ok(current.clone()),
        (Some(wanted), Some(current)) if wanted == current => return Ok(current.clone()),
        _ => {}
    }

    let (regular, bold) = locate(font, SYSTEM_FONTS)?;
    let regular_bytes = read_font(&regular)?;
    let bold_bytes = match &bold {
        Some(path) => read_font(path)?,
        None => regular_bytes,
    };

    register(&regular, regular_bytes, FontStyle::Normal)?;
    register(bold.as_ref().unwrap_or(&regular), bold_bytes, FontStyle::Bold)?;
    log::debug!("using font {}", regular.display());

    *registered = Some(regular.clone());
    Ok(regular)
}

/// Font data lives for the rest of the process once registered.
fn read_font(path: &Path) -> Result<&'static [u8], RenderError> {
    let bytes = std::fs::read(path).map_err(|e| RenderError::Font {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(Box::leak(bytes.into_boxed_slice()))
}

fn register(path: &Path, bytes: &'static [u8], style: FontStyle) -> Result<(), RenderError> {
    register_font("sans-serif", style, bytes).map_err(|_| RenderError::Font {
        path: path.to_path_buf(),
        message: "not a valid TrueType/OpenType font".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_file_is_reported() {
        let err = read_font(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(matches!(err, RenderError::Font { .. }));
    }

    #[test]
    fn garbage_font_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();

        let bytes = read_font(&path).unwrap();
        match register(&path, bytes, FontStyle::Normal).unwrap_err() {
            RenderError::Font { path: reported, message } => {
                assert_eq!(reported, path);
                assert!(message.contains("not a valid"));
            }
            other => panic!("expected Font, got {other:?}"),
        }
    }

    #[test]
    fn explicit_missing_font_is_an_error() {
        let err = ensure_registered(Some(Path::new("/nonexistent/font.ttf"))).unwrap_err();
        assert!(matches!(err, RenderError::Font { .. }));
    }

    #[test]
    fn no_candidate_means_no_font() {
        let missing = [
            ("/nonexistent/a.ttf", None),
            ("/nonexistent/b.ttf", Some("/nonexistent/b-bold.ttf")),
        ];
        assert!(matches!(locate(None, &[]), Err(RenderError::FontUnavailable)));
        assert!(matches!(locate(None, &missing), Err(RenderError::FontUnavailable)));
    }

    #[test]
    fn explicit_font_wins_over_candidates() {
        let (regular, bold) = locate(Some(Path::new("custom.ttf")), &[]).unwrap();
        assert_eq!(regular, PathBuf::from("custom.ttf"));
        assert!(bold.is_none());
    }

    #[test]
    fn system_font_candidates_exist_when_found() {
        if let Some((regular, bold)) = find_system_font() {
            assert!(regular.is_file());
            assert!(bold.map_or(true, |b| b.is_file()));
        }
    }
}
