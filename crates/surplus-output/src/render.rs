//! Rendering artifacts to text and files.

use crate::error::Result;
use std::path::Path;
use surplus_data::io::write_text;

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    /// Comma-separated values.
    Csv,

    /// Pretty-printed JSON.
    Json,

    /// Human-readable Markdown.
    Markdown,
}

/// Trait for artifacts that can be written in one or more formats.
pub trait Render {
    /// Render to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the format is unsupported.
    fn render(&self, format: RenderFormat) -> Result<String>;

    /// Render and write to `path`, overwriting it and creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    fn write_to(&self, path: &Path, format: RenderFormat) -> Result<()> {
        let content = self.render(format)?;
        write_text(path, &content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OutputError;
    use tempfile::tempdir;

    struct Note;

    impl Render for Note {
        fn render(&self, format: RenderFormat) -> Result<String> {
            match format {
                RenderFormat::Markdown => Ok("# note\n".to_string()),
                other => Err(OutputError::UnsupportedFormat(other)),
            }
        }
    }

    #[test]
    fn test_write_to_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("note.md");
        Note.write_to(&path, RenderFormat::Markdown).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# note\n");
    }

    #[test]
    fn test_unsupported_format_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("note.csv");
        assert!(Note.write_to(&path, RenderFormat::Csv).is_err());
        assert!(!path.exists());
    }
}
