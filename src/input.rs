use crate::models::{ConversionInput, SelectedFile};

/// Holds the user's single source choice: a local file or a remote URL.
///
/// Drag-and-drop and the file browser both end up in [`InputSelector::set_file`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSelector {
    current: Option<ConversionInput>,
}

impl InputSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_file(&mut self, file: SelectedFile) {
        self.current = Some(ConversionInput::File(file));
    }

    /// An empty or whitespace-only URL leaves nothing selected.
    pub fn set_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.current = if url.trim().is_empty() {
            None
        } else {
            Some(ConversionInput::Url(url))
        };
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&ConversionInput> {
        self.current.as_ref()
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        match &self.current {
            Some(ConversionInput::File(file)) => Some(file),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.current.as_ref().and_then(ConversionInput::source_url)
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_replaces_url() {
        let mut selector = InputSelector::new();
        selector.set_url("https://youtu.be/abc");
        selector.set_file(SelectedFile::new("/tmp/a.mp3", 1));

        assert!(selector.url().is_none());
        assert_eq!(selector.file().map(|f| f.name.as_str()), Some("a.mp3"));
    }

    #[test]
    fn test_url_replaces_file() {
        let mut selector = InputSelector::new();
        selector.set_file(SelectedFile::new("/tmp/a.mp3", 1));
        selector.set_url("https://youtu.be/abc");

        assert!(selector.file().is_none());
        assert_eq!(selector.url(), Some("https://youtu.be/abc"));
    }

    #[test]
    fn test_mutual_exclusion_over_any_sequence() {
        let mut selector = InputSelector::new();
        for step in 0..20 {
            if step % 3 == 0 {
                selector.set_url(format!("https://youtube.com/watch?v={step}"));
            } else {
                selector.set_file(SelectedFile::new(format!("/tmp/{step}.wav"), step));
            }
            assert!(!(selector.file().is_some() && selector.url().is_some()));
            assert!(!selector.is_empty());
        }
    }

    #[test]
    fn test_blank_url_clears_selection() {
        let mut selector = InputSelector::new();
        selector.set_file(SelectedFile::new("/tmp/a.mp3", 1));
        selector.set_url("  ");
        assert!(selector.is_empty());
    }
}
