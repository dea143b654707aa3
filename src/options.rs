//! Options for the text normalizer.

/// Controls which optional normalizer steps run.
///
/// NFKC normalization and whitespace canonicalization always run. The
/// remaining steps can be switched off individually; their relative order
/// never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanOptions {
    /// Remove markup elements and their content
    pub strip_markup: bool,
    /// Remove URLs and `@` mentions
    pub strip_links: bool,
    /// Remove `>>123` reply anchors
    pub strip_anchors: bool,
    /// Replace known face marks with tokens
    pub tokenize_face_marks: bool,
    /// Delete characters outside the allowed classes
    pub filter_chars: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            strip_markup: true,
            strip_links: true,
            strip_anchors: true,
            tokenize_face_marks: true,
            filter_chars: true,
        }
    }
}

impl CleanOptions {
    /// Creates options with every step enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for minimal cleaning (NFKC and whitespace only).
    pub fn minimal() -> Self {
        Self {
            strip_markup: false,
            strip_links: false,
            strip_anchors: false,
            tokenize_face_marks: false,
            filter_chars: false,
        }
    }

    /// Keeps markup in place.
    pub fn keep_markup(mut self) -> Self {
        self.strip_markup = false;
        self
    }

    /// Keeps URLs and mentions in place.
    pub fn keep_links(mut self) -> Self {
        self.strip_links = false;
        self
    }

    /// Keeps reply anchors in place.
    pub fn keep_anchors(mut self) -> Self {
        self.strip_anchors = false;
        self
    }

    /// Disables face-mark tokenization.
    pub fn without_face_marks(mut self) -> Self {
        self.tokenize_face_marks = false;
        self
    }

    /// Disables the character-class filter.
    pub fn without_char_filter(mut self) -> Self {
        self.filter_chars = false;
        self
    }

    /// Returns true if only the always-on steps run.
    pub fn is_minimal(&self) -> bool {
        *self == Self::minimal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let default = CleanOptions::default();
        assert!(default.strip_markup && default.filter_chars && default.tokenize_face_marks);
        assert!(!default.is_minimal());
        assert!(CleanOptions::minimal().is_minimal());
    }

    #[test]
    fn test_builder_chain() {
        let options = CleanOptions::new().keep_links().without_char_filter();
        assert!(!options.strip_links);
        assert!(!options.filter_chars);
        assert!(options.strip_anchors);
    }
}
