//! Indentation-tracking text buffer the emitters write into.

const INDENT: &str = "    ";

/// A growing source buffer with brace-scoped indentation.
///
/// The emitters only ever append whole lines, so output stays deterministic
/// for a given model regardless of how the callers interleave their work.
#[derive(Debug, Default)]
pub struct SourceWriter {
    buf: String,
    depth: usize,
}

impl SourceWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line at the current indentation.
    pub fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    /// Append an empty line.
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Write `header`, an opening brace, and indent everything that follows.
    pub fn open(&mut self, header: &str) {
        self.line(header);
        self.line("{");
        self.depth += 1;
    }

    /// Close the innermost brace scope opened with [`Self::open`].
    pub fn close(&mut self) {
        self.close_with("");
    }

    /// Close the innermost scope with trailing text after the brace, for
    /// initializer expressions that end in `};`.
    pub fn close_with(&mut self, suffix: &str) {
        debug_assert!(self.depth > 0, "unbalanced close");
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("}}{suffix}"));
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.buf
    }
}
