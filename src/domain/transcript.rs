use std::fmt;

/// Flattened speech-to-text output. Empty when the provider heard nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript(String);

impl Transcript {
    /// Joins segment texts with a single space, keeping provider order.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        Self(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Transcript {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for Transcript {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
