//! The minimum path a file must live under to be processed.

use std::path::MAIN_SEPARATOR;

/// Ordered folder names, compared positionally and case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathPrefix {
    segments: Vec<String>,
}

impl PathPrefix {
    /// Split `input` on the platform path separator.
    ///
    /// Empty segments are dropped, so `Team/2024/` equals `Team/2024`.
    pub fn parse(input: &str) -> Self {
        Self::parse_with(input, MAIN_SEPARATOR)
    }

    pub fn parse_with(input: &str, separator: char) -> Self {
        Self::from_segments(input.split(separator))
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments = segments
            .into_iter()
            .map(Into::into)
            .filter(|s: &String| !s.is_empty())
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// An empty prefix matches the whole drive.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when `path` already starts with the full prefix.
    ///
    /// Files directly inside a folder at `path` are processed only then.
    pub fn is_satisfied_by(&self, path: &[String]) -> bool {
        path.len() >= self.segments.len() && path[..self.segments.len()] == self.segments[..]
    }

    /// True when `path` agrees with the prefix over their shared length.
    ///
    /// Folders failing this can never lead below the prefix and are pruned.
    pub fn admits(&self, path: &[String]) -> bool {
        let shared = path.len().min(self.segments.len());
        path[..shared] == self.segments[..shared]
    }
}

impl std::fmt::Display for PathPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&join_path(&self.segments))
    }
}

/// Join drive path segments for display.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(&MAIN_SEPARATOR.to_string())
}

/// Display path of `name` inside the folder at `path`.
pub fn child_path(path: &[String], name: &str) -> String {
    let mut segments: Vec<&str> = path.iter().map(String::as_str).collect();
    segments.push(name);
    join_path(&segments)
}
