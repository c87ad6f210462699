use thiserror::Error;

/// Errors reported when parsing a key-path string.
///
/// These surface at the API boundary only; once a `KeyPath` exists,
/// resolving it against data can never fail with an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("key-path is empty")]
    Empty,

    #[error("key-path {0:?} contains an empty segment")]
    EmptySegment(String),
}

/// One segment of a key-path.
///
/// A segment made entirely of ASCII digits keeps its parsed index around,
/// but whether it acts as a sequence index or a mapping key is decided at
/// resolution time based on what the cursor actually points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    text: String,
    index: Option<usize>,
}

impl Segment {
    fn new(text: &str) -> Self {
        let index = if text.bytes().all(|b| b.is_ascii_digit()) {
            text.parse::<usize>().ok()
        } else {
            None
        };
        Segment {
            text: text.to_string(),
            index,
        }
    }

    /// The raw segment text, used for mapping lookups.
    pub fn key(&self) -> &str {
        &self.text
    }

    /// The segment as a sequence index, if it is all digits.
    pub fn as_index(&self) -> Option<usize> {
        self.index
    }
}

/// A parsed, validated dot-separated key-path, e.g. `pagemap.cse_image.0.src`.
///
/// The original string form is retained and used as the column name when the
/// path heads a table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    raw: String,
    segments: Vec<Segment>,
}

impl KeyPath {
    /// Parse a dotted path string.
    ///
    /// Rejects the empty string and any empty segment (leading, trailing,
    /// or doubled dots). Segment text is otherwise unrestricted.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            if part.is_empty() {
                return Err(PathError::EmptySegment(raw.to_string()));
            }
            segments.push(Segment::new(part));
        }

        Ok(KeyPath {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Parse a list of path strings, preserving order.
    pub fn parse_all<S: AsRef<str>>(raws: &[S]) -> Result<Vec<Self>, PathError> {
        raws.iter().map(|r| Self::parse(r.as_ref())).collect()
    }

    /// The original dotted string, used as the column name.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for KeyPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
