use std::fmt;

/// Separator between the segments of a textual selector path.
///
/// Defaults to `.`; callers whose keys contain dots pick another character
/// and pass it down explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divider(char);

impl Divider {
    pub fn new(c: char) -> Self {
        Self(c)
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

impl Default for Divider {
    fn default() -> Self {
        Self('.')
    }
}

impl From<char> for Divider {
    fn from(c: char) -> Self {
        Self(c)
    }
}

/// Address of a node inside a document: mapping keys and decimal list indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// The empty path, addressing the whole document.
    pub fn root() -> Self {
        Self::default()
    }

    /// Splits a selector such as `components.schemas.Account`. Leading,
    /// trailing and doubled dividers are ignored.
    pub fn parse(text: &str, divider: Divider) -> Self {
        Self {
            segments: text
                .split(divider.as_char())
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Target of a local `$ref` (`#/components/schemas/Pet`). Both `/` and the
    /// divider separate segments; `~1` and `~0` are unescaped. Anything not
    /// starting with `#` is not a local pointer.
    pub fn from_reference(reference: &str, divider: Divider) -> Option<Self> {
        let pointer = reference.strip_prefix('#')?;
        let segments = pointer
            .split('/')
            .flat_map(|part| part.split(divider.as_char()))
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
            .collect();
        Some(Self { segments })
    }

    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Self { segments }
    }

    pub fn index(&self, index: usize) -> Self {
        self.child(&index.to_string())
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}
