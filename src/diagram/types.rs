use std::fmt;

/// Multiplicity of a property or composition edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    ZeroOrOne,
    ExactlyOne,
    ZeroOrMore,
    OneOrMore,
}

impl Relationship {
    /// Lower bound from requiredness, upper bound from array-ness.
    pub fn new(required: bool, many: bool) -> Self {
        match (required, many) {
            (false, false) => Relationship::ZeroOrOne,
            (true, false) => Relationship::ExactlyOne,
            (false, true) => Relationship::ZeroOrMore,
            (true, true) => Relationship::OneOrMore,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relationship::ZeroOrOne => "0..1",
            Relationship::ExactlyOne => "1..1",
            Relationship::ZeroOrMore => "0..*",
            Relationship::OneOrMore => "1..*",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-left corner of a box, in em.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A scalar field of an object.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    /// Multi-line constraint summary (type, format, lengths, enum values...).
    pub description: String,
    pub relationship: Relationship,
}

/// Edge to an exclusively owned child object.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub relationship: Relationship,
    pub object: Object,
}

/// One class box. `position` is meaningless until the layout engine has run
/// on the tree this object belongs to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    pub name: String,
    pub description: String,
    pub properties: Vec<Property>,
    pub composed_of: Vec<Composition>,
    pub position: Position,
}

impl Object {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Depth-first, parent before children.
    pub fn walk(&self) -> Vec<&Object> {
        let mut out = vec![self];
        for composition in &self.composed_of {
            out.extend(composition.object.walk());
        }
        out
    }
}

/// A composition tree ready to be laid out and rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    pub root: Object,
}
