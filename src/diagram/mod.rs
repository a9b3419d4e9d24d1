mod layout;
mod render;
mod translate;
mod types;

pub use layout::LayoutEngine;
pub use render::{SvgRenderer, escape_xml};
pub use translate::{make_diagram, make_diagram_at, parse_properties};
pub use types::{Composition, Diagram, Object, Position, Property, Relationship};
