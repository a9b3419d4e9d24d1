use super::types::{Object, Position};

/// Geometry constants and placement for composition trees. All values are in
/// em.
#[derive(Debug, Clone, Copy)]
pub struct LayoutEngine {
    /// Width of one character of a box label.
    pub char_width: f64,
    /// Rows reserved around the property list: name, separator, frame.
    pub frame_rows: f64,
    /// Horizontal distance between a parent and its column of children.
    pub gap_width: f64,
    /// Vertical distance reserved below each leaf subtree.
    pub gap_height: f64,
    /// Added to the widest branch for each level that has children.
    pub width_increment: f64,
    /// Offset of the root box and extra space on the far canvas edges.
    pub margin: f64,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            char_width: 1.0,
            frame_rows: 4.0,
            gap_width: 6.0,
            gap_height: 1.0,
            width_increment: 1.0,
            margin: 1.0,
        }
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Longest of the name and every `name` + multiplicity row.
    pub fn width(&self, object: &Object) -> f64 {
        let longest = object
            .properties
            .iter()
            .map(|p| p.name.chars().count() + p.relationship.as_str().len())
            .fold(object.name.chars().count(), usize::max);
        longest as f64 * self.char_width
    }

    pub fn height(&self, object: &Object) -> f64 {
        object.properties.len() as f64 + self.frame_rows
    }

    /// Positions every object under `root`, seeding the root at the margin.
    pub fn layout(&self, root: &mut Object) {
        root.position = Position::new(self.margin, self.margin);
        self.place_children(root);
    }

    /// Stacks the direct children of `object` in one column to its right, each
    /// sibling starting below the previous sibling's whole subtree, then
    /// recurses into each child.
    pub fn place_children(&self, object: &mut Object) {
        let x = object.position.x + self.width(object) + self.gap_width;
        let mut y = object.position.y;

        for composition in &mut object.composed_of {
            let child = &mut composition.object;
            child.position = Position::new(x, y);
            self.place_children(child);
            y += self.total_height(child);
        }
    }

    /// Vertical space reserved for `object` and all its descendants.
    pub fn total_height(&self, object: &Object) -> f64 {
        let own = self.height(object);
        if object.composed_of.is_empty() {
            return own + self.gap_height;
        }

        let children: f64 = object
            .composed_of
            .iter()
            .map(|c| self.total_height(&c.object))
            .sum();
        if own > children {
            own + self.gap_height
        } else {
            children
        }
    }

    /// Right-most extent of the subtree. Depends on positions, so only valid
    /// after [`LayoutEngine::layout`].
    pub fn total_width(&self, object: &Object) -> f64 {
        let own = object.position.x + self.width(object);
        if object.composed_of.is_empty() {
            return own;
        }

        object
            .composed_of
            .iter()
            .map(|c| self.total_width(&c.object))
            .fold(own, f64::max)
            + self.width_increment
    }

    /// Canvas (width, height) needed for a laid out tree.
    pub fn canvas_size(&self, root: &Object) -> (f64, f64) {
        (
            self.total_width(root) + self.margin,
            self.total_height(root) + self.margin,
        )
    }

    /// Baseline of the centred name label.
    pub fn name_position(&self, object: &Object) -> Position {
        Position::new(
            object.position.x + self.width(object) / 2.0,
            object.position.y + 1.3,
        )
    }

    /// Baseline of the `index`-th property row.
    pub fn field_position(&self, object: &Object, index: usize) -> Position {
        Position::new(
            object.position.x + 1.0,
            self.name_position(object).y + 2.0 + index as f64 * 1.1,
        )
    }

    /// The three connector segments from `parent`'s right edge to the left
    /// edge of `child`, as four points.
    pub fn connector_points(&self, parent: &Object, child: &Object) -> [Position; 4] {
        let start = Position::new(
            parent.position.x + self.width(parent),
            parent.position.y + 1.0,
        );
        let elbow = Position::new(start.x + 2.0, start.y);
        let drop = Position::new(elbow.x, child.position.y + 1.0);
        let end = Position::new(child.position.x - 0.8, drop.y);
        [start, elbow, drop, end]
    }

    /// Where the multiplicity of the edge into `child` is written.
    pub fn relationship_label_position(&self, child: &Object) -> Position {
        Position::new(child.position.x - 3.5, child.position.y + 0.5)
    }
}
