use crate::markup;
use crate::types::caption_data::{CaptionSegment, CaretNode, CaretPosition, Point, SegmentId};

/// The page the engine runs against: caption segments it can read and mark
/// up, plus the caret-from-point primitive. Implementations own the layout.
pub trait CaptionSurface {
    /// Currently rendered segments in document order. Always a fresh query.
    fn segments(&self) -> Vec<CaptionSegment>;

    fn segment_at(&self, point: Point) -> Option<SegmentId>;

    /// `None` when the point is not over text.
    fn caret_from_point(&self, point: Point) -> Option<CaretPosition>;

    fn text_content(&self, segment: SegmentId) -> Option<String>;

    fn markup(&self, segment: SegmentId) -> Option<String>;

    /// Replaces the segment's inner markup. `false` if the segment is gone.
    fn set_markup(&mut self, segment: SegmentId, markup: &str) -> bool;

    fn set_text(&mut self, segment: SegmentId, text: &str) -> bool {
        self.set_markup(segment, &markup::escape_text(text))
    }
}

#[derive(Debug, Clone)]
struct SegmentNode {
    id: SegmentId,
    markup: String,
}

/// Monospace line layout: one segment per row, fixed cell width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub origin: Point,
    pub char_width: f32,
    pub line_height: f32,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self { origin: Point::new(0.0, 0.0), char_width: 10.0, line_height: 20.0 }
    }
}

impl GridGeometry {
    /// Horizontal centre of character `index`.
    pub fn char_x(&self, index: usize) -> f32 {
        self.origin.x + (index as f32 + 0.5) * self.char_width
    }

    /// Vertical centre of row `row`.
    pub fn line_y(&self, row: usize) -> f32 {
        self.origin.y + (row as f32 + 0.5) * self.line_height
    }

    fn cell(&self, point: Point) -> Option<(usize, usize)> {
        let dx = point.x - self.origin.x;
        let dy = point.y - self.origin.y;
        if dx < 0.0 || dy < 0.0 {
            return None;
        }
        Some(((dy / self.line_height) as usize, (dx / self.char_width) as usize))
    }
}

/// In-memory caption container. Segments hold markup strings whose tags split
/// the line into several text nodes, the way injected highlights do on a page.
#[derive(Debug, Clone, Default)]
pub struct CaptionDocument {
    nodes: Vec<SegmentNode>,
    next_id: u64,
    geometry: GridGeometry,
}

impl CaptionDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_geometry(geometry: GridGeometry) -> Self {
        Self { geometry, ..Self::default() }
    }

    pub fn from_lines<I, T>(lines: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut doc = Self::new();
        for line in lines {
            doc.push_line(line.as_ref());
        }
        doc
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn push_line(&mut self, text: &str) -> SegmentId {
        self.next_id += 1;
        let id = SegmentId(self.next_id);
        self.nodes.push(SegmentNode { id, markup: markup::escape_text(text) });
        id
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> Vec<SegmentId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    /// Mirrors the caption renderer: when the visible lines change, every
    /// segment is destroyed and recreated under new ids. Returns whether it did.
    pub fn sync_lines<T: AsRef<str>>(&mut self, lines: &[T]) -> bool {
        let unchanged = self.nodes.len() == lines.len()
            && self
                .nodes
                .iter()
                .zip(lines)
                .all(|(n, l)| markup::text_content(&n.markup) == l.as_ref());
        if unchanged {
            return false;
        }
        self.clear();
        for line in lines {
            self.push_line(line.as_ref());
        }
        true
    }

    fn node(&self, id: SegmentId) -> Option<&SegmentNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn segment_text(&self, id: SegmentId) -> Option<String> {
        self.node(id).map(|n| markup::text_content(&n.markup))
    }

    pub fn segment_markup(&self, id: SegmentId) -> Option<String> {
        self.node(id).map(|n| n.markup.clone())
    }

    pub fn write_markup(&mut self, id: SegmentId, markup: &str) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.markup = markup.to_string();
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> Vec<CaptionSegment> {
        self.nodes
            .iter()
            .map(|n| CaptionSegment::new(n.id, markup::text_content(&n.markup)))
            .collect()
    }

    /// Resolves a character index of the segment's text to the text node
    /// (fragment) holding it and the offset inside that node.
    pub fn caret_at(&self, id: SegmentId, char_index: usize) -> Option<CaretPosition> {
        let node = self.node(id)?;
        let frags = markup::fragments(&node.markup);
        let mut seen = 0;
        for (i, frag) in frags.iter().enumerate() {
            let len = frag.text.chars().count();
            let last = i + 1 == frags.len();
            if char_index < seen + len || (last && char_index <= seen + len) {
                return Some(CaretPosition {
                    segment: id,
                    node: CaretNode::Text(frag.text.clone()),
                    offset: char_index - seen,
                    segment_offset: char_index,
                });
            }
            seen += len;
        }
        if frags.is_empty() {
            return Some(CaretPosition { segment: id, node: CaretNode::Element, offset: 0, segment_offset: 0 });
        }
        None
    }

    fn hit(&self, point: Point) -> Option<(SegmentId, usize)> {
        let (row, col) = self.geometry.cell(point)?;
        let node = self.nodes.get(row)?;
        let len = markup::text_content(&node.markup).chars().count();
        (col < len).then_some((node.id, col))
    }
}

impl CaptionSurface for CaptionDocument {
    fn segments(&self) -> Vec<CaptionSegment> {
        self.snapshot()
    }

    fn segment_at(&self, point: Point) -> Option<SegmentId> {
        self.hit(point).map(|(id, _)| id)
    }

    fn caret_from_point(&self, point: Point) -> Option<CaretPosition> {
        let (id, col) = self.hit(point)?;
        self.caret_at(id, col)
    }

    fn text_content(&self, segment: SegmentId) -> Option<String> {
        self.segment_text(segment)
    }

    fn markup(&self, segment: SegmentId) -> Option<String> {
        self.segment_markup(segment)
    }

    fn set_markup(&mut self, segment: SegmentId, markup: &str) -> bool {
        self.write_markup(segment, markup)
    }
}
