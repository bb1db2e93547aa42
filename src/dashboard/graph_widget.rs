//! Run graph widget for the terminal dashboard.
//!
//! Rasterises a [`Scene`] onto a character grid: layout units are projected
//! to cells, edges are drawn as orthogonal box-drawing paths, then nodes are
//! painted over them. Each edge class has its own glyph set and color so
//! disabled and conditional dependencies stay distinguishable without color.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Widget},
};

use super::theme::Theme;
use super::widgets::status_char;
use crate::graph::layered::{route_orthogonal, LineSegment};
use crate::graph::{EdgeClass, NodeRect, Scene, SceneEdge, SceneElement, SceneNode};

/// Box-drawing characters for node rendering
mod box_chars {
    pub const HORIZONTAL: char = '─';
    pub const VERTICAL: char = '│';
    pub const TOP_LEFT: char = '┌';
    pub const TOP_RIGHT: char = '┐';
    pub const BOTTOM_LEFT: char = '└';
    pub const BOTTOM_RIGHT: char = '┘';
    pub const T_DOWN: char = '┬';
    pub const T_UP: char = '┴';
    pub const T_RIGHT: char = '├';
    pub const T_LEFT: char = '┤';
    pub const CROSS: char = '┼';
    pub const ARROW_RIGHT: char = '▶';
    pub const ARROW_LEFT: char = '◀';

    pub const SELECTED_HORIZONTAL: char = '━';
    pub const SELECTED_VERTICAL: char = '┃';
    pub const SELECTED_TOP_LEFT: char = '┏';
    pub const SELECTED_TOP_RIGHT: char = '┓';
    pub const SELECTED_BOTTOM_LEFT: char = '┗';
    pub const SELECTED_BOTTOM_RIGHT: char = '┛';
}

/// Line glyphs for one edge class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EdgeGlyphs {
    horizontal: char,
    vertical: char,
}

fn edge_glyphs(class: EdgeClass) -> EdgeGlyphs {
    match class {
        EdgeClass::Normal => EdgeGlyphs {
            horizontal: box_chars::HORIZONTAL,
            vertical: box_chars::VERTICAL,
        },
        EdgeClass::Disabled => EdgeGlyphs {
            horizontal: '╌',
            vertical: '╎',
        },
        EdgeClass::ConditionSatisfied => EdgeGlyphs {
            horizontal: '┅',
            vertical: '┇',
        },
        EdgeClass::ConditionUnsatisfied => EdgeGlyphs {
            horizontal: '┄',
            vertical: '┆',
        },
    }
}

/// Viewport configuration for scrolling
#[derive(Debug, Clone, Copy, Default)]
pub struct Viewport {
    /// Horizontal scroll offset
    pub scroll_x: u16,
    /// Vertical scroll offset
    pub scroll_y: u16,
}

impl Viewport {
    pub fn new(scroll_x: u16, scroll_y: u16) -> Self {
        Self { scroll_x, scroll_y }
    }
}

/// Result of graph rendering with bounds information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphRenderResult {
    /// Total width of the rendered graph in characters
    pub total_width: u16,
    /// Total height of the rendered graph in characters
    pub total_height: u16,
    /// Whether the graph was clipped horizontally
    pub clipped_x: bool,
    /// Whether the graph was clipped vertically
    pub clipped_y: bool,
}

impl GraphRenderResult {
    pub fn empty() -> Self {
        Self {
            total_width: 0,
            total_height: 0,
            clipped_x: false,
            clipped_y: false,
        }
    }
}

/// Projection from layout units to terminal cells.
///
/// The defaults map the 110-unit slot to five rows and the 220-unit band to
/// 22 columns, leaving one blank row between slots and a five column gutter
/// between levels for edge routing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellProjection {
    pub units_per_col: f64,
    pub units_per_row: f64,
    /// Node box height in rows; two border rows plus name and status.
    pub node_rows: u16,
}

impl Default for CellProjection {
    fn default() -> Self {
        Self {
            units_per_col: 10.0,
            units_per_row: 22.0,
            node_rows: 4,
        }
    }
}

/// Node box in cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl CellRect {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

impl CellProjection {
    pub fn point(&self, x: f64, y: f64) -> (usize, usize) {
        (
            (x.max(0.0) / self.units_per_col) as usize,
            (y.max(0.0) / self.units_per_row) as usize,
        )
    }

    pub fn rect(&self, rect: &NodeRect) -> CellRect {
        let (x, y) = self.point(rect.x, rect.y);
        CellRect {
            x,
            y,
            width: ((rect.width / self.units_per_col) as usize).max(3),
            height: self.node_rows.max(3) as usize,
        }
    }

    /// Grid size for a whole scene.
    pub fn size(&self, scene: &Scene) -> (usize, usize) {
        let (w, h) = self.point(scene.width, scene.height);
        (w.max(1), h.max(1))
    }

    /// Node under a cell of the unscrolled grid.
    pub fn node_at<'s>(&self, scene: &'s Scene, x: usize, y: usize) -> Option<&'s SceneNode> {
        scene
            .nodes()
            .iter()
            .rev()
            .find(|node| self.rect(&node.rect).contains(x, y))
    }
}

/// A character cell in the rendering grid with style
#[derive(Clone)]
struct StyledCell {
    ch: char,
    style: Style,
}

impl Default for StyledCell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::default(),
        }
    }
}

/// Internal grid for rendering before viewport clipping
struct RenderGrid {
    cells: Vec<Vec<StyledCell>>,
    width: usize,
    height: usize,
}

impl RenderGrid {
    fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![vec![StyledCell::default(); width]; height],
            width,
            height,
        }
    }

    fn set(&mut self, x: usize, y: usize, ch: char, style: Style) {
        if x < self.width && y < self.height {
            self.cells[y][x] = StyledCell { ch, style };
        }
    }

    fn get(&self, x: usize, y: usize) -> Option<&StyledCell> {
        self.cells.get(y).and_then(|row| row.get(x))
    }

    fn set_str(&mut self, x: usize, y: usize, s: &str, style: Style) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, ch, style);
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        self.cells
            .get(y)
            .map(|row| row.iter().map(|c| c.ch).collect())
            .unwrap_or_default()
    }
}

/// Run graph widget
pub struct GraphWidget<'a> {
    scene: &'a Scene,
    block: Option<Block<'a>>,
    viewport: Viewport,
    projection: CellProjection,
}

impl<'a> GraphWidget<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            block: None,
            viewport: Viewport::default(),
            projection: CellProjection::default(),
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn projection(mut self, projection: CellProjection) -> Self {
        self.projection = projection;
        self
    }

    /// Render a node box: border, status glyph with name, status text.
    fn render_node(&self, grid: &mut RenderGrid, node: &SceneNode) {
        let cell = self.projection.rect(&node.rect);
        let (x, y, w, h) = (cell.x, cell.y, cell.width, cell.height);

        let border = Theme::node_border(node.selected);
        let text_style = if node.disabled {
            Theme::disabled_node()
        } else {
            Theme::status(node.status_class)
        };
        let (hz, vt, tl, tr, bl, br) = if node.selected {
            (
                box_chars::SELECTED_HORIZONTAL,
                box_chars::SELECTED_VERTICAL,
                box_chars::SELECTED_TOP_LEFT,
                box_chars::SELECTED_TOP_RIGHT,
                box_chars::SELECTED_BOTTOM_LEFT,
                box_chars::SELECTED_BOTTOM_RIGHT,
            )
        } else {
            (
                box_chars::HORIZONTAL,
                box_chars::VERTICAL,
                box_chars::TOP_LEFT,
                box_chars::TOP_RIGHT,
                box_chars::BOTTOM_LEFT,
                box_chars::BOTTOM_RIGHT,
            )
        };

        grid.set(x, y, tl, border);
        for i in 1..w - 1 {
            grid.set(x + i, y, hz, border);
        }
        grid.set(x + w - 1, y, tr, border);

        let inner = w - 2;
        let indicator = status_char(node.status_class);
        let lines = [
            format!(" {indicator} {}", node.name),
            format!("   {}", node.status_text),
        ];
        for row in 1..h - 1 {
            grid.set(x, y + row, vt, border);
            let text = lines.get(row - 1).map(String::as_str).unwrap_or("");
            let clipped = crate::utils::truncate(text, inner);
            let padded = format!("{clipped:inner$}");
            let style = if row == 1 {
                text_style.add_modifier(Modifier::BOLD)
            } else {
                text_style
            };
            grid.set_str(x + 1, y + row, &padded, style);
            grid.set(x + w - 1, y + row, vt, border);
        }

        let bottom = y + h - 1;
        grid.set(x, bottom, bl, border);
        for i in 1..w - 1 {
            grid.set(x + i, bottom, hz, border);
        }
        grid.set(x + w - 1, bottom, br, border);
    }

    /// Render an edge path using orthogonal line characters
    fn render_edge(&self, grid: &mut RenderGrid, edge: &SceneEdge) {
        let style = Theme::edge(edge.class);
        let glyphs = edge_glyphs(edge.class);
        let segments = route_orthogonal(&edge.source_rect, &edge.target_rect);

        for segment in &segments {
            let (x1, y1) = self.projection.point(segment.x1, segment.y1);
            let (x2, y2) = self.projection.point(segment.x2, segment.y2);

            if y1 == y2 {
                let (start_x, end_x) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
                for x in start_x..=end_x {
                    let existing = grid.get(x, y1).map(|c| c.ch).unwrap_or(' ');
                    grid.set(x, y1, merge_edge_char(existing, glyphs.horizontal), style);
                }
            } else if x1 == x2 {
                let (start_y, end_y) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
                for y in start_y..=end_y {
                    let existing = grid.get(x1, y).map(|c| c.ch).unwrap_or(' ');
                    grid.set(x1, y, merge_edge_char(existing, glyphs.vertical), style);
                }
            }
        }

        if let Some(last) = segments.last() {
            self.render_arrow(grid, last, style);
        }
    }

    /// Arrow head one cell before the target's left edge.
    fn render_arrow(&self, grid: &mut RenderGrid, last: &LineSegment, style: Style) {
        let (x1, _) = self.projection.point(last.x1, last.y1);
        let (x2, y2) = self.projection.point(last.x2, last.y2);
        if x2 >= x1 && x2 > 0 {
            grid.set(x2 - 1, y2, box_chars::ARROW_RIGHT, style);
        } else if x2 < x1 {
            grid.set(x2 + 1, y2, box_chars::ARROW_LEFT, style);
        }
    }

    /// Paint the whole scene, edges first.
    fn render_to_grid(&self) -> (RenderGrid, GraphRenderResult) {
        if self.scene.is_empty() {
            return (RenderGrid::new(0, 0), GraphRenderResult::empty());
        }

        let (width, height) = self.projection.size(self.scene);
        let mut grid = RenderGrid::new(width, height);

        for element in self.scene.draw_order() {
            match element {
                SceneElement::Edge(edge) => self.render_edge(&mut grid, edge),
                SceneElement::Node(node) => self.render_node(&mut grid, node),
            }
        }

        let result = GraphRenderResult {
            total_width: width.min(u16::MAX as usize) as u16,
            total_height: height.min(u16::MAX as usize) as u16,
            clipped_x: false,
            clipped_y: false,
        };

        (grid, result)
    }

    /// Render the graph with viewport clipping
    pub fn render_graph(&self, area: Rect, buf: &mut Buffer) -> GraphRenderResult {
        let (grid, mut result) = self.render_to_grid();

        let view_start_x = self.viewport.scroll_x as usize;
        let view_start_y = self.viewport.scroll_y as usize;

        result.clipped_x = view_start_x > 0 || grid.width > area.width as usize + view_start_x;
        result.clipped_y = view_start_y > 0 || grid.height > area.height as usize + view_start_y;

        for y in 0..area.height as usize {
            let grid_y = view_start_y + y;
            if grid_y >= grid.height {
                break;
            }

            for x in 0..area.width as usize {
                let grid_x = view_start_x + x;
                if grid_x >= grid.width {
                    break;
                }

                if let Some(cell) = grid.get(grid_x, grid_y) {
                    let buf_x = area.x + x as u16;
                    let buf_y = area.y + y as u16;
                    buf[(buf_x, buf_y)].set_char(cell.ch).set_style(cell.style);
                }
            }
        }

        result
    }
}

/// Merge edge characters at intersections
fn merge_edge_char(existing: char, new_char: char) -> char {
    match (existing, new_char) {
        (' ', c) => c,
        (c, ' ') => c,
        (box_chars::HORIZONTAL, box_chars::VERTICAL) => box_chars::CROSS,
        (box_chars::VERTICAL, box_chars::HORIZONTAL) => box_chars::CROSS,
        (box_chars::HORIZONTAL, box_chars::HORIZONTAL) => box_chars::HORIZONTAL,
        (box_chars::VERTICAL, box_chars::VERTICAL) => box_chars::VERTICAL,
        (box_chars::CROSS, _) => box_chars::CROSS,
        (_, box_chars::CROSS) => box_chars::CROSS,
        // T-junctions
        (box_chars::HORIZONTAL, box_chars::T_DOWN) => box_chars::T_DOWN,
        (box_chars::HORIZONTAL, box_chars::T_UP) => box_chars::T_UP,
        (box_chars::VERTICAL, box_chars::T_RIGHT) => box_chars::T_RIGHT,
        (box_chars::VERTICAL, box_chars::T_LEFT) => box_chars::T_LEFT,
        // Default: prefer the new character
        (_, c) => c,
    }
}

impl Widget for GraphWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner_area.width < 2 || inner_area.height < 1 {
            return;
        }

        // An empty run leaves the canvas blank.
        if self.scene.is_empty() {
            return;
        }

        self.render_graph(inner_area, buf);
    }
}
