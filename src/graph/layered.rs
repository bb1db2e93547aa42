//! Layered layout for run DAGs.
//!
//! Longest-path leveling over a Kahn topological pass:
//! 1. Resolve `dep -> step` edges, dropping deps that name unknown steps
//! 2. Assign each step the longest distance from any source
//! 3. Order steps within a level lexicographically
//! 4. Place levels in fixed-width X bands and steps in fixed-height Y slots
//!
//! The result is a pure function of the step list: positions are kept in a
//! `BTreeMap` so repeated calls on the same run yield identical output.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::models::Step;

/// Rectangle occupied by a step node, in layout units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Midpoint of the right edge (where outgoing edges leave).
    pub fn right_middle(&self) -> (f64, f64) {
        (self.x + self.width, self.center_y())
    }

    /// Midpoint of the left edge (where incoming edges arrive).
    pub fn left_middle(&self) -> (f64, f64) {
        (self.x, self.center_y())
    }
}

/// A straight line segment of a routed edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl LineSegment {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

/// Grid constants for the layout.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Width of one level's X band
    pub band_width: f64,
    /// Height of one Y slot within a level
    pub slot_height: f64,
    pub node_width: f64,
    pub node_height: f64,
    /// Offset of the first band / slot from the canvas origin
    pub origin_x: f64,
    pub origin_y: f64,
    /// Space kept right of / below the outermost nodes
    pub margin_x: f64,
    pub margin_y: f64,
    /// Canvas floor so an empty or tiny graph still gets a usable area
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            band_width: 220.0,
            slot_height: 110.0,
            node_width: 170.0,
            node_height: 52.0,
            origin_x: 40.0,
            origin_y: 30.0,
            margin_x: 40.0,
            margin_y: 30.0,
            min_width: 800.0,
            min_height: 240.0,
        }
    }
}

/// Node positions and canvas extent for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphLayout {
    positions: BTreeMap<String, NodeRect>,
    levels: BTreeMap<String, usize>,
    width: f64,
    height: f64,
}

impl GraphLayout {
    pub fn get_node(&self, name: &str) -> Option<&NodeRect> {
        self.positions.get(name)
    }

    pub fn level(&self, name: &str) -> Option<usize> {
        self.levels.get(name).copied()
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Dependency edges `(dep, step)` whose endpoints are both known steps.
///
/// Duplicate deps on a step collapse to one edge. Order follows the step
/// list, then each step's `deps` order.
pub fn resolve_edges(steps: &[Step]) -> Vec<(&str, &str)> {
    let known: HashSet<&str> = steps.iter().map(|s| s.step_name.as_str()).collect();
    let mut edges = Vec::new();

    for step in steps {
        let mut seen: HashSet<&str> = HashSet::new();
        for dep in &step.deps {
            if known.contains(dep.as_str()) && seen.insert(dep.as_str()) {
                edges.push((dep.as_str(), step.step_name.as_str()));
            }
        }
    }

    edges
}

/// Longest-path level of every step.
///
/// Steps are dequeued in Kahn order; a step's level is one more than the
/// deepest predecessor seen before it became ready. Steps on a cycle never
/// reach in-degree zero and fall back to level 0 so they still get placed.
/// This fallback keeps malformed input drawable; it does not detect cycles.
pub fn compute_levels(steps: &[Step]) -> BTreeMap<String, usize> {
    let edges = resolve_edges(steps);

    let mut indegree: HashMap<&str, usize> =
        steps.iter().map(|s| (s.step_name.as_str(), 0)).collect();
    let mut downstream: HashMap<&str, Vec<&str>> = HashMap::new();

    for &(dep, step) in &edges {
        *indegree.entry(step).or_insert(0) += 1;
        downstream.entry(dep).or_default().push(step);
    }

    let mut queue: VecDeque<&str> = steps
        .iter()
        .map(|s| s.step_name.as_str())
        .filter(|name| indegree.get(name).copied() == Some(0))
        .collect();

    let mut candidate: HashMap<&str, usize> = HashMap::new();
    let mut levels: BTreeMap<String, usize> = BTreeMap::new();

    while let Some(node) = queue.pop_front() {
        if levels.contains_key(node) {
            continue;
        }
        let level = candidate.get(node).copied().unwrap_or(0);
        levels.insert(node.to_string(), level);

        for &child in downstream.get(node).map(Vec::as_slice).unwrap_or_default() {
            let next = candidate.entry(child).or_insert(0);
            *next = (*next).max(level + 1);

            if let Some(remaining) = indegree.get_mut(child) {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    queue.push_back(child);
                }
            }
        }
    }

    for step in steps {
        levels.entry(step.step_name.clone()).or_insert(0);
    }

    levels
}

/// Group step names by level, each level sorted by name.
fn group_by_level(levels: &BTreeMap<String, usize>) -> BTreeMap<usize, Vec<&str>> {
    let mut groups: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for (name, &level) in levels {
        groups.entry(level).or_default().push(name.as_str());
    }
    for names in groups.values_mut() {
        names.sort_unstable();
    }
    groups
}

/// Lay out a run's steps with the default grid.
pub fn layout(steps: &[Step]) -> GraphLayout {
    layout_with_config(steps, &LayoutConfig::default())
}

/// Lay out a run's steps with custom grid constants.
pub fn layout_with_config(steps: &[Step], config: &LayoutConfig) -> GraphLayout {
    let levels = compute_levels(steps);
    let groups = group_by_level(&levels);

    let mut positions: BTreeMap<String, NodeRect> = BTreeMap::new();
    let mut max_x: f64 = 0.0;
    let mut max_y: f64 = 0.0;

    for (&level, names) in &groups {
        for (slot, name) in names.iter().enumerate() {
            let x = config.origin_x + level as f64 * config.band_width;
            let y = config.origin_y + slot as f64 * config.slot_height;
            max_x = max_x.max(x + config.node_width + config.margin_x);
            max_y = max_y.max(y + config.node_height + config.margin_y);
            positions.insert(
                (*name).to_string(),
                NodeRect::new(x, y, config.node_width, config.node_height),
            );
        }
    }

    GraphLayout {
        positions,
        levels,
        width: max_x.max(config.min_width),
        height: max_y.max(config.min_height),
    }
}

/// Route an edge between two nodes as horizontal-vertical-horizontal
/// segments through the gap between their bands.
pub fn route_orthogonal(source: &NodeRect, target: &NodeRect) -> Vec<LineSegment> {
    let (src_x, src_y) = source.right_middle();
    let (tgt_x, tgt_y) = target.left_middle();

    if (src_y - tgt_y).abs() < f64::EPSILON {
        return vec![LineSegment::new(src_x, src_y, tgt_x, tgt_y)];
    }

    let mid_x = if tgt_x > src_x {
        (src_x + tgt_x) / 2.0
    } else {
        src_x
    };

    vec![
        LineSegment::new(src_x, src_y, mid_x, src_y),
        LineSegment::new(mid_x, src_y, mid_x, tgt_y),
        LineSegment::new(mid_x, tgt_y, tgt_x, tgt_y),
    ]
}
