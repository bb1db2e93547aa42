//! Render-ready vector scene for a run's DAG.
//!
//! The scene is rebuilt from scratch for every snapshot. Backends (the
//! terminal widget and the SVG export) only read it.

use std::collections::HashMap;

use super::edges::{classify_edge, EdgeClass};
use super::layered::{self, GraphLayout, NodeRect};
use crate::models::{Step, StepStatus};

/// One of the five fixed node classes derived from the step status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Pending,
    Running,
    Done,
    Failed,
    Skipped,
}

impl StatusClass {
    pub fn css_class(&self) -> &'static str {
        match self {
            StatusClass::Pending => "status-pending",
            StatusClass::Running => "status-running",
            StatusClass::Done => "status-done",
            StatusClass::Failed => "status-failed",
            StatusClass::Skipped => "status-skipped",
        }
    }
}

impl From<&StepStatus> for StatusClass {
    fn from(status: &StepStatus) -> Self {
        match status {
            StepStatus::Running => StatusClass::Running,
            StepStatus::Done => StatusClass::Done,
            StepStatus::Failed => StatusClass::Failed,
            StepStatus::Skipped => StatusClass::Skipped,
            StepStatus::Pending | StepStatus::Unknown(_) => StatusClass::Pending,
        }
    }
}

/// A drawn step node.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub rect: NodeRect,
    pub status_text: String,
    pub status_class: StatusClass,
    pub disabled: bool,
    pub selected: bool,
    pub deps: Vec<String>,
}

impl SceneNode {
    /// Inspection text: name, status and dependency list.
    pub fn tooltip(&self) -> String {
        format!(
            "{}\nstatus={}\ndeps=[{}]",
            self.name,
            self.status_text,
            self.deps.join(", ")
        )
    }

    /// Space-separated class list, e.g. `graph-node status-done selected`.
    pub fn css_classes(&self) -> String {
        let mut classes = vec!["graph-node", self.status_class.css_class()];
        if self.disabled {
            classes.push("disabled");
        }
        if self.selected {
            classes.push("selected");
        }
        classes.join(" ")
    }
}

/// A drawn dependency edge, from the source's right edge to the target's
/// left edge.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEdge {
    pub source: String,
    pub target: String,
    pub class: EdgeClass,
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub source_rect: NodeRect,
    pub target_rect: NodeRect,
}

/// Element of the scene in paint order.
#[derive(Debug, Clone, Copy)]
pub enum SceneElement<'a> {
    Edge(&'a SceneEdge),
    Node(&'a SceneNode),
}

/// Complete drawing of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    edges: Vec<SceneEdge>,
    nodes: Vec<SceneNode>,
}

impl Scene {
    /// Build the scene for a run's steps with an optional selected step.
    pub fn build(steps: &[Step], selected: Option<&str>) -> Self {
        let layout = layered::layout(steps);
        Self::from_layout(steps, &layout, selected)
    }

    /// Build the scene from a precomputed layout.
    pub fn from_layout(steps: &[Step], layout: &GraphLayout, selected: Option<&str>) -> Self {
        let by_name: HashMap<&str, &Step> =
            steps.iter().map(|s| (s.step_name.as_str(), s)).collect();

        let mut edges = Vec::new();
        for (dep, target) in layered::resolve_edges(steps) {
            let (Some(step), Some(source_rect), Some(target_rect)) = (
                by_name.get(target),
                layout.get_node(dep),
                layout.get_node(target),
            ) else {
                continue;
            };

            edges.push(SceneEdge {
                source: dep.to_string(),
                target: target.to_string(),
                class: classify_edge(step, dep),
                from: source_rect.right_middle(),
                to: target_rect.left_middle(),
                source_rect: *source_rect,
                target_rect: *target_rect,
            });
        }

        let nodes = steps
            .iter()
            .filter_map(|step| {
                let rect = layout.get_node(&step.step_name)?;
                Some(SceneNode {
                    name: step.step_name.clone(),
                    rect: *rect,
                    status_text: step.status.to_string(),
                    status_class: StatusClass::from(&step.status),
                    disabled: step.disabled_self,
                    selected: selected == Some(step.step_name.as_str()),
                    deps: step.deps.clone(),
                })
            })
            .collect();

        Self {
            width: layout.width(),
            height: layout.height(),
            edges,
            nodes,
        }
    }

    pub fn edges(&self) -> &[SceneEdge] {
        &self.edges
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every element in paint order: all edges, then all nodes, so nodes
    /// cover edge endpoints.
    pub fn draw_order(&self) -> impl Iterator<Item = SceneElement<'_>> {
        self.edges
            .iter()
            .map(SceneElement::Edge)
            .chain(self.nodes.iter().map(SceneElement::Node))
    }
}
