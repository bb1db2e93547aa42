//! Semantic classes for dependency edges.

use crate::models::Step;

/// Visual class of a `dep -> step` edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeClass {
    /// Plain dependency: solid, neutral colour.
    Normal,
    /// Dependency listed in the step's `disabled_deps`.
    Disabled,
    /// The step's condition edge whose outcome was true.
    ConditionSatisfied,
    /// The step's condition edge whose outcome was false or is not yet known.
    ConditionUnsatisfied,
}

impl EdgeClass {
    /// CSS-style class name used by the SVG export.
    pub fn css_class(&self) -> &'static str {
        match self {
            EdgeClass::Normal => "edge-normal",
            EdgeClass::Disabled => "edge-disabled",
            EdgeClass::ConditionSatisfied => "edge-conditional edge-satisfied",
            EdgeClass::ConditionUnsatisfied => "edge-conditional edge-unsatisfied",
        }
    }

    /// Stroke colour as an SVG hex string.
    pub fn stroke(&self) -> &'static str {
        match self {
            EdgeClass::Normal => "#6b7280",
            EdgeClass::Disabled => "#9aa0a6",
            EdgeClass::ConditionSatisfied => "#1f8a4c",
            EdgeClass::ConditionUnsatisfied => "#c0392b",
        }
    }

    /// SVG `stroke-dasharray`, `None` for solid lines.
    pub fn dash(&self) -> Option<&'static str> {
        match self {
            EdgeClass::Normal => None,
            EdgeClass::Disabled => Some("5 5"),
            EdgeClass::ConditionSatisfied | EdgeClass::ConditionUnsatisfied => Some("6 4"),
        }
    }
}

/// Classify the edge from `dep` into `step`.
///
/// `disabled_deps` membership is checked first, so an edge that is both
/// disabled and the condition edge is `Disabled`.
pub fn classify_edge(step: &Step, dep: &str) -> EdgeClass {
    if step.is_dep_disabled(dep) {
        return EdgeClass::Disabled;
    }

    if step.when_name.as_deref() == Some(dep) {
        return match step.condition_bool {
            Some(true) => EdgeClass::ConditionSatisfied,
            Some(false) | None => EdgeClass::ConditionUnsatisfied,
        };
    }

    EdgeClass::Normal
}
