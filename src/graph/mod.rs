//! DAG layout, edge classification and scene construction.

pub mod edges;
pub mod layered;
pub mod scene;
pub mod svg;

pub use edges::{classify_edge, EdgeClass};
pub use layered::{layout, GraphLayout, LayoutConfig, NodeRect};
pub use scene::{Scene, SceneEdge, SceneElement, SceneNode, StatusClass};
pub use svg::to_svg;
