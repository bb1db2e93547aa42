//! SVG export of a [`Scene`].

use std::fmt::Write;

use super::scene::{Scene, SceneElement};

const NODE_RADIUS: f64 = 8.0;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Serialise the scene as a standalone SVG document.
///
/// Each node is a `<g>` carrying its class list and `data-step` name, with a
/// `<title>` child that browsers show on hover.
pub fn to_svg(scene: &Scene) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {} {}\" width=\"{}\" height=\"{}\">",
        scene.width, scene.height, scene.width, scene.height
    );

    for element in scene.draw_order() {
        match element {
            SceneElement::Edge(edge) => {
                let dash = edge
                    .class
                    .dash()
                    .map(|d| format!(" stroke-dasharray=\"{d}\""))
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "  <line class=\"{}\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"2\"{}/>",
                    edge.class.css_class(),
                    edge.from.0,
                    edge.from.1,
                    edge.to.0,
                    edge.to.1,
                    edge.class.stroke(),
                    dash
                );
            }
            SceneElement::Node(node) => {
                let rect = &node.rect;
                let _ = writeln!(
                    out,
                    "  <g class=\"{}\" data-step=\"{}\">",
                    node.css_classes(),
                    escape(&node.name)
                );
                let _ = writeln!(out, "    <title>{}</title>", escape(&node.tooltip()));
                let _ = writeln!(
                    out,
                    "    <rect x=\"{}\" y=\"{}\" rx=\"{NODE_RADIUS}\" ry=\"{NODE_RADIUS}\" width=\"{}\" height=\"{}\"/>",
                    rect.x, rect.y, rect.width, rect.height
                );
                let _ = writeln!(
                    out,
                    "    <text x=\"{}\" y=\"{}\">{}</text>",
                    rect.x + 10.0,
                    rect.y + 22.0,
                    escape(&node.name)
                );
                let _ = writeln!(
                    out,
                    "    <text x=\"{}\" y=\"{}\">{}</text>",
                    rect.x + 10.0,
                    rect.y + 40.0,
                    escape(&node.status_text)
                );
                out.push_str("  </g>\n");
            }
        }
    }

    out.push_str("</svg>\n");
    out
}
