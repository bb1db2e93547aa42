//! SVG export of a run graph
//! Usage: ninout-dash graph <RUN> [--out FILE] [--step NAME]

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::api::RunSource;
use crate::config::DashConfig;
use crate::graph::{to_svg, Scene};
use crate::models::Run;

/// Build the SVG document for a run, highlighting `step` when present.
pub fn render_run_svg(run: &Run, step: Option<&str>) -> String {
    let selected = step.filter(|s| {
        let present = run.has_step(s);
        if !present {
            tracing::warn!(run = %run.run_name, step = s, "step not in run, nothing highlighted");
        }
        present
    });
    to_svg(&Scene::build(&run.steps, selected))
}

pub fn execute(
    config: &DashConfig,
    run_name: &str,
    out: Option<&Path>,
    step: Option<&str>,
) -> Result<()> {
    let client = super::client(config)?;
    let run = client
        .get_run(run_name)
        .with_context(|| format!("Failed to fetch run '{run_name}'"))?;

    let svg = render_run_svg(&run, step);

    match out {
        Some(path) => {
            fs::write(path, &svg)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} graph for {} ({} steps) to {}",
                "Wrote".green().bold(),
                run.run_name.bold(),
                run.steps.len(),
                path.display()
            );
        }
        None => print!("{svg}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Step;

    fn make_run() -> Run {
        Run {
            run_name: "r1".to_string(),
            steps: vec![Step::new("a"), Step::new("b").with_deps(["a"])],
            ..Run::default()
        }
    }

    #[test]
    fn test_svg_marks_selected_step() {
        let svg = render_run_svg(&make_run(), Some("b"));
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("selected"));
        assert!(svg.contains("data-step=\"b\""));
    }

    #[test]
    fn test_svg_ignores_unknown_step() {
        let svg = render_run_svg(&make_run(), Some("zzz"));
        assert!(!svg.contains("selected"));
    }

    #[test]
    fn test_svg_edges_before_nodes() {
        let svg = render_run_svg(&make_run(), None);
        let line = svg.find("<line").unwrap();
        let node = svg.find("<g").unwrap();
        assert!(line < node);
    }
}
