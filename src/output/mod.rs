mod format;

use crate::buildkite::{Section, StatusReport};

pub use format::{header_line, menu_line};

const DIVIDER: &str = "---";
const SUBMENU: &str = "--";
const NESTED_SUBMENU: &str = "----";

/// Render the full menu document.
///
/// `build_count` is a prefix take on every build list; zero shows labels
/// only, and a count past the end clamps without erroring.
pub fn render(report: &StatusReport, build_count: usize) -> String {
    let mut lines = Vec::new();

    match report.personal.first() {
        Some(build) => lines.push(header_line(build)),
        None => lines.push("No recent builds".to_string()),
    }

    lines.push(DIVIDER.to_string());
    for build in report.personal.iter().take(build_count) {
        lines.push(menu_line(build));
    }

    for section in &report.sections {
        lines.push(DIVIDER.to_string());
        match section {
            Section::Branch(group) => {
                lines.push(group.branch.clone());
                for build in group.builds.iter().take(build_count) {
                    lines.push(format!("{SUBMENU} {}", menu_line(build)));
                }
            }
            Section::Pipeline { pipeline, groups } => {
                lines.push(pipeline.clone());
                for group in groups {
                    lines.push(format!("{SUBMENU} {}", group.branch));
                    for build in group.builds.iter().take(build_count) {
                        lines.push(format!("{NESTED_SUBMENU} {}", menu_line(build)));
                    }
                }
            }
        }
    }

    let mut document = lines.join("\n");
    document.push('\n');
    document
}
