// src/report/console.rs

//! Plain-text console sink.

use crate::report::reporter::StatusSink;
use crate::report::snapshot::{NodeProgress, StatusSnapshot};

const RESET: &str = "\x1b[0m";

/// Renders each snapshot as one line per node on stdout.
///
/// Pending nodes show the dependencies they are waiting on, annotated
/// with each dependency's own progress; running nodes show elapsed time.
/// In board mode lines are color-coded by state: pending white, running
/// yellow, done green, failed red.
pub struct ConsoleSink {
    /// Clear the terminal before each snapshot so the output reads as a
    /// live-updating board rather than a scrolling log.
    clear_screen: bool,
    /// Use ANSI colors for node and dependency states.
    color: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            clear_screen: true,
            color: true,
        }
    }

    /// Append plain snapshots instead of redrawing in place. Useful when
    /// stdout is not a terminal.
    pub fn appending() -> Self {
        Self {
            clear_screen: false,
            color: false,
        }
    }

    fn paint(&self, progress: NodeProgress, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("{}{text}{RESET}", color_of(progress))
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for ConsoleSink {
    fn publish(&mut self, snapshot: &StatusSnapshot) {
        if self.clear_screen {
            print!("\x1b[2J\x1b[1;1H");
        }

        for node in &snapshot.nodes {
            match node.progress {
                NodeProgress::Pending => {
                    println!(
                        "{}\tawaiting {}",
                        self.paint(node.progress, &node.id),
                        render_deps(&node.deps, self.color)
                    );
                }
                NodeProgress::Running { since } => {
                    let line = format!(
                        "{}\trunning\t\t({:.1}s)",
                        node.id,
                        since.elapsed().as_secs_f64()
                    );
                    println!("{}", self.paint(node.progress, &line));
                }
                NodeProgress::Done | NodeProgress::Failed => {
                    let line = format!("{}\t{}", node.id, node.progress.label());
                    println!("{}", self.paint(node.progress, &line));
                }
            }
        }

        if !self.clear_screen {
            println!();
        }
    }
}

fn color_of(progress: NodeProgress) -> &'static str {
    match progress {
        NodeProgress::Pending => "\x1b[37m",
        NodeProgress::Running { .. } => "\x1b[33m",
        NodeProgress::Done => "\x1b[32m",
        NodeProgress::Failed => "\x1b[31m",
    }
}

fn render_deps(deps: &[(String, NodeProgress)], color: bool) -> String {
    let parts: Vec<String> = deps
        .iter()
        .map(|(id, progress)| {
            let text = format!("{id}:{}", progress.label());
            if color {
                format!("{}{text}{RESET}", color_of(*progress))
            } else {
                text
            }
        })
        .collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deps_render_with_state_colors() {
        let deps = vec![
            ("a".to_string(), NodeProgress::Done),
            ("b".to_string(), NodeProgress::Pending),
        ];

        assert_eq!(render_deps(&deps, false), "[a:done, b:pending]");

        let colored = render_deps(&deps, true);
        assert!(colored.contains("\x1b[32ma:done\x1b[0m"));
        assert!(colored.contains("\x1b[37mb:pending\x1b[0m"));
    }
}
