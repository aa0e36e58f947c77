//! Rendering of traced guards.

use super::trace::{TraceKind, TraceNode};

#[derive(Default)]
struct Rendering {
    code: String,
    carets: String,
}

impl Rendering {
    fn push(&mut self, text: &str, highlight: bool) {
        let mark = if highlight { '^' } else { ' ' };
        self.code.push_str(text);
        self.carets
            .extend(std::iter::repeat(mark).take(text.chars().count()));
    }

    fn node(&mut self, node: &TraceNode, highlight: bool) {
        let highlight = highlight || node.cause;
        match &node.kind {
            TraceKind::Leaf(name) => self.push(name, highlight),
            TraceKind::Not(inner) => {
                self.push("!", highlight);
                self.node(inner, highlight);
            }
            TraceKind::And(children) => self.group(children, " && ", highlight),
            TraceKind::Or(children) => self.group(children, " || ", highlight),
        }
    }

    fn group(&mut self, children: &[TraceNode], sep: &str, highlight: bool) {
        self.push("(", highlight);
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                self.push(sep, highlight);
            }
            self.node(child, highlight);
        }
        self.push(")", highlight);
    }
}

/// Render a trace as its source code, followed by a caret line marking
/// every character of the cause nodes.
///
/// When no node is a cause (the guard passed) only the code line is
/// returned.
pub fn format_trace(result: &TraceNode) -> String {
    let mut out = Rendering::default();
    out.node(result, false);

    if out.carets.contains('^') {
        format!("{}\n{}", out.code, out.carets)
    } else {
        out.code
    }
}
