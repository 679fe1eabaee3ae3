//! Recolors diagram nodes by task state.
//!
//! Every completed name, then every pending name, is looked up
//! independently. A name colors every element whose own name normalizes to
//! the same string; a name without matches colors nothing. A pending entry
//! for a name that is also completed therefore wins, since it is applied
//! last.

use wasm_bindgen::JsValue;

use crate::config::{NodeStyle, Palette};
use crate::normalize::normalize_name;
use crate::payload::{DiagramPayload, TaskState};

/// A named diagram element as seen by the coloring pass.
#[derive(Debug, Clone)]
pub struct NamedElement<H> {
    pub name: String,
    /// Engine element type, e.g. `bpmn:UserTask` or `label`.
    pub kind: String,
    pub handle: H,
}

/// Seam between the coloring pass and the diagram engine's registry.
pub trait ElementSource {
    type Handle;

    /// Every element that carries a non-empty name.
    fn named_elements(&self) -> Vec<NamedElement<Self::Handle>>;

    /// Apply `style` to the element's visual. `Ok(false)` when the element
    /// has nothing to paint.
    fn paint(&self, handle: &Self::Handle, style: &NodeStyle) -> Result<bool, JsValue>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColoringReport {
    pub matched: Vec<String>,
    pub unmatched: Vec<String>,
    pub painted: usize,
}

impl ColoringReport {
    pub fn summary(&self) -> String {
        format!(
            "Colored {} element(s); {} name(s) matched, {} without a diagram element",
            self.painted,
            self.matched.len(),
            self.unmatched.len()
        )
    }
}

pub fn style_for<'a>(palette: &'a Palette, state: TaskState) -> &'a NodeStyle {
    match state {
        TaskState::Completed => &palette.completed,
        TaskState::Pending => &palette.pending,
    }
}

/// Color every element named in `payload`. Paint errors abort the pass and
/// propagate; callers treat them as cosmetic.
pub fn color_elements<S: ElementSource>(
    source: &S,
    payload: &DiagramPayload,
    palette: &Palette,
    excluded_types: &[String],
) -> Result<ColoringReport, JsValue> {
    let candidates: Vec<(String, NamedElement<S::Handle>)> = source
        .named_elements()
        .into_iter()
        .filter(|el| !excluded_types.iter().any(|kind| *kind == el.kind))
        .map(|el| (normalize_name(&el.name), el))
        .collect();

    let mut report = ColoringReport::default();
    for (task, state) in payload.tasks() {
        let wanted = normalize_name(task);
        let style = style_for(palette, state);

        let mut hits = 0;
        for (normalized, element) in &candidates {
            if *normalized != wanted {
                continue;
            }
            hits += 1;
            if source.paint(&element.handle, style)? {
                report.painted += 1;
            }
        }

        if hits == 0 {
            web_sys::console::log_1(&format!("No diagram element found for task '{}'", task).into());
            report.unmatched.push(task.to_string());
        } else {
            report.matched.push(task.to_string());
        }
    }
    Ok(report)
}
