//! HTML progress list with a completion bar.

use super::{animation_phase, dots, percent_complete, ProgressRenderer, StepMark};

/// Renders progress as an HTML checklist followed by a proportional bar.
#[derive(Debug, Clone, Default)]
pub struct HtmlProgressRenderer;

impl HtmlProgressRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render with an explicit animation phase; `None` means no suffix.
    pub fn render_frame(&self, step_names: &[String], current: usize, phase: Option<usize>) -> String {
        let mut html = String::from("<ul style='list-style:none;padding:0'>");
        for (i, name) in step_names.iter().enumerate() {
            let name = escape(name);
            match StepMark::for_index(i, current) {
                StepMark::Done => html.push_str(&format!("<li>✅ <b>{}</b></li>", name)),
                StepMark::InProgress => {
                    html.push_str(&format!("<li>⏳ <b>{}{}</b></li>", name, dots(phase)))
                }
                StepMark::Pending => html.push_str(&format!("<li>⬜ {}</li>", name)),
            }
        }
        html.push_str("</ul>");

        let percent = percent_complete(current, step_names.len());
        html.push_str(
            "<div style='background:#eee;border-radius:8px;height:12px;overflow:hidden;margin-top:8px'>",
        );
        html.push_str(&format!(
            "<div style='background:#2563eb;height:100%;width:{}%;transition:width 0.3s'></div>",
            percent
        ));
        html.push_str("</div>");
        html
    }
}

impl ProgressRenderer for HtmlProgressRenderer {
    fn render(&self, step_names: &[String], current: usize, animate: bool) -> String {
        let phase = animate.then(animation_phase);
        self.render_frame(step_names, current, phase)
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        ["fetch", "build", "submit"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn marks_each_step() {
        let html = HtmlProgressRenderer::new().render_frame(&names(), 1, None);
        assert!(html.contains("<li>✅ <b>fetch</b></li>"));
        assert!(html.contains("<li>⏳ <b>build</b></li>"));
        assert!(html.contains("<li>⬜ submit</li>"));
    }

    #[test]
    fn bar_width_is_floor_percent() {
        let renderer = HtmlProgressRenderer::new();
        assert!(renderer.render_frame(&names(), 0, None).contains("width:0%"));
        assert!(renderer.render_frame(&names(), 1, None).contains("width:33%"));
        assert!(renderer.render_frame(&names(), 2, None).contains("width:66%"));
        assert!(renderer.render_frame(&names(), 3, None).contains("width:100%"));
    }

    #[test]
    fn animation_suffix_only_on_current() {
        let html = HtmlProgressRenderer::new().render_frame(&names(), 0, Some(2));
        assert!(html.contains("<b>fetch...</b>"));
        assert!(!html.contains("build."));
    }

    #[test]
    fn non_animated_render_is_deterministic() {
        let renderer = HtmlProgressRenderer::new();
        assert_eq!(
            renderer.render(&names(), 2, false),
            renderer.render(&names(), 2, false)
        );
        assert_eq!(
            renderer.render(&names(), 2, false),
            renderer.render_frame(&names(), 2, None)
        );
    }

    #[test]
    fn names_are_escaped() {
        let html = HtmlProgressRenderer::new().render_frame(&["<a & b>".to_string()], 1, None);
        assert!(html.contains("&lt;a &amp; b&gt;"));
    }

    #[test]
    fn empty_list_is_complete() {
        let html = HtmlProgressRenderer::new().render_frame(&[], 0, None);
        assert!(html.starts_with("<ul style='list-style:none;padding:0'></ul>"));
        assert!(html.contains("width:100%"));
    }
}
