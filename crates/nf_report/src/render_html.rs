//! render_html.rs: self-contained HTML (no external assets, no scripts).
//! Every model-sourced string goes through `esc`.

use std::fmt::Write as _;

use crate::ReportModel;

/// Escape text for HTML (minimal, deterministic).
fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) struct HtmlBuilder {
    buf: String,
}

impl HtmlBuilder {
    pub(crate) fn new() -> Self {
        Self { buf: String::with_capacity(16 * 1024) }
    }

    pub(crate) fn start(&mut self, title: &str) {
        let _ = write!(
            self.buf,
            "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
             <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\
             <title>{}</title>\
             <style>\
             body{{font-family:system-ui,-apple-system,Segoe UI,Roboto,Ubuntu,Arial,sans-serif;margin:24px;}}\
             h1,h2,h3{{margin:0.2em 0;}}\
             section{{margin-bottom:2em}}\
             .muted{{opacity:0.8}}\
             .award{{display:inline-block;padding:.3em .8em;border-radius:9999px;background:#eee;font-weight:600}}\
             .award.gold{{background:#f5d76e}}\
             .award.silver{{background:#d5d8dc}}\
             .award.bronze{{background:#e0a872}}\
             table{{border-collapse:collapse}}\
             td,th{{padding:4px 8px;border-bottom:1px solid #ddd;text-align:left}}\
             </style></head><body>",
            esc(title)
        );
    }

    pub(crate) fn finish(mut self) -> String {
        self.buf.push_str("</body></html>");
        self.buf
    }

    pub(crate) fn section_participant(&mut self, m: &ReportModel) {
        let c = &m.cover;
        let _ = write!(
            self.buf,
            "<section><h2>{}</h2><p class=\"muted\">{} · {} · age {} · run {}</p>",
            esc(&c.participant_id),
            esc(&c.level),
            esc(&c.sex),
            c.age,
            esc(&c.run_km)
        );

        let _ = write!(
            self.buf,
            "<p><span class=\"award {}\">{}</span> <span class=\"muted\">{}</span></p>",
            esc(&m.award.tone),
            esc(&m.award.label),
            esc(&m.award.reason)
        );

        self.buf.push_str(
            "<table><thead><tr><th>Station</th><th>Result</th><th>Unit</th><th>Grade</th>\
             <th>Points</th><th>Next target</th><th>Next grade</th></tr></thead><tbody>",
        );
        for r in &m.stations {
            let _ = write!(
                self.buf,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                esc(&r.station),
                esc(&r.measured),
                esc(&r.unit),
                esc(&r.grade),
                esc(&r.points),
                esc(&r.next_target),
                esc(&r.next_grade)
            );
        }
        let _ = write!(
            self.buf,
            "</tbody><tfoot><tr><th>Total</th><td colspan=\"3\"></td><th>{}</th><td colspan=\"2\"></td></tr></tfoot></table>",
            m.total_points
        );

        let i = &m.integrity;
        let _ = write!(
            self.buf,
            "<p class=\"muted\">Result {} · Table {}",
            esc(&i.result_id),
            esc(&i.table_id)
        );
        if let Some(run) = &i.run_id {
            let _ = write!(self.buf, " · Run {}", esc(run));
        }
        if let Some(engine) = &i.engine {
            let _ = write!(self.buf, " · Engine {}", esc(engine));
        }
        self.buf.push_str("</p></section>");
    }
}

/// One document, one section per participant in the given order.
pub fn render_html(models: &[ReportModel]) -> String {
    let mut h = HtmlBuilder::new();
    let title = match models {
        [one] => format!("{}: {}", one.cover.title, one.cover.participant_id),
        _ => format!("Fitness Assessment Results ({})", models.len()),
    };
    h.start(&title);
    let _ = write!(h.buf, "<h1>{}</h1>", esc(&title));
    for m in models {
        h.section_participant(m);
    }
    h.finish()
}
