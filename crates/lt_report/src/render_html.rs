//! Deterministic, offline HTML renderer.
//!
//! One self-contained page: no external assets, every content field escaped,
//! integers with a narrow no-break space (U+202F) as thousands separator.

use std::fmt::Write as _;

use crate::ReportModel;

// ------------------------- formatting helpers -------------------------

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

fn fmt_int(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('\u{202F}');
        }
        out.push(ch);
    }
    out
}

// ------------------------- HTML builder -------------------------

struct HtmlBuilder {
    buf: String,
}

impl HtmlBuilder {
    fn new() -> Self {
        Self { buf: String::with_capacity(16 * 1024) }
    }

    fn start(&mut self, title: &str) {
        let _ = write!(
            self.buf,
            "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
             <title>{}</title>\
             <style>\
             body{{font-family:system-ui,-apple-system,Segoe UI,Roboto,Ubuntu,Arial,sans-serif;margin:24px;}}\
             h1,h2,h3{{margin:0.2em 0;}}\
             .kv ul{{list-style:none;padding-left:0}}\
             .muted{{opacity:0.8}}\
             .full{{font-weight:bold}}\
             table{{border-collapse:collapse}}\
             td,th{{padding:4px 8px;border-bottom:1px solid #ddd;text-align:left}}\
             </style></head><body>",
            esc(title)
        );
    }

    fn finish(mut self) -> String {
        self.buf.push_str("</body></html>");
        self.buf
    }

    fn kv_list<'a, I>(&mut self, heading: &str, items: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let _ = write!(self.buf, "<h3>{}</h3><div class=\"kv\"><ul>", esc(heading));
        for (k, v) in items {
            let _ = write!(self.buf, "<li><b>{}</b>: {}</li>", esc(k), esc(v));
        }
        self.buf.push_str("</ul></div>");
    }
}

// ------------------------- entry -------------------------

pub fn render_html(m: &ReportModel) -> String {
    let mut h = HtmlBuilder::new();
    h.start(&format!("{} · {}", m.cover.title, m.integrity.result_id));

    // Cover
    let _ = write!(
        h.buf,
        "<h1>{}</h1><p>{} of {} seats filled ({}) across {} shows; {} of {} applicants won at least one seat.</p>",
        esc(&m.cover.title),
        fmt_int(m.cover.seats_filled),
        fmt_int(m.cover.total_capacity),
        esc(&m.cover.fill_pct_1dp),
        fmt_int(m.cover.shows),
        fmt_int(m.cover.applicants_with_wins),
        fmt_int(m.cover.applicants),
    );

    if let Some(s) = &m.snapshot {
        h.kv_list("Parameters", s.items.iter().map(|v| (v.key.as_str(), v.value.as_str())));
    }

    // Shows
    h.buf.push_str(
        "<h3>Shows</h3><table><thead><tr><th>Show</th><th>Slot</th><th>Play</th>\
         <th>Filled</th><th>Holders</th></tr></thead><tbody>",
    );
    for s in &m.shows {
        let class = if s.holder_count >= s.capacity { " class=\"full\"" } else { "" };
        let _ = write!(
            h.buf,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td{}>{}/{}</td><td>{}</td></tr>",
            esc(&s.id),
            esc(&s.slot),
            esc(&s.play),
            class,
            fmt_int(s.holder_count),
            fmt_int(s.capacity),
            esc(&s.holders.join(", ")),
        );
    }
    h.buf.push_str("</tbody></table>");

    // Distribution
    h.buf.push_str("<h3>Wins per applicant</h3><table><thead><tr><th>Wins</th><th>Applicants</th></tr></thead><tbody>");
    for d in &m.distribution {
        let _ = write!(h.buf, "<tr><td>{}</td><td>{}</td></tr>", fmt_int(d.wins), fmt_int(d.applicants));
    }
    h.buf.push_str("</tbody></table>");

    if let Some(a) = &m.allocation {
        let rounds = a.rounds_run.to_string();
        let initial = a.initial_grants.to_string();
        let backfill = if a.backfill_ran { a.backfill_grants.to_string() } else { "not run".to_string() };
        let draws = a.draws.to_string();
        h.kv_list(
            "Allocation",
            [
                ("Rounds", rounds.as_str()),
                ("Initial grants", initial.as_str()),
                ("Backfill grants", backfill.as_str()),
                ("Draws", draws.as_str()),
            ],
        );
    }

    // Integrity
    let i = &m.integrity;
    let mut items: Vec<(&str, &str)> = vec![("Result", i.result_id.as_str())];
    for (k, v) in [("Run", &i.run_id), ("Timestamp", &i.timestamp_utc), ("Engine", &i.engine), ("Seed", &i.seed)] {
        if let Some(v) = v {
            items.push((k, v.as_str()));
        }
    }
    items.extend(i.input_digests.iter().map(|d| (d.key.as_str(), d.value.as_str())));
    h.kv_list("Integrity", items);

    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_model;
    use crate::tests::{sample_result, sample_run};

    #[test]
    fn thousands_use_narrow_nbsp() {
        assert_eq!(fmt_int(0), "0");
        assert_eq!(fmt_int(999), "999");
        assert_eq!(fmt_int(1_234_567), "1\u{202F}234\u{202F}567");
    }

    #[test]
    fn content_is_escaped() {
        let m = build_model(&sample_result(), Some(&sample_run())).unwrap();
        let html = render_html(&m);
        assert!(html.contains("&lt;b&gt;Y&lt;/b&gt;"));
        assert!(!html.contains("<b>Y</b>"));
        assert!(html.contains("RUN:2026-05-01T09:30:00Z-ff"));
        assert!(html.ends_with("</body></html>"));
    }
}
