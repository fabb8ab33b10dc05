//! Self-contained HTML rendering of a laid-out timeline
//!
//! Each snapshot becomes a `div.state`, each row a `div.line` of floated
//! `div.block` cells whose width is proportional to the number of grid
//! columns they cover. Because every snapshot uses the same grid, an
//! address sits in the same horizontal position in every snapshot.

use crate::layout::{Cell, Row, TimelineLayout};
use crate::memory::Chunk;
use crate::snapshot::{Snapshot, Timeline};
use std::io::{self, Write};

/// Width of one grid column, in `em`
const UNIT_WIDTH: usize = 10;

const ERROR_STRIPES: &str = "background-image: repeating-linear-gradient(120deg, transparent, \
    transparent 1.40em, #A85860 1.40em, #A85860 2.80em);";

const STYLE: &str = r#"
p {
margin: 0.8em 0 0 0.1em;
}
.block {
float: left;
padding: 0.5em 0;
text-align: center;
color: black;
}
.normal {
-webkit-box-shadow: 2px 2px 4px 0px rgba(0,0,0,0.80);
-moz-box-shadow: 2px 2px 4px 0px rgba(0,0,0,0.80);
box-shadow: 2px 2px 4px 0px rgba(0,0,0,0.80);
}
.empty + .empty {
border-left: 1px solid gray;
margin-left: -1px;
}
.empty {
color: gray;
}
.line:after {
content:"";
display:table;
clear:both;
}
.state {
margin: 0.5em;
background-color: white;
border-radius: 0.3em;
-webkit-box-shadow: inset 2px 2px 4px 0px rgba(0,0,0,0.80);
-moz-box-shadow: inset 2px 2px 4px 0px rgba(0,0,0,0.80);
box-shadow: inset 2px 2px 4px 0px rgba(0,0,0,0.80);
padding: 0.5em;
}
.error {
color: white;
background-color: #8b1820;
}
.error .empty {
color: white;
}
"#;

/// Write the whole document.
///
/// `layout` must have been computed from `timeline`. With `seed` set, the
/// color seed is printed as a heading so a run can be reproduced.
pub fn render<W: Write>(
    out: &mut W,
    timeline: &Timeline,
    layout: &TimelineLayout,
    seed: Option<u64>,
) -> io::Result<()> {
    let grid = layout.boundaries.as_slice();

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html>\n<head>\n<meta charset=\"utf-8\">")?;
    writeln!(out, "<title>heap timeline</title>")?;
    writeln!(out, "<style>")?;
    writeln!(
        out,
        "body {{\nbackground-color: #EBEBEB;\nfont-family: \"Lucida Console\", Monaco, monospace;\nwidth: {}em;\n}}",
        layout.boundaries.columns() * (UNIT_WIDTH + 1)
    )?;
    out.write_all(STYLE.as_bytes())?;
    writeln!(out, "</style>\n</head>\n<body>")?;

    if let Some(seed) = seed {
        writeln!(out, "<h2>seed: {}</h2>", seed)?;
    }

    writeln!(out, "<div class=\"timeline\">")?;
    for (i, (snapshot, rows)) in timeline.iter().zip(&layout.snapshots).enumerate() {
        // the starting heap is blank unless something was seeded into it
        if i == 0 && is_blank(snapshot) {
            continue;
        }
        render_snapshot(out, grid, snapshot, rows)?;
    }
    writeln!(out, "</div>\n</body>\n</html>")?;
    Ok(())
}

fn is_blank(snapshot: &Snapshot) -> bool {
    snapshot.is_empty() && snapshot.info().is_empty() && !snapshot.has_errors()
}

fn render_snapshot<W: Write>(
    out: &mut W,
    grid: &[u64],
    snapshot: &Snapshot,
    rows: &[Row],
) -> io::Result<()> {
    let class = if snapshot.has_errors() {
        "state error"
    } else {
        "state"
    };
    writeln!(out, "<div class=\"{}\">", class)?;

    for row in rows {
        writeln!(out, "<div class=\"line\">")?;
        for cell in &row.cells {
            render_cell(out, grid, snapshot, cell)?;
        }
        writeln!(out, "</div>")?;
    }

    for msg in snapshot.info().iter().chain(snapshot.errors()) {
        writeln!(out, "<p>{}</p>", escape(msg))?;
    }

    writeln!(out, "</div>")
}

fn render_cell<W: Write>(
    out: &mut W,
    grid: &[u64],
    snapshot: &Snapshot,
    cell: &Cell,
) -> io::Result<()> {
    let span = cell.span();
    let width = UNIT_WIDTH * span.width();

    match cell {
        Cell::Chunk { index, .. } => {
            let chunk = &snapshot.chunks()[*index];
            let mut style = format!("background-color: {};", chunk.color.css());
            if chunk.error {
                style.push_str(ERROR_STRIPES);
            }
            write!(
                out,
                "<div class=\"block normal\" style=\"width: {}em; {}\">",
                width, style
            )?;
            write!(
                out,
                "<strong>{:#x}</strong><br />+ {:#x} {}",
                chunk.start(),
                chunk.size(),
                chunk_detail(chunk)
            )?;
        }
        Cell::Spacer { visible: true, .. } => {
            let (start, end) = (grid[span.from], grid[span.to]);
            write!(
                out,
                "<div class=\"block empty\" style=\"width: {}em;\">",
                width
            )?;
            write!(out, "<strong>{:#x}</strong><br />+ {:#x} ", start, end - start)?;
        }
        Cell::Spacer { visible: false, .. } => {
            write!(
                out,
                "<div class=\"block empty\" style=\"width: {}em;\">&nbsp;",
                width
            )?;
        }
    }
    writeln!(out, "</div>")
}

fn chunk_detail(chunk: &Chunk) -> String {
    if chunk.temporary {
        "(unknown)".to_string()
    } else {
        format!("({:#x})", chunk.user_size)
    }
}

/// Escape text for use inside an HTML element.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout_timeline;
    use crate::memory::Geometry;
    use crate::replay::replay;
    use crate::trace::Trace;

    fn render_to_string(timeline: &Timeline) -> String {
        let layout = layout_timeline(timeline).unwrap();
        let mut out = Vec::new();
        render(&mut out, timeline, &layout, None).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_blank_starting_heap_is_skipped() {
        let trace = Trace::new("malloc(0x10) = 0x602010\n");
        let timeline = replay(trace.events(), Geometry::default(), 1);
        assert_eq!(timeline.len(), 2);

        let html = render_to_string(&timeline);
        assert_eq!(html.matches("<div class=\"state").count(), 1);
        assert!(html.contains("malloc(0x10) = 0x602010"));
    }

    #[test]
    fn test_empty_trace_renders_no_states() {
        let html = render_to_string(&Timeline::new());
        assert!(!html.contains("<div class=\"state"));
        assert!(html.contains("<div class=\"timeline\">"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("free(0x10) = <error>"), "free(0x10) = &lt;error&gt;");
        assert_eq!(escape("a & \"b\""), "a &amp; &quot;b&quot;");
    }
}
