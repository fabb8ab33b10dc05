//! Heap pane: the current snapshot drawn row by row on the shared grid
//!
//! Every grid column is [`COLUMN_WIDTH`] characters wide, so a cell covering
//! `n` columns is `n * COLUMN_WIDTH` characters. Each layout row takes two
//! text lines: the start address on top, the size below.

use crate::layout::{Cell, Row};
use crate::memory::Chunk;
use crate::snapshot::Snapshot;
use crate::ui::theme::{chunk_color, DEFAULT_THEME};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub const COLUMN_WIDTH: usize = 14;

/// Scroll state for the heap pane
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapScrollState {
    /// First visible text line
    pub line: usize,
    /// First visible character column
    pub column: usize,
}

/// Data needed to render the heap pane
pub struct HeapRenderData<'a> {
    pub grid: &'a [u64],
    pub snapshot: &'a Snapshot,
    pub rows: &'a [Row],
}

/// Render the heap pane
pub fn render_heap_pane(
    frame: &mut Frame,
    area: Rect,
    data: HeapRenderData,
    is_focused: bool,
    scroll: &mut HeapScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let title = if data.snapshot.has_errors() {
        " Heap (errors) "
    } else {
        " Heap "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    if data.rows.is_empty() {
        let paragraph = Paragraph::new("(empty heap)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let lines = build_lines(&data);

    // Clamp both offsets to the content, accounting for borders
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let visible_width = area.width.saturating_sub(2).max(1) as usize;
    let content_width = data.grid.len().saturating_sub(1) * COLUMN_WIDTH;
    scroll.line = scroll.line.min(lines.len().saturating_sub(visible_height));
    scroll.column = scroll
        .column
        .min(content_width.saturating_sub(visible_width));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((clamp_offset(scroll.line), clamp_offset(scroll.column)));
    frame.render_widget(paragraph, area);
}

/// Paragraph offsets are `u16`; wide grids pin at the far edge.
fn clamp_offset(offset: usize) -> u16 {
    u16::try_from(offset).unwrap_or(u16::MAX)
}

/// Grid header followed by two lines per layout row.
pub fn build_lines(data: &HeapRenderData) -> Vec<Line<'static>> {
    let columns = data.grid.len().saturating_sub(1);
    let mut lines = Vec::with_capacity(1 + data.rows.len() * 2);

    let header: Vec<Span> = data.grid[..columns]
        .iter()
        .map(|addr| {
            Span::styled(
                fit(&format!("{:#x}", addr), COLUMN_WIDTH, ' '),
                Style::default().fg(DEFAULT_THEME.comment),
            )
        })
        .collect();
    lines.push(Line::from(header));

    for row in data.rows {
        let mut top = Vec::with_capacity(row.cells.len());
        let mut bottom = Vec::with_capacity(row.cells.len());
        for cell in &row.cells {
            let width = cell.span().width() * COLUMN_WIDTH;
            let (upper, lower, style, fill) = cell_text(data, cell);
            top.push(Span::styled(fit(&upper, width, fill), style));
            bottom.push(Span::styled(fit(&lower, width, fill), style));
        }
        lines.push(Line::from(top));
        lines.push(Line::from(bottom));
    }

    lines
}

fn cell_text(data: &HeapRenderData, cell: &Cell) -> (String, String, Style, char) {
    match cell {
        Cell::Chunk { index, .. } => {
            let chunk = &data.snapshot.chunks()[*index];
            (
                format!("{:#x}", chunk.start()),
                format!("+{:#x} {}", chunk.size(), user_size_label(chunk)),
                chunk_style(chunk),
                ' ',
            )
        }
        Cell::Spacer {
            span,
            visible: true,
        } => {
            let (start, end) = (data.grid[span.from], data.grid[span.to]);
            (
                format!("{:#x}", start),
                format!("+{:#x}", end - start),
                Style::default().fg(DEFAULT_THEME.spacer),
                '·',
            )
        }
        Cell::Spacer { visible: false, .. } => {
            (String::new(), String::new(), Style::default(), ' ')
        }
    }
}

fn chunk_style(chunk: &Chunk) -> Style {
    let style = Style::default()
        .bg(chunk_color(chunk.color))
        .fg(DEFAULT_THEME.chunk_text);
    if chunk.error {
        style
            .fg(DEFAULT_THEME.error)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        style
    }
}

fn user_size_label(chunk: &Chunk) -> String {
    if chunk.temporary {
        "(?)".to_string()
    } else {
        format!("({:#x})", chunk.user_size)
    }
}

/// Pad or cut `text` to exactly `width` characters, with one leading space.
fn fit(text: &str, width: usize, fill: char) -> String {
    if width == 0 {
        return String::new();
    }
    let mut out: String = std::iter::once(' ')
        .chain(text.chars())
        .take(width)
        .collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat(fill).take(width - len));
    out
}
