//! Collapsed borders.
//!
//! [§ 17.6.2 The collapsing border model](https://www.w3.org/TR/CSS2/tables.html#collapsing-borders)
//!
//! "In the collapsing border model, it is possible to specify borders that
//! surround all or part of a cell, row, row group, column, and column group."
//! Every segment of every grid line gets one border, picked from all the
//! boxes meeting there; each cell then owns half of each border around it.

use std::cmp::Ordering;

use quire_style::keywords::BorderStyle;
use quire_style::values::{BorderSide, Color, Sides};

use super::structure::{Cell, Structure};
use crate::geometry::EdgeSizes;

/// Who asked for a border. Later variants take precedence when width and
/// style tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Origin {
    Table,
    ColumnGroup,
    Column,
    RowGroup,
    Row,
    Cell,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    side: BorderSide,
    origin: Origin,
}

const NO_BORDER: BorderSide = BorderSide {
    width: 0.0,
    style: BorderStyle::None,
    color: Color::BLACK,
};

/// [§ 17.6.2.1 Border conflict resolution](https://www.w3.org/TR/CSS2/tables.html#border-conflict-resolution)
fn beats(a: &Candidate, b: &Candidate) -> bool {
    // "If none of the styles are 'hidden' and at least one of them is not
    // 'none', then narrow borders are discarded in favor of wider ones."
    match a.side.width.total_cmp(&b.side.width) {
        Ordering::Greater => true,
        Ordering::Less => false,
        // "If border styles differ only in color, then a style set on a cell
        // wins over one on a row, which wins over a row group, column,
        // column group and, lastly, table."
        Ordering::Equal => (a.side.style.collapse_rank(), a.origin) > (b.side.style.collapse_rank(), b.origin),
    }
}

/// Pick the border of one segment. Earlier candidates win complete ties,
/// which puts the left and top cells first.
fn resolve(candidates: &[Candidate]) -> BorderSide {
    // "Borders with the 'border-style' of 'hidden' take precedence over all
    // other conflicting borders."
    if candidates.iter().any(|c| c.side.style == BorderStyle::Hidden) {
        return BorderSide {
            style: BorderStyle::Hidden,
            ..NO_BORDER
        };
    }
    // "Borders with a style of 'none' have the lowest priority."
    let mut winner: Option<&Candidate> = None;
    for candidate in candidates.iter().filter(|c| c.side.style != BorderStyle::None) {
        if winner.is_none_or(|w| beats(candidate, w)) {
            winner = Some(candidate);
        }
    }
    winner.map_or(NO_BORDER, |w| w.side)
}

/// The resolved border of every grid line segment.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapsedBorders {
    /// Horizontal lines, top to bottom: one per row edge, each with one
    /// segment per column.
    horizontal: Vec<Vec<BorderSide>>,
    /// Vertical lines by row: one segment per column edge.
    vertical: Vec<Vec<BorderSide>>,
    table: Sides<BorderSide>,
}

impl CollapsedBorders {
    /// Resolve every segment of the table grid.
    #[must_use]
    pub fn resolve(s: &Structure<'_>) -> Self {
        let rows = s.rows.len();
        let columns = s.column_count;
        let table = s.table.style.border;
        let cell_side = |cell: usize, pick: fn(&Sides<BorderSide>) -> BorderSide| Candidate {
            side: pick(&s.cells[cell].source.style.border),
            origin: Origin::Cell,
        };
        let group_of = |row: usize| &s.groups[s.row_groups[row]];

        let mut horizontal = Vec::with_capacity(rows + 1);
        for line in 0..=rows {
            let mut segments = Vec::with_capacity(columns);
            for column in 0..columns {
                let above = line.checked_sub(1).and_then(|r| s.slot(r, column));
                let below = if line < rows { s.slot(line, column) } else { None };
                if above.is_some() && above == below {
                    segments.push(NO_BORDER);
                    continue;
                }
                let mut candidates = Vec::new();
                if let Some(cell) = above {
                    candidates.push(cell_side(cell, |b| b.bottom));
                }
                if let Some(cell) = below {
                    candidates.push(cell_side(cell, |b| b.top));
                }
                if line > 0 {
                    candidates.push(Candidate {
                        side: s.rows[line - 1].style.border.bottom,
                        origin: Origin::Row,
                    });
                    let group = group_of(line - 1);
                    if group.rows.end == line {
                        candidates.push(Candidate {
                            side: group.source.style.border.bottom,
                            origin: Origin::RowGroup,
                        });
                    }
                }
                if line < rows {
                    candidates.push(Candidate {
                        side: s.rows[line].style.border.top,
                        origin: Origin::Row,
                    });
                    let group = group_of(line);
                    if group.rows.start == line {
                        candidates.push(Candidate {
                            side: group.source.style.border.top,
                            origin: Origin::RowGroup,
                        });
                    }
                }
                if line == 0 || line == rows {
                    let pick = |b: &Sides<BorderSide>| if line == 0 { b.top } else { b.bottom };
                    if let Some(source) = s.columns.get(column) {
                        if let Some(col) = source.column {
                            candidates.push(Candidate {
                                side: pick(&col.style.border),
                                origin: Origin::Column,
                            });
                        }
                        if let Some(group) = source.group {
                            candidates.push(Candidate {
                                side: pick(&group.style.border),
                                origin: Origin::ColumnGroup,
                            });
                        }
                    }
                    candidates.push(Candidate {
                        side: pick(&table),
                        origin: Origin::Table,
                    });
                }
                segments.push(resolve(&candidates));
            }
            horizontal.push(segments);
        }

        let mut vertical = Vec::with_capacity(rows);
        for row in 0..rows {
            let mut segments = Vec::with_capacity(columns + 1);
            for line in 0..=columns {
                let left = line.checked_sub(1).and_then(|c| s.slot(row, c));
                let right = if line < columns { s.slot(row, line) } else { None };
                if left.is_some() && left == right {
                    segments.push(NO_BORDER);
                    continue;
                }
                let mut candidates = Vec::new();
                if let Some(cell) = left {
                    candidates.push(cell_side(cell, |b| b.right));
                }
                if let Some(cell) = right {
                    candidates.push(cell_side(cell, |b| b.left));
                }
                if line == 0 || line == columns {
                    let pick = |b: &Sides<BorderSide>| if line == 0 { b.left } else { b.right };
                    candidates.push(Candidate {
                        side: pick(&s.rows[row].style.border),
                        origin: Origin::Row,
                    });
                    candidates.push(Candidate {
                        side: pick(&group_of(row).source.style.border),
                        origin: Origin::RowGroup,
                    });
                }
                if line > 0
                    && let Some(source) = s.columns.get(line - 1)
                {
                    if let Some(col) = source.column {
                        candidates.push(Candidate {
                            side: col.style.border.right,
                            origin: Origin::Column,
                        });
                    }
                    if let Some(group) = source.group.filter(|_| source.group_end) {
                        candidates.push(Candidate {
                            side: group.style.border.right,
                            origin: Origin::ColumnGroup,
                        });
                    }
                }
                if line < columns
                    && let Some(source) = s.columns.get(line)
                {
                    if let Some(col) = source.column {
                        candidates.push(Candidate {
                            side: col.style.border.left,
                            origin: Origin::Column,
                        });
                    }
                    if let Some(group) = source.group.filter(|_| source.group_start) {
                        candidates.push(Candidate {
                            side: group.style.border.left,
                            origin: Origin::ColumnGroup,
                        });
                    }
                }
                if line == 0 || line == columns {
                    candidates.push(Candidate {
                        side: if line == 0 { table.left } else { table.right },
                        origin: Origin::Table,
                    });
                }
                segments.push(resolve(&candidates));
            }
            vertical.push(segments);
        }

        Self {
            horizontal,
            vertical,
            table,
        }
    }

    /// The half of each surrounding border a cell owns. Where segments along
    /// one side differ, the widest decides.
    #[must_use]
    pub fn cell(&self, cell: &Cell<'_>) -> Sides<BorderSide> {
        let columns = cell.columns();
        let rows = cell.rows();
        let top = widest(self.horizontal[cell.row][columns.clone()].iter());
        let bottom = widest(self.horizontal[rows.end][columns].iter());
        let left = widest(self.vertical[rows.clone()].iter().map(|line| &line[cell.column]));
        let right = widest(self.vertical[rows].iter().map(|line| &line[cell.column + cell.colspan]));
        Sides {
            top: half(top),
            right: half(right),
            bottom: half(bottom),
            left: half(left),
        }
    }

    /// [§ 17.6.2](https://www.w3.org/TR/CSS2/tables.html#collapsing-borders)
    ///
    /// The table's own border: half of the outer grid lines. "Any borders
    /// that spill into the margin are taken into account when determining
    /// if the table overflows some ancestor."
    #[must_use]
    pub fn table_edges(&self) -> EdgeSizes {
        let Some(last) = self.horizontal.last().filter(|_| !self.vertical.is_empty()) else {
            return EdgeSizes {
                top: self.table.top.used_width() / 2.0,
                right: self.table.right.used_width() / 2.0,
                bottom: self.table.bottom.used_width() / 2.0,
                left: self.table.left.used_width() / 2.0,
            };
        };
        let edge = |side: Option<BorderSide>| side.map_or(0.0, |s| s.used_width() / 2.0);
        EdgeSizes {
            top: edge(widest(self.horizontal[0].iter())),
            right: edge(widest(self.vertical.iter().filter_map(|line| line.last()))),
            bottom: edge(widest(last.iter())),
            left: edge(widest(self.vertical.iter().filter_map(|line| line.first()))),
        }
    }
}

fn widest<'b>(sides: impl Iterator<Item = &'b BorderSide>) -> Option<BorderSide> {
    sides
        .copied()
        .max_by(|a, b| a.used_width().total_cmp(&b.used_width()))
}

fn half(side: Option<BorderSide>) -> BorderSide {
    side.map_or(NO_BORDER, |s| BorderSide {
        width: s.used_width() / 2.0,
        ..s
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use quire_style::ComputedStyle;

    use crate::boxes::{BoxId, BoxKind, LayoutBox};

    fn solid(width: f32) -> BorderSide {
        BorderSide {
            width,
            style: BorderStyle::Solid,
            ..NO_BORDER
        }
    }

    fn boxed(kind: BoxKind, border: Option<BorderSide>, children: Vec<LayoutBox>) -> LayoutBox {
        let mut style = ComputedStyle::initial();
        if let Some(side) = border {
            style.border = Sides::all(side);
        }
        let mut b = LayoutBox::new(BoxId(0), kind, Arc::new(style));
        b.children = children;
        b
    }

    fn table(table_border: Option<BorderSide>, cells: Vec<Option<BorderSide>>) -> LayoutBox {
        let cells = cells
            .into_iter()
            .map(|border| boxed(BoxKind::TableCell, border, Vec::new()))
            .collect();
        let row = boxed(BoxKind::TableRow, None, cells);
        let group = boxed(BoxKind::TableRowGroup, None, vec![row]);
        boxed(BoxKind::Table, table_border, vec![group])
    }

    #[test]
    fn test_wider_border_wins() {
        let t = table(Some(solid(2.0)), vec![Some(solid(6.0)), Some(solid(4.0))]);
        let s = Structure::new(&t);
        let borders = CollapsedBorders::resolve(&s);
        let first = borders.cell(&s.cells[0]);
        let second = borders.cell(&s.cells[1]);
        assert_eq!(first.right.width, 3.0);
        assert_eq!(second.left.width, 3.0);
        assert_eq!(second.right.width, 2.0);
        assert_eq!(borders.table_edges().left, 3.0);
        assert_eq!(borders.table_edges().right, 2.0);
    }

    #[test]
    fn test_hidden_suppresses_everything() {
        let hidden = BorderSide {
            width: 1.0,
            style: BorderStyle::Hidden,
            ..NO_BORDER
        };
        let t = table(None, vec![Some(hidden), Some(solid(8.0))]);
        let s = Structure::new(&t);
        let borders = CollapsedBorders::resolve(&s);
        assert_eq!(borders.cell(&s.cells[1]).left.used_width(), 0.0);
        assert_eq!(borders.cell(&s.cells[1]).right.width, 4.0);
    }

    #[test]
    fn test_style_breaks_width_ties() {
        let dotted = BorderSide {
            width: 2.0,
            style: BorderStyle::Dotted,
            ..NO_BORDER
        };
        let double = BorderSide {
            width: 2.0,
            style: BorderStyle::Double,
            ..NO_BORDER
        };
        let t = table(None, vec![Some(dotted), Some(double)]);
        let s = Structure::new(&t);
        let borders = CollapsedBorders::resolve(&s);
        assert_eq!(borders.cell(&s.cells[0]).right.style, BorderStyle::Double);
    }
}
