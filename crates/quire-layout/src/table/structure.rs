//! The table grid: which cell covers which slot.
//!
//! [§ 17.5 Visual layout of table contents](https://www.w3.org/TR/CSS2/tables.html#table-layout)
//!
//! "The edges of the rows, columns, row groups and column groups in the
//! collapsing borders model coincide with the hypothetical grid lines on
//! which the borders of the cells are centered."

use std::ops::Range;

use crate::boxes::{BoxKind, LayoutBox};

/// Upper bound on `colspan`, as HTML clamps it.
const MAX_COLSPAN: usize = 1000;

/// Where a row group goes in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRole {
    /// The first `table-header-group`, shown on top of every fragment.
    Header,
    /// Row groups in document order.
    Body,
    /// The first `table-footer-group`, shown at the bottom of every fragment.
    Footer,
}

/// A row group and the table rows it holds.
#[derive(Debug, Clone)]
pub struct Group<'a> {
    /// The row group box.
    pub source: &'a LayoutBox,
    /// Its rows, as table row indices.
    pub rows: Range<usize>,
    /// Position in the table.
    pub role: GroupRole,
}

/// A cell and the slots it covers.
#[derive(Debug, Clone)]
pub struct Cell<'a> {
    /// The cell box.
    pub source: &'a LayoutBox,
    /// Table row the cell starts in.
    pub row: usize,
    /// Column the cell starts in.
    pub column: usize,
    /// Columns covered, at least one.
    pub colspan: usize,
    /// Rows covered, at least one, never past the end of its group.
    pub rowspan: usize,
}

impl Cell<'_> {
    /// Columns covered.
    #[must_use]
    pub const fn columns(&self) -> Range<usize> {
        self.column..self.column + self.colspan
    }

    /// Rows covered.
    #[must_use]
    pub const fn rows(&self) -> Range<usize> {
        self.row..self.row + self.rowspan
    }
}

/// Column and column group boxes of one column.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnSource<'a> {
    /// The `table-column` box.
    pub column: Option<&'a LayoutBox>,
    /// The `table-column-group` box.
    pub group: Option<&'a LayoutBox>,
    /// First column of that group.
    pub group_start: bool,
    /// Last column of that group.
    pub group_end: bool,
}

/// Rows, cells and columns of a table box, in display order.
#[derive(Debug, Clone)]
pub struct Structure<'a> {
    /// The table box.
    pub table: &'a LayoutBox,
    /// Row groups: the header first, then bodies, then the footer.
    pub groups: Vec<Group<'a>>,
    /// Row boxes by table row index.
    pub rows: Vec<&'a LayoutBox>,
    /// Group of each row.
    pub row_groups: Vec<usize>,
    /// Cells, row by row.
    pub cells: Vec<Cell<'a>>,
    /// Column boxes per column; shorter than the grid when cells reach past
    /// the last column box.
    pub columns: Vec<ColumnSource<'a>>,
    /// Columns in the grid.
    pub column_count: usize,
    slots: Vec<Vec<Option<usize>>>,
}

impl<'a> Structure<'a> {
    /// [§ 17.5](https://www.w3.org/TR/CSS2/tables.html#table-layout)
    ///
    /// Lay cells out on the grid: "cells are placed in the first free slot
    /// of their row", skipping slots taken by cells spanning down from
    /// earlier rows.
    #[must_use]
    pub fn new(table: &'a LayoutBox) -> Self {
        // STEP 1: Columns.
        let mut columns = Vec::new();
        for child in &table.children {
            match child.kind {
                BoxKind::TableColumnGroup => {
                    let start = columns.len();
                    let cols: Vec<&LayoutBox> = child
                        .children
                        .iter()
                        .filter(|c| c.kind == BoxKind::TableColumn)
                        .collect();
                    if cols.is_empty() {
                        for _ in 0..child.colspan.clamp(1, MAX_COLSPAN) {
                            columns.push(ColumnSource {
                                group: Some(child),
                                ..ColumnSource::default()
                            });
                        }
                    } else {
                        for col in cols {
                            for _ in 0..col.colspan.clamp(1, MAX_COLSPAN) {
                                columns.push(ColumnSource {
                                    column: Some(col),
                                    group: Some(child),
                                    ..ColumnSource::default()
                                });
                            }
                        }
                    }
                    if let Some(first) = columns.get_mut(start) {
                        first.group_start = true;
                    }
                    if columns.len() > start
                        && let Some(last) = columns.last_mut()
                    {
                        last.group_end = true;
                    }
                }
                BoxKind::TableColumn => {
                    for _ in 0..child.colspan.clamp(1, MAX_COLSPAN) {
                        columns.push(ColumnSource {
                            column: Some(child),
                            ..ColumnSource::default()
                        });
                    }
                }
                _ => {}
            }
        }

        // STEP 2: Row groups in display order.
        //
        // [§ 17.2](https://www.w3.org/TR/CSS2/tables.html#table-display)
        // "table-header-group: Like 'table-row-group', but for visual
        // formatting, the row group is always displayed before all other rows
        // and row groups"; the footer goes after them. Only the first of each
        // is special.
        let row_groups: Vec<&LayoutBox> = table
            .children
            .iter()
            .filter(|c| c.kind == BoxKind::TableRowGroup)
            .collect();
        debug_assert!(
            table.children.iter().all(|c| c.kind != BoxKind::TableRow),
            "rows must be wrapped in row groups"
        );
        let header = row_groups.iter().position(|g| g.is_header_group());
        let footer = row_groups.iter().position(|g| g.is_footer_group());
        let mut ordered: Vec<(&LayoutBox, GroupRole)> = Vec::new();
        if let Some(h) = header {
            ordered.push((row_groups[h], GroupRole::Header));
        }
        for (i, group) in row_groups.iter().enumerate() {
            if Some(i) != header && Some(i) != footer {
                ordered.push((*group, GroupRole::Body));
            }
        }
        if let Some(f) = footer {
            ordered.push((row_groups[f], GroupRole::Footer));
        }

        // STEP 3: Rows and cells.
        let mut structure = Self {
            table,
            groups: Vec::new(),
            rows: Vec::new(),
            row_groups: Vec::new(),
            cells: Vec::new(),
            columns,
            column_count: 0,
            slots: Vec::new(),
        };
        for (source, role) in ordered {
            let first = structure.rows.len();
            let group_rows: Vec<&LayoutBox> = source
                .children
                .iter()
                .filter(|c| c.kind == BoxKind::TableRow)
                .collect();
            let count = group_rows.len();
            let group_index = structure.groups.len();
            for &row in &group_rows {
                structure.rows.push(row);
                structure.row_groups.push(group_index);
                structure.slots.push(Vec::new());
            }
            for (offset, row) in group_rows.iter().enumerate() {
                let index = first + offset;
                let mut column = 0;
                for cell in row.children.iter().filter(|c| c.kind == BoxKind::TableCell) {
                    while structure.slot(index, column).is_some() {
                        column += 1;
                    }
                    // [HTML § 4.9.11](https://html.spec.whatwg.org/multipage/tables.html#attr-tdth-rowspan)
                    // A zero rowspan reaches the end of the row group.
                    let remaining = count - offset;
                    let rowspan = if cell.rowspan == 0 {
                        remaining
                    } else {
                        cell.rowspan.min(remaining)
                    };
                    let colspan = cell.colspan.clamp(1, MAX_COLSPAN);
                    let cell_index = structure.cells.len();
                    structure.cells.push(Cell {
                        source: cell,
                        row: index,
                        column,
                        colspan,
                        rowspan,
                    });
                    for r in index..index + rowspan {
                        for c in column..column + colspan {
                            structure.occupy(r, c, cell_index);
                        }
                    }
                    column += colspan;
                }
            }
            structure.groups.push(Group {
                source,
                rows: first..first + count,
                role,
            });
        }
        structure.column_count = structure
            .slots
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(structure.columns.len());
        structure
    }

    fn occupy(&mut self, row: usize, column: usize, cell: usize) {
        let slots = &mut self.slots[row];
        if slots.len() <= column {
            slots.resize(column + 1, None);
        }
        slots[column] = Some(cell);
    }

    /// The cell covering a slot.
    #[must_use]
    pub fn slot(&self, row: usize, column: usize) -> Option<usize> {
        self.slots.get(row)?.get(column).copied().flatten()
    }

    /// Index of the header group.
    #[must_use]
    pub fn header(&self) -> Option<usize> {
        self.groups.iter().position(|g| g.role == GroupRole::Header)
    }

    /// Index of the footer group.
    #[must_use]
    pub fn footer(&self) -> Option<usize> {
        self.groups.iter().position(|g| g.role == GroupRole::Footer)
    }

    /// Indices of the body groups.
    #[must_use]
    pub fn bodies(&self) -> Vec<usize> {
        (0..self.groups.len())
            .filter(|&g| self.groups[g].role == GroupRole::Body)
            .collect()
    }

    /// A break may fall between `row - 1` and `row`: no cell spans it.
    #[must_use]
    pub fn breakable_before(&self, row: usize) -> bool {
        self.cells
            .iter()
            .all(|c| !(c.row < row && row < c.row + c.rowspan))
    }

    /// Cells starting in `row`.
    pub fn cells_in(&self, row: usize) -> impl Iterator<Item = (usize, &Cell<'a>)> {
        self.cells.iter().enumerate().filter(move |(_, c)| c.row == row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use quire_style::display::InternalDisplay;
    use quire_style::{ComputedStyle, Display};

    use crate::boxes::BoxId;

    fn boxed(kind: BoxKind, display: Option<InternalDisplay>, children: Vec<LayoutBox>) -> LayoutBox {
        let mut style = ComputedStyle::initial();
        if let Some(d) = display {
            style.display = Display::Internal(d);
        }
        let mut b = LayoutBox::new(BoxId(0), kind, Arc::new(style));
        b.children = children;
        b
    }

    fn cell(colspan: usize, rowspan: usize) -> LayoutBox {
        let mut c = boxed(BoxKind::TableCell, Some(InternalDisplay::TableCell), Vec::new());
        c.colspan = colspan;
        c.rowspan = rowspan;
        c
    }

    fn row(cells: Vec<LayoutBox>) -> LayoutBox {
        boxed(BoxKind::TableRow, Some(InternalDisplay::TableRow), cells)
    }

    fn group(display: InternalDisplay, rows: Vec<LayoutBox>) -> LayoutBox {
        boxed(BoxKind::TableRowGroup, Some(display), rows)
    }

    #[test]
    fn test_rowspan_pushes_later_cells_right() {
        let table = boxed(
            BoxKind::Table,
            None,
            vec![group(
                InternalDisplay::TableRowGroup,
                vec![row(vec![cell(1, 2), cell(2, 1)]), row(vec![cell(1, 1)])],
            )],
        );
        let s = Structure::new(&table);
        assert_eq!(s.column_count, 3);
        assert_eq!(s.cells[2].row, 1);
        assert_eq!(s.cells[2].column, 1);
        assert_eq!(s.slot(1, 0), Some(0));
        assert!(!s.breakable_before(1));
    }

    #[test]
    fn test_rowspan_stops_at_group_end() {
        let table = boxed(
            BoxKind::Table,
            None,
            vec![
                group(InternalDisplay::TableRowGroup, vec![row(vec![cell(1, 5)])]),
                group(InternalDisplay::TableRowGroup, vec![row(vec![cell(1, 0)]), row(vec![])]),
            ],
        );
        let s = Structure::new(&table);
        assert_eq!(s.cells[0].rowspan, 1);
        assert_eq!(s.cells[1].rowspan, 2);
        assert!(s.breakable_before(1));
    }

    #[test]
    fn test_header_and_footer_move_to_the_edges() {
        let table = boxed(
            BoxKind::Table,
            None,
            vec![
                group(InternalDisplay::TableFooterGroup, vec![row(vec![cell(1, 1)])]),
                group(InternalDisplay::TableRowGroup, vec![row(vec![cell(1, 1)])]),
                group(InternalDisplay::TableHeaderGroup, vec![row(vec![cell(1, 1)])]),
            ],
        );
        let s = Structure::new(&table);
        let roles: Vec<GroupRole> = s.groups.iter().map(|g| g.role).collect();
        assert_eq!(roles, vec![GroupRole::Header, GroupRole::Body, GroupRole::Footer]);
        assert_eq!(s.header(), Some(0));
        assert_eq!(s.bodies(), vec![1]);
    }

    #[test]
    fn test_column_groups_span_columns() {
        let mut colgroup = boxed(BoxKind::TableColumnGroup, Some(InternalDisplay::TableColumnGroup), Vec::new());
        colgroup.colspan = 2;
        let table = boxed(BoxKind::Table, None, vec![colgroup]);
        let s = Structure::new(&table);
        assert_eq!(s.column_count, 2);
        assert!(s.columns[0].group_start && !s.columns[0].group_end);
        assert!(s.columns[1].group_end);
    }
}
