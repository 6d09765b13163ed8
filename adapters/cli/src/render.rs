use oubliette_core::{CellCoord, Grid, PursuerKind};

/// Character drawn for an open cell. Plain renders parse back with `Grid::parse`.
const OPEN: char = '.';
const WALL: char = '#';
const TARGET: char = 'T';
const TRAIL: char = '*';

/// Overlays drawn on top of the maze.
#[derive(Clone, Debug, Default)]
pub(crate) struct Overlay<'a> {
    pub(crate) target: Option<CellCoord>,
    pub(crate) pursuers: Vec<(PursuerKind, CellCoord)>,
    pub(crate) trail: &'a [CellCoord],
}

/// Glyph used for a pursuer of the given kind.
pub(crate) const fn pursuer_glyph(kind: PursuerKind) -> char {
    match kind {
        PursuerKind::AStar => 'A',
        PursuerKind::Dijkstra => 'D',
        PursuerKind::Greedy => 'G',
    }
}

/// Legend lines naming each pursuer glyph and its profile colour.
pub(crate) fn legend(kinds: &[PursuerKind]) -> String {
    kinds
        .iter()
        .map(|kind| {
            let color = kind.profile().color;
            format!(
                "{} {kind:?} #{:02x}{:02x}{:02x}\n",
                pursuer_glyph(*kind),
                color.red(),
                color.green(),
                color.blue()
            )
        })
        .collect()
}

/// Renders the grid as text, one line per row.
pub(crate) fn render(grid: &Grid, overlay: &Overlay<'_>) -> String {
    let columns = usize::try_from(grid.columns()).unwrap_or(0);
    let mut canvas: Vec<char> = grid
        .cells()
        .iter()
        .map(|kind| match kind {
            oubliette_core::CellKind::Wall => WALL,
            oubliette_core::CellKind::Path => OPEN,
        })
        .collect();

    let mut paint = |cell: CellCoord, glyph: char| {
        if let Some(slot) = grid.index(cell).and_then(|index| canvas.get_mut(index)) {
            *slot = glyph;
        }
    };

    for cell in overlay.trail {
        paint(*cell, TRAIL);
    }
    if let Some(target) = overlay.target {
        paint(target, TARGET);
    }
    for (kind, cell) in &overlay.pursuers {
        paint(*cell, pursuer_glyph(*kind));
    }

    let mut output = String::with_capacity(canvas.len() + grid.rows() as usize);
    for row in canvas.chunks(columns.max(1)) {
        output.extend(row.iter());
        output.push('\n');
    }
    output
}
