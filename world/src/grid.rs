use boxoban_core::{CellCoord, Direction, EntityId, TerrainId};

/// Dense row-major storage of terrain ids and occupants.
#[derive(Clone, Debug)]
pub(crate) struct LevelGrid {
    columns: u32,
    rows: u32,
    terrain: Vec<TerrainId>,
    occupants: Vec<Option<EntityId>>,
}

impl LevelGrid {
    /// Caller guarantees `terrain.len() == columns * rows`.
    pub(crate) fn new(columns: u32, rows: u32, terrain: Vec<TerrainId>) -> Self {
        let occupants = vec![None; terrain.len()];
        Self {
            columns,
            rows,
            terrain,
            occupants,
        }
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    pub(crate) fn terrain(&self, cell: CellCoord) -> Option<TerrainId> {
        self.index(cell)
            .and_then(|index| self.terrain.get(index).copied())
    }

    pub(crate) fn is_walkable(&self, cell: CellCoord) -> bool {
        self.terrain(cell).is_some_and(TerrainId::is_walkable)
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<EntityId> {
        self.index(cell)
            .and_then(|index| self.occupants.get(index).copied().flatten())
    }

    /// Cell adjacent to `cell` in `direction`, `None` past any edge.
    pub(crate) fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        cell.step(direction).filter(|next| self.contains(*next))
    }

    pub(crate) fn occupy(&mut self, cell: CellCoord, entity: EntityId) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.occupants.get_mut(index) {
                *slot = Some(entity);
            }
        }
    }

    pub(crate) fn vacate(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.occupants.get_mut(index) {
                *slot = None;
            }
        }
    }

    /// Row-major iterator over every cell coordinate.
    pub(crate) fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.rows)
            .flat_map(move |row| (0..self.columns).map(move |column| CellCoord::new(column, row)))
    }

    // Each axis is checked on its own so that an overflowing column never
    // wraps into the next row.
    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
