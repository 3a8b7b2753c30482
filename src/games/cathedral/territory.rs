//! Territory detection: regions, enclosure test, claims and captures.
//!
//! For an owner, the board splits into maximal 8-connected regions of cells
//! the owner does not occupy. A region is enclosed when the grid-line edges
//! it shares with owner cells or the board edge form closed loops: every
//! vertex of that edge graph has degree exactly 2. Diagonal pinch points
//! give degree 4, so a wall that only touches at corners never closes.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use super::board::Board;
use super::types::{Cell, Owner, PerSeat, PlacedPiece, Seat};

/// For each orthogonal side of a cell: neighbor offset, then the two
/// endpoints of the shared edge relative to the cell's lower-left corner.
/// Order: east, west, north, south.
const SIDES: [((i32, i32), (i32, i32), (i32, i32)); 4] = [
    ((1, 0), (1, 0), (1, 1)),
    ((-1, 0), (0, 0), (0, 1)),
    ((0, 1), (0, 1), (1, 1)),
    ((0, -1), (0, 0), (1, 0)),
];

/// A connected area of cells not occupied by the analyzed owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub cells: BTreeSet<Cell>,
    /// Distinct instance ids of the other player's pieces inside the region.
    pub opponent_pieces: BTreeSet<u32>,
    pub contains_neutral: bool,
    pub has_owner_border: bool,
    pub touches_board_edge: bool,
    pub is_boundary_closed: bool,
}

impl Region {
    /// Whether the region can be considered for a claim at all.
    pub fn is_enclosed(&self) -> bool {
        self.has_owner_border && self.is_boundary_closed
    }
}

/// Partition the board into regions relative to `owner`, in row-major order
/// of each region's first cell.
pub fn find_regions(board: &Board, owner: Seat) -> Vec<Region> {
    let size = board.size();
    let owner = Owner::Seat(owner);
    let mut visited = vec![false; size.cell_count()];
    let mut regions = Vec::new();

    for start in size.cells() {
        let Some(idx) = size.index_of(start) else { continue };
        if visited[idx] || board.owner_at(start) == Some(owner) {
            continue;
        }

        visited[idx] = true;
        let mut cells = BTreeSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            cells.insert(cell);
            for next in cell.surrounding() {
                let Some(ni) = size.index_of(next) else { continue };
                if !visited[ni] && board.owner_at(next) != Some(owner) {
                    visited[ni] = true;
                    queue.push_back(next);
                }
            }
        }

        regions.push(classify_region(board, owner, cells));
    }

    regions
}

fn classify_region(board: &Board, owner: Owner, cells: BTreeSet<Cell>) -> Region {
    let mut opponent_pieces = BTreeSet::new();
    let mut contains_neutral = false;
    let mut has_owner_border = false;
    let mut touches_board_edge = false;
    let mut vertex_degree: HashMap<(i32, i32), u32> = HashMap::new();

    for &cell in &cells {
        match board.occupant_at(cell) {
            Some(occ) if occ.owner == Owner::Neutral => contains_neutral = true,
            Some(occ) if occ.owner != owner => {
                opponent_pieces.insert(occ.instance_id);
            }
            _ => {}
        }

        for ((dx, dy), (ax, ay), (bx, by)) in SIDES {
            let neighbor = Cell::new(cell.x + dx, cell.y + dy);
            let off_board = !board.is_in_bounds(neighbor);
            let owner_cell = !off_board && board.owner_at(neighbor) == Some(owner);
            if !off_board && !owner_cell {
                continue;
            }
            if off_board {
                touches_board_edge = true;
            } else {
                has_owner_border = true;
            }
            *vertex_degree.entry((cell.x + ax, cell.y + ay)).or_insert(0) += 1;
            *vertex_degree.entry((cell.x + bx, cell.y + by)).or_insert(0) += 1;
        }
    }

    let is_boundary_closed = has_owner_border && vertex_degree.values().all(|&d| d == 2);

    Region {
        cells,
        opponent_pieces,
        contains_neutral,
        has_owner_border,
        touches_board_edge,
        is_boundary_closed,
    }
}

/// Result of one claim pass for a single owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimPass {
    pub claimed: BTreeSet<Cell>,
    /// Opponent pieces taken off the board; the caller returns them to inventory.
    pub captured: Vec<PlacedPiece>,
    pub removed_neutrals: Vec<PlacedPiece>,
    pub board_changed: bool,
}

/// Run one claim pass for `owner`, mutating the board and piece table.
pub fn resolve_claims(
    board: &mut Board,
    pieces: &mut BTreeMap<u32, PlacedPiece>,
    owner: Seat,
) -> ClaimPass {
    let mut pass = ClaimPass::default();

    for region in find_regions(board, owner) {
        if !region.is_enclosed() {
            continue;
        }

        if region.contains_neutral {
            if !region.opponent_pieces.is_empty() || region.touches_board_edge {
                continue;
            }
            let neutral_ids: BTreeSet<u32> = region
                .cells
                .iter()
                .filter_map(|&c| board.occupant_at(c))
                .filter(|o| o.owner == Owner::Neutral)
                .map(|o| o.instance_id)
                .collect();
            for id in neutral_ids {
                if let Some(piece) = remove_piece(board, pieces, id) {
                    tracing::debug!(
                        %owner,
                        instance_id = id,
                        "neutral piece removed from enclosure"
                    );
                    pass.removed_neutrals.push(piece);
                }
            }
            pass.board_changed = true;
            continue;
        }

        // Two or more intruding pieces make the enclosure invalid.
        if region.opponent_pieces.len() > 1 {
            continue;
        }
        if let Some(&id) = region.opponent_pieces.iter().next() {
            if let Some(piece) = remove_piece(board, pieces, id) {
                tracing::debug!(
                    %owner,
                    instance_id = id,
                    piece_type = %piece.piece_type,
                    "captured enclosed piece"
                );
                pass.captured.push(piece);
            }
        }
        pass.claimed.extend(region.cells);
    }

    pass
}

fn remove_piece(
    board: &mut Board,
    pieces: &mut BTreeMap<u32, PlacedPiece>,
    instance_id: u32,
) -> Option<PlacedPiece> {
    let piece = pieces.remove(&instance_id)?;
    for &cell in &piece.cells {
        board.clear_occupant(cell);
    }
    Some(piece)
}

/// Everything a territory recomputation took off the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub captured: Vec<PlacedPiece>,
    pub removed_neutrals: Vec<PlacedPiece>,
    pub passes: usize,
}

/// Recompute both players' territory after a move by `last_mover`.
///
/// Claims are sticky: fresh claims are added to the previous sets. Cells
/// claimed by both players go to the last mover, or to nobody when the
/// last mover is neutral. Removing a neutral piece can open or close other
/// regions, so the whole procedure repeats while the board keeps changing;
/// every repeat removes at least one neutral piece, which bounds the loop.
pub fn recompute_territory(
    board: &mut Board,
    pieces: &mut BTreeMap<u32, PlacedPiece>,
    claimed: &mut PerSeat<BTreeSet<Cell>>,
    last_mover: Owner,
) -> Resolution {
    let mut resolution = Resolution::default();
    let mut remaining_repeats = pieces.values().filter(|p| p.is_neutral()).count();

    loop {
        resolution.passes += 1;
        let previous = claimed.clone();
        let mut board_changed = false;
        let mut next = previous;

        for seat in Seat::BOTH {
            let pass = resolve_claims(board, pieces, seat);
            board_changed |= pass.board_changed;
            next[seat].extend(pass.claimed);
            resolution.captured.extend(pass.captured);
            resolution.removed_neutrals.extend(pass.removed_neutrals);
        }

        let contested: Vec<Cell> = next[Seat::First]
            .intersection(&next[Seat::Second])
            .copied()
            .collect();
        if !contested.is_empty() {
            tracing::debug!(cells = contested.len(), %last_mover, "resolving contested territory");
            let losers: &[Seat] = match last_mover {
                Owner::Seat(Seat::First) => &[Seat::Second],
                Owner::Seat(Seat::Second) => &[Seat::First],
                Owner::Neutral => &Seat::BOTH,
            };
            for &seat in losers {
                for cell in &contested {
                    next[seat].remove(cell);
                }
            }
        }

        *claimed = next;

        if !board_changed || remaining_repeats == 0 {
            break;
        }
        remaining_repeats -= 1;
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cathedral::types::{BoardSize, Occupant};

    fn place(
        board: &mut Board,
        pieces: &mut BTreeMap<u32, PlacedPiece>,
        owner: Owner,
        id: u32,
        cells: &[(i32, i32)],
    ) {
        let piece = PlacedPiece {
            instance_id: id,
            owner,
            piece_type: "tavern".into(),
            cells: cells.iter().map(|&(x, y)| Cell::new(x, y)).collect(),
        };
        for &cell in &piece.cells {
            board.set_occupant(cell, piece.occupant());
        }
        pieces.insert(id, piece);
    }

    /// The 8 cells around (cx, cy), skipping any listed in `gaps`.
    fn ring(cx: i32, cy: i32, gaps: &[(i32, i32)]) -> Vec<(i32, i32)> {
        let mut cells = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                let c = (cx + dx, cy + dy);
                if (dx, dy) != (0, 0) && !gaps.contains(&c) {
                    cells.push(c);
                }
            }
        }
        cells
    }

    /// 10x10 board with a neutral tavern in the corner, so the open area
    /// around any test enclosure always holds the neutral piece.
    fn setup() -> (Board, BTreeMap<u32, PlacedPiece>) {
        let mut board = Board::new(BoardSize::new(10, 10));
        let mut pieces = BTreeMap::new();
        place(&mut board, &mut pieces, Owner::Neutral, 100, &[(0, 0)]);
        (board, pieces)
    }

    fn p0() -> Owner {
        Owner::Seat(Seat::First)
    }

    fn p1() -> Owner {
        Owner::Seat(Seat::Second)
    }

    #[test]
    fn test_empty_board_is_one_open_region() {
        let board = Board::new(BoardSize::new(5, 5));
        let regions = find_regions(&board, Seat::First);
        assert_eq!(regions.len(), 1);
        let r = &regions[0];
        assert_eq!(r.cells.len(), 25);
        assert!(r.touches_board_edge);
        assert!(!r.has_owner_border);
        assert!(!r.is_boundary_closed);
        assert!(!r.is_enclosed());
    }

    #[test]
    fn test_ring_encloses_single_cell() {
        let (mut board, mut pieces) = setup();
        place(&mut board, &mut pieces, p0(), 1, &ring(5, 5, &[]));
        let regions = find_regions(&board, Seat::First);
        let inner = regions
            .iter()
            .find(|r| r.cells.contains(&Cell::new(5, 5)))
            .unwrap();
        assert_eq!(inner.cells.len(), 1);
        assert!(inner.has_owner_border);
        assert!(!inner.touches_board_edge);
        assert!(inner.is_boundary_closed);
        assert!(inner.opponent_pieces.is_empty());
    }

    #[test]
    fn test_corner_gap_leaves_boundary_open() {
        let (mut board, mut pieces) = setup();
        place(&mut board, &mut pieces, p0(), 1, &ring(5, 5, &[(6, 6)]));
        let regions = find_regions(&board, Seat::First);
        // The centre leaks out diagonally through the missing corner.
        assert_eq!(regions.len(), 1);
        let r = &regions[0];
        assert!(r.cells.contains(&Cell::new(5, 5)));
        assert!(r.has_owner_border);
        assert!(!r.is_boundary_closed);
    }

    #[test]
    fn test_diagonal_pinch_is_not_closed() {
        let mut board = Board::new(BoardSize::new(4, 4));
        for (id, cell) in [(1, Cell::new(1, 1)), (2, Cell::new(2, 2))] {
            let occupant = Occupant {
                owner: p0(),
                instance_id: id,
                piece_type: "tavern".into(),
            };
            board.set_occupant(cell, occupant);
        }
        let regions = find_regions(&board, Seat::First);
        assert_eq!(regions.len(), 1);
        assert!(!regions[0].is_boundary_closed);
    }

    #[test]
    fn test_region_against_board_edge_is_closed() {
        let (mut board, mut pieces) = setup();
        // Wall cutting off the top-right corner cell (9, 9).
        place(&mut board, &mut pieces, p0(), 1, &[(8, 9), (8, 8), (9, 8)]);
        let regions = find_regions(&board, Seat::First);
        let corner = regions
            .iter()
            .find(|r| r.cells.contains(&Cell::new(9, 9)))
            .unwrap();
        assert_eq!(corner.cells.len(), 1);
        assert!(corner.touches_board_edge);
        assert!(corner.is_enclosed());
    }

    #[test]
    fn test_claim_empty_enclosure() {
        let (mut board, mut pieces) = setup();
        place(&mut board, &mut pieces, p0(), 1, &ring(5, 5, &[]));
        let pass = resolve_claims(&mut board, &mut pieces, Seat::First);
        assert_eq!(pass.claimed, BTreeSet::from([Cell::new(5, 5)]));
        assert!(pass.captured.is_empty());
        assert!(!pass.board_changed);
    }

    #[test]
    fn test_capture_single_opponent_piece() {
        let (mut board, mut pieces) = setup();
        place(&mut board, &mut pieces, p0(), 1, &ring(5, 5, &[]));
        place(&mut board, &mut pieces, p1(), 2, &[(5, 5)]);
        let pass = resolve_claims(&mut board, &mut pieces, Seat::First);
        assert_eq!(pass.captured.len(), 1);
        assert_eq!(pass.captured[0].instance_id, 2);
        assert!(!pieces.contains_key(&2));
        assert!(!board.is_occupied(Cell::new(5, 5)));
        assert!(pass.claimed.contains(&Cell::new(5, 5)));
    }

    #[test]
    fn test_two_intruders_block_claim() {
        let (mut board, mut pieces) = setup();
        // 2x1 hole at (4,5)-(5,5) inside a wall.
        let mut wall = Vec::new();
        for x in 3..=6 {
            wall.push((x, 4));
            wall.push((x, 6));
        }
        wall.push((3, 5));
        wall.push((6, 5));
        place(&mut board, &mut pieces, p0(), 1, &wall);
        place(&mut board, &mut pieces, p1(), 2, &[(4, 5)]);
        place(&mut board, &mut pieces, p1(), 3, &[(5, 5)]);
        let pass = resolve_claims(&mut board, &mut pieces, Seat::First);
        assert!(pass.claimed.is_empty());
        assert!(pass.captured.is_empty());
        assert_eq!(pieces.len(), 4);
    }

    #[test]
    fn test_enclosed_neutral_is_removed_not_claimed() {
        let mut board = Board::new(BoardSize::new(10, 10));
        let mut pieces = BTreeMap::new();
        place(&mut board, &mut pieces, Owner::Neutral, 100, &[(5, 5)]);
        place(&mut board, &mut pieces, p0(), 1, &ring(5, 5, &[]));
        let pass = resolve_claims(&mut board, &mut pieces, Seat::First);
        assert!(pass.board_changed);
        assert_eq!(pass.removed_neutrals.len(), 1);
        assert!(!pass.claimed.contains(&Cell::new(5, 5)));
        assert!(!board.is_occupied(Cell::new(5, 5)));
    }

    #[test]
    fn test_neutral_shared_with_opponent_stays() {
        let (mut board, mut pieces) = setup();
        let mut wall = Vec::new();
        for x in 3..=6 {
            wall.push((x, 4));
            wall.push((x, 6));
        }
        wall.push((3, 5));
        wall.push((6, 5));
        place(&mut board, &mut pieces, p0(), 1, &wall);
        place(&mut board, &mut pieces, Owner::Neutral, 101, &[(4, 5)]);
        place(&mut board, &mut pieces, p1(), 2, &[(5, 5)]);

        let regions = find_regions(&board, Seat::First);
        let hole = regions
            .iter()
            .find(|r| r.cells.contains(&Cell::new(4, 5)))
            .unwrap();
        assert!(hole.is_enclosed());
        assert!(hole.contains_neutral);
        assert_eq!(hole.opponent_pieces.len(), 1);

        let pass = resolve_claims(&mut board, &mut pieces, Seat::First);
        assert!(!pass.board_changed);
        assert!(pass.removed_neutrals.is_empty());
        assert!(pass.captured.is_empty());
        assert!(pass.claimed.is_empty());
        assert_eq!(board.owner_at(Cell::new(4, 5)), Some(Owner::Neutral));
        assert_eq!(board.owner_at(Cell::new(5, 5)), Some(p1()));
    }

    #[test]
    fn test_neutral_against_board_edge_stays() {
        let mut board = Board::new(BoardSize::new(10, 10));
        let mut pieces = BTreeMap::new();
        place(&mut board, &mut pieces, Owner::Neutral, 100, &[(9, 9)]);
        place(&mut board, &mut pieces, p0(), 1, &[(8, 9), (8, 8), (9, 8)]);
        let pass = resolve_claims(&mut board, &mut pieces, Seat::First);
        assert!(!pass.board_changed);
        assert!(board.is_occupied(Cell::new(9, 9)));
    }

    #[test]
    fn test_recompute_claims_after_neutral_removal() {
        let mut board = Board::new(BoardSize::new(10, 10));
        let mut pieces = BTreeMap::new();
        place(&mut board, &mut pieces, Owner::Neutral, 100, &[(5, 5)]);
        place(&mut board, &mut pieces, Owner::Neutral, 101, &[(0, 0)]);
        place(&mut board, &mut pieces, p0(), 1, &ring(5, 5, &[]));
        let mut claimed: PerSeat<BTreeSet<Cell>> = PerSeat::default();
        let res = recompute_territory(&mut board, &mut pieces, &mut claimed, p0());
        assert_eq!(res.removed_neutrals.len(), 1);
        assert_eq!(res.passes, 2);
        assert!(claimed[Seat::First].contains(&Cell::new(5, 5)));
        assert!(claimed[Seat::Second].is_empty());
    }

    #[test]
    fn test_claims_are_sticky() {
        let (mut board, mut pieces) = setup();
        let mut claimed: PerSeat<BTreeSet<Cell>> = PerSeat::default();
        claimed[Seat::First].insert(Cell::new(7, 7));
        recompute_territory(&mut board, &mut pieces, &mut claimed, p1());
        assert!(claimed[Seat::First].contains(&Cell::new(7, 7)));
    }

    #[test]
    fn test_contested_cells_go_to_last_mover() {
        let (mut board, mut pieces) = setup();
        let contested = Cell::new(7, 7);
        for (mover, keeps, loses) in [
            (p0(), Seat::First, Seat::Second),
            (p1(), Seat::Second, Seat::First),
        ] {
            let mut claimed: PerSeat<BTreeSet<Cell>> = PerSeat::default();
            claimed[Seat::First].insert(contested);
            claimed[Seat::Second].insert(contested);
            recompute_territory(&mut board, &mut pieces, &mut claimed, mover);
            assert!(claimed[keeps].contains(&contested));
            assert!(!claimed[loses].contains(&contested));
        }
    }

    #[test]
    fn test_neutral_mover_clears_contested_from_both() {
        let (mut board, mut pieces) = setup();
        let contested = Cell::new(7, 7);
        let mut claimed: PerSeat<BTreeSet<Cell>> = PerSeat::default();
        claimed[Seat::First].insert(contested);
        claimed[Seat::Second].insert(contested);
        claimed[Seat::Second].insert(Cell::new(8, 8));
        recompute_territory(&mut board, &mut pieces, &mut claimed, Owner::Neutral);
        assert!(claimed[Seat::First].is_empty());
        assert_eq!(claimed[Seat::Second], BTreeSet::from([Cell::new(8, 8)]));
    }
}
