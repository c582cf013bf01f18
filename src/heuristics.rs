//! Move-selection heuristics: atari reading, ladder capture, block/liberty
//! geometry used both by the playout policy and by MCTS node priors.

use crate::constants::*;
use crate::position::{all_neighbors, neighbors, play_move, Point, Position};

/// Compute a block (group) of stones at a given point.
///
/// Returns the stones in the group and their liberties (up to `max_libs` liberties).
pub fn compute_block(pos: &Position, start: Point, max_libs: usize) -> (Vec<Point>, Vec<Point>) {
    let color = pos.color[start];
    let mut stones = Vec::new();
    let mut libs = Vec::new();
    let mut visited = [false; BOARDSIZE];
    let mut lib_visited = [false; BOARDSIZE];
    let mut stack = vec![start];
    visited[start] = true;

    while let Some(pt) = stack.pop() {
        stones.push(pt);
        for n in neighbors(pt) {
            if visited[n] {
                continue;
            }
            visited[n] = true;
            if pos.color[n] == color {
                stack.push(n);
            } else if pos.color[n] == EMPTY && !lib_visited[n] {
                lib_visited[n] = true;
                libs.push(n);
                if libs.len() >= max_libs {
                    return (stones, libs);
                }
            }
        }
    }

    (stones, libs)
}

/// Find neighbor blocks in atari (opponent blocks with only 1 liberty).
///
/// Given a list of stones, finds all opponent blocks adjacent to them that
/// have exactly one liberty. Returns pairs of (representative stone, liberty).
pub fn find_neighbor_blocks_in_atari(pos: &Position, stones: &[Point]) -> Vec<(Point, Point)> {
    let color = pos.color[stones[0]];
    let opponent = if color == STONE_BLACK {
        STONE_WHITE
    } else {
        STONE_BLACK
    };

    let mut result = Vec::new();
    let mut block_visited = [false; BOARDSIZE];

    for &stone in stones {
        for n in neighbors(stone) {
            if pos.color[n] == opponent && !block_visited[n] {
                let (block_stones, libs) = compute_block(pos, n, 2);
                for &s in &block_stones {
                    block_visited[s] = true;
                }
                if libs.len() == 1 {
                    result.push((block_stones[0], libs[0]));
                }
            }
        }
    }

    result
}

/// Get the distance from the board edge (0 = on edge, 1 = one away, etc.)
///
/// Used to skip expensive ladder checks for groups with liberties away from edges,
/// and by MCTS to bias against first-line/second-line moves in the opening.
#[inline]
pub fn line_height(pt: Point) -> i32 {
    let stride = N + 1;
    let row = pt / stride;
    let col = pt % stride;

    let from_left = col as i32 - 1;
    let from_right = N as i32 - col as i32;
    let from_top = row as i32 - 1;
    let from_bottom = N as i32 - row as i32;

    from_left.min(from_right).min(from_top).min(from_bottom)
}

/// Returns true if there are no stones within `dist` steps of `pt`.
///
/// Used as a small negative MCTS prior against first/second-line moves played
/// into an otherwise empty corner during the opening, where they are unlikely
/// to do anything useful yet.
pub fn empty_area(pos: &Position, pt: Point, dist: usize) -> bool {
    if dist == 0 {
        return true;
    }

    for n in all_neighbors(pt) {
        let c = pos.color[n];
        if c == STONE_BLACK || c == STONE_WHITE {
            return false;
        }
        if c == EMPTY && dist > 1 && !empty_area(pos, n, dist - 1) {
            return false;
        }
    }

    true
}

/// Compute CFG (Common Fate Graph) distances from a given point.
///
/// CFG distance is like Manhattan distance but groups of same-colored stones
/// count as distance 0 from each other — used to bias MCTS priors toward
/// moves near the last move's group rather than the literal last point.
pub fn compute_cfg_distances(pos: &Position, start: Point) -> [i8; BOARDSIZE] {
    let mut cfg_map = [-1i8; BOARDSIZE];
    let mut queue = Vec::with_capacity(BOARDSIZE);

    cfg_map[start] = 0;
    queue.push(start);
    let mut head = 0;

    while head < queue.len() {
        let pt = queue[head];
        head += 1;

        for n in all_neighbors(pt) {
            let c = pos.color[n];
            if c == OUT {
                continue;
            }

            let old_dist = cfg_map[n];
            let new_dist = if c != EMPTY && c == pos.color[pt] {
                cfg_map[pt]
            } else {
                cfg_map[pt] + 1
            };

            if old_dist < 0 || new_dist < old_dist {
                cfg_map[n] = new_dist;
                queue.push(n);
            }
        }
    }

    cfg_map
}

/// Check if a group with 2 liberties can be captured in a working ladder.
///
/// For each liberty of the group, tries playing there as an attack move, then
/// recursively calls `fix_atari_ext` to see if the group can escape. If no
/// escape is possible, the ladder works.
///
/// Returns the attacking move if the ladder succeeds, or 0 if not.
pub fn read_ladder_attack(pos: &Position, pt: Point, libs: &[Point]) -> Point {
    for &lib in libs {
        let mut test_pos = pos.clone();
        if play_move(&mut test_pos, lib).is_err() {
            continue;
        }

        let escape_moves = fix_atari_ext(&test_pos, pt, false, false, false);

        let (_, new_libs) = compute_block(&test_pos, pt, 2);
        if new_libs.len() <= 1 && escape_moves.is_empty() {
            return lib;
        }
    }

    0
}

/// Check if a group is in atari and find moves that can save it or capture neighbors.
///
/// Parameters:
/// - `pos`: Current position
/// - `pt`: A point in the group to check
/// - `singlept_ok`: If true, don't try to save single-stone groups
///
/// Returns moves that can capture opponent stones (if the group belongs to the
/// opponent), escape by playing the last liberty, or counter-capture adjacent
/// opponent groups in atari.
pub fn fix_atari(pos: &Position, pt: Point, singlept_ok: bool) -> Vec<Point> {
    fix_atari_ext(pos, pt, singlept_ok, true, true)
}

/// Extended version of [`fix_atari`] with ladder detection options.
///
/// `twolib_test` additionally checks groups with 2 liberties for ladder
/// captures; `twolib_edgeonly`, when `twolib_test` is set, restricts that
/// check to groups whose liberties both sit on the edge, skipping the
/// expensive ladder read for interior groups.
pub fn fix_atari_ext(
    pos: &Position,
    pt: Point,
    singlept_ok: bool,
    twolib_test: bool,
    twolib_edgeonly: bool,
) -> Vec<Point> {
    let (moves, _) = fix_atari_with_sizes(pos, pt, singlept_ok, twolib_test, twolib_edgeonly);
    moves
}

/// Extended version of [`fix_atari`] that also returns group sizes for each move.
///
/// Returns `(moves, sizes)` where `sizes` is a parallel list of group sizes
/// corresponding to each move — used to weight capture priors by how many
/// stones the move actually wins or saves.
pub fn fix_atari_with_sizes(
    pos: &Position,
    pt: Point,
    singlept_ok: bool,
    twolib_test: bool,
    twolib_edgeonly: bool,
) -> (Vec<Point>, Vec<usize>) {
    let mut moves = Vec::new();
    let mut sizes = Vec::new();

    let (stones, libs) = compute_block(pos, pt, 3);
    let group_size = stones.len();

    if singlept_ok && group_size == 1 {
        return (moves, sizes);
    }

    if libs.len() >= 2 {
        if twolib_test && libs.len() == 2 && group_size > 1 {
            if twolib_edgeonly && (line_height(libs[0]) > 0 || line_height(libs[1]) > 0) {
                return (moves, sizes);
            }

            let ladder_move = read_ladder_attack(pos, pt, &libs);
            if ladder_move != 0 {
                moves.push(ladder_move);
                sizes.push(group_size);
            }
        }
        return (moves, sizes);
    }

    let lib = libs[0];

    if pos.color[pt] == STONE_WHITE {
        moves.push(lib);
        sizes.push(group_size);
        return (moves, sizes);
    }

    let atari_neighbors = find_neighbor_blocks_in_atari(pos, &stones);
    for (_, capture_lib) in atari_neighbors {
        if !moves.contains(&capture_lib) {
            moves.push(capture_lib);
            sizes.push(group_size);
        }
    }

    let mut test_pos = pos.clone();
    if play_move(&mut test_pos, lib).is_ok() {
        let (new_stones, new_libs) = compute_block(&test_pos, lib, 3);
        if new_libs.len() >= 2
            && (moves.len() > 1
                || new_libs.len() >= 3
                || read_ladder_attack(&test_pos, lib, &new_libs) == 0)
            && !moves.contains(&lib)
        {
            moves.push(lib);
            sizes.push(new_stones.len());
        }
    }

    (moves, sizes)
}

/// Generate capture moves in the neighborhood of recent moves.
///
/// Looks at groups near `last` and `last2` and finds opponent groups in atari
/// (can capture) or own groups in atari (need to save). This is the cheap
/// version used in playouts; use [`gen_capture_moves_all`] for MCTS priors.
///
/// Returns `(move, group_size)` pairs for prioritization.
pub fn gen_capture_moves(pos: &Position) -> Vec<(Point, usize)> {
    let mut points_to_check = Vec::with_capacity(20);

    if pos.last != 0 {
        points_to_check.push(pos.last);
        for n in all_neighbors(pos.last) {
            if pos.color[n] != OUT {
                points_to_check.push(n);
            }
        }
    }

    if pos.last2 != 0 {
        for n in all_neighbors(pos.last2) {
            if pos.color[n] != OUT && !points_to_check.contains(&n) {
                points_to_check.push(n);
            }
        }
    }

    gen_capture_moves_in_set(pos, Some(&points_to_check), true)
}

/// Generate capture moves for all groups on the board.
///
/// This is the expensive version used for MCTS priors, scanning the entire
/// board for groups in atari. `twolib_edgeonly = false` performs full ladder
/// analysis even for interior groups (more accurate, costlier).
///
/// Returns `(move, group_size)` pairs for prioritization.
pub fn gen_capture_moves_all(pos: &Position, twolib_edgeonly: bool) -> Vec<(Point, usize)> {
    gen_capture_moves_in_set(pos, None, twolib_edgeonly)
}

/// Generate capture moves, optionally restricted to a set of points.
///
/// If `points` is `Some`, only those points are checked; if `None`, every
/// stone on the board is checked.
fn gen_capture_moves_in_set(
    pos: &Position,
    points: Option<&[Point]>,
    twolib_edgeonly: bool,
) -> Vec<(Point, usize)> {
    let mut moves = Vec::new();
    let mut checked = [false; BOARDSIZE];

    let points_to_check: Vec<Point> = if let Some(pts) = points {
        pts.to_vec()
    } else {
        (BOARD_IMIN..BOARD_IMAX)
            .filter(|&pt| pos.color[pt] != OUT)
            .collect()
    };

    for pt in points_to_check {
        if checked[pt] {
            continue;
        }

        if pos.color[pt] == STONE_BLACK || pos.color[pt] == STONE_WHITE {
            checked[pt] = true;
            let (atari_moves, atari_sizes) =
                fix_atari_with_sizes(pos, pt, false, true, twolib_edgeonly);

            for (i, m) in atari_moves.iter().enumerate() {
                if !moves.iter().any(|(mv, _)| mv == m) {
                    moves.push((*m, atari_sizes[i]));
                }
            }
        }
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::parse_coord;

    #[test]
    fn single_stone_has_no_ladder_escape_when_surrounded() {
        let mut pos = Position::new();
        play_move(&mut pos, parse_coord("A2")).unwrap();
        play_move(&mut pos, parse_coord("B1")).unwrap();
        play_move(&mut pos, parse_coord("C9")).unwrap(); // elsewhere
        let pt = parse_coord("A1");
        // A1 is empty, no atari to fix there.
        let moves = fix_atari(&pos, pt, false);
        assert!(moves.is_empty());
    }

    #[test]
    fn gen_capture_moves_empty_board() {
        let pos = Position::new();
        assert!(gen_capture_moves(&pos).is_empty());
    }

    #[test]
    fn line_height_corner_is_zero() {
        let pt = parse_coord("A1");
        assert_eq!(line_height(pt), 0);
    }
}
