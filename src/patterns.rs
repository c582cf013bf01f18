//! Pattern matching for Go move generation.
//!
//! This module implements pattern-based move heuristics:
//!
//! ## 3x3 Patterns (`pat3`)
//! Fast pattern matching using the 8 neighbors encoded into a lookup table.
//! Used for both playout move generation and MCTS priors.
//!
//! The patterns are stored in a 8192-byte bitfield (`PAT3SET`), where each bit
//! corresponds to a possible 16-bit encoding of the 8 neighbors (env8).
//!
//! ## Large Patterns
//! A file-loaded dictionary of up to 141-point "gridcular" neighborhoods,
//! keyed by a 64-bit Zobrist-style signature and looked up in an
//! open-addressed hash table with double hashing. Returns a probability used
//! as an MCTS prior (see [`large_pattern_probability`]).

use crate::constants::{LARGE_PATTERN_MAX_POINTS, LARGE_PATTERN_N_SIZES, LARGE_PATTERN_TABLE_LENGTH, N};
use crate::position::{Point, Position};
use std::sync::OnceLock;

/// The 3x3 pattern source definitions from michi-c.
/// Each pattern is a 9-character string representing a 3x3 grid:
/// - X: current player (BLACK or WHITE depending on turn)
/// - O: opponent
/// - .: empty
/// - x: not X (i.e., O or . or #)
/// - o: not O (i.e., X or . or #)
/// - ?: any (X, O, ., or #)
/// - #: edge of board (out of bounds)
const PAT3_SRC: &[&str] = &[
    // 1- hane pattern - enclosing hane
    "XOX...???",
    // 2- hane pattern - non-cutting hane
    "XO....?.?",
    // 3- hane pattern - magari
    "XO?X..x.?",
    // 4- generic pattern - katatsuke or diagonal attachment
    ".O.X.....",
    // 5- cut1 pattern (kiri) - unprotected cut
    "XO?O.o?o?",
    // 6- cut1 pattern (kiri) - peeped cut
    "XO?O.X???",
    // 7- cut2 pattern (de)
    "?X?O.Oooo",
    // 8- cut keima
    "OX?o.O???",
    // 9- side pattern - chase
    "X.?O.?##?",
    // 10- side pattern - block side cut
    "OX?X.O###",
    // 11- side pattern - block side connection
    "?X?x.O###",
    // 12- side pattern - sagari
    "?XOx.x###",
    // 13- side pattern - cut
    "?OXX.O###",
];

/// Static storage for the pattern bitfield.
static PAT3SET: OnceLock<[u8; 8192]> = OnceLock::new();

/// Check if a point matches any 3x3 pattern.
///
/// Uses the precomputed pattern table for fast lookup.
/// The env4 and env4d fields encode the 8 neighbors, which are combined
/// into a 16-bit index for the lookup table.
#[inline]
pub fn pat3_match(pos: &Position, pt: Point) -> bool {
    let pat3set = PAT3SET.get_or_init(make_pat3set);

    // Combine env4 (orthogonal) and env4d (diagonal) into env8
    let env8 = (pos.env4[pt] as u16) | ((pos.env4d[pt] as u16) << 8);

    // Look up in the bitfield
    let byte_idx = (env8 >> 3) as usize;
    let bit_idx = (env8 & 7) as u8;

    (pat3set[byte_idx] & (1 << bit_idx)) != 0
}

/// Initialize pattern tables.
///
/// This is called automatically on first use of pat3_match.
pub fn init_patterns() {
    PAT3SET.get_or_init(make_pat3set);
}

/// Build the 3x3 pattern lookup table.
fn make_pat3set() -> [u8; 8192] {
    let mut pat3set = [0u8; 8192];

    for pat_src in PAT3_SRC {
        pat_enumerate(pat_src, &mut pat3set);
    }

    pat3set
}

/// Enumerate all rotations, reflections, and color swaps of a pattern.
fn pat_enumerate(src: &str, pat3set: &mut [u8; 8192]) {
    let mut src: [u8; 9] = src.as_bytes().try_into().unwrap();

    // Apply all symmetries
    pat_enumerate1(&src, pat3set);
    rot90(&mut src);
    pat_enumerate1(&src, pat3set);
}

fn pat_enumerate1(src: &[u8; 9], pat3set: &mut [u8; 8192]) {
    let mut src = *src;
    pat_enumerate2(&src, pat3set);
    vertflip(&mut src);
    pat_enumerate2(&src, pat3set);
}

fn pat_enumerate2(src: &[u8; 9], pat3set: &mut [u8; 8192]) {
    let mut src = *src;
    pat_enumerate3(&src, pat3set);
    horizflip(&mut src);
    pat_enumerate3(&src, pat3set);
}

fn pat_enumerate3(src: &[u8; 9], pat3set: &mut [u8; 8192]) {
    let mut src = *src;
    pat_wildexp(&src, 0, pat3set);
    swapcolor(&mut src);
    pat_wildexp(&src, 0, pat3set);
}

/// Expand wildcards and add all matching patterns to the set.
fn pat_wildexp(src: &[u8; 9], i: usize, pat3set: &mut [u8; 8192]) {
    if i == 9 {
        // All positions processed - compute env8 and set the bit
        let env8 = compute_code(src);
        let byte_idx = (env8 >> 3) as usize;
        let bit_idx = (env8 & 7) as u8;
        pat3set[byte_idx] |= 1 << bit_idx;
        return;
    }

    match src[i] {
        b'?' => {
            // Any of X, O, ., #
            for &c in &[b'X', b'O', b'.', b'#'] {
                let mut new_src = *src;
                new_src[i] = c;
                pat_wildexp(&new_src, i + 1, pat3set);
            }
        }
        b'x' => {
            // Not X (O, ., or #)
            for &c in &[b'O', b'.', b'#'] {
                let mut new_src = *src;
                new_src[i] = c;
                pat_wildexp(&new_src, i + 1, pat3set);
            }
        }
        b'o' => {
            // Not O (X, ., or #)
            for &c in &[b'X', b'.', b'#'] {
                let mut new_src = *src;
                new_src[i] = c;
                pat_wildexp(&new_src, i + 1, pat3set);
            }
        }
        _ => {
            // Fixed character - continue
            pat_wildexp(src, i + 1, pat3set);
        }
    }
}

/// Compute the 16-bit env8 code from a 9-character pattern string.
///
/// The pattern layout is:
/// ```text
/// 0 1 2     bits: 7 0 4
/// 3 4 5  ->       3 . 1
/// 6 7 8           6 2 5
/// ```
///
/// Low 8 bits = env4 (orthogonal neighbors)
/// High 8 bits = env4d (diagonal neighbors)
fn compute_code(src: &[u8; 9]) -> u16 {
    let mut env8: u16 = 0;

    // Orthogonal neighbors (env4)
    env8 |= code(src[1], 0);  // North
    env8 |= code(src[5], 1);  // East
    env8 |= code(src[7], 2);  // South
    env8 |= code(src[3], 3);  // West

    // Diagonal neighbors (env4d) - shifted to high byte
    env8 |= code(src[2], 0) << 8;  // NE
    env8 |= code(src[8], 1) << 8;  // SE
    env8 |= code(src[6], 2) << 8;  // SW
    env8 |= code(src[0], 3) << 8;  // NW

    env8
}

/// Encode a single neighbor color into the appropriate bit positions.
///
/// Color encoding:
/// - O (WHITE): 0
/// - X (BLACK): 1
/// - . (EMPTY): 2
/// - # (OUT): 3
///
/// Each neighbor uses 2 bits stored at positions p and p+4.
fn code(color: u8, p: u8) -> u16 {
    let c = match color {
        b'O' => 0,  // WHITE
        b'X' => 1,  // BLACK
        b'.' => 2,  // EMPTY
        b'#' => 3,  // OUT
        _ => 0,     // Shouldn't happen
    };

    let hi = (c >> 1) & 1;
    let lo = c & 1;
    ((hi << 4) | lo) << p
}

/// Swap X and O colors in a pattern.
fn swapcolor(src: &mut [u8; 9]) {
    for c in src.iter_mut() {
        *c = match *c {
            b'X' => b'O',
            b'O' => b'X',
            b'x' => b'o',
            b'o' => b'x',
            other => other,
        };
    }
}

/// Horizontal flip of a pattern.
fn horizflip(src: &mut [u8; 9]) {
    src.swap(0, 6);
    src.swap(1, 7);
    src.swap(2, 8);
}

/// Vertical flip of a pattern.
fn vertflip(src: &mut [u8; 9]) {
    src.swap(0, 2);
    src.swap(3, 5);
    src.swap(6, 8);
}

/// 90-degree rotation of a pattern.
fn rot90(src: &mut [u8; 9]) {
    let t = src[0];
    src[0] = src[2];
    src[2] = src[8];
    src[8] = src[6];
    src[6] = t;

    let t = src[1];
    src[1] = src[5];
    src[5] = src[7];
    src[7] = src[3];
    src[3] = t;
}

// =============================================================================
// Large Patterns
// =============================================================================

/// Relative color codes used by the large-pattern signature, matching
/// spec's `{empty=0, off-board=1, theirs=2, ours=3}`.
const CODE_EMPTY: usize = 0;
const CODE_OFFBOARD: usize = 1;
const CODE_THEIRS: usize = 2;
const CODE_OURS: usize = 3;

/// One of the 16 odd primes used as the double-hashing probe step, indexed
/// by `(key >> 45) & 15`.
const HASH_STEP_PRIMES: [u64; 16] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59,
];

/// Gridcular distance `|dx| + |dy| + max(|dx|, |dy|)`: a Go-board-shaped
/// metric whose unit circles look like flattened diamonds rather than
/// exact Euclidean or Manhattan circles.
fn gridcular_distance(dx: i32, dy: i32) -> i32 {
    dx.abs() + dy.abs() + dx.abs().max(dy.abs())
}

/// The fixed nested sequence of board offsets used by the large-pattern
/// matcher, plus the cumulative point count at each of the 12 ring cutoffs.
struct GridcularSeq {
    /// Offsets in ring order: ring 0 first (the center point itself), then
    /// each successive ring of strictly increasing gridcular distance.
    disp: Vec<(i32, i32)>,
    /// `sizes[s]` is the number of points in rings `0..=s` combined
    /// (`s` in `0..LARGE_PATTERN_N_SIZES`). Rings past the 11th are folded
    /// into the 12th so the table always has exactly
    /// `LARGE_PATTERN_N_SIZES` entries, regardless of how many distinct
    /// distance values fit under the `LARGE_PATTERN_MAX_POINTS` cap.
    sizes: [usize; LARGE_PATTERN_N_SIZES],
}

impl GridcularSeq {
    fn build() -> Self {
        // Border radius of 7: the largest offset any of the 141 points can
        // carry, so a board copy with a 7-cell off-board border would make
        // every displacement valid from any on-board point.
        let radius = 7i32;
        let mut candidates: Vec<(i32, i32)> = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                candidates.push((dx, dy));
            }
        }
        candidates.sort_by_key(|&(dx, dy)| gridcular_distance(dx, dy));

        let mut distinct_distances: Vec<i32> = candidates
            .iter()
            .map(|&(dx, dy)| gridcular_distance(dx, dy))
            .collect();
        distinct_distances.dedup();

        let mut disp = Vec::with_capacity(LARGE_PATTERN_MAX_POINTS);
        let mut ring_cumulative = Vec::new();
        for d in distinct_distances {
            let ring: Vec<(i32, i32)> = candidates
                .iter()
                .copied()
                .filter(|&(dx, dy)| gridcular_distance(dx, dy) == d)
                .collect();
            if disp.len() + ring.len() > LARGE_PATTERN_MAX_POINTS {
                break;
            }
            disp.extend(ring);
            ring_cumulative.push(disp.len());
        }

        let mut sizes = [0usize; LARGE_PATTERN_N_SIZES];
        if ring_cumulative.len() <= LARGE_PATTERN_N_SIZES {
            for (i, &c) in ring_cumulative.iter().enumerate() {
                sizes[i] = c;
            }
            let last = ring_cumulative.last().copied().unwrap_or(0);
            for s in sizes.iter_mut().skip(ring_cumulative.len()) {
                *s = last;
            }
        } else {
            sizes[..LARGE_PATTERN_N_SIZES - 1]
                .copy_from_slice(&ring_cumulative[..LARGE_PATTERN_N_SIZES - 1]);
            sizes[LARGE_PATTERN_N_SIZES - 1] = *ring_cumulative.last().unwrap();
        }

        GridcularSeq { disp, sizes }
    }
}

fn gridcular_seq() -> &'static GridcularSeq {
    static SEQ: OnceLock<GridcularSeq> = OnceLock::new();
    SEQ.get_or_init(GridcularSeq::build)
}

/// The 8 elements of the square's symmetry group (dihedral group of order
/// 8), applied to `(dx, dy)` offsets.
const SYMMETRIES: [fn(i32, i32) -> (i32, i32); 8] = [
    |x, y| (x, y),
    |x, y| (-y, x),
    |x, y| (-x, -y),
    |x, y| (y, -x),
    |x, y| (-x, y),
    |x, y| (y, x),
    |x, y| (x, -y),
    |x, y| (-y, -x),
];

/// For each of the 8 symmetries, `perm[k][i]` is the canonical index `j`
/// such that `disp[j] == symmetry_k(disp[i])`. Since the candidate box used
/// to build [`GridcularSeq`] is itself symmetric under the square's symmetry
/// group and every ring is taken whole, this mapping is always total.
fn symmetry_perms() -> &'static [Vec<usize>; 8] {
    static PERMS: OnceLock<[Vec<usize>; 8]> = OnceLock::new();
    PERMS.get_or_init(|| {
        let seq = gridcular_seq();
        let mut index_of = std::collections::HashMap::with_capacity(seq.disp.len());
        for (i, &p) in seq.disp.iter().enumerate() {
            index_of.insert(p, i);
        }
        std::array::from_fn(|k| {
            seq.disp
                .iter()
                .map(|&(dx, dy)| {
                    let (tx, ty) = SYMMETRIES[k](dx, dy);
                    *index_of
                        .get(&(tx, ty))
                        .expect("gridcular candidate box is symmetric under the square's symmetry group")
                })
                .collect()
        })
    })
}

/// Random 64-bit mask per (position, color code), drawn once from a
/// generator seeded with a fixed constant so the table is identical across
/// runs regardless of the engine's own PRNG seed.
fn zobrist_table() -> &'static [[u64; 4]; LARGE_PATTERN_MAX_POINTS] {
    static TABLE: OnceLock<[[u64; 4]; LARGE_PATTERN_MAX_POINTS]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let rng = fastrand::Rng::with_seed(0x4D49_4348_4930_3142);
        std::array::from_fn(|_| std::array::from_fn(|_| rng.u64(..)))
    })
}

/// Map a pattern-file color character to the signature's color code.
/// Reuses the 3x3 matcher's vocabulary: `X` = ours, `O` = theirs, `.` =
/// empty, `#` = off-board.
fn char_color_code(c: u8) -> Option<usize> {
    match c {
        b'X' => Some(CODE_OURS),
        b'O' => Some(CODE_THEIRS),
        b'.' => Some(CODE_EMPTY),
        b'#' => Some(CODE_OFFBOARD),
        _ => None,
    }
}

/// Color code of the board at `pt + (dx, dy)`, relative to the player to
/// move. Points outside the board are off-board, matching the "virtual
/// 7-cell border" described in `GridcularSeq`.
fn board_color_code(pos: &Position, pt: Point, dx: i32, dy: i32) -> usize {
    let stride = N + 1;
    let row = (pt / stride) as i32 + dy;
    let col = (pt % stride) as i32 + dx;
    if row < 1 || row > N as i32 || col < 1 || col > N as i32 {
        return CODE_OFFBOARD;
    }
    match pos.color[(row as usize) * stride + (col as usize)] {
        crate::constants::EMPTY => CODE_EMPTY,
        crate::constants::STONE_WHITE => CODE_THEIRS,
        crate::constants::STONE_BLACK => CODE_OURS,
        _ => CODE_OFFBOARD,
    }
}

/// An open-addressed, double-hashed dictionary mapping large-pattern
/// signatures to `(pattern id, probability)`. A slot is empty iff its key
/// is zero.
pub struct LargePatternDict {
    keys: Vec<u64>,
    ids: Vec<i64>,
    probs: Vec<f32>,
    mask: u64,
}

impl LargePatternDict {
    fn with_length(length: usize) -> Self {
        assert!(length.is_power_of_two());
        LargePatternDict {
            keys: vec![0; length],
            ids: vec![0; length],
            probs: vec![0.0; length],
            mask: (length - 1) as u64,
        }
    }

    fn probe_sequence(&self, key: u64) -> impl Iterator<Item = usize> + '_ {
        let mut idx = (key >> 20) & self.mask;
        let step = HASH_STEP_PRIMES[((key >> 45) & 15) as usize];
        let len = self.keys.len() as u64;
        std::iter::from_fn(move || {
            let cur = idx as usize;
            idx = (idx + step) % len;
            Some(cur)
        })
    }

    fn insert(&mut self, key: u64, id: i64, prob: f32) {
        if key == 0 {
            return; // Vanishingly unlikely, but a zero key would look empty.
        }
        for idx in self.probe_sequence(key).take(self.keys.len()) {
            if self.keys[idx] == 0 || self.keys[idx] == key {
                self.keys[idx] = key;
                self.ids[idx] = id;
                self.probs[idx] = prob;
                return;
            }
        }
    }

    fn lookup(&self, key: u64) -> Option<(i64, f32)> {
        if key == 0 {
            return None;
        }
        for idx in self.probe_sequence(key).take(self.keys.len()) {
            if self.keys[idx] == 0 {
                return None;
            }
            if self.keys[idx] == key {
                return Some((self.ids[idx], self.probs[idx]));
            }
        }
        None
    }

    /// Insert a pattern's coloring string (and all 8 symmetric variants)
    /// at every ring size it's long enough to cover.
    fn insert_pattern(&mut self, id: i64, prob: f32, spatial: &str) {
        let seq = gridcular_seq();
        let chars: Vec<u8> = spatial.bytes().collect();
        let len = chars.len().min(seq.disp.len());

        for perm in symmetry_perms() {
            let mut sig: u64 = 0;
            let mut prev_cutoff = 0;
            let zobrist = zobrist_table();
            for &cutoff in &seq.sizes {
                if cutoff > len {
                    break;
                }
                for i in prev_cutoff..cutoff {
                    let src = perm[i];
                    let Some(code) = chars.get(src).copied().and_then(char_color_code) else {
                        continue;
                    };
                    sig ^= zobrist[i][code];
                }
                prev_cutoff = cutoff;
                self.insert(sig, id, prob);
            }
        }
    }

    /// Probability of the move at `pt` being good, per the largest matched
    /// neighborhood, or `-1.0` if none of the 12 sizes matched.
    pub fn probability(&self, pos: &Position, pt: Point) -> f64 {
        let seq = gridcular_seq();
        let zobrist = zobrist_table();
        let mut sig: u64 = 0;
        let mut prev_cutoff = 0;
        let mut best_prob = -1.0f64;
        let mut misses = 0;

        for &cutoff in &seq.sizes {
            for i in prev_cutoff..cutoff {
                let (dx, dy) = seq.disp[i];
                let code = board_color_code(pos, pt, dx, dy);
                sig ^= zobrist[i][code];
            }
            prev_cutoff = cutoff;

            match self.lookup(sig) {
                Some((_, prob)) => {
                    best_prob = prob as f64;
                    misses = 0;
                }
                None => {
                    misses += 1;
                    if misses >= 2 {
                        break;
                    }
                }
            }
        }

        best_prob
    }

    /// All pattern ids matched at any of the 12 sizes, largest-size last.
    pub fn matching_ids(&self, pos: &Position, pt: Point) -> Vec<i64> {
        let seq = gridcular_seq();
        let zobrist = zobrist_table();
        let mut sig: u64 = 0;
        let mut prev_cutoff = 0;
        let mut ids = Vec::new();

        for &cutoff in &seq.sizes {
            for i in prev_cutoff..cutoff {
                let (dx, dy) = seq.disp[i];
                let code = board_color_code(pos, pt, dx, dy);
                sig ^= zobrist[i][code];
            }
            prev_cutoff = cutoff;

            if let Some((id, _)) = self.lookup(sig) {
                ids.push(id);
            }
        }

        ids
    }
}

/// Load a large-pattern dictionary from a `patterns.prob` / `patterns.spat`
/// file pair.
///
/// `patterns.prob` lines are `<prob> <count1> <count2> (s:<id>)`; only
/// `prob` and `id` are consumed. `patterns.spat` lines are
/// `<id> <d> <string>`, where `string` uses the 3x3 matcher's `X`/`O`/`.`/`#`
/// vocabulary for up to 141 gridcular-ordered points. Blank lines and lines
/// starting with `;` are comments in both files.
pub fn load_large_patterns_from(
    prob_path: &std::path::Path,
    spat_path: &std::path::Path,
) -> anyhow::Result<LargePatternDict> {
    use anyhow::Context;
    use std::collections::HashMap;

    let prob_text = std::fs::read_to_string(prob_path)
        .with_context(|| format!("reading {}", prob_path.display()))?;
    let spat_text = std::fs::read_to_string(spat_path)
        .with_context(|| format!("reading {}", spat_path.display()))?;

    let mut probs: HashMap<i64, f32> = HashMap::new();
    for line in prob_text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let Some(prob_str) = fields.next() else {
            continue;
        };
        let Some(id_field) = fields.last() else {
            continue;
        };
        let id_str = id_field.trim_start_matches('(').trim_end_matches(')');
        let id_str = id_str.strip_prefix("s:").unwrap_or(id_str);
        if let (Ok(prob), Ok(id)) = (prob_str.parse::<f32>(), id_str.parse::<i64>()) {
            probs.insert(id, prob);
        }
    }

    let mut dict = LargePatternDict::with_length(LARGE_PATTERN_TABLE_LENGTH);
    let mut loaded = 0usize;
    for line in spat_text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        let mut fields = line.splitn(3, char::is_whitespace);
        let Some(id_str) = fields.next() else {
            continue;
        };
        let Some(_d_str) = fields.next() else {
            continue;
        };
        let Some(spatial) = fields.next() else {
            continue;
        };
        let Ok(id) = id_str.parse::<i64>() else {
            continue;
        };
        let Some(&prob) = probs.get(&id) else {
            continue;
        };
        dict.insert_pattern(id, prob, spatial.trim());
        loaded += 1;
    }

    log::debug!("loaded {loaded} large patterns from {}", spat_path.display());
    Ok(dict)
}

static LARGE_PATTERNS: OnceLock<LargePatternDict> = OnceLock::new();

/// Install a loaded dictionary as the process-wide large-pattern table.
/// Only the first call takes effect.
pub fn install_large_patterns(dict: LargePatternDict) {
    let _ = LARGE_PATTERNS.set(dict);
}

/// True once a dictionary has been installed via [`install_large_patterns`].
pub fn large_patterns_loaded() -> bool {
    LARGE_PATTERNS.get().is_some()
}

/// Probability that the move at `pt` is good, per the installed large
/// pattern dictionary's largest matched neighborhood. Returns `-1.0` if no
/// dictionary is installed or none of the 12 sizes matched.
pub fn large_pattern_probability(pos: &Position, pt: Point) -> f64 {
    match LARGE_PATTERNS.get() {
        Some(dict) => dict.probability(pos, pt),
        None => -1.0,
    }
}

/// Every pattern id matched at `pt` across the 12 sizes, largest-size last.
/// Empty if no dictionary is installed.
pub fn matching_pattern_ids(pos: &Position, pt: Point) -> Vec<i64> {
    match LARGE_PATTERNS.get() {
        Some(dict) => dict.matching_ids(pos, pt),
        None => Vec::new(),
    }
}
