//! Bitmap contour tracing.
//!
//! A 2x2 window is swept over every grid corner of the bitmap (one cell past
//! each edge). Corners where the window holds an odd number of filled cells
//! become boundary turns with an incoming and outgoing direction; diagonal
//! saddles become two turns so that pixels touching only at a corner stay
//! separate. Turns are then chained into closed loops by walking from each
//! turn along its outgoing direction until a turn accepting that direction
//! is reached.
use std::collections::HashMap;

use tracing::trace;

use crate::glyph::Glyph;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Top,
    Left,
    Bottom,
}

impl Direction {
    const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Top,
        Direction::Left,
        Direction::Bottom,
    ];

    /// Unit step in grid space (y grows downwards).
    pub fn vector(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Top => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Bottom => (0, 1),
        }
    }

    fn first_of(flags: [bool; 4]) -> Option<Direction> {
        flags
            .iter()
            .position(|&f| f)
            .map(|i| Direction::ALL[i])
    }
}

/// A grid point; `(0, 0)` is the top-left corner of the top-left pixel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A closed loop of grid points. The closing edge back to the first point
/// is implicit.
pub type Contour = Vec<Point>;

#[derive(Copy, Clone, Debug)]
struct Turn {
    x: i32,
    y: i32,
    dir_in: Direction,
    dir_out: Direction,
}

// Loops shorter than this are single-pixel noise.
const MIN_LOOP_LEN: usize = 4;

// Largest traced side; the sweep and the walks step up to two past it.
const MAX_TRACE_SIDE: i32 = i32::MAX - 2;

fn trace_side(n: usize) -> i32 {
    i32::try_from(n).map_or(MAX_TRACE_SIDE, |n| n.min(MAX_TRACE_SIDE))
}

/// Trace the outline of a glyph.
///
/// Every loop is emitted in reverse walk order, which is the orientation the
/// outline builder expects; holes always wind opposite to filled regions.
pub fn trace_glyph(glyph: &Glyph) -> Vec<Contour> {
    trace_bitmap(trace_side(glyph.width()), trace_side(glyph.height()), |x, y| {
        glyph.get(x, y)
    })
}

/// Trace any `width` x `height` boolean field; `get` should return `false`
/// outside `[0, width) x [0, height)`.
///
/// Walks that run off the swept window never close; they are dropped along
/// with loops of fewer than four points.
pub fn trace_bitmap<F>(width: i32, height: i32, get: F) -> Vec<Contour>
where
    F: Fn(i32, i32) -> bool,
{
    let width = width.clamp(0, MAX_TRACE_SIDE);
    let height = height.clamp(0, MAX_TRACE_SIDE);
    let turns = find_turns(width, height, &get);
    if turns.is_empty() {
        return Vec::new();
    }

    let loops = assemble_loops(&turns, width, height);
    let total = loops.len();
    let contours = into_contours(&turns, loops);

    trace!(
        turns = turns.len(),
        loops = total,
        contours = contours.len(),
        "traced bitmap"
    );
    contours
}

/// Drop degenerate loops and emit the rest in reverse walk order.
fn into_contours(turns: &[Turn], loops: Vec<Vec<usize>>) -> Vec<Contour> {
    loops
        .into_iter()
        .filter_map(|mut members| {
            if members.len() < MIN_LOOP_LEN {
                trace!(len = members.len(), "discarding degenerate loop");
                return None;
            }
            members.reverse();
            Some(
                members
                    .into_iter()
                    .map(|i| Point::new(turns[i].x, turns[i].y))
                    .collect(),
            )
        })
        .collect()
}

fn find_turns<F>(width: i32, height: i32, get: &F) -> Vec<Turn>
where
    F: Fn(i32, i32) -> bool,
{
    let mut turns = Vec::new();
    for y in 0..=height + 1 {
        for x in 0..=width + 1 {
            let top_left = get(x - 1, y - 1);
            let top_right = get(x, y - 1);
            let bottom_left = get(x - 1, y);
            let bottom_right = get(x, y);

            let filled = [top_left, top_right, bottom_left, bottom_right]
                .iter()
                .filter(|&&c| c)
                .count();

            if filled == 1 || filled == 3 {
                // One or three cells filled: a single unambiguous turn.
                let dir_in = Direction::first_of([
                    bottom_left && !top_left,
                    bottom_right && !bottom_left,
                    top_right && !bottom_right,
                    top_left && !top_right,
                ]);
                let dir_out = Direction::first_of([
                    bottom_right && !top_right,
                    top_right && !top_left,
                    top_left && !bottom_left,
                    bottom_left && !bottom_right,
                ]);
                if let (Some(dir_in), Some(dir_out)) = (dir_in, dir_out) {
                    turns.push(Turn {
                        x,
                        y,
                        dir_in,
                        dir_out,
                    });
                }
            } else if top_left == bottom_right && top_right == bottom_left && top_left != top_right
            {
                // Saddle: split into two turns keeping the diagonal pixels apart.
                let pair = if top_left {
                    [
                        (Direction::Bottom, Direction::Left),
                        (Direction::Top, Direction::Right),
                    ]
                } else {
                    [
                        (Direction::Left, Direction::Top),
                        (Direction::Right, Direction::Bottom),
                    ]
                };
                for (dir_in, dir_out) in pair {
                    turns.push(Turn {
                        x,
                        y,
                        dir_in,
                        dir_out,
                    });
                }
            }
        }
    }
    turns
}

/// Chain turns into closed loops of turn indices, in walk order.
fn assemble_loops(turns: &[Turn], width: i32, height: i32) -> Vec<Vec<usize>> {
    let mut by_entry: HashMap<(i32, i32, Direction), usize> = HashMap::with_capacity(turns.len());
    for (i, t) in turns.iter().enumerate() {
        by_entry.entry((t.x, t.y, t.dir_in)).or_insert(i);
    }

    let in_window = |x: i32, y: i32| x >= 0 && x <= width + 1 && y >= 0 && y <= height + 1;

    let mut owner: Vec<Option<usize>> = vec![None; turns.len()];
    let mut loops: Vec<Vec<usize>> = Vec::new();

    for start in 0..turns.len() {
        if owner[start].is_some() {
            continue;
        }
        let loop_id = loops.len();
        owner[start] = Some(loop_id);
        let mut members = vec![start];
        let mut current = start;
        let mut closed = false;

        'walk: loop {
            let dir = turns[current].dir_out;
            let (dx, dy) = dir.vector();
            let (mut x, mut y) = (turns[current].x, turns[current].y);
            loop {
                if !in_window(x, y) {
                    trace!(x, y, len = members.len(), "loop left the bitmap unterminated");
                    break 'walk;
                }
                x += dx;
                y += dy;
                let Some(&next) = by_entry.get(&(x, y, dir)) else {
                    continue;
                };
                if owner[next].is_some() {
                    closed = true;
                    break 'walk;
                }
                owner[next] = Some(loop_id);
                members.push(next);
                current = next;
                continue 'walk;
            }
        }
        if closed {
            loops.push(members);
        }
    }
    loops
}
