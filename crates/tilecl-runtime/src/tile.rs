use core::cell::Cell;
use core::ops::Range;

use crate::{TileDim, TiledDomain};

/// A cooperative group of lanes executing one kernel invocation.
///
/// The lanes of a tile run in lock-step: [Tile::for_each_lane] executes one lane step for every
/// lane, and [Tile::sync_units] is the barrier separating a step from the steps that read its
/// results. A tile owns the contiguous range of the launch domain returned by [Tile::range].
#[derive(Debug)]
pub struct Tile {
    pos: u32,
    count: u32,
    dim: TileDim,
    range: Range<usize>,
    barriers: Cell<u32>,
}

/// One lane of a [Tile].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lane {
    pos: u32,
    tile_pos: u32,
    width: u32,
}

impl Tile {
    pub(crate) fn new(pos: u32, domain: &TiledDomain) -> Self {
        Self::with_range(pos, domain.tile_count, domain.tile_dim, domain.tile_range(pos))
    }

    pub(crate) fn with_range(pos: u32, count: u32, dim: TileDim, range: Range<usize>) -> Self {
        Self {
            pos,
            count,
            dim,
            range,
            barriers: Cell::new(0),
        }
    }

    /// Position of the tile in the launch.
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Number of tiles in the launch.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Number of lanes in the tile.
    pub fn width(&self) -> u32 {
        self.dim.width
    }

    /// The range of the launch domain owned by this tile.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// First index owned by this tile.
    pub fn offset(&self) -> usize {
        self.range.start
    }

    /// Number of indices owned by this tile.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Whether the tile owns no index.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The lanes of this tile, in lane order.
    pub fn lanes(&self) -> impl Iterator<Item = Lane> + '_ {
        (0..self.dim.width).map(|pos| Lane {
            pos,
            tile_pos: self.pos,
            width: self.dim.width,
        })
    }

    /// Executes one lane step on every lane of the tile.
    ///
    /// Writes made by a lane during a step are only guaranteed to be visible to other lanes after
    /// the next [Tile::sync_units].
    pub fn for_each_lane<F: FnMut(Lane)>(&self, mut step: F) {
        for lane in self.lanes() {
            step(lane);
        }
    }

    /// Runs `func` on the origin lane only and returns its result.
    pub fn uniform<R, F: FnOnce() -> R>(&self, func: F) -> R {
        let mut func = Some(func);
        let mut output = None;

        self.for_each_lane(|lane| {
            if lane.is_origin() {
                output = func.take().map(|func| func());
            }
        });

        match output {
            Some(output) => output,
            None => unreachable!("A tile always has an origin lane"),
        }
    }

    /// Barrier between lane steps.
    pub fn sync_units(&self) {
        self.barriers.set(self.barriers.get() + 1);
    }

    /// Number of barriers crossed so far by this tile.
    pub fn barrier_count(&self) -> u32 {
        self.barriers.get()
    }

    /// Number of lanes that own at least one item when `len` items are split in contiguous
    /// blocks over the lanes.
    pub fn active_lanes(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        len.div_ceil(self.items_per_lane(len))
    }

    /// The contiguous block of `[0, len)` owned by the lane at `lane_pos`.
    ///
    /// Blocks preserve item order: lane `l` owns items before those of lane `l + 1`.
    pub fn lane_block(&self, lane_pos: u32, len: usize) -> Range<usize> {
        let per_lane = self.items_per_lane(len);
        let start = (lane_pos as usize * per_lane).min(len);
        let end = (start + per_lane).min(len);
        start..end
    }

    /// The items of `[0, len)` owned by the lane at `lane_pos` in a strided arrangement.
    pub fn lane_stride(&self, lane_pos: u32, len: usize) -> impl Iterator<Item = usize> {
        (lane_pos as usize..len).step_by(self.dim.width as usize)
    }

    fn items_per_lane(&self, len: usize) -> usize {
        len.div_ceil(self.dim.width as usize).max(1)
    }
}

impl Lane {
    /// Position of the lane in its tile.
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Position of the lane in the whole launch.
    pub fn absolute_pos(&self) -> usize {
        self.tile_pos as usize * self.width as usize + self.pos as usize
    }

    /// Whether this lane is the first lane of its tile.
    pub fn is_origin(&self) -> bool {
        self.pos == 0
    }
}
