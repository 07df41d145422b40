/*
 * Spatial Grid Module
 *
 * This module defines the SpatialGrid struct for efficient neighbor lookups
 * during avoidance. Agents are binned by their lookahead-predicted position
 * into square cells over the view. With a cell size at least as large as the
 * biggest avoidance radius, the 3x3 block around a query cell holds every
 * agent that can contribute repulsion.
 *
 * Positions outside the view are clamped into the border cells. Clamping never
 * moves two points further apart in cell space, so the 3x3 guarantee still
 * holds for agents that have drifted off-screen.
 */

use nannou::prelude::*;

pub struct SpatialGrid {
    pub cell_size: f32,
    pub cols: usize,
    pub rows: usize,
    pub grid: Vec<Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32, width: f32, height: f32) -> Self {
        let cell_size = cell_size.max(1.0);
        let cols = ((width / cell_size).ceil() as usize).max(1);
        let rows = ((height / cell_size).ceil() as usize).max(1);

        let mut grid = Vec::with_capacity(cols * rows);

        // Initialize an empty grid
        for _ in 0..(cols * rows) {
            grid.push(Vec::new());
        }

        Self {
            cell_size,
            cols,
            rows,
            grid,
        }
    }

    // Whether this grid can be reused for the given cell size and view
    pub fn fits(&self, cell_size: f32, width: f32, height: f32) -> bool {
        let cell_size = cell_size.max(1.0);
        self.cell_size == cell_size
            && self.cols == ((width / cell_size).ceil() as usize).max(1)
            && self.rows == ((height / cell_size).ceil() as usize).max(1)
    }

    #[inline]
    fn cell_coords(&self, pos: Vec2) -> (usize, usize) {
        let gx = (pos.x / self.cell_size).floor();
        let gy = (pos.y / self.cell_size).floor();

        // NaN casts to 0, which keeps a corrupted agent in a valid cell
        let gx = gx.clamp(0.0, (self.cols - 1) as f32) as usize;
        let gy = gy.clamp(0.0, (self.rows - 1) as f32) as usize;
        (gx, gy)
    }

    // Convert view coordinates to grid cell index
    #[inline]
    pub fn pos_to_cell_index(&self, pos: Vec2) -> usize {
        let (gx, gy) = self.cell_coords(pos);
        gy * self.cols + gx
    }

    // Clear the grid
    pub fn clear(&mut self) {
        for cell in &mut self.grid {
            cell.clear();
        }
    }

    // Insert an agent into the grid
    #[inline]
    pub fn insert(&mut self, agent_index: usize, position: Vec2) {
        let cell_index = self.pos_to_cell_index(position);
        self.grid[cell_index].push(agent_index);
    }

    // Get agent indices within and adjacent to the cell containing the given position
    pub fn get_nearby_indices(&self, position: Vec2) -> Vec<usize> {
        let (gx, gy) = self.cell_coords(position);

        let x0 = gx.saturating_sub(1);
        let x1 = (gx + 1).min(self.cols - 1);
        let y0 = gy.saturating_sub(1);
        let y1 = (gy + 1).min(self.rows - 1);

        let mut result = Vec::new();

        // Check the cell and its neighbors (3x3 block)
        for y in y0..=y1 {
            let row = y * self.cols;
            for x in x0..=x1 {
                result.extend_from_slice(&self.grid[row + x]);
            }
        }

        result
    }
}
