use super::util::{color_to_rgb8, ColorRGB};

/// Depth of a pixel nothing has been drawn to yet.
pub const FAR_DEPTH: f32 = 1.0;

/// Rectangle of pixels, in frame buffer coordinates with (0, 0) in the top left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TileRect {
    /// Index of an absolute pixel coordinate inside this rectangle's row-major storage.
    fn local_index(&self, x: u32, y: u32) -> usize {
        return ((y - self.y) * self.width + (x - self.x)) as usize;
    }
}

/// Frame buffer with color stored as rgb8 (3 bytes per pixel) and a depth buffer of the same size.
/// Both are always cleared together.
pub struct FrameBuffer {
    width: u32,
    height: u32,
    color: Vec<u8>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let n_pixels = width as usize * height as usize;
        return Self {
            width,
            height,
            color: vec![0; 3 * n_pixels],
            depth: vec![FAR_DEPTH; n_pixels],
        };
    }

    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    /// Sets every pixel to `color` and every depth value to far.
    pub fn clear(&mut self, color: ColorRGB) {
        let rgb = color_to_rgb8(color);
        for pixel in self.color.chunks_exact_mut(3) {
            pixel.copy_from_slice(&rgb);
        }
        self.depth.fill(FAR_DEPTH);
    }

    /// Rendered frame as a slice of rgb8 values, row by row from the top.
    pub fn as_render_data(&self) -> &[u8] {
        return &self.color[..];
    }

    #[cfg(test)]
    pub fn color_at(&self, x: u32, y: u32) -> [u8; 3] {
        let index = 3 * (y * self.width + x) as usize;
        return [self.color[index], self.color[index + 1], self.color[index + 2]];
    }

    #[cfg(test)]
    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        return self.depth[(y * self.width + x) as usize];
    }

    /// Splits the frame into disjoint tiles of at most `tile_size` x `tile_size` pixels.
    pub fn tiles(&self, tile_size: u32) -> Vec<TileRect> {
        let tile_size = tile_size.max(1);
        let mut tiles = Vec::new();
        for y in (0..self.height).step_by(tile_size as usize) {
            for x in (0..self.width).step_by(tile_size as usize) {
                tiles.push(TileRect {
                    x,
                    y,
                    width: tile_size.min(self.width - x),
                    height: tile_size.min(self.height - y),
                });
            }
        }
        return tiles;
    }

    /// Copies a region of the frame out so it can be rendered on its own.
    pub fn read_tile(&self, rect: TileRect) -> Tile {
        let n_pixels = (rect.width * rect.height) as usize;
        let mut tile = Tile {
            rect,
            color: Vec::with_capacity(3 * n_pixels),
            depth: Vec::with_capacity(n_pixels),
        };
        for y in rect.y..rect.y + rect.height {
            let row_start = (y * self.width + rect.x) as usize;
            let row_end = row_start + rect.width as usize;
            tile.color.extend_from_slice(&self.color[3 * row_start..3 * row_end]);
            tile.depth.extend_from_slice(&self.depth[row_start..row_end]);
        }
        return tile;
    }

    /// Writes a rendered tile back to its place in the frame.
    pub fn write_tile(&mut self, tile: &Tile) {
        let rect = tile.rect;
        for row in 0..rect.height {
            let frame_start = ((rect.y + row) * self.width + rect.x) as usize;
            let tile_start = (row * rect.width) as usize;
            let len = rect.width as usize;
            self.color[3 * frame_start..3 * (frame_start + len)]
                .copy_from_slice(&tile.color[3 * tile_start..3 * (tile_start + len)]);
            self.depth[frame_start..frame_start + len].copy_from_slice(&tile.depth[tile_start..tile_start + len]);
        }
    }
}

/// Exclusively owned piece of the frame, rendered by a single worker.
/// Coordinates passed to its methods are absolute frame coordinates inside `rect`.
pub struct Tile {
    rect: TileRect,
    color: Vec<u8>,
    depth: Vec<f32>,
}

impl Tile {
    pub fn rect(&self) -> TileRect {
        return self.rect;
    }

    /// True if `depth` is in the visible range and closer than what is stored.
    pub fn passes_depth_test(&self, x: u32, y: u32, depth: f32) -> bool {
        if !(0.0..=1.0).contains(&depth) {
            return false;
        }
        return depth < self.depth[self.rect.local_index(x, y)];
    }

    /// Stores a fragment that passed the depth test.
    pub fn write(&mut self, x: u32, y: u32, depth: f32, color: ColorRGB) {
        let index = self.rect.local_index(x, y);
        self.depth[index] = depth;
        self.color[3 * index..3 * index + 3].copy_from_slice(&color_to_rgb8(color));
    }

    /// Overwrites color only, leaving depth alone. Used by the bounding box overlay.
    pub fn paint(&mut self, x: u32, y: u32, color: ColorRGB) {
        let index = self.rect.local_index(x, y);
        self.color[3 * index..3 * index + 3].copy_from_slice(&color_to_rgb8(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn tiles_cover_frame_without_overlap() {
        let frame = FrameBuffer::new(150, 70);
        let tiles = frame.tiles(64);
        assert_eq!(tiles.len(), 3 * 2);
        let covered: u32 = tiles.iter().map(|t| t.width * t.height).sum();
        assert_eq!(covered, 150 * 70);
        assert_eq!(tiles[2], TileRect { x: 128, y: 0, width: 22, height: 64 });
    }

    #[test]
    fn tile_round_trip_keeps_rest_of_frame() {
        let mut frame = FrameBuffer::new(8, 8);
        frame.clear(vector![0.0, 0.0, 1.0]);
        let rect = TileRect { x: 2, y: 3, width: 4, height: 2 };
        let mut tile = frame.read_tile(rect);
        assert!(tile.passes_depth_test(3, 4, 0.5));
        tile.write(3, 4, 0.5, vector![1.0, 0.0, 0.0]);
        frame.write_tile(&tile);

        assert_eq!(frame.color_at(3, 4), [255, 0, 0]);
        assert_eq!(frame.depth_at(3, 4), 0.5);
        assert_eq!(frame.color_at(2, 4), [0, 0, 255]);
        assert_eq!(frame.depth_at(7, 7), FAR_DEPTH);
    }

    #[test]
    fn depth_test_rejects_out_of_range_and_farther() {
        let frame = FrameBuffer::new(4, 4);
        let mut tile = frame.read_tile(TileRect { x: 0, y: 0, width: 4, height: 4 });
        assert!(!tile.passes_depth_test(1, 1, -0.1));
        assert!(!tile.passes_depth_test(1, 1, 1.5));
        tile.write(1, 1, 0.3, vector![1.0, 1.0, 1.0]);
        assert!(!tile.passes_depth_test(1, 1, 0.7));
        assert!(!tile.passes_depth_test(1, 1, 0.3));
        assert!(tile.passes_depth_test(1, 1, 0.2));
    }

    #[test]
    fn clear_resets_color_and_depth() {
        let mut frame = FrameBuffer::new(2, 2);
        let mut tile = frame.read_tile(TileRect { x: 0, y: 0, width: 2, height: 2 });
        tile.write(0, 0, 0.1, vector![1.0, 1.0, 1.0]);
        frame.write_tile(&tile);
        frame.clear(vector![0.0, 0.0, 0.0]);
        assert_eq!(frame.color_at(0, 0), [0, 0, 0]);
        assert_eq!(frame.depth_at(0, 0), FAR_DEPTH);
    }
}
