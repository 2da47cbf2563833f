use std::path::Path;

use image::RgbImage;
use nalgebra as na;
use na::{vector, Vector2};

use super::util::ColorRGB;
use crate::error::Result;

/// Color returned for samples outside of the texture in border mode.
pub const MISSING_COLOR: ColorRGB = vector![1.0, 0.0, 1.0];

/// How uv coordinates outside of [0, 1] are mapped back onto the texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Wrap,
    Clamp,
    Mirror,
    Border,
}

impl AddressMode {
    pub fn next(self) -> Self {
        return match self {
            AddressMode::Wrap => AddressMode::Clamp,
            AddressMode::Clamp => AddressMode::Mirror,
            AddressMode::Mirror => AddressMode::Border,
            AddressMode::Border => AddressMode::Wrap,
        };
    }
}

/// Rgb8 texture with point sampling.
pub struct Texture {
    image: RgbImage,
}

impl Texture {
    pub fn from_image(image: RgbImage) -> Self {
        return Self { image };
    }

    pub fn load(path: &Path) -> Result<Self> {
        let image = image::open(path)?.to_rgb8();
        return Ok(Self::from_image(image));
    }

    /// Samples the texel under `uv` and returns its color normalized to [0, 1].
    pub fn sample(&self, uv: Vector2<f32>, mode: AddressMode) -> ColorRGB {
        let width = self.image.width() as i64;
        let height = self.image.height() as i64;
        // Texel coordinate before addressing, floor so that [-1/w, 0) lands on texel -1.
        let x = (uv.x * width as f32).floor() as i64;
        let y = (uv.y * height as f32).floor() as i64;

        let (x, y) = match mode {
            AddressMode::Wrap => (x.rem_euclid(width), y.rem_euclid(height)),
            AddressMode::Clamp => (x.clamp(0, width - 1), y.clamp(0, height - 1)),
            AddressMode::Mirror => (mirror(x, width), mirror(y, height)),
            AddressMode::Border => {
                if x < 0 || x >= width || y < 0 || y >= height {
                    return MISSING_COLOR;
                }
                (x, y)
            }
        };

        let texel = self.image.get_pixel(x as u32, y as u32).0;
        return vector![texel[0] as f32, texel[1] as f32, texel[2] as f32] / 255.0;
    }
}

/// Every other repetition of the texture is flipped.
fn mirror(coord: i64, size: i64) -> i64 {
    let repetition = coord.div_euclid(size);
    let local = coord.rem_euclid(size);
    if repetition % 2 == 0 {
        return local;
    }
    return size - 1 - local;
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// 4x1 texture with red channel equal to 10 * x.
    fn gradient() -> Texture {
        return Texture::from_image(RgbImage::from_fn(4, 1, |x, _| Rgb([(10 * x) as u8, 0, 0])));
    }

    fn red_of(texture: &Texture, u: f32, mode: AddressMode) -> u8 {
        return (texture.sample(vector![u, 0.5], mode).x * 255.0).round() as u8;
    }

    #[test]
    fn samples_are_normalized() {
        let texture = Texture::from_image(RgbImage::from_pixel(2, 2, Rgb([255, 0, 51])));
        let color = texture.sample(vector![0.3, 0.7], AddressMode::Wrap);
        assert!((color - vector![1.0, 0.0, 0.2]).norm() < 1e-6);
    }

    #[test]
    fn wrap_repeats() {
        let texture = gradient();
        assert_eq!(red_of(&texture, 0.3, AddressMode::Wrap), 10);
        assert_eq!(red_of(&texture, 1.3, AddressMode::Wrap), 10);
        assert_eq!(red_of(&texture, -0.1, AddressMode::Wrap), 30);
    }

    #[test]
    fn clamp_sticks_to_edges() {
        let texture = gradient();
        assert_eq!(red_of(&texture, 5.0, AddressMode::Clamp), 30);
        assert_eq!(red_of(&texture, -2.0, AddressMode::Clamp), 0);
        assert_eq!(red_of(&texture, 1.0, AddressMode::Clamp), 30);
    }

    #[test]
    fn mirror_flips_odd_repetitions() {
        let texture = gradient();
        assert_eq!(red_of(&texture, 0.1, AddressMode::Mirror), 0);
        assert_eq!(red_of(&texture, 1.1, AddressMode::Mirror), 30);
        assert_eq!(red_of(&texture, -0.1, AddressMode::Mirror), 0);
        assert_eq!(red_of(&texture, 2.1, AddressMode::Mirror), 0);
    }

    #[test]
    fn border_returns_missing_color_outside() {
        let texture = gradient();
        assert_eq!(texture.sample(vector![1.5, 0.5], AddressMode::Border), MISSING_COLOR);
        assert_eq!(texture.sample(vector![0.5, -0.01], AddressMode::Border), MISSING_COLOR);
        assert_eq!(red_of(&texture, 0.6, AddressMode::Border), 20);
    }
}
