use std::f32::consts::PI;
use std::sync::Arc;

use nalgebra as na;
use na::{vector, Vector2, Vector3};

use super::settings::{RenderSettings, ShadingMode};
use super::texture::Texture;
use super::util::{remap, ColorRGB};

/// Depth range stretched over the full grayscale range in depth visualization. Almost all of the
/// [0, 1] device depth range is spent close to the near plane, so only the tail is interesting.
const DEPTH_VISUALIZATION_RANGE: (f32, f32) = (0.985, 1.0);

/// Effect texels darker than this (brightest channel) are cut out.
const EFFECT_CUTOUT_THRESHOLD: f32 = 0.05;

const BLACK: ColorRGB = vector![0.0, 0.0, 0.0];

#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>, // Unit vector, pointing from the light into the scene.
    pub intensity: f32,
    pub color: ColorRGB,
}

/// Scene wide lighting constants, set once when the scene is built.
#[derive(Debug, Clone, Copy)]
pub struct SceneLighting {
    pub light: DirectionalLight,
    pub ambient: ColorRGB,
    pub shininess: f32,
}

impl Default for SceneLighting {
    fn default() -> Self {
        return Self {
            light: DirectionalLight {
                direction: vector![0.577, -0.577, 0.577].normalize(),
                intensity: 7.0,
                color: vector![1.0, 1.0, 1.0],
            },
            ambient: vector![0.025, 0.025, 0.025],
            shininess: 25.0,
        };
    }
}

/// Opaque material lit with Lambert diffuse and Phong specular.
pub struct LitMaterial {
    pub diffuse: Arc<Texture>,
    pub normal: Arc<Texture>,
    pub specular: Arc<Texture>,
    pub glossiness: Arc<Texture>,
}

/// Unlit transparent effect. The software pipeline has no blending, so it is drawn as a cutout.
pub struct EffectMaterial {
    pub diffuse: Arc<Texture>,
}

pub enum Material {
    Lit(LitMaterial),
    Effect(EffectMaterial),
}

/// Perspective correct interpolated attributes of a single pixel.
#[derive(Debug, Clone, Copy)]
pub struct Fragment {
    pub depth: f32,
    pub color: ColorRGB,
    pub uv: Vector2<f32>,
    pub normal: Vector3<f32>,
    pub tangent: Vector3<f32>,
    pub view_direction: Vector3<f32>,
}

/// Texture values under a fragment's uv, one per map of a lit material.
#[derive(Debug, Clone, Copy)]
pub struct MaterialSamples {
    pub diffuse: ColorRGB,
    pub normal: ColorRGB,
    pub specular: ColorRGB,
    pub glossiness: ColorRGB,
}

impl Material {
    /// Final color of a fragment that passed the depth test, `None` if the fragment is cut out.
    pub fn shade(&self, fragment: &Fragment, lighting: &SceneLighting, settings: &RenderSettings) -> Option<ColorRGB> {
        if settings.show_depth {
            let gray = remap(fragment.depth, DEPTH_VISUALIZATION_RANGE.0, DEPTH_VISUALIZATION_RANGE.1);
            return Some(vector![gray, gray, gray]);
        }

        match self {
            Material::Lit(material) => {
                let samples = MaterialSamples {
                    diffuse: material.diffuse.sample(fragment.uv, settings.address_mode),
                    normal: material.normal.sample(fragment.uv, settings.address_mode),
                    specular: material.specular.sample(fragment.uv, settings.address_mode),
                    glossiness: material.glossiness.sample(fragment.uv, settings.address_mode),
                };
                return Some(shade_lit(fragment, &samples, lighting, settings));
            }
            Material::Effect(material) => {
                let color = material
                    .diffuse
                    .sample(fragment.uv, settings.address_mode)
                    .component_mul(&fragment.color);
                if color.max() < EFFECT_CUTOUT_THRESHOLD {
                    return None;
                }
                return Some(clamp_color(color));
            }
        }
    }
}

/// Brings a normal map sample from tangent space into world space.
pub fn decode_normal_map(sample: ColorRGB, normal: Vector3<f32>, tangent: Vector3<f32>) -> Vector3<f32> {
    let binormal = normal.cross(&tangent);
    let local = 2.0 * sample - vector![1.0, 1.0, 1.0];
    return (tangent * local.x + binormal * local.y + normal * local.z).normalize();
}

/// Lambert + Phong shading of one fragment under the selected shading mode.
pub fn shade_lit(fragment: &Fragment, samples: &MaterialSamples, lighting: &SceneLighting, settings: &RenderSettings) -> ColorRGB {
    let light = &lighting.light;
    let interpolated_normal = fragment.normal.normalize();
    let normal = if settings.use_normal_map {
        decode_normal_map(samples.normal, interpolated_normal, fragment.tangent.normalize())
    } else {
        interpolated_normal
    };

    let reflected = light.direction - 2.0 * normal.dot(&light.direction) * normal;
    let cos_alpha = reflected.dot(&-fragment.view_direction.normalize()).max(0.0);
    let exponent = samples.glossiness.x * lighting.shininess;
    // Zero gloss has no highlight, powf would give 0^0 = 1 everywhere.
    let specular = if exponent > 0.0 { samples.specular * cos_alpha.powf(exponent) } else { BLACK };
    if settings.shading_mode == ShadingMode::SpecularOnly {
        return clamp_color(specular);
    }

    let observed_area = normal.dot(&-light.direction);
    if observed_area <= 0.0 {
        return BLACK;
    }

    let diffuse = (samples.diffuse.component_mul(&fragment.color) / PI).component_mul(&light.color) * light.intensity;
    let color = match settings.shading_mode {
        ShadingMode::Combined => (diffuse + specular + lighting.ambient) * observed_area,
        ShadingMode::ObservedAreaOnly => vector![observed_area, observed_area, observed_area],
        ShadingMode::DiffuseOnly => diffuse * observed_area,
        ShadingMode::SpecularOnly => specular,
    };
    return clamp_color(color);
}

fn clamp_color(color: ColorRGB) -> ColorRGB {
    return color.map(|channel| channel.clamp(0.0, 1.0));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(normal: Vector3<f32>) -> Fragment {
        return Fragment {
            depth: 0.5,
            color: vector![1.0, 1.0, 1.0],
            uv: vector![0.5, 0.5],
            normal,
            tangent: vector![1.0, 0.0, 0.0],
            view_direction: vector![0.0, 0.0, 1.0],
        };
    }

    fn samples(diffuse: f32, specular: f32) -> MaterialSamples {
        return MaterialSamples {
            diffuse: vector![diffuse, diffuse, diffuse],
            // Flat normal map: (0.5, 0.5, 1.0) decodes to the interpolated normal.
            normal: vector![0.5, 0.5, 1.0],
            specular: vector![specular, specular, specular],
            glossiness: vector![1.0, 1.0, 1.0],
        };
    }

    fn lighting_towards(direction: Vector3<f32>) -> SceneLighting {
        return SceneLighting {
            light: DirectionalLight {
                direction,
                intensity: PI,
                color: vector![1.0, 1.0, 1.0],
            },
            ambient: vector![0.0, 0.0, 0.0],
            shininess: 1.0,
        };
    }

    fn settings(mode: ShadingMode, use_normal_map: bool) -> RenderSettings {
        return RenderSettings {
            shading_mode: mode,
            use_normal_map,
            ..Default::default()
        };
    }

    #[test]
    fn surface_facing_away_is_black_in_combined() {
        // Normal points along the light, so the observed area is negative.
        let lighting = SceneLighting {
            ambient: vector![1.0, 1.0, 1.0],
            ..lighting_towards(vector![0.0, 0.0, 1.0])
        };
        let color = shade_lit(&fragment(vector![0.0, 0.0, 1.0]), &samples(1.0, 1.0), &lighting, &settings(ShadingMode::Combined, false));
        assert_eq!(color, BLACK);
        let color = shade_lit(&fragment(vector![1.0, 0.0, 0.0]), &samples(1.0, 1.0), &lighting, &settings(ShadingMode::Combined, false));
        assert_eq!(color, BLACK);
    }

    #[test]
    fn diffuse_is_lambert_over_pi() {
        // Light hits the surface at 60 degrees, observed area 0.5.
        let direction = vector![0.0, -(3f32.sqrt()) / 2.0, 0.5];
        let color = shade_lit(
            &fragment(vector![0.0, 0.0, -1.0]),
            &samples(0.8, 0.0),
            &lighting_towards(direction),
            &settings(ShadingMode::DiffuseOnly, false),
        );
        // 0.8 / pi * pi * 0.5
        assert!((color - vector![0.4, 0.4, 0.4]).norm() < 1e-5);

        let observed = shade_lit(
            &fragment(vector![0.0, 0.0, -1.0]),
            &samples(0.8, 0.0),
            &lighting_towards(direction),
            &settings(ShadingMode::ObservedAreaOnly, false),
        );
        assert!((observed - vector![0.5, 0.5, 0.5]).norm() < 1e-5);
    }

    #[test]
    fn specular_peaks_on_mirror_direction() {
        // Light straight into the surface reflects straight back at the viewer.
        let lighting = lighting_towards(vector![0.0, 0.0, 1.0]);
        let color = shade_lit(&fragment(vector![0.0, 0.0, -1.0]), &samples(0.0, 0.6), &lighting, &settings(ShadingMode::SpecularOnly, false));
        assert!((color - vector![0.6, 0.6, 0.6]).norm() < 1e-5);
    }

    #[test]
    fn zero_glossiness_has_no_highlight() {
        let mut matte = samples(0.0, 1.0);
        matte.glossiness = vector![0.0, 0.0, 0.0];
        // Light grazing away from the viewer, cos_alpha is 0.
        let lighting = lighting_towards(vector![1.0, 0.0, 0.0]);
        let color = shade_lit(&fragment(vector![0.0, 0.0, -1.0]), &matte, &lighting, &settings(ShadingMode::SpecularOnly, false));
        assert_eq!(color, BLACK);
        // Even facing the mirror direction.
        let lighting = lighting_towards(vector![0.0, 0.0, 1.0]);
        let color = shade_lit(&fragment(vector![0.0, 0.0, -1.0]), &matte, &lighting, &settings(ShadingMode::SpecularOnly, false));
        assert_eq!(color, BLACK);
    }

    #[test]
    fn combined_output_is_clamped() {
        let lighting = lighting_towards(vector![0.0, 0.0, 1.0]);
        let color = shade_lit(&fragment(vector![0.0, 0.0, -1.0]), &samples(1.0, 1.0), &lighting, &settings(ShadingMode::Combined, false));
        assert_eq!(color, vector![1.0, 1.0, 1.0]);
    }

    #[test]
    fn flat_normal_map_keeps_normal() {
        let normal = vector![0.0, 0.0, -1.0];
        let decoded = decode_normal_map(vector![0.5, 0.5, 1.0], normal, vector![1.0, 0.0, 0.0]);
        assert!((decoded - normal).norm() < 1e-5);
        // Fully tilted towards the tangent.
        let tilted = decode_normal_map(vector![1.0, 0.5, 0.5], normal, vector![1.0, 0.0, 0.0]);
        assert!((tilted - vector![1.0, 0.0, 0.0]).norm() < 1e-5);
    }

    #[test]
    fn normal_map_toggle_selects_normal() {
        let lighting = lighting_towards(vector![0.0, 0.0, 1.0]);
        let mut tilted = samples(1.0, 0.0);
        tilted.normal = vector![1.0, 0.5, 0.5]; // Perpendicular to the light once decoded.
        let mapped = shade_lit(&fragment(vector![0.0, 0.0, -1.0]), &tilted, &lighting, &settings(ShadingMode::ObservedAreaOnly, true));
        let plain = shade_lit(&fragment(vector![0.0, 0.0, -1.0]), &tilted, &lighting, &settings(ShadingMode::ObservedAreaOnly, false));
        assert!(mapped.norm() < 1e-5);
        assert!((plain - vector![1.0, 1.0, 1.0]).norm() < 1e-5);
    }

    #[test]
    fn depth_visualization_bypasses_lighting() {
        use image::{Rgb, RgbImage};
        let texture = Arc::new(Texture::from_image(RgbImage::from_pixel(1, 1, Rgb([0, 0, 0]))));
        let material = Material::Effect(EffectMaterial { diffuse: texture });
        let mut frag = fragment(vector![0.0, 0.0, -1.0]);
        frag.depth = 0.9925;
        let settings = RenderSettings { show_depth: true, ..Default::default() };
        let color = material.shade(&frag, &SceneLighting::default(), &settings).unwrap();
        assert!((color.x - 0.5).abs() < 1e-3);
    }

    #[test]
    fn dark_effect_texels_are_cut_out() {
        use image::{Rgb, RgbImage};
        let texture = Arc::new(Texture::from_image(RgbImage::from_pixel(1, 1, Rgb([2, 1, 0]))));
        let material = Material::Effect(EffectMaterial { diffuse: texture });
        let color = material.shade(&fragment(vector![0.0, 0.0, -1.0]), &SceneLighting::default(), &RenderSettings::default());
        assert!(color.is_none());
    }
}
