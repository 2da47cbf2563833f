use std::str::FromStr;

use super::texture::AddressMode;
use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingMode {
    Combined,
    ObservedAreaOnly,
    DiffuseOnly,
    SpecularOnly,
}

impl ShadingMode {
    pub fn next(self) -> Self {
        return match self {
            ShadingMode::Combined => ShadingMode::ObservedAreaOnly,
            ShadingMode::ObservedAreaOnly => ShadingMode::DiffuseOnly,
            ShadingMode::DiffuseOnly => ShadingMode::SpecularOnly,
            ShadingMode::SpecularOnly => ShadingMode::Combined,
        };
    }
}

impl FromStr for ShadingMode {
    type Err = RenderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        return match value {
            "combined" => Ok(ShadingMode::Combined),
            "observed-area" => Ok(ShadingMode::ObservedAreaOnly),
            "diffuse" => Ok(ShadingMode::DiffuseOnly),
            "specular" => Ok(ShadingMode::SpecularOnly),
            _ => Err(RenderError::UnknownEnumerant {
                kind: "shading mode",
                value: value.to_string(),
            }),
        };
    }
}

/// Which winding is discarded. Winding is judged by the sign of the edge functions in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    BackFace,
    FrontFace,
    None,
}

impl CullMode {
    pub fn next(self) -> Self {
        return match self {
            CullMode::BackFace => CullMode::FrontFace,
            CullMode::FrontFace => CullMode::None,
            CullMode::None => CullMode::BackFace,
        };
    }

    /// Coverage test for the three edge function values of a pixel.
    pub fn is_inside(self, edges: [f32; 3]) -> bool {
        let front = edges.iter().all(|&e| e >= 0.0);
        let back = edges.iter().all(|&e| e <= 0.0);
        return match self {
            CullMode::BackFace => front,
            CullMode::FrontFace => back,
            CullMode::None => front || back,
        };
    }
}

impl FromStr for CullMode {
    type Err = RenderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        return match value {
            "back" => Ok(CullMode::BackFace),
            "front" => Ok(CullMode::FrontFace),
            "none" => Ok(CullMode::None),
            _ => Err(RenderError::UnknownEnumerant {
                kind: "cull mode",
                value: value.to_string(),
            }),
        };
    }
}

impl FromStr for AddressMode {
    type Err = RenderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        return match value {
            "wrap" => Ok(AddressMode::Wrap),
            "clamp" => Ok(AddressMode::Clamp),
            "mirror" => Ok(AddressMode::Mirror),
            "border" => Ok(AddressMode::Border),
            _ => Err(RenderError::UnknownEnumerant {
                kind: "sampler address mode",
                value: value.to_string(),
            }),
        };
    }
}

/// Toggles of the software pipeline. Changed by input handling between frames; every render pass
/// takes its own copy, so a pass never sees a change half way through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub shading_mode: ShadingMode,
    pub cull_mode: CullMode,
    pub address_mode: AddressMode,
    pub use_normal_map: bool,
    pub show_depth: bool,
    pub show_bounding_boxes: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        return Self {
            shading_mode: ShadingMode::Combined,
            cull_mode: CullMode::BackFace,
            address_mode: AddressMode::Wrap,
            use_normal_map: true,
            show_depth: false,
            show_bounding_boxes: false,
        };
    }
}
