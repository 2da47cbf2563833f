use std::path::PathBuf;
use std::str::FromStr;
use std::thread;

use crate::error::{RenderError, Result};
use crate::scene::renderer::DEFAULT_TILE_SIZE;
use crate::scene::settings::RenderSettings;

const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;
const DEFAULT_ASSET_DIR: &str = "assets";
/// Largest accepted frame side. Pixel indices are computed in u32, 16384^2 * 3 still fits.
const MAX_DIMENSION: u32 = 16384;

/// Execution parameters of the application.
#[derive(Debug, Clone)]
pub struct Params {
    pub asset_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub threads: usize,
    pub tile_size: u32,
    pub print_fps: bool,
    pub settings: RenderSettings, // Starting values, toggled at runtime afterwards.
}

impl Default for Params {
    fn default() -> Self {
        return Self {
            asset_dir: PathBuf::from(DEFAULT_ASSET_DIR),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            threads: thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            tile_size: DEFAULT_TILE_SIZE,
            print_fps: false,
            settings: RenderSettings::default(),
        };
    }
}

/// Value following a flag, parsed with `FromStr`.
fn value_of<T, I>(flag: &str, args: &mut I) -> Result<T>
where
    T: FromStr,
    I: Iterator<Item = String>,
{
    let value = args.next().ok_or_else(|| RenderError::MissingArgument(flag.to_string()))?;
    return value.parse::<T>().map_err(|_| RenderError::InvalidArgument {
        argument: flag.to_string(),
        value,
    });
}

/// Value following a flag that names a settings enumerant. Unknown names keep their own error.
fn enumerant_of<T, I>(flag: &str, args: &mut I) -> Result<T>
where
    T: FromStr<Err = RenderError>,
    I: Iterator<Item = String>,
{
    let value = args.next().ok_or_else(|| RenderError::MissingArgument(flag.to_string()))?;
    return value.parse::<T>();
}

impl Params {
    /// Parses command line arguments, program name excluded.
    pub fn from_args<I: Iterator<Item = String>>(mut args: I) -> Result<Params> {
        let mut params = Params::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-p" | "--assets" => { params.asset_dir = value_of::<PathBuf, _>(&arg, &mut args)?; }
                "--width" => { params.width = value_of(&arg, &mut args)?; }
                "--height" => { params.height = value_of(&arg, &mut args)?; }
                "--threads" => { params.threads = value_of(&arg, &mut args)?; }
                "--tile" => { params.tile_size = value_of(&arg, &mut args)?; }
                "--cull" => { params.settings.cull_mode = enumerant_of(&arg, &mut args)?; }
                "--shading" => { params.settings.shading_mode = enumerant_of(&arg, &mut args)?; }
                "--sampler" => { params.settings.address_mode = enumerant_of(&arg, &mut args)?; }
                "--fps" => { params.print_fps = true; }
                _ => { return Err(RenderError::UnknownArgument(arg.clone())); }
            }
        }

        let valid = 1..=MAX_DIMENSION;
        if !valid.contains(&params.width) || !valid.contains(&params.height) {
            return Err(RenderError::InvalidArgument {
                argument: String::from("--width/--height"),
                value: format!("{}x{}", params.width, params.height),
            });
        }
        return Ok(params);
    }
}
