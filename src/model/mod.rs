//! Data structures representing loaded XAML scenes

mod config;
mod core;
mod light;
mod material;

pub use config::ParserConfig;
pub use core::{Face, LoadedScene, Mesh, SceneGroup, SceneNode, Transform};
pub use light::{Camera, Light};
pub use material::{Color, MaterialParams, Texture, TextureMap, next_power_of_two};
