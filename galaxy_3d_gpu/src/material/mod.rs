//! Shader-reflection-driven materials

pub mod material;
pub mod material_value;

pub use material::{Material, MaterialFlags};
pub use material_value::MaterialValue;
