//! Shader programs and the reflection data materials bind against

pub mod shader_reflection;
pub mod shader;

pub use shader_reflection::{
    ShaderUniformType, ShaderUniform, ShaderBuffer, ShaderResourceDeclaration,
    ResourceDimension, ShaderReflection, ResolvedUniform,
};
pub use shader::{Shader, ReloadCallbackKey, ReloadCallback};
