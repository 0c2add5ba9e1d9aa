//! Unit tests for ShaderReflection lookups

use crate::shader::{
    ShaderReflection, ShaderBuffer, ShaderUniform, ShaderUniformType, ShaderResourceDeclaration,
    ResourceDimension,
};

fn reflection() -> ShaderReflection {
    ShaderReflection::new(
        vec![
            ShaderBuffer::packed(
                "Material",
                &[("u_Albedo", ShaderUniformType::Vec3), ("u_Metalness", ShaderUniformType::Float)],
            ),
            ShaderBuffer::packed("Object", &[("u_Transform", ShaderUniformType::Mat4)]),
        ],
        vec![
            ShaderResourceDeclaration::new("u_AlbedoTexture", 1, ResourceDimension::Texture2D),
            ShaderResourceDeclaration::new("u_EnvMap", 4, ResourceDimension::Texture3D),
        ],
    )
}

#[test]
fn test_uniform_type_sizes() {
    assert_eq!(ShaderUniformType::Bool.size(), 4);
    assert_eq!(ShaderUniformType::Mat2.size(), 16);
    assert_eq!(ShaderUniformType::Mat3.size(), 36);
    assert_eq!(ShaderUniformType::IVec3.size(), 12);
}

#[test]
fn test_packed_buffer_offsets_and_size() {
    let buffer = ShaderBuffer::packed(
        "B",
        &[("a", ShaderUniformType::Float), ("b", ShaderUniformType::Vec4)],
    );

    assert_eq!(buffer.uniforms[1].offset, 4);
    assert_eq!(buffer.size, 20);
}

#[test]
fn test_buffer_size_uses_furthest_uniform() {
    let buffer = ShaderBuffer::new(
        "Padded",
        vec![
            ShaderUniform::new("late", ShaderUniformType::Float, 28),
            ShaderUniform::new("early", ShaderUniformType::Vec4, 0),
        ],
    );
    assert_eq!(buffer.size, 32);
}

#[test]
fn test_uniform_offsets_span_buffers() {
    let reflection = reflection();

    assert_eq!(reflection.total_buffer_size(), 16 + 64);
    assert_eq!(reflection.uniform("u_Metalness").unwrap().offset, 12);
    let transform = reflection.uniform("u_Transform").unwrap();
    assert_eq!(transform.offset, 16);
    assert_eq!(transform.uniform_type, ShaderUniformType::Mat4);
    assert!(reflection.uniform("u_Missing").is_none());
}

#[test]
fn test_uniforms_lists_every_uniform_in_order() {
    let reflection = reflection();
    let names: Vec<&str> = reflection.uniforms().iter().map(|(n, _)| *n).collect::<Vec<_>>();
    assert_eq!(names, vec!["u_Albedo", "u_Metalness", "u_Transform"]);
}

#[test]
fn test_resource_lookup() {
    let reflection = reflection();

    let env = reflection.resource("u_EnvMap").unwrap();
    assert_eq!(env.register, 4);
    assert_eq!(env.dimension, ResourceDimension::Texture3D);
    assert_eq!(env.count, 1);
    assert!(reflection.resource("u_Albedo").is_none());
}
