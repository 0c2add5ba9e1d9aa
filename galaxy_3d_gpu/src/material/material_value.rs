/// Values a material property can hold.
///
/// Each type knows the shader uniform type it maps to and how it is laid
/// out in the material's shadow storage.

use bytemuck::Pod;
use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};
use crate::shader::ShaderUniformType;

pub trait MaterialValue: Sized {
    const UNIFORM_TYPE: ShaderUniformType;

    /// Write exactly `UNIFORM_TYPE.size()` bytes
    fn write_to(&self, out: &mut [u8]);

    /// Read from exactly `UNIFORM_TYPE.size()` bytes
    fn read_from(bytes: &[u8]) -> Self;
}

fn write_pod<T: Pod>(value: &T, out: &mut [u8]) {
    out.copy_from_slice(bytemuck::bytes_of(value));
}

macro_rules! pod_material_value {
    ($($ty:ty => $uniform:ident),* $(,)?) => {
        $(
            impl MaterialValue for $ty {
                const UNIFORM_TYPE: ShaderUniformType = ShaderUniformType::$uniform;

                fn write_to(&self, out: &mut [u8]) {
                    write_pod(self, out);
                }

                fn read_from(bytes: &[u8]) -> Self {
                    bytemuck::pod_read_unaligned(bytes)
                }
            }
        )*
    };
}

pod_material_value! {
    f32 => Float,
    i32 => Int,
    u32 => UInt,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    IVec2 => IVec2,
    IVec3 => IVec3,
    IVec4 => IVec4,
    Mat2 => Mat2,
    Mat3 => Mat3,
    Mat4 => Mat4,
}

// Booleans are stored as 32-bit 0 / 1
impl MaterialValue for bool {
    const UNIFORM_TYPE: ShaderUniformType = ShaderUniformType::Bool;

    fn write_to(&self, out: &mut [u8]) {
        write_pod(&u32::from(*self), out);
    }

    fn read_from(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned::<u32>(bytes) != 0
    }
}
