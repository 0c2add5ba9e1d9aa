//! Layout-driven GPU buffers and their per-frame-in-flight sets

pub mod gpu_buffer;
pub mod buffer_set;

pub use gpu_buffer::{GpuBuffer, BufferKindMarker, Uniform, Storage, UniformBuffer, StorageBuffer};
pub use buffer_set::{BufferSet, SlotKey, UniformBufferSet, StorageBufferSet};
