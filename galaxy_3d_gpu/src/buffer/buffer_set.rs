/// Per-frame-in-flight buffer multiplexing.
///
/// A BufferSet holds one physical buffer per frame in flight for each
/// logical (set, binding) pair, so the CPU can fill frame N+1 while the GPU
/// still reads frame N. Entries are keyed by (frame, set, binding) and
/// iterate in that order.

use std::collections::BTreeMap;
use std::sync::Arc;
use crate::buffer::gpu_buffer::{GpuBuffer, BufferKindMarker, Uniform, Storage};
use crate::device::GraphicsDevice;
use crate::error::Result;
use crate::layout::BufferLayout;
use crate::{engine_contract, engine_contract_bail, engine_debug};

/// Address of one buffer in a set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub frame: u32,
    pub set: u32,
    pub binding: u32,
}

impl SlotKey {
    pub fn new(frame: u32, set: u32, binding: u32) -> Self {
        Self { frame, set, binding }
    }
}

pub type UniformBufferSet = BufferSet<Uniform>;
pub type StorageBufferSet = BufferSet<Storage>;

pub struct BufferSet<K: BufferKindMarker> {
    frames: u32,
    buffers: BTreeMap<SlotKey, GpuBuffer<K>>,
}

impl<K: BufferKindMarker> BufferSet<K> {
    pub fn new(frames: u32) -> Self {
        Self {
            frames,
            buffers: BTreeMap::new(),
        }
    }

    /// Number of frames in flight
    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Create one buffer per frame at (frame, set 0, binding)
    pub fn create_buffers(
        &mut self,
        device: &Arc<dyn GraphicsDevice>,
        size: u32,
        binding: u32,
        layout: &BufferLayout,
    ) -> Result<()> {
        for frame in 0..self.frames {
            let buffer = GpuBuffer::with_size(device.clone(), size, binding, layout)?;
            self.buffers.insert(SlotKey::new(frame, 0, binding), buffer);
        }
        engine_debug!(
            K::SET_SOURCE,
            "Created {} buffers of {} bytes at binding {}",
            self.frames,
            size.max(layout.stride()),
            binding
        );
        Ok(())
    }

    pub fn get(&self, binding: u32, set: u32, frame: u32) -> Result<&GpuBuffer<K>> {
        self.buffers
            .get(&SlotKey::new(frame, set, binding))
            .ok_or_else(|| Self::missing(binding, set, frame))
    }

    pub fn get_mut(&mut self, binding: u32, set: u32, frame: u32) -> Result<&mut GpuBuffer<K>> {
        self.buffers
            .get_mut(&SlotKey::new(frame, set, binding))
            .ok_or_else(|| Self::missing(binding, set, frame))
    }

    fn missing(binding: u32, set: u32, frame: u32) -> crate::error::Error {
        engine_contract!(
            K::SET_SOURCE,
            "No buffer at binding {} (set {}, frame {})",
            binding,
            set,
            frame
        )
    }

    /// Insert or replace the buffer at (frame, set, buffer.binding())
    pub fn set(&mut self, buffer: GpuBuffer<K>, set: u32, frame: u32) -> Result<()> {
        if frame >= self.frames {
            engine_contract_bail!(
                K::SET_SOURCE,
                "Frame {} out of range ({} frames in flight)",
                frame,
                self.frames
            );
        }
        self.buffers.insert(SlotKey::new(frame, set, buffer.binding()), buffer);
        Ok(())
    }

    // ===== ITERATION =====

    pub fn for_each<F: FnMut(&GpuBuffer<K>)>(&self, mut f: F) {
        for buffer in self.buffers.values() {
            f(buffer);
        }
    }

    pub fn for_each_mut<F: FnMut(&mut GpuBuffer<K>)>(&mut self, mut f: F) {
        for buffer in self.buffers.values_mut() {
            f(buffer);
        }
    }

    /// Like `for_each`, stopping at the first error
    pub fn try_for_each<F: FnMut(&GpuBuffer<K>) -> Result<()>>(&self, mut f: F) -> Result<()> {
        for buffer in self.buffers.values() {
            f(buffer)?;
        }
        Ok(())
    }

    /// Every (key, buffer) pair in (frame, set, binding) order
    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &GpuBuffer<K>)> {
        self.buffers.iter()
    }

    /// Buffers belonging to one frame, in (set, binding) order
    pub fn frame_buffers(&self, frame: u32) -> impl Iterator<Item = &GpuBuffer<K>> {
        self.buffers
            .range(SlotKey::new(frame, 0, 0)..=SlotKey::new(frame, u32::MAX, u32::MAX))
            .map(|(_, buffer)| buffer)
    }

    /// Upload staged writes of one frame; returns the number of uploads
    pub fn upload_frame(&mut self, frame: u32) -> Result<usize> {
        let mut uploaded = 0;
        let range = SlotKey::new(frame, 0, 0)..=SlotKey::new(frame, u32::MAX, u32::MAX);
        for (_, buffer) in self.buffers.range_mut(range) {
            if buffer.upload_if_dirty()? {
                uploaded += 1;
            }
        }
        Ok(uploaded)
    }

    /// Bindings present in (frame, set)
    pub fn bindings(&self, frame: u32, set: u32) -> Vec<u32> {
        self.buffers
            .range(SlotKey::new(frame, set, 0)..=SlotKey::new(frame, set, u32::MAX))
            .map(|(key, _)| key.binding)
            .collect()
    }

    /// True when every frame holds the same (set, binding) pairs
    pub fn is_consistent(&self) -> bool {
        let reference: Vec<(u32, u32)> = self
            .buffers
            .keys()
            .filter(|key| key.frame == 0)
            .map(|key| (key.set, key.binding))
            .collect();

        (1..self.frames).all(|frame| {
            let pairs: Vec<(u32, u32)> = self
                .buffers
                .keys()
                .filter(|key| key.frame == frame)
                .map(|key| (key.set, key.binding))
                .collect();
            pairs == reference
        }) && self.buffers.keys().all(|key| key.frame < self.frames)
    }

    // ===== RESIZE =====

    /// Resize (set, binding) in every frame
    pub fn resize(&mut self, binding: u32, set: u32, new_size: u32) -> Result<()> {
        if self.buffers.is_empty() {
            return Ok(());
        }
        for frame in 0..self.frames {
            self.get_mut(binding, set, frame)?.resize(new_size)?;
        }
        engine_debug!(K::SET_SOURCE, "Resized binding {} (set {}) to {} bytes", binding, set, new_size);
        Ok(())
    }
}

#[cfg(test)]
#[path = "buffer_set_tests.rs"]
mod tests;
