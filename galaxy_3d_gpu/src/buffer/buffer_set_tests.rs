//! Unit tests for BufferSet

use std::sync::Arc;
use crate::buffer::{UniformBufferSet, StorageBufferSet, UniformBuffer, SlotKey};
use crate::device::{GraphicsDevice, HeadlessDevice};
use crate::error::Error;
use crate::layout::{BufferLayout, FieldDesc, FieldType};

fn devices() -> (Arc<HeadlessDevice>, Arc<dyn GraphicsDevice>) {
    let headless = Arc::new(HeadlessDevice::default());
    let device: Arc<dyn GraphicsDevice> = headless.clone();
    (headless, device)
}

fn abc() -> BufferLayout {
    BufferLayout::new(&[
        FieldDesc::new("A", FieldType::Float),
        FieldDesc::new("B", FieldType::Float3),
        FieldDesc::new("C", FieldType::Mat4),
    ])
}

// ============================================================================
// CREATE / GET TESTS
// ============================================================================

#[test]
fn test_create_buffers_one_per_frame() {
    let (_headless, device) = devices();
    let mut set = UniformBufferSet::new(2);
    set.create_buffers(&device, 80, 3, &abc()).unwrap();

    let frame0 = set.get(3, 0, 0).unwrap();
    let frame1 = set.get(3, 0, 1).unwrap();

    assert_ne!(frame0.handle(), frame1.handle());
    assert_eq!(frame0.binding(), 3);
    assert_eq!(frame1.binding(), 3);
    assert_eq!(frame0.size(), 80);
    assert_eq!(frame1.size(), 80);
    assert_eq!(set.len(), 2);
}

#[test]
fn test_get_returns_queried_binding_for_every_tuple() {
    let (_headless, device) = devices();
    let mut set = UniformBufferSet::new(3);
    for binding in [0, 1, 7] {
        set.create_buffers(&device, 0, binding, &abc()).unwrap();
    }

    for frame in 0..3 {
        for binding in [0, 1, 7] {
            assert_eq!(set.get(binding, 0, frame).unwrap().binding(), binding);
        }
    }
}

#[test]
fn test_get_missing_tuple_is_contract_violation() {
    let (_headless, device) = devices();
    let mut set = UniformBufferSet::new(2);
    set.create_buffers(&device, 0, 3, &abc()).unwrap();

    assert!(matches!(set.get(4, 0, 0), Err(Error::ContractViolation(_))));
    assert!(matches!(set.get(3, 1, 0), Err(Error::ContractViolation(_))));
    assert!(matches!(set.get_mut(3, 0, 2), Err(Error::ContractViolation(_))));
}

#[test]
fn test_frames_write_independently() {
    let (_headless, device) = devices();
    let mut set = UniformBufferSet::new(2);
    set.create_buffers(&device, 0, 0, &abc()).unwrap();

    set.get_mut(0, 0, 1).unwrap().set_value("A", &4.0f32).unwrap();

    assert_eq!(set.get(0, 0, 0).unwrap().get_value::<f32>("A"), Some(0.0));
    assert_eq!(set.get(0, 0, 1).unwrap().get_value::<f32>("A"), Some(4.0));
}

// ============================================================================
// SET TESTS
// ============================================================================

#[test]
fn test_set_overwrites_at_buffer_binding() {
    let (headless, device) = devices();
    let mut set = UniformBufferSet::new(2);
    set.create_buffers(&device, 0, 5, &abc()).unwrap();

    let replacement = UniformBuffer::with_size(device.clone(), 128, 5, &abc()).unwrap();
    set.set(replacement, 0, 1).unwrap();

    assert_eq!(set.get(5, 0, 1).unwrap().size(), 128);
    assert_eq!(set.len(), 2);
    // The replaced buffer was dropped
    assert_eq!(headless.live_buffer_count(), 2);
}

#[test]
fn test_set_frame_out_of_range_is_rejected() {
    let (_headless, device) = devices();
    let mut set = UniformBufferSet::new(2);
    let buffer = UniformBuffer::create(device, &abc(), 0).unwrap();

    assert!(matches!(set.set(buffer, 0, 2), Err(Error::ContractViolation(_))));
    assert!(set.is_empty());
}

// ============================================================================
// ITERATION TESTS
// ============================================================================

#[test]
fn test_iteration_order_is_frame_set_binding() {
    let (_headless, device) = devices();
    let mut set = UniformBufferSet::new(2);
    set.create_buffers(&device, 0, 2, &abc()).unwrap();
    set.create_buffers(&device, 0, 1, &abc()).unwrap();
    set.set(UniformBuffer::create(device.clone(), &abc(), 0).unwrap(), 1, 0).unwrap();

    let keys: Vec<SlotKey> = set.iter().map(|(key, _)| *key).collect();
    assert_eq!(
        keys,
        vec![
            SlotKey::new(0, 0, 1),
            SlotKey::new(0, 0, 2),
            SlotKey::new(0, 1, 0),
            SlotKey::new(1, 0, 1),
            SlotKey::new(1, 0, 2),
        ]
    );

    let mut bindings = Vec::new();
    set.for_each(|buffer| bindings.push(buffer.binding()));
    assert_eq!(bindings, vec![1, 2, 0, 1, 2]);
}

#[test]
fn test_frame_buffers_and_bindings() {
    let (_headless, device) = devices();
    let mut set = StorageBufferSet::new(3);
    set.create_buffers(&device, 0, 4, &abc()).unwrap();
    set.create_buffers(&device, 0, 6, &abc()).unwrap();

    assert_eq!(set.frame_buffers(1).count(), 2);
    assert_eq!(set.bindings(2, 0), vec![4, 6]);
    assert!(set.bindings(2, 1).is_empty());
}

#[test]
fn test_upload_frame_only_touches_that_frame() {
    let (headless, device) = devices();
    let mut set = UniformBufferSet::new(2);
    set.create_buffers(&device, 0, 0, &abc()).unwrap();
    set.for_each_mut(|buffer| {
        buffer.write_data(&[1, 0, 0, 0], 0).unwrap();
    });

    assert_eq!(set.upload_frame(0).unwrap(), 1);
    assert_eq!(set.upload_frame(0).unwrap(), 0);

    let frame0 = set.get(0, 0, 0).unwrap();
    let frame1 = set.get(0, 0, 1).unwrap();
    assert_eq!(headless.buffer_contents(frame0.handle()).unwrap()[0], 1);
    assert_eq!(headless.buffer_contents(frame1.handle()).unwrap()[0], 0);
    assert!(frame1.is_dirty());
}

#[test]
fn test_try_for_each_stops_on_error() {
    let (_headless, device) = devices();
    let mut set = UniformBufferSet::new(3);
    set.create_buffers(&device, 0, 0, &abc()).unwrap();

    let mut visited = 0;
    let result = set.try_for_each(|_| {
        visited += 1;
        if visited == 2 {
            return Err(Error::OutOfMemory);
        }
        Ok(())
    });

    assert_eq!(result, Err(Error::OutOfMemory));
    assert_eq!(visited, 2);
}

#[test]
fn test_is_consistent() {
    let (_headless, device) = devices();
    let mut set = UniformBufferSet::new(2);
    set.create_buffers(&device, 0, 0, &abc()).unwrap();
    assert!(set.is_consistent());

    set.set(UniformBuffer::create(device, &abc(), 9).unwrap(), 0, 1).unwrap();
    assert!(!set.is_consistent());
}

// ============================================================================
// RESIZE TESTS
// ============================================================================

#[test]
fn test_resize_fans_out_to_every_frame() {
    let (_headless, device) = devices();
    let mut set = StorageBufferSet::new(3);
    set.create_buffers(&device, 0, 2, &abc()).unwrap();

    set.resize(2, 0, 512).unwrap();

    for frame in 0..3 {
        assert_eq!(set.get(2, 0, frame).unwrap().size(), 512);
    }
}

#[test]
fn test_resize_empty_set_is_noop() {
    let mut set = StorageBufferSet::new(3);
    assert!(set.resize(2, 0, 512).is_ok());
}

#[test]
fn test_resize_missing_frame_is_contract_violation() {
    let (_headless, device) = devices();
    let mut set = StorageBufferSet::new(2);
    set.set(
        crate::buffer::StorageBuffer::create(device, &abc(), 1).unwrap(),
        0,
        0,
    )
    .unwrap();

    assert!(matches!(set.resize(1, 0, 128), Err(Error::ContractViolation(_))));
}
