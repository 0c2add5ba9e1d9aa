//! Unit tests for Framebuffer

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU32, Ordering};
use crate::device::{GraphicsDevice, HeadlessDevice, HeadlessDeviceConfig, ImageDesc, TextureFormat, Extent2D};
use crate::error::Error;
use crate::framebuffer::{Framebuffer, FramebufferSpec, FramebufferTextureSpec};

// ============================================================================
// TEST HELPERS
// ============================================================================

fn devices() -> (Arc<HeadlessDevice>, Arc<dyn GraphicsDevice>) {
    let headless = Arc::new(HeadlessDevice::default());
    let device: Arc<dyn GraphicsDevice> = headless.clone();
    (headless, device)
}

fn spec(formats: &[TextureFormat]) -> FramebufferSpec {
    FramebufferSpec {
        attachments: formats.iter().map(|f| FramebufferTextureSpec::new(*f)).collect(),
        debug_name: "test".to_string(),
        ..Default::default()
    }
}

fn window() -> Extent2D {
    Extent2D::new(800, 600)
}

// ============================================================================
// CREATION TESTS
// ============================================================================

#[test]
fn test_create_partitions_color_and_depth() {
    let (headless, device) = devices();
    let fb = Framebuffer::create(
        device,
        spec(&[TextureFormat::R8G8B8A8_UNORM, TextureFormat::DEPTH, TextureFormat::R32_SINT]),
        &window(),
    )
    .unwrap();

    assert_eq!(fb.color_attachment_count(), 2);
    assert!(fb.has_depth_attachment());
    assert_eq!(headless.live_image_count(), 3);

    let first = headless.image_info(fb.image(0).unwrap()).unwrap();
    let second = headless.image_info(fb.image(1).unwrap()).unwrap();
    assert_eq!(first.format, TextureFormat::R8G8B8A8_UNORM);
    assert_eq!(second.format, TextureFormat::R32_SINT);
    assert_eq!(
        headless.image_info(fb.depth_image().unwrap()).unwrap().format,
        TextureFormat::DEPTH
    );
}

#[test]
fn test_zero_dimensions_take_surface_extent_independently() {
    let (_headless, device) = devices();
    let mut fb_spec = spec(&[TextureFormat::R8G8B8A8_UNORM]);
    fb_spec.width = 256;

    let fb = Framebuffer::create(device, fb_spec, &window()).unwrap();

    assert_eq!(fb.width(), 256);
    assert_eq!(fb.height(), 600);
    assert_eq!(fb.generation(), 1);
}

#[test]
fn test_create_without_attachments_is_rejected() {
    let (_headless, device) = devices();
    let result = Framebuffer::create(device, spec(&[]), &window());
    assert!(matches!(result, Err(Error::ContractViolation(_))));
}

#[test]
fn test_create_with_two_depth_attachments_is_rejected() {
    let (_headless, device) = devices();
    let result = Framebuffer::create(
        device,
        spec(&[TextureFormat::D32_FLOAT, TextureFormat::DEPTH]),
        &window(),
    );
    assert!(matches!(result, Err(Error::ContractViolation(_))));
}

#[test]
fn test_create_against_minimised_surface_is_rejected() {
    let (_headless, device) = devices();
    let result = Framebuffer::create(device, spec(&[TextureFormat::R8_UNORM]), &Extent2D::new(0, 0));
    assert!(matches!(result, Err(Error::ContractViolation(_))));
}

#[test]
fn test_create_out_of_memory_releases_partial_images() {
    let headless = Arc::new(HeadlessDevice::new(HeadlessDeviceConfig {
        memory_budget: Some(800 * 600 * 4),
        ..Default::default()
    }));
    let device: Arc<dyn GraphicsDevice> = headless.clone();

    let result = Framebuffer::create(
        device,
        spec(&[TextureFormat::R8G8B8A8_UNORM, TextureFormat::R8G8B8A8_UNORM]),
        &window(),
    );

    assert!(matches!(result, Err(Error::DeviceResource(_))));
    assert_eq!(headless.live_image_count(), 0);
}

// ============================================================================
// RESIZE TESTS
// ============================================================================

#[test]
fn test_resize_twice_rebuilds_once() {
    let (headless, device) = devices();
    let mut fb = Framebuffer::create(device, spec(&[TextureFormat::R8G8B8A8_UNORM]), &window()).unwrap();
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    fb.add_resize_callback(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let created_before = headless.stats().images_created;

    assert!(fb.resize(1024, 768, false).unwrap());
    assert!(!fb.resize(1024, 768, false).unwrap());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(headless.stats().images_created, created_before + 1);
    assert_eq!(fb.generation(), 2);
}

#[test]
fn test_force_resize_rebuilds_same_size() {
    let (_headless, device) = devices();
    let mut fb = Framebuffer::create(device, spec(&[TextureFormat::R8G8B8A8_UNORM]), &window()).unwrap();
    let old = fb.image(0).unwrap();

    assert!(fb.resize(800, 600, true).unwrap());
    assert_ne!(fb.image(0).unwrap(), old);
}

#[test]
fn test_no_resize_ignores_unforced_resize() {
    let (_headless, device) = devices();
    let mut fb_spec = spec(&[TextureFormat::R8G8B8A8_UNORM]);
    fb_spec.no_resize = true;
    let mut fb = Framebuffer::create(device, fb_spec, &window()).unwrap();

    assert!(!fb.resize(1024, 768, false).unwrap());
    assert_eq!(fb.width(), 800);

    assert!(fb.resize(1024, 768, true).unwrap());
    assert_eq!(fb.width(), 1024);
}

#[test]
fn test_resize_to_zero_is_contract_violation() {
    let (_headless, device) = devices();
    let mut fb = Framebuffer::create(device, spec(&[TextureFormat::R8_UNORM]), &window()).unwrap();

    assert!(matches!(fb.resize(0, 600, true), Err(Error::ContractViolation(_))));
    assert_eq!(fb.generation(), 1);
}

#[test]
fn test_resize_releases_old_images() {
    let (headless, device) = devices();
    let mut fb = Framebuffer::create(
        device,
        spec(&[TextureFormat::R8G8B8A8_UNORM, TextureFormat::DEPTH]),
        &window(),
    )
    .unwrap();

    fb.resize(320, 240, false).unwrap();

    assert_eq!(headless.live_image_count(), 2);
    assert_eq!(headless.memory_used(), 2 * 320 * 240 * 4);
}

#[test]
fn test_failed_resize_can_be_retried_at_same_size() {
    let headless = Arc::new(HeadlessDevice::new(HeadlessDeviceConfig {
        memory_budget: Some(2 * 100 * 100 * 4),
        ..Default::default()
    }));
    let device: Arc<dyn GraphicsDevice> = headless.clone();
    let occupant = device
        .create_image(&ImageDesc::new_2d(TextureFormat::R8G8B8A8_UNORM, 100, 100))
        .unwrap();
    let mut fb = Framebuffer::create(
        device.clone(),
        spec(&[TextureFormat::R8G8B8A8_UNORM, TextureFormat::R8G8B8A8_UNORM]),
        &Extent2D::new(16, 16),
    )
    .unwrap();

    // Second attachment does not fit next to the occupant
    assert!(matches!(fb.resize(100, 100, false), Err(Error::DeviceResource(_))));
    assert!(!fb.is_built());
    assert!(fb.image(0).is_err());
    assert_eq!(headless.live_image_count(), 1);
    assert_eq!(fb.generation(), 1);

    device.destroy_image(occupant).unwrap();

    assert!(fb.resize(100, 100, false).unwrap());
    assert!(fb.is_built());
    assert_eq!((fb.width(), fb.height()), (100, 100));
    assert!(fb.image(1).is_ok());
    assert_eq!(headless.live_image_count(), 2);
    assert_eq!(fb.generation(), 2);
}

#[test]
fn test_scale_applies_to_images() {
    let (headless, device) = devices();
    let mut fb_spec = spec(&[TextureFormat::R8G8B8A8_UNORM]);
    fb_spec.scale = 0.5;
    let fb = Framebuffer::create(device, fb_spec, &window()).unwrap();

    let info = headless.image_info(fb.image(0).unwrap()).unwrap();
    assert_eq!((info.width, info.height), (400, 300));
    assert_eq!((fb.width(), fb.height()), (800, 600));
}

#[test]
fn test_callback_sees_rebuilt_framebuffer() {
    let (_headless, device) = devices();
    let mut fb = Framebuffer::create(device, spec(&[TextureFormat::R8_UNORM]), &window()).unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    fb.add_resize_callback(move |fb| {
        sink.lock().unwrap().push((fb.width(), fb.height(), fb.generation()));
    });

    fb.resize(640, 480, false).unwrap();
    fb.resize(320, 240, false).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![(640, 480, 2), (320, 240, 3)]);
}

// ============================================================================
// ATTACHMENT OPERATION TESTS
// ============================================================================

#[test]
fn test_clear_and_read_pixel() {
    let (_headless, device) = devices();
    let fb = Framebuffer::create(
        device,
        spec(&[TextureFormat::R8G8B8A8_UNORM, TextureFormat::R32_SINT]),
        &window(),
    )
    .unwrap();

    fb.clear_attachment(1, -1).unwrap();

    assert_eq!(fb.read_pixel(1, 10, 20).unwrap(), -1);
    assert_eq!(fb.read_pixel(0, 10, 20).unwrap(), 0);
}

#[test]
fn test_bind_texture_binds_color_attachment() {
    let (headless, device) = devices();
    let fb = Framebuffer::create(device, spec(&[TextureFormat::R8G8B8A8_UNORM]), &window()).unwrap();

    fb.bind_texture(0, 4).unwrap();

    assert_eq!(headless.bound_image(4), Some(fb.image(0).unwrap()));
}

#[test]
fn test_attachment_index_out_of_range() {
    let (_headless, device) = devices();
    let fb = Framebuffer::create(
        device,
        spec(&[TextureFormat::R8G8B8A8_UNORM, TextureFormat::DEPTH]),
        &window(),
    )
    .unwrap();

    assert!(matches!(fb.bind_texture(1, 0), Err(Error::ContractViolation(_))));
    assert!(matches!(fb.clear_attachment(2, 0), Err(Error::ContractViolation(_))));
    assert!(matches!(fb.read_pixel(1, 0, 0), Err(Error::ContractViolation(_))));
    assert!(fb.image(1).is_err());
}

#[test]
fn test_drop_releases_all_images() {
    let (headless, device) = devices();
    {
        let _fb = Framebuffer::create(
            device,
            spec(&[TextureFormat::R8G8B8A8_UNORM, TextureFormat::DEPTH]),
            &window(),
        )
        .unwrap();
    }
    assert_eq!(headless.live_image_count(), 0);
}
