use super::*;
use lattice_renderer::context::HandlePools;
use lattice_renderer::lattice::device::{BufferUsage, SamplerFilter, TextureFormat};

fn texture_desc(label: &str, flags: TextureFlags, mip_levels: u32) -> TextureDesc {
    TextureDesc {
        label: label.to_string(),
        width: 16,
        height: 16,
        format: TextureFormat::R8G8B8A8_UNORM,
        flags,
        mip_levels,
        initial_state: ResourceState::Common,
    }
}

#[test]
fn test_descriptor_tables_are_disjoint() {
    let mut device = HeadlessDevice::new();
    let rtv = device.create_descriptor_table(HandleKind::RenderTarget, 8).unwrap();
    let srv = device.create_descriptor_table(HandleKind::ShaderResource, 8).unwrap();

    assert_ne!(rtv.cpu_base, srv.cpu_base);
    assert_eq!(rtv.gpu_base, GpuLocation(0));
    assert_ne!(srv.gpu_base, GpuLocation(0));
    assert_eq!(srv.stride, DESCRIPTOR_STRIDE);
}

#[test]
fn test_write_view_checks_usage_and_mip_range() {
    let mut device = HeadlessDevice::new();
    let mut pools = HandlePools::new(|kind| device.create_descriptor_table(kind, 8)).unwrap();
    let texture = device.create_texture(&texture_desc("tex", TextureFlags::SHADER_RESOURCE, 2)).unwrap();

    let srv = pools.get_mut(HandleKind::ShaderResource).try_alloc().unwrap();
    assert!(device
        .write_view(&ViewDesc::ShaderResource { texture: texture.as_ref(), mip_level: 1 }, &srv)
        .is_ok());
    assert!(device
        .write_view(&ViewDesc::ShaderResource { texture: texture.as_ref(), mip_level: 2 }, &srv)
        .is_err());

    let rtv = pools.get_mut(HandleKind::RenderTarget).try_alloc().unwrap();
    assert!(device
        .write_view(&ViewDesc::RenderTarget { texture: texture.as_ref(), mip_level: 0 }, &rtv)
        .is_err());

    // Kind of the view must match the handle
    assert!(device.write_view(&ViewDesc::Sampler { filter: SamplerFilter::Linear }, &srv).is_err());
}

#[test]
fn test_manual_completion_holds_fences() {
    let mut device = HeadlessDevice::with_manual_completion();
    let controller = device.controller();
    let fence = device.create_fence(0).unwrap();
    let mut cmd = device.create_command_list().unwrap();

    for value in 1..=2 {
        cmd.begin().unwrap();
        cmd.end().unwrap();
        device.submit(cmd.as_mut(), fence.as_ref(), value).unwrap();
    }
    assert_eq!(fence.completed_value(), 0);
    assert_eq!(controller.pending(), 2);

    assert_eq!(controller.complete_next(), Some(1));
    assert_eq!(fence.completed_value(), 1);
    controller.complete_all();
    assert_eq!(fence.completed_value(), 2);
    assert_eq!(controller.complete_next(), None);
}

#[test]
fn test_submit_rejects_recording_list() {
    let mut device = HeadlessDevice::new();
    let fence = device.create_fence(0).unwrap();
    let mut cmd = device.create_command_list().unwrap();
    cmd.begin().unwrap();
    assert!(device.submit(cmd.as_mut(), fence.as_ref(), 1).is_err());
}

#[test]
fn test_lost_device_reports_device_lost() {
    let mut device = HeadlessDevice::new();
    let controller = device.controller();
    controller.lose_device("hung");

    assert!(device.device_status().unwrap_err().is_device_lost());
    let result = device.create_buffer(&BufferDesc { label: "b".to_string(), size: 4, usage: BufferUsage::Vertex });
    assert!(matches!(result, Err(Error::DeviceLost(reason)) if reason == "hung"));
}

#[test]
fn test_dropped_resources_leave_registry() {
    let mut device = HeadlessDevice::new();
    let controller = device.controller();
    let buffer = device
        .create_buffer(&BufferDesc { label: "b".to_string(), size: 4, usage: BufferUsage::Vertex })
        .unwrap();
    let texture = device.create_texture(&texture_desc("t", TextureFlags::SHADER_RESOURCE, 1)).unwrap();
    assert_eq!(controller.live_resources(), 2);

    drop(buffer);
    drop(texture);
    assert_eq!(controller.live_resources(), 0);
    assert_eq!(controller.stats().buffers_created, 1);
}

#[test]
fn test_swapchain_back_buffers_start_presentable() {
    let mut device = HeadlessDevice::new();
    let controller = device.controller();
    let mut swapchain = device
        .create_swapchain(
            SurfaceHandle::Headless,
            &SwapchainDesc { width: 4, height: 4, buffer_count: 3, format: TextureFormat::R8G8B8A8_UNORM },
        )
        .unwrap();

    for expected in [1, 2, 0] {
        swapchain.present().unwrap();
        assert_eq!(swapchain.current_index(), expected);
    }
    assert_eq!(controller.presents(), 3);
    assert_eq!(controller.read_texture("backbuffer2", 0).unwrap().len(), 4 * 4 * 4);
}
