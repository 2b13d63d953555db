/// Tests for RendererConfig

use super::*;

#[test]
fn test_default_config_is_valid() {
    let config = RendererConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.buffer_count, 2);
    assert_eq!(config.handle_capacities.get(HandleKind::ShaderResource), 1024);
    assert_eq!(config.mipmap_shader, "genmipmap.hlsl");
}

#[test]
fn test_zero_buffer_count_rejected() {
    let config = RendererConfig { buffer_count: 0, ..Default::default() };
    assert!(matches!(config.validate(), Err(Error::InitializationFailed(_))));
}

#[test]
fn test_zero_capacity_rejected() {
    let mut config = RendererConfig::default();
    config.handle_capacities.sampler = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_surface_rejected() {
    let config = RendererConfig { width: 0, ..Default::default() };
    assert!(config.validate().is_err());
}

#[test]
fn test_uniform_capacities() {
    let caps = HandleCapacities::uniform(8);
    for kind in HandleKind::ALL {
        assert_eq!(caps.get(kind), 8);
    }
}
