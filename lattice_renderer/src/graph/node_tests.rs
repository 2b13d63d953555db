use super::*;

// ============================================================================
// Construction / validation
// ============================================================================

#[test]
fn test_new_nodes_are_pending() {
    let node: Node = RenderTargetNode::new("rt", 64, 32).unwrap().into();
    assert_eq!(node.state(), NodeState::Pending);
    assert!(node.is_dirty());
    assert_eq!(node.kind(), NodeKind::RenderTarget);
    assert_eq!(node.name(), "rt");
}

#[test]
fn test_zero_size_rejected() {
    assert!(RenderTargetNode::new("rt", 0, 32).is_err());
    assert!(ViewNode::new("view", 32, 0).is_err());
    assert!(TextureNode::new("tex", 0, 0, Vec::new()).is_err());
}

#[test]
fn test_empty_name_rejected() {
    assert!(DrawUnitNode::new("").is_err());
}

#[test]
fn test_texture_byte_count_validated() {
    assert!(TextureNode::new("tex", 2, 2, vec![0; 16]).is_ok());
    let result = TextureNode::new("tex", 2, 2, vec![0; 15]);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_texture_with_mipmaps_requests_generation() {
    let texture = TextureNode::new("tex", 4, 4, vec![0; 64]).unwrap();
    assert!(!texture.has_mip_chain());
    assert!(!texture.generate_mipmaps());

    let mut texture = texture.with_mipmaps();
    assert!(texture.has_mip_chain());
    assert!(texture.take_mipmap_request());
    assert!(!texture.generate_mipmaps());
}

#[test]
fn test_vertex_buffer_validation() {
    assert!(VertexBufferNode::new("vb", vec![0; 12], 0).is_err());
    assert!(VertexBufferNode::new("vb", vec![0; 13], 4).is_err());
    let vb = VertexBufferNode::new("vb", vec![0; 64], 32).unwrap();
    assert_eq!(vb.vertex_count(), 2);
}

#[test]
fn test_vertex_buffer_from_pod_slice() {
    let quad: [[f32; 8]; 4] = [[0.0; 8]; 4];
    let vb = VertexBufferNode::from_slice("rect", &quad).unwrap();
    assert_eq!(vb.stride(), 32);
    assert_eq!(vb.data().len(), 128);
    assert_eq!(vb.vertex_count(), 4);
}

// ============================================================================
// Draw unit
// ============================================================================

#[test]
fn test_draw_unit_defaults() {
    let unit = DrawUnitNode::new("rect").unwrap();
    assert_eq!(unit.topology(), PrimitiveTopology::TriangleStrip);
    assert_eq!(unit.input_layout(), &VertexLayout::position_uv_normal());
    assert_eq!(unit.transform(), Mat4::IDENTITY);
    assert!(unit.texture().is_none());
}

#[test]
fn test_draw_unit_transform() {
    let mut unit = DrawUnitNode::new("rect").unwrap();
    unit.set_position(Vec3::new(1.0, 2.0, 3.0));
    unit.set_scale(Vec3::splat(2.0));
    let p = unit.transform().transform_point3(Vec3::ONE);
    assert_eq!(p, Vec3::new(3.0, 4.0, 5.0));
}

#[test]
fn test_changing_shader_marks_unit_dirty() {
    let mut node: Node = DrawUnitNode::new("rect").unwrap().into();
    node.set_state(NodeState::Ready);
    if let Node::DrawUnit(unit) = &mut node {
        unit.set_shader("a.hlsl");
    }
    assert!(node.is_dirty());

    node.set_state(NodeState::Ready);
    if let Node::DrawUnit(unit) = &mut node {
        unit.set_shader("a.hlsl");
    }
    assert!(!node.is_dirty());
}

// ============================================================================
// View
// ============================================================================

#[test]
fn test_view_defaults() {
    let view = ViewNode::new("main", 720, 480).unwrap();
    assert_eq!(view.clear_color(), DEFAULT_CLEAR_COLOR);
    assert_eq!(view.order(), 0);
    assert!(view.render_target().is_none());
}

#[test]
fn test_view_units_keep_insertion_order() {
    let mut view = ViewNode::new("main", 720, 480).unwrap();
    view.add_unit("a");
    view.add_unit("b");
    view.add_unit("a");
    view.add_unit("c");
    assert_eq!(view.units(), ["a", "b", "c"]);

    assert!(view.remove_unit("b"));
    assert!(!view.remove_unit("b"));
    assert_eq!(view.units(), ["a", "c"]);
}

#[test]
fn test_node_kind_names() {
    assert_eq!(NodeKind::DrawUnit.as_str(), "DrawUnit");
    assert_eq!(NodeKind::View.as_str(), "View");
}
