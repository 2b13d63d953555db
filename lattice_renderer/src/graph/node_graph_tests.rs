use super::*;
use crate::graph::NodeState;

fn view(name: &str) -> Node {
    ViewNode::new(name, 64, 64).unwrap().into()
}

fn unit(name: &str) -> Node {
    DrawUnitNode::new(name).unwrap().into()
}

#[test]
fn test_insert_and_lookup() {
    let mut graph = NodeGraph::new();
    let (id, previous) = graph.insert(view("main"));
    assert!(previous.is_none());
    assert!(graph.contains("main"));
    assert_eq!(graph.id("main"), Some(id));
    assert_eq!(graph.len(), 1);
    assert_eq!(graph.node("main").unwrap().kind(), NodeKind::View);
}

#[test]
fn test_names_keep_insertion_order() {
    let mut graph = NodeGraph::new();
    graph.insert(unit("c"));
    graph.insert(unit("a"));
    graph.insert(unit("b"));
    assert_eq!(graph.names().collect::<Vec<_>>(), vec!["c", "a", "b"]);
}

#[test]
fn test_replace_keeps_id_and_position() {
    let mut graph = NodeGraph::new();
    let (first, _) = graph.insert(unit("a"));
    graph.insert(unit("b"));
    let (replaced, previous) = graph.insert(view("a"));

    assert_eq!(first, replaced);
    assert_eq!(previous.unwrap().kind(), NodeKind::DrawUnit);
    assert_eq!(graph.names().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(graph.node("a").unwrap().state(), NodeState::Pending);
}

#[test]
fn test_remove() {
    let mut graph = NodeGraph::new();
    graph.insert(unit("a"));
    graph.insert(unit("b"));

    let (_, removed) = graph.remove("a").unwrap();
    assert_eq!(removed.name(), "a");
    assert!(graph.remove("a").is_none());
    assert_eq!(graph.names().collect::<Vec<_>>(), vec!["b"]);
    assert_eq!(graph.ids().len(), 1);
}

#[test]
fn test_typed_accessors() {
    let mut graph = NodeGraph::new();
    graph.insert(view("main"));
    graph.insert(unit("rect"));

    graph.view_mut("main").unwrap().set_order(7);
    assert_eq!(graph.view("main").unwrap().order(), 7);
    graph.draw_unit_mut("rect").unwrap().set_vertex_count(4);
    assert_eq!(graph.draw_unit("rect").unwrap().vertex_count(), 4);
}

#[test]
fn test_typed_accessor_errors() {
    let mut graph = NodeGraph::new();
    graph.insert(unit("rect"));

    assert!(matches!(graph.view("missing"), Err(Error::NodeNotFound(_))));
    match graph.view_mut("rect") {
        Err(error) => assert_eq!(error.to_string(), "Node 'rect' is a DrawUnit (expected View)"),
        Ok(_) => panic!("expected a kind mismatch"),
    }
}

#[test]
fn test_views_in_insertion_order() {
    let mut graph = NodeGraph::new();
    graph.insert(view("v1"));
    graph.insert(unit("u"));
    graph.insert(view("v2"));
    let views = graph.views();
    let names: Vec<&str> = views.iter().map(|(_, v)| v.name()).collect();
    assert_eq!(names, vec!["v1", "v2"]);
}
