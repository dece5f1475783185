use lazytask_core::{DirectedEdges, EntityKey, EntityStore, ModelError, RelationSlot};

fn tasks(store: &mut EntityStore, count: usize) -> Vec<EntityKey> {
    (0..count)
        .map(|idx| store.create_task(format!("task {idx}")).unwrap())
        .collect()
}

fn depends(store: &mut EntityStore, dependant: EntityKey, dependee: EntityKey) {
    store
        .add(dependant, RelationSlot::TaskDependees, dependee)
        .unwrap();
}

#[test]
fn task_without_edges_has_no_cycle() {
    let mut store = EntityStore::new();
    let task = store.create_task("alone").unwrap();
    assert!(!store.contains_dependency_cycle(task).unwrap());
}

#[test]
fn self_dependency_is_a_cycle() {
    let mut store = EntityStore::new();
    let task = store.create_task("loop").unwrap();
    depends(&mut store, task, task);
    assert!(store.contains_dependency_cycle(task).unwrap());
}

#[test]
fn two_node_cycle_is_detected_from_both_ends() {
    let mut store = EntityStore::new();
    let nodes = tasks(&mut store, 2);
    depends(&mut store, nodes[0], nodes[1]);
    depends(&mut store, nodes[1], nodes[0]);

    for node in nodes {
        assert!(store.contains_dependency_cycle(node).unwrap());
    }
}

#[test]
fn six_node_ring_is_detected_from_every_node() {
    let mut store = EntityStore::new();
    let nodes = tasks(&mut store, 6);
    for idx in 0..nodes.len() {
        depends(&mut store, nodes[idx], nodes[(idx + 1) % nodes.len()]);
    }

    for node in &nodes {
        assert!(store.contains_dependency_cycle(*node).unwrap());
    }
}

#[test]
fn diamond_is_acyclic_for_every_node() {
    let mut store = EntityStore::new();
    let nodes = tasks(&mut store, 4);
    let (a, b, c, d) = (nodes[0], nodes[1], nodes[2], nodes[3]);
    depends(&mut store, a, b);
    depends(&mut store, a, c);
    depends(&mut store, b, d);
    depends(&mut store, c, d);

    for node in nodes {
        assert!(!store.contains_dependency_cycle(node).unwrap());
    }
}

#[test]
fn wide_layered_graph_finishes_and_finds_back_edge() {
    // Every node of a layer depends on every node of the next layer; without
    // a visited set the number of paths explodes.
    let mut store = EntityStore::new();
    let layers: Vec<Vec<EntityKey>> = (0..12).map(|_| tasks(&mut store, 4)).collect();
    for window in layers.windows(2) {
        for from in &window[0] {
            for to in &window[1] {
                depends(&mut store, *from, *to);
            }
        }
    }
    let root = layers[0][0];
    assert!(!store.contains_dependency_cycle(root).unwrap());

    let last = layers[layers.len() - 1][3];
    depends(&mut store, last, root);
    assert!(store.contains_dependency_cycle(root).unwrap());
}

#[test]
fn priority_edges_use_their_own_graph() {
    let mut store = EntityStore::new();
    let nodes = tasks(&mut store, 3);
    for idx in 0..nodes.len() {
        store
            .add(
                nodes[idx],
                RelationSlot::TaskPrioritizedOver,
                nodes[(idx + 1) % nodes.len()],
            )
            .unwrap();
    }

    assert!(store.contains_priority_cycle(nodes[0]).unwrap());
    assert!(!store.contains_dependency_cycle(nodes[0]).unwrap());
    assert!(store
        .contains(nodes[1], RelationSlot::TaskPrioritizedUnder, nodes[0])
        .unwrap());
}

#[test]
fn non_task_start_is_rejected() {
    let mut store = EntityStore::new();
    let tag = store.create_tag("x").unwrap();
    let err = store
        .contains_cycle(tag, DirectedEdges::Dependency)
        .unwrap_err();
    assert!(matches!(err, ModelError::MissingCounterpart { .. }));
}
