//! Integration tests for the unordered disk exchange: write entities keyed by
//! external ids, read them back into a fresh store, check re-indexing.

use std::fs;

use weave_core::{
    DoubleVectorAttribute, EdgeBundle, Entity, EntityKind, Guid, StringAttribute, VertexSet,
};
use weave_graph::example::example_graph;
use weave_graph::EntityStore;
use weave_storage::{StorageError, UnorderedDisk};

#[test]
fn vertex_set_and_edges_survive_a_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let disk = UnorderedDisk::new(tmp.path());

    let mut store = EntityStore::new();
    let vs = store.insert(Entity::VertexSet(VertexSet {
        mapping: vec![900, 17, 4242],
    }));
    let es = store.insert(Entity::EdgeBundle(EdgeBundle {
        src: vec![0, 2, 1],
        dst: vec![1, 0, 1],
        edge_mapping: vec![5, 6, 7],
    }));

    assert_eq!(disk.write(&store, &vs, None, None).unwrap(), 3);
    assert_eq!(disk.write(&store, &es, Some(&vs), Some(&vs)).unwrap(), 3);
    assert!(disk.entity_dir(&vs).join("_SUCCESS").exists());

    let mut fresh = EntityStore::new();
    disk.read(&mut fresh, vs, EntityKind::VertexSet, None, None)
        .unwrap();
    disk.read(&mut fresh, es, EntityKind::EdgeBundle, Some(&vs), Some(&vs))
        .unwrap();

    assert_eq!(fresh.get(&vs).unwrap(), store.get(&vs).unwrap());
    assert_eq!(fresh.get(&es).unwrap(), store.get(&es).unwrap());
}

#[test]
fn example_graph_attributes_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let disk = UnorderedDisk::new(tmp.path());

    let mut store = EntityStore::new();
    let project = example_graph(&mut store);
    let vs = project.vertex_set;

    disk.write(&store, &vs, None, None).unwrap();
    let mut fresh = EntityStore::new();
    disk.read(&mut fresh, vs, EntityKind::VertexSet, None, None)
        .unwrap();

    for (name, guid) in &project.vertex_attributes {
        let kind = store.get(guid).unwrap().kind();
        disk.write(&store, guid, Some(&vs), None).unwrap();
        disk.read(&mut fresh, *guid, kind, Some(&vs), None).unwrap();
        assert_eq!(
            fresh.get(guid).unwrap(),
            store.get(guid).unwrap(),
            "attribute {} changed on the way through disk",
            name
        );
    }
}

#[test]
fn undefined_rows_stay_undefined() {
    let tmp = tempfile::tempdir().unwrap();
    let disk = UnorderedDisk::new(tmp.path());

    let mut store = EntityStore::new();
    let vs = store.insert(Entity::VertexSet(VertexSet {
        mapping: vec![3, 1, 2],
    }));
    let attr = store.insert(Entity::StringAttribute(StringAttribute {
        values: vec!["a".into(), String::new(), "c".into()],
        defined: vec![true, false, true],
    }));
    let embedding = store.insert(Entity::DoubleVectorAttribute(DoubleVectorAttribute {
        values: vec![vec![0.5, -1.0], Vec::new(), vec![2.0, 3.0]],
        defined: vec![true, false, true],
    }));

    assert_eq!(disk.write(&store, &attr, Some(&vs), None).unwrap(), 2);
    assert_eq!(disk.write(&store, &embedding, Some(&vs), None).unwrap(), 2);

    disk.read(&mut store, attr, EntityKind::StringAttribute, Some(&vs), None)
        .unwrap();
    disk.read(
        &mut store,
        embedding,
        EntityKind::DoubleVectorAttribute,
        Some(&vs),
        None,
    )
    .unwrap();

    match store.get(&embedding).unwrap() {
        Entity::DoubleVectorAttribute(a) => {
            assert_eq!(a.defined, vec![true, false, true]);
            assert_eq!(a.values[2], vec![2.0, 3.0]);
        }
        other => panic!("unexpected entity {:?}", other.kind()),
    }
}

#[test]
fn reading_with_a_different_vertex_set_reindexes() {
    let tmp = tempfile::tempdir().unwrap();
    let disk = UnorderedDisk::new(tmp.path());

    let mut store = EntityStore::new();
    let original = store.insert(Entity::VertexSet(VertexSet {
        mapping: vec![10, 20],
    }));
    let attr = store.insert(Entity::StringAttribute(StringAttribute {
        values: vec!["ten".into(), "twenty".into()],
        defined: vec![true, true],
    }));
    disk.write(&store, &attr, Some(&original), None).unwrap();

    // Same ids in the opposite order.
    let reversed = store.insert(Entity::VertexSet(VertexSet {
        mapping: vec![20, 10],
    }));
    let copy = Guid::new_v4();
    fs::rename(disk.entity_dir(&attr), disk.entity_dir(&copy)).unwrap();
    disk.read(&mut store, copy, EntityKind::StringAttribute, Some(&reversed), None)
        .unwrap();

    match store.get(&copy).unwrap() {
        Entity::StringAttribute(a) => assert_eq!(a.values, vec!["twenty", "ten"]),
        other => panic!("unexpected entity {:?}", other.kind()),
    }
}

#[test]
fn unknown_external_id_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let disk = UnorderedDisk::new(tmp.path());

    let mut store = EntityStore::new();
    let vs = store.insert(Entity::VertexSet(VertexSet {
        mapping: vec![1, 2],
    }));
    let es = store.insert(Entity::EdgeBundle(EdgeBundle {
        src: vec![0],
        dst: vec![1],
        edge_mapping: vec![0],
    }));
    disk.write(&store, &es, Some(&vs), Some(&vs)).unwrap();

    let smaller = store.insert(Entity::VertexSet(VertexSet { mapping: vec![1] }));
    let err = disk
        .read(&mut store, es, EntityKind::EdgeBundle, Some(&smaller), Some(&smaller))
        .unwrap_err();
    assert!(matches!(err, StorageError::UnknownId(2)), "got {:?}", err);
}

#[test]
fn missing_directory_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let disk = UnorderedDisk::new(tmp.path());
    let mut store = EntityStore::new();

    let result = disk.read(&mut store, Guid::new_v4(), EntityKind::VertexSet, None, None);
    assert!(result.is_err());
}

#[test]
fn directory_without_parts_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let disk = UnorderedDisk::new(tmp.path());
    let guid = Guid::new_v4();
    let dir = disk.entity_dir(&guid);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("_SUCCESS"), b"").unwrap();

    let mut store = EntityStore::new();
    let result = disk.read(&mut store, guid, EntityKind::VertexSet, None, None);
    assert!(matches!(result, Err(StorageError::NoParts(_))));
    assert!(!store.contains(&guid));
}
