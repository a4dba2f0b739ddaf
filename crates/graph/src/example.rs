//! The small demo graph used by tests and the `ExampleGraph` operation.
//!
//! Four people, four directed edges. "Isolated Joe" has no edges at all,
//! so he is a dead end for random walks.

use weave_core::{
    DoubleAttribute, DoubleTuple2Attribute, EdgeBundle, Entity, StringAttribute, VertexSet,
};

use crate::project::Project;
use crate::store::EntityStore;

const NAMES: [&str; 4] = ["Adam", "Eve", "Bob", "Isolated Joe"];
const AGES: [f64; 4] = [20.3, 18.2, 50.3, 2.0];
const GENDERS: [&str; 4] = ["Male", "Female", "Male", "Male"];
const LOCATIONS: [(f64, f64); 4] = [
    (40.71448, -74.00598),
    (47.5269674, 19.0323968),
    (1.352083, 103.819836),
    (-33.8674869, 151.2069902),
];
const EDGES: [(usize, usize); 4] = [(0, 1), (1, 0), (2, 0), (2, 1)];
const WEIGHTS: [f64; 4] = [1.0, 2.0, 3.0, 4.0];
const COMMENTS: [&str; 4] = ["Adam loves Eve", "Eve loves Adam", "Bob envies Adam", "Bob loves Eve"];

fn vertex_set() -> Entity {
    Entity::VertexSet(VertexSet::with_len(NAMES.len()))
}

fn edge_bundle() -> Entity {
    Entity::EdgeBundle(EdgeBundle {
        src: EDGES.iter().map(|&(s, _)| s).collect(),
        dst: EDGES.iter().map(|&(_, d)| d).collect(),
        edge_mapping: (0..EDGES.len() as i64).collect(),
    })
}

fn vertex_attributes() -> Vec<(&'static str, Entity)> {
    let defined = vec![true; NAMES.len()];
    vec![
        (
            "name",
            Entity::StringAttribute(StringAttribute {
                values: NAMES.iter().map(|s| s.to_string()).collect(),
                defined: defined.clone(),
            }),
        ),
        (
            "age",
            Entity::DoubleAttribute(DoubleAttribute {
                values: AGES.to_vec(),
                defined: defined.clone(),
            }),
        ),
        (
            "gender",
            Entity::StringAttribute(StringAttribute {
                values: GENDERS.iter().map(|s| s.to_string()).collect(),
                defined: defined.clone(),
            }),
        ),
        (
            "location",
            Entity::DoubleTuple2Attribute(DoubleTuple2Attribute {
                values1: LOCATIONS.iter().map(|&(lat, _)| lat).collect(),
                values2: LOCATIONS.iter().map(|&(_, lon)| lon).collect(),
                defined,
            }),
        ),
    ]
}

fn edge_attributes() -> Vec<(&'static str, Entity)> {
    let defined = vec![true; EDGES.len()];
    vec![
        (
            "weight",
            Entity::DoubleAttribute(DoubleAttribute {
                values: WEIGHTS.to_vec(),
                defined: defined.clone(),
            }),
        ),
        (
            "comment",
            Entity::StringAttribute(StringAttribute {
                values: COMMENTS.iter().map(|s| s.to_string()).collect(),
                defined,
            }),
        ),
    ]
}

/// Every entity of the example graph, keyed by output name
/// (`vs`, `es`, then vertex and edge attributes).
pub fn example_graph_entities() -> Vec<(&'static str, Entity)> {
    let mut entities = vec![("vs", vertex_set()), ("es", edge_bundle())];
    entities.extend(vertex_attributes());
    entities.extend(edge_attributes());
    entities
}

/// Insert the example graph into `store` and describe it as a project.
pub fn example_graph(store: &mut EntityStore) -> Project {
    let mut project = Project::new(store.insert(vertex_set()));
    project.edge_bundle = Some(store.insert(edge_bundle()));

    for (name, entity) in vertex_attributes() {
        project
            .vertex_attributes
            .insert(name.to_string(), store.insert(entity));
    }
    for (name, entity) in edge_attributes() {
        project
            .edge_attributes
            .insert(name.to_string(), store.insert(entity));
    }
    project
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_graph_shape() {
        let mut store = EntityStore::new();
        let project = example_graph(&mut store);

        assert_eq!(project.vertex_count(&store).unwrap(), 4);
        let edges = project.edges(&store).unwrap();
        assert_eq!(edges.len(), 4);
        assert_eq!(project.vertex_attributes.len(), 4);
        assert_eq!(project.edge_attributes.len(), 2);
        assert!(project.vertex_attributes.contains_key("location"));
        assert!(project.edge_attributes.contains_key("comment"));
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn entity_outputs_are_named() {
        let names: Vec<&str> = example_graph_entities().iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec!["vs", "es", "name", "age", "gender", "location", "weight", "comment"]
        );
    }

    #[test]
    fn isolated_joe_is_the_only_dead_end() {
        let mut store = EntityStore::new();
        let project = example_graph(&mut store);
        let edges = project.edges(&store).unwrap();

        assert_eq!(edges.dead_ends(4), vec![3]);
    }
}
