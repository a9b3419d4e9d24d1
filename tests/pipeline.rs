use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use schemabox::diagram::Relationship;
use schemabox::{
    Divider, Error, LayoutEngine, Object, ResolveOptions, Theme, make_diagram, parse_document,
    parse_to_diagram,
};

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");

fn element_counts(svg: &str) -> HashMap<String, usize> {
    let mut reader = Reader::from_str(svg);
    let mut counts = HashMap::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                *counts.entry(name).or_insert(0) += 1;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("malformed svg at byte {}: {e}", reader.buffer_position()),
        }
    }
    counts
}

fn count(counts: &HashMap<String, usize>, element: &str) -> usize {
    counts.get(element).copied().unwrap_or(0)
}

fn child<'a>(object: &'a Object, name: &str) -> &'a Object {
    &object
        .composed_of
        .iter()
        .find(|c| c.object.name == name)
        .unwrap_or_else(|| panic!("{} has no child {name}", object.name))
        .object
}

#[test]
fn single_object_schema_renders_one_box() {
    let source = br#"{"components":{"schemas":{"Pet":{"type":"object","required":["id"],"properties":{"id":{"type":"string"},"tag":{"type":"string"}}}}}}"#;
    let mut diagram = parse_to_diagram(source, "components.schemas.Pet", ResolveOptions::default())
        .expect("diagram");

    let root = &diagram.root;
    assert_eq!(root.name, "Pet");
    assert!(root.composed_of.is_empty());
    let rows: Vec<(&str, Relationship)> = root
        .properties
        .iter()
        .map(|p| (p.name.as_str(), p.relationship))
        .collect();
    assert_eq!(
        rows,
        [("id", Relationship::ExactlyOne), ("tag", Relationship::ZeroOrOne)]
    );

    let svg = diagram.to_svg(&Theme::default()).expect("svg");
    let counts = element_counts(&svg);
    assert_eq!(count(&counts, "rect"), 1);
    assert_eq!(count(&counts, "line"), 0);
    assert_eq!(count(&counts, "marker"), 2);
    assert_eq!(count(&counts, "svg"), 1);
}

#[test]
fn petstore_translates_references_into_a_tree() {
    let diagram = parse_to_diagram(
        PETSTORE.as_bytes(),
        "components.schemas.Pet",
        ResolveOptions::default(),
    )
    .expect("diagram");
    let pet = &diagram.root;

    assert_eq!(pet.description, "A pet for sale");
    let properties: Vec<&str> = pet.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(properties, ["id", "name", "status", "tags"]);
    let children: Vec<(&str, Relationship)> = pet
        .composed_of
        .iter()
        .map(|c| (c.object.name.as_str(), c.relationship))
        .collect();
    assert_eq!(
        children,
        [("owner", Relationship::ZeroOrOne), ("visits", Relationship::ZeroOrMore)]
    );

    let tags = pet.properties.iter().find(|p| p.name == "tags").expect("tags");
    assert_eq!(tags.relationship, Relationship::ZeroOrMore);

    let status = pet.properties.iter().find(|p| p.name == "status").expect("status");
    assert_eq!(
        status.description,
        "type: string\ndescription: Availability in the store\nValues:\n  - available\n  - pending\n  - sold"
    );

    let owner = child(pet, "owner");
    assert_eq!(owner.properties[0].relationship, Relationship::ExactlyOne);
    let (address, billing) = (child(owner, "address"), child(owner, "billingAddress"));
    assert_eq!(address.properties, billing.properties);
    assert_eq!(address.properties[1].description, "type: string\npattern: ^[A-Za-z ]+$");

    let visits = child(pet, "visits");
    assert_eq!(child(visits, "vet").properties[0].name, "licence");
}

#[test]
fn shared_definitions_are_copied_per_site() {
    let mut diagram = parse_to_diagram(
        PETSTORE.as_bytes(),
        "components.schemas.Owner",
        ResolveOptions::default(),
    )
    .expect("diagram");
    LayoutEngine::default().layout(&mut diagram.root);

    let address = child(&diagram.root, "address");
    let billing = child(&diagram.root, "billingAddress");
    assert_eq!(address.properties, billing.properties);
    assert_ne!(address.position, billing.position);
}

#[test]
fn petstore_renders_every_box_and_connector() {
    let mut diagram = parse_to_diagram(
        PETSTORE.as_bytes(),
        "components.schemas.Pet",
        ResolveOptions::default(),
    )
    .expect("diagram");
    let objects = diagram.root.walk().len();
    assert_eq!(objects, 6);

    let svg = diagram.to_svg(&Theme::default()).expect("svg");
    let counts = element_counts(&svg);
    assert_eq!(count(&counts, "rect"), objects);
    assert_eq!(count(&counts, "line"), 3 * (objects - 1));
}

#[test]
fn rendering_is_byte_identical_across_runs_and_key_order() {
    let forward = br#"{"S": {"type": "object", "properties": {"a": {"type": "string"}, "b": {"type": "object", "properties": {"x": {"type": "number"}}}}}}"#;
    let reversed = br#"{"S": {"properties": {"b": {"properties": {"x": {"type": "number"}}, "type": "object"}, "a": {"type": "string"}}, "type": "object"}}"#;

    let render = |source: &[u8]| {
        parse_to_diagram(source, "S", ResolveOptions::default())
            .and_then(|mut d| d.to_svg(&Theme::default()))
            .expect("svg")
    };
    let first = render(forward);
    assert_eq!(first, render(forward));
    assert_eq!(first, render(reversed));
}

#[test]
fn batch_interface_parses_once_and_renders_many() {
    let schemas = parse_document(
        PETSTORE.as_bytes(),
        "components.schemas",
        ResolveOptions::default(),
    )
    .expect("schemas");
    assert_eq!(
        schemabox::document::object_names(&schemas),
        ["Address", "Owner", "Pet", "Visit"]
    );

    for name in ["Address", "Owner", "Pet", "Visit"] {
        let schema = schemas.get(name).expect("schema");
        let mut diagram = make_diagram(schema, name).expect("diagram");
        let svg = diagram.to_svg(&Theme::default()).expect("svg");
        assert!(count(&element_counts(&svg), "rect") >= 1, "{name}");
    }
}

#[test]
fn reference_resolves_like_its_target() {
    let source = br##"{"A": {"$ref": "#/B"}, "B": {"type": "object", "properties": {}}}"##;
    let via_ref = parse_document(source, "A", ResolveOptions::default()).expect("A");
    let direct = parse_document(source, "B", ResolveOptions::default()).expect("B");
    assert_eq!(via_ref, direct);
}

#[test]
fn mutually_recursive_schemas_fail_with_a_reference_error() {
    let source = br##"{"A": {"$ref": "#/B"}, "B": {"$ref": "#/A"}}"##;
    let err = parse_to_diagram(source, "A", ResolveOptions::default()).unwrap_err();
    assert!(matches!(err, Error::CyclicReference { .. }), "{err}");
}

#[test]
fn missing_selector_is_reference_not_found() {
    let err = parse_to_diagram(
        PETSTORE.as_bytes(),
        "components.schemas.Cat",
        ResolveOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "reference not found: 'components.schemas.Cat'");
}

#[test]
fn scalar_selection_is_not_an_object() {
    let err = parse_to_diagram(
        PETSTORE.as_bytes(),
        "components.schemas.PetId.format",
        ResolveOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::NotAnObject { .. }), "{err}");
    assert_eq!(err.to_string(), "source is not an object: 'components.schemas.PetId.format'");
}

#[test]
fn malformed_source_is_a_deserialize_error() {
    let err = parse_to_diagram(b"{\"A\": [", "A", ResolveOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Deserialize(_)));
}

#[test]
fn custom_divider_selects_keys_with_dots() {
    let source = br#"{"schemas": {"v1.Pet": {"type": "object", "properties": {"id": {"type": "string"}}}}}"#;
    let options = ResolveOptions {
        divider: Divider::new('/'),
        ..ResolveOptions::default()
    };
    let diagram = parse_to_diagram(source, "schemas/v1.Pet", options).expect("diagram");
    assert_eq!(diagram.root.name, "v1.Pet");
    assert_eq!(diagram.root.properties.len(), 1);
}

#[test]
fn arrays_of_arrays_are_drawn_as_composed_boxes() {
    let source = br#"{"S": {"type": "object", "properties": {"matrix": {"type": "array", "items": {"type": "array", "items": {"type": "string"}}}}}}"#;
    let mut diagram = parse_to_diagram(source, "S", ResolveOptions::default()).expect("diagram");
    assert!(diagram.root.properties.is_empty());
    assert_eq!(diagram.root.composed_of.len(), 1);
    assert_eq!(diagram.root.composed_of[0].relationship, Relationship::ZeroOrMore);

    let svg = diagram.to_svg(&Theme::default()).expect("svg");
    let counts = element_counts(&svg);
    assert_eq!(count(&counts, "rect"), 2);
    assert_eq!(count(&counts, "line"), 3);
}
