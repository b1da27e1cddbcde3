use domain::parse_document;
use gwc_topology::{TagKind, TagResolver, TreeOptions, build_tree};

const HIERARCHY: &str = r#"
io_setup:
  ports:
    - id: port-1
      name: PLC1
      hardwareInterface: /dev/ttyS0
      devices:
        - id: dev-1
          name: PLC1
          tags:
            - id: t1
              name: Temp
              dataType: float32
            - id: t2
              name: Pressure
        - id: dev-2
          name: Boiler
          tags:
            - id: t3
              name: Level
    - id: port-2
      name: TCP
      hardwareInterface: eth0
      devices:
        - id: dev-3
          name: Meter
          tags:
            - id: t4
              name: kWh
calculation_tags:
  - id: c1
    name: Sum
    formula: "A+B"
  - id: c2
    name: Ratio
    formula: "A/B"
"#;

#[test]
fn resolver_covers_every_tag_in_any_case() {
    let (document, _) = parse_document(HIERARCHY).expect("parse");
    let resolver = TagResolver::from_ports(&document.io_setup.ports);
    assert_eq!(resolver.len(), 4);

    for port in &document.io_setup.ports {
        for device in &port.devices {
            for tag in &device.tags {
                let reference = format!("{}:{}", device.name, tag.name);
                assert_eq!(resolver.resolve(Some(&reference)), Some(tag.id.as_str()));
                assert_eq!(
                    resolver.resolve(Some(&reference.to_uppercase())),
                    Some(tag.id.as_str())
                );
                assert_eq!(
                    resolver.resolve(Some(&reference.to_lowercase())),
                    Some(tag.id.as_str())
                );
            }
        }
    }
}

#[test]
fn resolver_returns_none_for_unknown_or_empty() {
    let (document, _) = parse_document(HIERARCHY).expect("parse");
    let resolver = TagResolver::from_ports(&document.io_setup.ports);
    assert_eq!(resolver.resolve(None), None);
    assert_eq!(resolver.resolve(Some("")), None);
    assert_eq!(resolver.resolve(Some("   ")), None);
    assert_eq!(resolver.resolve(Some("NoSuch:Tag")), None);
    assert_eq!(resolver.resolve(Some("PLC1")), None);
    assert_eq!(resolver.resolve(Some("Temp")), None);
}

#[test]
fn register_reports_replaced_id() {
    let mut resolver = TagResolver::new();
    assert_eq!(resolver.register("Dev", "Tag", "x1"), None);
    assert_eq!(
        resolver.register("DEV", "tag", "x2"),
        Some("x1".to_string())
    );
    assert_eq!(resolver.resolve(Some("dev:TAG")), Some("x2"));
}

#[test]
fn calculation_tags_resolve_under_virtual_group() {
    let mut resolver = TagResolver::new();
    assert!(resolver.register_calculation("Sum", "c1"));
    assert_eq!(resolver.resolve(Some("calculation:sum")), Some("c1"));
}

#[test]
fn calculation_registration_keeps_existing_entry() {
    let mut resolver = TagResolver::new();
    resolver.register("Calculation", "X", "io-x");
    assert!(!resolver.register_calculation("x", "calc-x"));
    assert_eq!(resolver.resolve(Some("Calculation:X")), Some("io-x"));
}

#[test]
fn tree_lists_ports_devices_tags_and_calculation_group() {
    let (document, _) = parse_document(HIERARCHY).expect("parse");
    let tree = build_tree(&document, &TreeOptions::default());
    assert_eq!(tree.len(), 3);
    assert_eq!(tree[0].devices.len(), 2);
    assert_eq!(tree[0].devices[0].tags[0].reference, "PLC1:Temp");
    assert_eq!(tree[0].devices[0].tags[0].kind, TagKind::Io);

    let group = &tree[2];
    assert!(group.is_virtual);
    assert_eq!(group.devices[0].tags.len(), 2);
    assert!(
        group.devices[0]
            .tags
            .iter()
            .all(|tag| tag.kind == TagKind::Calculation)
    );
}

#[test]
fn tree_excludes_one_calculation_tag() {
    let (document, _) = parse_document(HIERARCHY).expect("parse");
    let options = TreeOptions {
        exclude_calculation_tag_id: Some("c1".to_string()),
        exclude_calculation_tags: false,
    };
    let tree = build_tree(&document, &options);
    let group = tree.last().expect("group");
    let ids: Vec<&str> = group.devices[0]
        .tags
        .iter()
        .map(|tag| tag.id.as_str())
        .collect();
    assert_eq!(ids, vec!["c2"]);
}

#[test]
fn tree_excludes_all_calculation_tags() {
    let (document, _) = parse_document(HIERARCHY).expect("parse");
    let options = TreeOptions {
        exclude_calculation_tag_id: None,
        exclude_calculation_tags: true,
    };
    let tree = build_tree(&document, &options);
    assert_eq!(tree.len(), 2);
    assert!(tree.iter().all(|port| !port.is_virtual));
}

#[test]
fn tree_is_deterministic_and_serializes_camel_case() {
    let (document, _) = parse_document(HIERARCHY).expect("parse");
    let first = serde_json::to_value(build_tree(&document, &TreeOptions::default())).expect("json");
    let second =
        serde_json::to_value(build_tree(&document, &TreeOptions::default())).expect("json");
    assert_eq!(first, second);
    assert!(first[0].get("isVirtual").is_some());
    assert!(first[0]["devices"][0]["tags"][0].get("dataType").is_some());
}
