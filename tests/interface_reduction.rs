mod common;

use php_stubgen::reflection::{ExtensionSnapshot, IntrospectionProvider, ReflectedClass};
use php_stubgen::stubgen::interfaces::{actual_interfaces, recursive_ancestors, reduce};
use std::collections::BTreeSet;

fn lowercase_set<'a>(names: impl IntoIterator<Item = &'a String>) -> BTreeSet<String> {
    names.into_iter().map(|n| n.to_ascii_lowercase()).collect()
}

/// Reduced list re-expanded through interface edges plus the parent chain
fn expand(
    class: &ReflectedClass,
    reduced: &[String],
    snapshot: &ExtensionSnapshot,
) -> BTreeSet<String> {
    let mut expanded = lowercase_set(reduced);
    for interface in reduced {
        expanded.extend(lowercase_set(&recursive_ancestors(interface, snapshot)));
    }
    let mut parent = class.parent.clone();
    while let Some(name) = parent {
        expanded.extend(lowercase_set(&recursive_ancestors(&name, snapshot)));
        parent = snapshot.find_class(&name).and_then(|p| p.parent.clone());
    }
    expanded
}

fn all_snapshots() -> Vec<ExtensionSnapshot> {
    let engine = common::engine();
    engine
        .extension_names()
        .iter()
        .map(|name| engine.snapshot(name).unwrap())
        .collect()
}

#[test]
fn test_reduction_loses_no_interface() {
    for snapshot in all_snapshots() {
        for class in &snapshot.classes {
            let reduced = actual_interfaces(class, &snapshot);
            assert_eq!(
                expand(class, &reduced, &snapshot),
                lowercase_set(&class.interfaces),
                "{} in {}",
                class.name,
                snapshot.name
            );
        }
    }
}

#[test]
fn test_reduction_is_idempotent() {
    for snapshot in all_snapshots() {
        for class in &snapshot.classes {
            let reduced = actual_interfaces(class, &snapshot);
            assert_eq!(reduce(&reduced, None, &snapshot), reduced, "{}", class.name);
        }
    }
}

#[test]
fn test_reduced_lists_are_subsequences_of_the_flattened_list() {
    for snapshot in all_snapshots() {
        for class in &snapshot.classes {
            let reduced = actual_interfaces(class, &snapshot);
            let mut flattened = class.interfaces.iter();
            for name in &reduced {
                assert!(flattened.any(|n| n == name), "{} out of order in {}", name, class.name);
            }
        }
    }
}

#[test]
fn test_known_reductions() {
    let core = common::snapshot("core");
    let generator = core.find_class("Generator").unwrap();
    assert_eq!(generator.interfaces, vec!["Iterator", "Traversable"]);
    assert_eq!(actual_interfaces(generator, &core), vec!["Iterator"]);

    let error = core.find_class("TypeError").unwrap();
    assert!(actual_interfaces(error, &core).is_empty());

    let date = common::snapshot("date");
    let immutable = date.find_class("DateTimeImmutable").unwrap();
    assert_eq!(actual_interfaces(immutable, &date), vec!["DateTimeInterface"]);
}
