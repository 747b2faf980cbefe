//! Minimal `implements` / `extends` lists
//!
//! Reflection reports every interface a class satisfies. A declaration only
//! needs the ones not already implied by another listed interface or by
//! an ancestor class.

use crate::reflection::{ExtensionSnapshot, ReflectedClass};
use std::collections::HashSet;
use tracing::warn;

/// Interface hierarchies deeper than this are cut off
pub const MAX_DEPTH: usize = 64;

/// Resolves class and interface names during reduction
pub trait ClassLookup {
    fn find_class(&self, name: &str) -> Option<&ReflectedClass>;
}

impl ClassLookup for ExtensionSnapshot {
    fn find_class(&self, name: &str) -> Option<&ReflectedClass> {
        ExtensionSnapshot::find_class(self, name)
    }
}

impl ClassLookup for [ReflectedClass] {
    fn find_class(&self, name: &str) -> Option<&ReflectedClass> {
        self.iter()
            .find(|class| crate::reflection::same_name(&class.name, name))
    }
}

fn key(name: &str) -> String {
    name.trim_start_matches('\\').to_ascii_lowercase()
}

/// Every interface reachable from `name`'s own interface list, `name` excluded
pub fn recursive_ancestors<L: ClassLookup + ?Sized>(name: &str, lookup: &L) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    collect_ancestors(name, lookup, 0, &mut seen, &mut found);
    found
}

fn collect_ancestors<L: ClassLookup + ?Sized>(
    name: &str,
    lookup: &L,
    depth: usize,
    seen: &mut HashSet<String>,
    found: &mut Vec<String>,
) {
    if depth >= MAX_DEPTH {
        warn!(class = name, "interface hierarchy too deep, stopping");
        return;
    }
    let Some(class) = lookup.find_class(name) else {
        return;
    };
    for interface in &class.interfaces {
        if seen.insert(key(interface)) {
            found.push(interface.clone());
            collect_ancestors(interface, lookup, depth + 1, seen, found);
        }
    }
}

/// Reduce `direct` against itself and the ancestor chain starting at `parent`
pub fn reduce<L: ClassLookup + ?Sized>(
    direct: &[String],
    parent: Option<&str>,
    lookup: &L,
) -> Vec<String> {
    let mut implied = HashSet::new();

    for interface in direct {
        implied.extend(recursive_ancestors(interface, lookup).iter().map(|i| key(i)));
    }

    let mut current = parent.map(str::to_string);
    let mut depth = 0;
    while let Some(name) = current {
        if depth >= MAX_DEPTH {
            warn!(class = %name, "parent chain too deep, stopping");
            break;
        }
        depth += 1;
        // recursive_ancestors of a class covers its own interfaces too
        implied.extend(recursive_ancestors(&name, lookup).iter().map(|i| key(i)));
        current = lookup.find_class(&name).and_then(|class| class.parent.clone());
    }

    direct
        .iter()
        .filter(|interface| !implied.contains(&key(interface)))
        .cloned()
        .collect()
}

/// The interfaces `class` has to name itself
pub fn actual_interfaces<L>(class: &ReflectedClass, lookup: &L) -> Vec<String>
where
    L: ClassLookup + ?Sized,
{
    reduce(&class.interfaces, class.parent.as_deref(), lookup)
}
