//! Reflection over a loaded [`EngineContext`]
//!
//! The registry stores only what each class declares. This module resolves
//! inheritance the way `ReflectionClass` reports it:
//! - `interfaces` holds the parent's interfaces first, then each declared
//!   interface followed by everything it extends, without duplicates
//! - constants, properties and methods inherited from the parent keep the
//!   parent as their declaring class; private members are not inherited
//! - trait members are copied in and reported as declared by the using class
//! - interface methods are abstract

use super::{
    ClassKind, ExtensionSnapshot, IntrospectionProvider, ReflectedClass, ReflectedClassConstant,
    ReflectedFunction, ReflectedMethod, ReflectedParameter, ReflectedProperty, TypeRef,
};
use crate::core::value::Visibility;
use crate::error::StubError;
use crate::runtime::context::EngineContext;
use crate::runtime::registry::{
    lookup_key, ExtensionRegistry, NativeClassDef, NativeFunctionDef, NativeMethodEntry,
    NativeParamInfo, NativeSignature, NativeType, ParamDefault, TypeHint,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Inheritance chains deeper than this are treated as broken
pub const MAX_HIERARCHY_DEPTH: usize = 64;

impl IntrospectionProvider for EngineContext {
    fn extension_names(&self) -> Vec<String> {
        self.registry
            .get_extensions()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn snapshot(&self, extension: &str) -> Result<ExtensionSnapshot, StubError> {
        let module = self
            .registry
            .get_module(extension)
            .ok_or_else(|| StubError::ExtensionNotFound(extension.to_string()))?;

        let mut snapshot = ExtensionSnapshot::new(module.name());
        snapshot.version = Some(module.info.version.to_string());
        snapshot.constants = self
            .registry
            .module_constants(module)
            .map(|(name, value)| (lossy(name), value.clone()))
            .collect();
        snapshot.functions = self
            .registry
            .module_functions(module)
            .map(reflect_function)
            .collect();

        let mut reflector = Reflector::new(&self.registry);
        snapshot.classes = module
            .classes
            .iter()
            .filter_map(|key| reflector.reflect(key, 0))
            .collect();
        snapshot.related = reflector.related(&snapshot.classes, &module.classes);

        debug!(
            extension = %snapshot.name,
            constants = snapshot.constants.len(),
            functions = snapshot.functions.len(),
            classes = snapshot.classes.len(),
            related = snapshot.related.len(),
            "snapshot built"
        );
        Ok(snapshot)
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn type_ref(ty: &NativeType) -> TypeRef {
    let mut type_ref = match ty.hint.builtin_name() {
        Some(keyword) => TypeRef::builtin(keyword),
        None => match &ty.hint {
            TypeHint::Class(name) => TypeRef::class(&lossy(name)),
            _ => TypeRef::builtin("mixed"),
        },
    };
    // mixed and null always admit null
    type_ref.nullable = ty.nullable || matches!(ty.hint, TypeHint::Mixed | TypeHint::Null);
    type_ref
}

fn reflect_parameter(param: &NativeParamInfo) -> ReflectedParameter {
    ReflectedParameter {
        name: lossy(&param.name),
        ty: param.type_hint.as_ref().map(type_ref),
        by_reference: param.is_reference,
        variadic: param.is_variadic,
        optional: param.is_optional(),
        default: match &param.default {
            ParamDefault::Value(value) => Some(value.clone()),
            ParamDefault::Required | ParamDefault::Unavailable => None,
        },
    }
}

fn reflect_parameters(signature: &NativeSignature) -> Vec<ReflectedParameter> {
    signature.parameters.iter().map(reflect_parameter).collect()
}

fn reflect_function(def: &NativeFunctionDef) -> ReflectedFunction {
    ReflectedFunction {
        name: lossy(&def.name),
        parameters: reflect_parameters(&def.signature),
        return_type: def.signature.return_type.as_ref().map(type_ref),
        returns_reference: def.signature.returns_reference,
        doc_comment: def.doc_comment.as_deref().map(lossy),
    }
}

fn reflect_method(
    name: &[u8],
    entry: &NativeMethodEntry,
    declaring_class: &str,
    in_interface: bool,
) -> ReflectedMethod {
    ReflectedMethod {
        name: lossy(name),
        visibility: entry.visibility,
        is_static: entry.is_static,
        is_abstract: entry.is_abstract || in_interface,
        is_final: entry.is_final,
        parameters: reflect_parameters(&entry.signature),
        return_type: entry.signature.return_type.as_ref().map(type_ref),
        returns_reference: entry.signature.returns_reference,
        doc_comment: entry.doc_comment.as_deref().map(lossy),
        declaring_class: declaring_class.to_string(),
    }
}

fn has_member<T>(members: &[T], name: &str, member_name: impl Fn(&T) -> &str) -> bool {
    members.iter().any(|m| member_name(m) == name)
}

fn has_method(methods: &[ReflectedMethod], name: &str) -> bool {
    methods.iter().any(|m| m.name.eq_ignore_ascii_case(name))
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|seen| seen.eq_ignore_ascii_case(name)) {
        list.push(name.to_string());
    }
}

/// Copy visible members of an ancestor that the class does not redeclare
fn inherit(
    ancestor: &ReflectedClass,
    constants: &mut Vec<ReflectedClassConstant>,
    properties: &mut Vec<ReflectedProperty>,
    methods: &mut Vec<ReflectedMethod>,
) {
    for constant in &ancestor.constants {
        if constant.visibility != Some(Visibility::Private)
            && !has_member(constants, &constant.name, |c| c.name.as_str())
        {
            constants.push(constant.clone());
        }
    }
    for property in &ancestor.properties {
        if property.visibility != Visibility::Private
            && !has_member(properties, &property.name, |p| p.name.as_str())
        {
            properties.push(property.clone());
        }
    }
    for method in &ancestor.methods {
        if method.visibility != Visibility::Private && !has_method(methods, &method.name) {
            methods.push(method.clone());
        }
    }
}

/// Memoised class reflection over one registry
struct Reflector<'a> {
    registry: &'a ExtensionRegistry,
    cache: HashMap<Vec<u8>, Option<ReflectedClass>>,
}

impl<'a> Reflector<'a> {
    fn new(registry: &'a ExtensionRegistry) -> Self {
        Self {
            registry,
            cache: HashMap::new(),
        }
    }

    fn reflect(&mut self, name: &[u8], depth: usize) -> Option<ReflectedClass> {
        let key = lookup_key(name);
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }
        if depth > MAX_HIERARCHY_DEPTH {
            warn!(class = %lossy(name), "class hierarchy too deep, ignoring ancestors");
            return None;
        }
        let registry = self.registry;
        let Some(def) = registry.get_class(&key) else {
            debug!(class = %lossy(name), "class not registered");
            self.cache.insert(key, None);
            return None;
        };

        let class = self.build(def, depth);
        self.cache.insert(key, Some(class.clone()));
        Some(class)
    }

    /// Reflect a referenced class, falling back to the name as written
    fn resolve(&mut self, name: &[u8], depth: usize) -> (String, Option<ReflectedClass>) {
        match self.reflect(name, depth + 1) {
            Some(class) => (class.name.clone(), Some(class)),
            None => {
                let name = lossy(name.strip_prefix(b"\\").unwrap_or(name));
                warn!(class = %name, "unresolved class in hierarchy");
                (name, None)
            }
        }
    }

    fn build(&mut self, def: &NativeClassDef, depth: usize) -> ReflectedClass {
        let name = lossy(&def.name);
        let kind = if def.is_interface {
            ClassKind::Interface
        } else if def.is_trait {
            ClassKind::Trait
        } else {
            ClassKind::Class
        };

        let parent = def.parent.as_deref().map(|p| self.resolve(p, depth));

        let mut interfaces = Vec::new();
        if let Some((_, Some(parent))) = &parent {
            for interface in &parent.interfaces {
                push_unique(&mut interfaces, interface);
            }
        }
        let mut implemented = Vec::new();
        for interface in &def.interfaces {
            let (interface_name, reflected) = self.resolve(interface, depth);
            push_unique(&mut interfaces, &interface_name);
            if let Some(reflected) = reflected {
                for inherited in &reflected.interfaces {
                    push_unique(&mut interfaces, inherited);
                }
                implemented.push(reflected);
            }
        }

        let mut traits = Vec::new();
        let mut used = Vec::new();
        for trait_name in &def.traits {
            let (trait_name, reflected) = self.resolve(trait_name, depth);
            traits.push(trait_name);
            used.extend(reflected);
        }

        let mut constants: Vec<ReflectedClassConstant> = def
            .constants
            .iter()
            .map(|(const_name, (value, visibility))| ReflectedClassConstant {
                name: lossy(const_name),
                value: value.clone(),
                visibility: Some(*visibility),
                declaring_class: name.clone(),
            })
            .collect();

        let mut properties: Vec<ReflectedProperty> = def
            .properties
            .iter()
            .map(|(prop_name, entry)| ReflectedProperty {
                name: lossy(prop_name),
                visibility: entry.visibility,
                is_static: entry.is_static,
                ty: entry.type_hint.as_ref().map(type_ref),
                doc_comment: entry.doc_comment.as_deref().map(lossy),
                declaring_class: name.clone(),
            })
            .collect();

        let mut methods: Vec<ReflectedMethod> = def
            .methods
            .iter()
            .map(|(method_name, entry)| reflect_method(method_name, entry, &name, def.is_interface))
            .collect();

        for used_trait in &used {
            for property in &used_trait.properties {
                if !has_member(&properties, &property.name, |p| p.name.as_str()) {
                    properties.push(ReflectedProperty {
                        declaring_class: name.clone(),
                        ..property.clone()
                    });
                }
            }
            for method in &used_trait.methods {
                if !has_method(&methods, &method.name) {
                    methods.push(ReflectedMethod {
                        declaring_class: name.clone(),
                        ..method.clone()
                    });
                }
            }
        }

        if let Some((_, Some(parent))) = &parent {
            inherit(parent, &mut constants, &mut properties, &mut methods);
        }
        for interface in &implemented {
            inherit(interface, &mut constants, &mut properties, &mut methods);
        }

        ReflectedClass {
            name,
            kind,
            is_abstract: def.is_abstract && kind == ClassKind::Class,
            is_final: def.is_final && kind == ClassKind::Class,
            parent: parent.map(|(parent_name, _)| parent_name),
            interfaces,
            traits,
            constants,
            properties,
            methods,
            doc_comment: def.doc_comment.as_deref().map(lossy),
        }
    }

    /// Ancestors and interfaces outside the extension that its classes reach
    fn related(&mut self, classes: &[ReflectedClass], own_keys: &[Vec<u8>]) -> Vec<ReflectedClass> {
        let own: HashSet<&[u8]> = own_keys.iter().map(Vec::as_slice).collect();
        let mut seen = HashSet::new();
        let mut related = Vec::new();
        let mut pending: Vec<String> = Vec::new();

        for class in classes {
            pending.extend(class.parent.iter().cloned());
            pending.extend(class.interfaces.iter().cloned());
        }
        pending.reverse();

        while let Some(name) = pending.pop() {
            let key = lookup_key(name.as_bytes());
            if own.contains(key.as_slice()) || !seen.insert(key.clone()) {
                continue;
            }
            if let Some(class) = self.reflect(&key, 0) {
                let mut next: Vec<String> = class.parent.iter().cloned().collect();
                next.extend(class.interfaces.iter().cloned());
                pending.extend(next.into_iter().rev());
                related.push(class);
            }
        }
        related
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::context::EngineBuilder;

    fn bundled() -> EngineContext {
        EngineContext::bundled().expect("bundled extensions should load")
    }

    fn class<'s>(snapshot: &'s ExtensionSnapshot, name: &str) -> &'s ReflectedClass {
        snapshot
            .find_class(name)
            .unwrap_or_else(|| panic!("{name} missing from snapshot"))
    }

    #[test]
    fn test_unknown_extension_is_not_found() {
        let err = bundled().snapshot("nope").unwrap_err();
        assert!(matches!(err, StubError::ExtensionNotFound(ref name) if name == "nope"));
        assert_eq!(err.to_string(), "Extension \"nope\" does not exist");
    }

    #[test]
    fn test_extension_lookup_is_case_insensitive() {
        let snapshot = bundled().snapshot("JSON").unwrap();
        assert_eq!(snapshot.name, "json");
        assert_eq!(snapshot.version.as_deref(), Some("8.3.0"));
    }

    #[test]
    fn test_interfaces_are_flattened_in_reflection_order() {
        let snapshot = bundled().snapshot("example").unwrap();
        let map = class(&snapshot, "Example\\Collections\\Map");
        assert_eq!(
            map.interfaces,
            vec![
                "Example\\Collections\\Collection",
                "IteratorAggregate",
                "Traversable",
                "Countable",
                "ArrayAccess",
            ]
        );
    }

    #[test]
    fn test_inherited_members_keep_their_declaring_class() {
        let snapshot = bundled().snapshot("example").unwrap();
        let vector = class(&snapshot, "Example\\Collections\\Vector");

        let count = vector.methods.iter().find(|m| m.name == "count").unwrap();
        assert_eq!(count.declaring_class, "Example\\Collections\\AbstractCollection");

        let items = vector.properties.iter().find(|p| p.name == "items").unwrap();
        assert_eq!(items.declaring_class, "Example\\Collections\\AbstractCollection");

        let ordered = vector.constants.iter().find(|c| c.name == "ORDERED").unwrap();
        assert_eq!(ordered.declaring_class, "Example\\Collections\\Collection");
    }

    #[test]
    fn test_trait_members_belong_to_the_using_class() {
        let snapshot = bundled().snapshot("example").unwrap();
        let vector = class(&snapshot, "Example\\Collections\\Vector");
        let sort = vector.methods.iter().find(|m| m.name == "sort").unwrap();
        assert_eq!(sort.declaring_class, vector.name);

        // the class's own compare() wins over the trait's abstract one
        let compare = vector.methods.iter().find(|m| m.name == "compare").unwrap();
        assert!(!compare.is_abstract);
    }

    #[test]
    fn test_interface_methods_are_abstract() {
        let snapshot = bundled().snapshot("example").unwrap();
        let collection = class(&snapshot, "Example\\Collections\\Collection");
        assert!(collection.is_interface());
        assert!(collection.methods.iter().all(|m| m.is_abstract));
        assert!(
            collection
                .methods
                .iter()
                .any(|m| m.name == "getIterator" && m.declaring_class == "IteratorAggregate")
        );
    }

    #[test]
    fn test_related_classes_cover_foreign_ancestors() {
        let snapshot = bundled().snapshot("json").unwrap();
        let exception = class(&snapshot, "JsonException");
        assert_eq!(exception.parent.as_deref(), Some("Exception"));
        assert!(exception.interfaces.iter().any(|i| i == "Throwable"));

        let related: Vec<_> = snapshot.related.iter().map(|c| c.name.as_str()).collect();
        assert!(related.contains(&"Exception"));
        assert!(related.contains(&"Throwable"));
        assert!(related.contains(&"Stringable"));
        assert!(!related.contains(&"JsonSerializable"));
    }

    #[test]
    fn test_private_members_are_not_inherited() {
        use crate::runtime::extension::{Extension, ExtensionInfo, ExtensionResult};
        use crate::runtime::registry::NativePropertyEntry;

        struct Secrets;
        impl Extension for Secrets {
            fn info(&self) -> ExtensionInfo {
                ExtensionInfo {
                    name: "secrets",
                    version: "1.0",
                    dependencies: &[],
                }
            }

            fn module_init(&self, registry: &mut ExtensionRegistry) -> ExtensionResult {
                registry.register_class(
                    NativeClassDef::new_class(b"Vault")
                        .property(b"key", NativePropertyEntry::private())
                        .method(b"seal", NativeMethodEntry::private()),
                );
                registry.register_class(NativeClassDef::new_class(b"Safe").extends(b"vault"));
                ExtensionResult::Success
            }
        }

        let engine = EngineBuilder::new().with_extension(Secrets).build().unwrap();
        let snapshot = engine.snapshot("secrets").unwrap();
        let safe = class(&snapshot, "Safe");
        assert_eq!(safe.parent.as_deref(), Some("Vault"));
        assert!(safe.properties.is_empty());
        assert!(safe.methods.is_empty());
    }

    #[test]
    fn test_nullable_types_and_defaults() {
        let snapshot = bundled().snapshot("json").unwrap();
        let decode = snapshot
            .functions
            .iter()
            .find(|f| f.name == "json_decode")
            .unwrap();
        let associative = &decode.parameters[1];
        assert_eq!(associative.ty, Some(TypeRef::builtin("bool").or_null()));
        assert!(associative.optional);
        assert_eq!(associative.default, Some(crate::core::value::Val::Null));

        let mixed = decode.return_type.as_ref().unwrap();
        assert!(mixed.nullable);
    }
}
