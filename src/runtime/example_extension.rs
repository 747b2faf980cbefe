use crate::core::value::{ArrayData, ArrayKey, Val, Visibility};
use crate::runtime::extension::{Extension, ExtensionInfo, ExtensionResult};
use crate::runtime::registry::{
    ExtensionRegistry, NativeClassDef, NativeFunctionDef, NativeMethodEntry, NativeParamInfo,
    NativePropertyEntry, TypeHint,
};

/// Example extension demonstrating a namespaced API surface
///
/// Besides the two global functions `example_hello()` and `example_add()`,
/// it declares a small collection library under `Example\Collections`:
/// an interface extending two Core interfaces, a trait, an abstract base
/// class, and two concrete collections.
pub struct ExampleExtension;

const COLLECTION: &[u8] = b"Example\\Collections\\Collection";
const ABSTRACT_COLLECTION: &[u8] = b"Example\\Collections\\AbstractCollection";
const SORTABLE: &[u8] = b"Example\\Collections\\Sortable";
const VECTOR: &[u8] = b"Example\\Collections\\Vector";
const MAP: &[u8] = b"Example\\Collections\\Map";

impl Extension for ExampleExtension {
    fn info(&self) -> ExtensionInfo {
        ExtensionInfo {
            name: "example",
            version: "1.0.0",
            dependencies: &["Core"],
        }
    }

    fn module_init(&self, registry: &mut ExtensionRegistry) -> ExtensionResult {
        registry.register_constant(b"Example\\VERSION", "1.0.0");
        registry.register_constant(b"Example\\Collections\\DEFAULT_CAPACITY", 16i64);
        registry.register_constant(b"EXAMPLE_DEFAULTS", default_options());

        registry.register_function(
            NativeFunctionDef::new(b"example_hello")
                .doc("/**\n * Returns a greeting string\n */")
                .returns(TypeHint::String),
        );
        registry.register_function(
            NativeFunctionDef::new(b"example_add")
                .param(NativeParamInfo::typed(b"a", TypeHint::Int))
                .param(NativeParamInfo::typed(b"b", TypeHint::Int))
                .returns(TypeHint::Int),
        );
        registry.register_function(
            NativeFunctionDef::new(b"Example\\Collections\\vector")
                .param(NativeParamInfo::typed(b"items", TypeHint::Mixed).variadic())
                .returns(TypeHint::class(VECTOR)),
        );
        registry.register_function(
            NativeFunctionDef::new(b"Example\\Collections\\swap")
                .param(NativeParamInfo::typed(b"items", TypeHint::Array).by_ref())
                .param(NativeParamInfo::typed(b"i", TypeHint::Int))
                .param(NativeParamInfo::typed(b"j", TypeHint::Int))
                .returns(TypeHint::Void),
        );

        registry.register_class(
            NativeClassDef::new_interface(COLLECTION)
                .implements(&[b"IteratorAggregate", b"Countable"])
                .constant(b"ORDERED", true, Visibility::Public)
                .method(b"isEmpty", NativeMethodEntry::public().returns(TypeHint::Bool))
                .method(b"toArray", NativeMethodEntry::public().returns(TypeHint::Array)),
        );

        registry.register_class(
            NativeClassDef::new_trait(SORTABLE)
                .method(
                    b"sort",
                    NativeMethodEntry::public()
                        .param(
                            NativeParamInfo::typed(b"comparator", TypeHint::Callable.nullable())
                                .default(Val::Null),
                        )
                        .returns(TypeHint::Static),
                )
                .method(
                    b"compare",
                    NativeMethodEntry::protected()
                        .abstract_method()
                        .param(NativeParamInfo::typed(b"a", TypeHint::Mixed))
                        .param(NativeParamInfo::typed(b"b", TypeHint::Mixed))
                        .returns(TypeHint::Int),
                ),
        );

        registry.register_class(
            NativeClassDef::new_class(ABSTRACT_COLLECTION)
                .abstract_class()
                .implements(&[COLLECTION])
                .property(
                    b"items",
                    NativePropertyEntry::protected()
                        .typed(TypeHint::Array)
                        .doc("/** @var array<int|string, mixed> */"),
                )
                .method(
                    b"add",
                    NativeMethodEntry::public()
                        .abstract_method()
                        .param(NativeParamInfo::typed(b"item", TypeHint::Mixed))
                        .returns(TypeHint::Void),
                )
                .method(b"isEmpty", NativeMethodEntry::public().returns(TypeHint::Bool))
                .method(b"count", NativeMethodEntry::public().returns(TypeHint::Int))
                .method(
                    b"getIterator",
                    NativeMethodEntry::public().returns(TypeHint::class(b"Iterator")),
                )
                .method(
                    b"toArray",
                    NativeMethodEntry::public().final_method().returns(TypeHint::Array),
                ),
        );

        registry.register_class(
            NativeClassDef::new_class(VECTOR)
                .final_class()
                .extends(ABSTRACT_COLLECTION)
                .implements(&[b"ArrayAccess"])
                .uses(&[SORTABLE])
                .doc("/**\n * Growable list indexed from zero\n */")
                .constant(b"MAX_SIZE", 1i64 << 32, Visibility::Public)
                .constant(b"GROWTH_FACTOR", 1.5f64, Visibility::Protected)
                .property(
                    b"instances",
                    NativePropertyEntry::public()
                        .static_property()
                        .typed(TypeHint::Int),
                )
                .method(
                    b"__construct",
                    NativeMethodEntry::public().param(
                        NativeParamInfo::typed(b"items", TypeHint::Array)
                            .default(Val::array(ArrayData::new())),
                    ),
                )
                .method(
                    b"add",
                    NativeMethodEntry::public()
                        .param(NativeParamInfo::typed(b"item", TypeHint::Mixed))
                        .returns(TypeHint::Void),
                )
                .method(
                    b"offsetExists",
                    NativeMethodEntry::public()
                        .param(NativeParamInfo::typed(b"offset", TypeHint::Mixed))
                        .returns(TypeHint::Bool),
                )
                .method(
                    b"offsetGet",
                    NativeMethodEntry::public()
                        .returns_reference()
                        .param(NativeParamInfo::typed(b"offset", TypeHint::Mixed))
                        .returns(TypeHint::Mixed),
                )
                .method(
                    b"offsetSet",
                    NativeMethodEntry::public()
                        .param(NativeParamInfo::typed(b"offset", TypeHint::Mixed))
                        .param(NativeParamInfo::typed(b"value", TypeHint::Mixed))
                        .returns(TypeHint::Void),
                )
                .method(
                    b"offsetUnset",
                    NativeMethodEntry::public()
                        .param(NativeParamInfo::typed(b"offset", TypeHint::Mixed))
                        .returns(TypeHint::Void),
                )
                .method(
                    b"compare",
                    NativeMethodEntry::protected()
                        .param(NativeParamInfo::typed(b"a", TypeHint::Mixed))
                        .param(NativeParamInfo::typed(b"b", TypeHint::Mixed))
                        .returns(TypeHint::Int),
                )
                .method(
                    b"fromArray",
                    NativeMethodEntry::public()
                        .static_method()
                        .param(NativeParamInfo::typed(b"items", TypeHint::Array))
                        .returns(TypeHint::Static),
                ),
        );

        // Map re-lists Collection even though its parent already provides it
        registry.register_class(
            NativeClassDef::new_class(MAP)
                .extends(ABSTRACT_COLLECTION)
                .implements(&[b"ArrayAccess", COLLECTION])
                .method(
                    b"add",
                    NativeMethodEntry::public()
                        .param(NativeParamInfo::typed(b"item", TypeHint::Mixed))
                        .returns(TypeHint::Void),
                )
                .method(
                    b"get",
                    NativeMethodEntry::public()
                        .param(NativeParamInfo::typed(b"key", TypeHint::String))
                        .param(
                            NativeParamInfo::typed(b"default", TypeHint::Mixed).default(Val::Null),
                        )
                        .returns(TypeHint::Mixed),
                )
                .method(
                    b"offsetExists",
                    NativeMethodEntry::public()
                        .param(NativeParamInfo::typed(b"offset", TypeHint::Mixed))
                        .returns(TypeHint::Bool),
                )
                .method(
                    b"offsetGet",
                    NativeMethodEntry::public()
                        .param(NativeParamInfo::typed(b"offset", TypeHint::Mixed))
                        .returns(TypeHint::Mixed),
                )
                .method(
                    b"offsetSet",
                    NativeMethodEntry::public()
                        .param(NativeParamInfo::typed(b"offset", TypeHint::Mixed))
                        .param(NativeParamInfo::typed(b"value", TypeHint::Mixed))
                        .returns(TypeHint::Void),
                )
                .method(
                    b"offsetUnset",
                    NativeMethodEntry::public()
                        .param(NativeParamInfo::typed(b"offset", TypeHint::Mixed))
                        .returns(TypeHint::Void),
                ),
        );

        ExtensionResult::Success
    }
}

fn default_options() -> Val {
    let mut options = ArrayData::new();
    options.insert(ArrayKey::from("strict"), Val::Bool(true));
    options.insert(ArrayKey::from("depth"), Val::Int(3));
    options.insert(
        ArrayKey::from("separators"),
        Val::array([Val::string(","), Val::string(";")].into_iter().collect()),
    );
    Val::array(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::context::EngineBuilder;

    #[test]
    fn test_example_extension_registration() {
        let engine = EngineBuilder::new()
            .with_core_extensions()
            .with_extension(ExampleExtension)
            .build()
            .expect("Failed to build engine");

        assert!(engine.registry.extension_loaded("example"));
        assert!(engine.registry.get_function(b"example_hello").is_some());
        assert!(engine.registry.get_function(b"example_add").is_some());
        assert!(
            engine
                .registry
                .get_function(b"\\example\\collections\\VECTOR")
                .is_some()
        );

        let vector = engine.registry.get_class(VECTOR).unwrap();
        assert!(vector.is_final);
        assert_eq!(vector.traits, vec![SORTABLE.to_vec()]);
    }

    #[test]
    fn test_without_core_fails() {
        let err = EngineBuilder::new()
            .with_extension(ExampleExtension)
            .build()
            .err()
            .expect("example requires Core");
        assert!(err.contains("depends on 'Core'"));
    }
}
