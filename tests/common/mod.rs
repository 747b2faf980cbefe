//! Common test helpers for php-stubgen tests
//!
//! Provides an engine with the bundled extensions plus a small `scenario`
//! extension whose hierarchy exercises interface reduction and the
//! ownership filter.

#![allow(dead_code)]

use php_stubgen::reflection::{ExtensionSnapshot, IntrospectionProvider};
use php_stubgen::runtime::context::{EngineBuilder, EngineContext};
use php_stubgen::runtime::extension::{Extension, ExtensionInfo, ExtensionResult};
use php_stubgen::runtime::registry::{
    ExtensionRegistry, NativeClassDef, NativeMethodEntry, NativeParamInfo, NativePropertyEntry,
    TypeHint,
};
use php_stubgen::stubgen::{StubGenerator, StubOutput};

/// Test extension covering the documented stub scenarios
pub struct ScenarioExtension;

impl Extension for ScenarioExtension {
    fn info(&self) -> ExtensionInfo {
        ExtensionInfo {
            name: "scenario",
            version: "0.0.1",
            dependencies: &["Core"],
        }
    }

    fn module_init(&self, registry: &mut ExtensionRegistry) -> ExtensionResult {
        registry.register_constant(b"X\\Y\\VERSION", "1.2.3");
        registry.register_constant(b"SCENARIO_LEVEL", 2i64);

        registry.register_class(
            NativeClassDef::new_class(b"Container")
                .implements(&[b"Countable"])
                .method(b"count", NativeMethodEntry::public().returns(TypeHint::Int)),
        );
        registry.register_class(
            NativeClassDef::new_class(b"Box")
                .extends(b"Container")
                .implements(&[b"Countable"]),
        );

        registry.register_class(
            NativeClassDef::new_class(b"Shapes\\Shape").abstract_class().method(
                b"area",
                NativeMethodEntry::public()
                    .abstract_method()
                    .returns(TypeHint::Float),
            ),
        );
        registry.register_class(
            NativeClassDef::new_interface(b"Shapes\\Measurable")
                .method(b"area", NativeMethodEntry::public().returns(TypeHint::Float)),
        );

        registry.register_class(
            NativeClassDef::new_class(b"Shapes\\Base")
                .property(b"label", NativePropertyEntry::protected())
                .property(b"registry", NativePropertyEntry::private().static_property())
                .method(
                    b"describe",
                    NativeMethodEntry::public()
                        .param(NativeParamInfo::typed(b"verbose", TypeHint::Bool).default(false))
                        .returns(TypeHint::String),
                )
                .method(b"reset", NativeMethodEntry::protected().static_method()),
        );
        registry.register_class(
            NativeClassDef::new_class(b"Shapes\\Derived").extends(b"Shapes\\Base"),
        );
        registry.register_class(
            NativeClassDef::new_class(b"Shapes\\Override")
                .extends(b"Shapes\\Base")
                .method(
                    b"describe",
                    NativeMethodEntry::public()
                        .final_method()
                        .param(NativeParamInfo::typed(b"verbose", TypeHint::Bool).default(false))
                        .returns(TypeHint::String),
                ),
        );

        ExtensionResult::Success
    }
}

/// Bundled extensions plus the scenario extension
pub fn engine() -> EngineContext {
    EngineBuilder::new()
        .with_bundled_extensions()
        .with_extension(ScenarioExtension)
        .build()
        .expect("test engine should build")
}

pub fn snapshot(extension: &str) -> ExtensionSnapshot {
    engine()
        .snapshot(extension)
        .unwrap_or_else(|e| panic!("snapshot of {extension} failed: {e}"))
}

/// Combined stub document with default settings
pub fn combined(snapshot: &ExtensionSnapshot) -> String {
    match StubGenerator::default()
        .generate(snapshot)
        .expect("combined generation does not touch the filesystem")
    {
        StubOutput::Combined(text) => text,
        StubOutput::Tree(_) => unreachable!("default mode is combined"),
    }
}

/// Rendered text of one class, interface or trait
pub fn render_class(snapshot: &ExtensionSnapshot, name: &str) -> String {
    let class = snapshot
        .find_class(name)
        .unwrap_or_else(|| panic!("{name} missing from snapshot"));
    php_stubgen::stubgen::Renderer::default().class(class, snapshot)
}
