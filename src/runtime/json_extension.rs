use crate::core::value::Val;
use crate::runtime::extension::{Extension, ExtensionInfo, ExtensionResult};
use crate::runtime::registry::{
    ExtensionRegistry, NativeClassDef, NativeFunctionDef, NativeMethodEntry, NativeParamInfo,
    TypeHint,
};

/// JSON extension - RFC 8259 JSON encoding/decoding
///
/// This extension declares PHP's core JSON API:
/// - `json_encode()` - Encode PHP values to JSON
/// - `json_decode()` - Decode JSON to PHP values
/// - `json_last_error()` - Get last error code
/// - `json_last_error_msg()` - Get last error message
/// - `json_validate()` - Fast syntax validation (PHP 8.3+)
/// - `JsonSerializable` and `JsonException`
///
/// # Constants
///
/// Error codes:
/// - `JSON_ERROR_NONE`, `JSON_ERROR_DEPTH`, `JSON_ERROR_STATE_MISMATCH`
/// - `JSON_ERROR_CTRL_CHAR`, `JSON_ERROR_SYNTAX`, `JSON_ERROR_UTF8`
/// - `JSON_ERROR_RECURSION`, `JSON_ERROR_INF_OR_NAN`, `JSON_ERROR_UNSUPPORTED_TYPE`
/// - `JSON_ERROR_INVALID_PROPERTY_NAME`, `JSON_ERROR_UTF16`
///
/// Options:
/// - `JSON_HEX_TAG`, `JSON_HEX_AMP`, `JSON_HEX_APOS`, `JSON_HEX_QUOT`
/// - `JSON_FORCE_OBJECT`, `JSON_NUMERIC_CHECK`, `JSON_UNESCAPED_SLASHES`
/// - `JSON_PRETTY_PRINT`, `JSON_UNESCAPED_UNICODE`, `JSON_PARTIAL_OUTPUT_ON_ERROR`
/// - `JSON_PRESERVE_ZERO_FRACTION`, `JSON_UNESCAPED_LINE_TERMINATORS`
/// - `JSON_OBJECT_AS_ARRAY`, `JSON_BIGINT_AS_STRING`
/// - `JSON_INVALID_UTF8_IGNORE`, `JSON_INVALID_UTF8_SUBSTITUTE`, `JSON_THROW_ON_ERROR`
pub struct JsonExtension;

impl Extension for JsonExtension {
    fn info(&self) -> ExtensionInfo {
        ExtensionInfo {
            name: "json",
            version: "8.3.0",
            dependencies: &["Core"],
        }
    }

    fn module_init(&self, registry: &mut ExtensionRegistry) -> ExtensionResult {
        registry.register_function(
            NativeFunctionDef::new(b"json_encode")
                .param(NativeParamInfo::typed(b"value", TypeHint::Mixed))
                .param(NativeParamInfo::typed(b"flags", TypeHint::Int).default(0i64))
                .param(NativeParamInfo::typed(b"depth", TypeHint::Int).default(512i64)),
        );
        registry.register_function(
            NativeFunctionDef::new(b"json_decode")
                .param(NativeParamInfo::typed(b"json", TypeHint::String))
                .param(
                    NativeParamInfo::typed(b"associative", TypeHint::Bool.nullable())
                        .default(Val::Null),
                )
                .param(NativeParamInfo::typed(b"depth", TypeHint::Int).default(512i64))
                .param(NativeParamInfo::typed(b"flags", TypeHint::Int).default(0i64))
                .returns(TypeHint::Mixed),
        );
        registry.register_function(
            NativeFunctionDef::new(b"json_validate")
                .param(NativeParamInfo::typed(b"json", TypeHint::String))
                .param(NativeParamInfo::typed(b"depth", TypeHint::Int).default(512i64))
                .param(NativeParamInfo::typed(b"flags", TypeHint::Int).default(0i64))
                .returns(TypeHint::Bool),
        );
        registry.register_function(
            NativeFunctionDef::new(b"json_last_error").returns(TypeHint::Int),
        );
        registry.register_function(
            NativeFunctionDef::new(b"json_last_error_msg").returns(TypeHint::String),
        );

        registry.register_class(
            NativeClassDef::new_interface(b"JsonSerializable").method(
                b"jsonSerialize",
                NativeMethodEntry::public().returns(TypeHint::Mixed),
            ),
        );
        registry.register_class(NativeClassDef::new_class(b"JsonException").extends(b"Exception"));

        // Error codes
        registry.register_constant(b"JSON_ERROR_NONE", 0i64);
        registry.register_constant(b"JSON_ERROR_DEPTH", 1i64);
        registry.register_constant(b"JSON_ERROR_STATE_MISMATCH", 2i64);
        registry.register_constant(b"JSON_ERROR_CTRL_CHAR", 3i64);
        registry.register_constant(b"JSON_ERROR_SYNTAX", 4i64);
        registry.register_constant(b"JSON_ERROR_UTF8", 5i64);
        registry.register_constant(b"JSON_ERROR_RECURSION", 6i64);
        registry.register_constant(b"JSON_ERROR_INF_OR_NAN", 7i64);
        registry.register_constant(b"JSON_ERROR_UNSUPPORTED_TYPE", 8i64);
        registry.register_constant(b"JSON_ERROR_INVALID_PROPERTY_NAME", 9i64);
        registry.register_constant(b"JSON_ERROR_UTF16", 10i64);

        // Options
        registry.register_constant(b"JSON_HEX_TAG", 1i64);
        registry.register_constant(b"JSON_HEX_AMP", 2i64);
        registry.register_constant(b"JSON_HEX_APOS", 4i64);
        registry.register_constant(b"JSON_HEX_QUOT", 8i64);
        registry.register_constant(b"JSON_FORCE_OBJECT", 16i64);
        registry.register_constant(b"JSON_NUMERIC_CHECK", 32i64);
        registry.register_constant(b"JSON_UNESCAPED_SLASHES", 64i64);
        registry.register_constant(b"JSON_PRETTY_PRINT", 128i64);
        registry.register_constant(b"JSON_UNESCAPED_UNICODE", 256i64);
        registry.register_constant(b"JSON_PARTIAL_OUTPUT_ON_ERROR", 512i64);
        registry.register_constant(b"JSON_PRESERVE_ZERO_FRACTION", 1024i64);
        registry.register_constant(b"JSON_UNESCAPED_LINE_TERMINATORS", 2048i64);
        registry.register_constant(b"JSON_OBJECT_AS_ARRAY", 1i64);
        registry.register_constant(b"JSON_BIGINT_AS_STRING", 2i64);
        registry.register_constant(b"JSON_INVALID_UTF8_IGNORE", 1048576i64);
        registry.register_constant(b"JSON_INVALID_UTF8_SUBSTITUTE", 2097152i64);
        registry.register_constant(b"JSON_THROW_ON_ERROR", 4194304i64);

        ExtensionResult::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::context::EngineBuilder;

    #[test]
    fn test_json_extension_registration() {
        let engine = EngineBuilder::new()
            .with_core_extensions()
            .with_extension(JsonExtension)
            .build()
            .expect("Failed to build engine with JSON extension");

        assert!(
            engine.registry.extension_loaded("json"),
            "JSON extension should be loaded"
        );

        let module = engine.registry.get_module("json").unwrap();
        let functions: Vec<_> = engine
            .registry
            .module_functions(module)
            .map(|f| String::from_utf8_lossy(&f.name).into_owned())
            .collect();
        assert_eq!(
            functions,
            vec![
                "json_encode",
                "json_decode",
                "json_validate",
                "json_last_error",
                "json_last_error_msg"
            ]
        );

        assert_eq!(
            engine.registry.get_constant(b"JSON_THROW_ON_ERROR"),
            Some(&Val::Int(4194304))
        );
        assert_eq!(module.constants.len(), 28);
    }
}
