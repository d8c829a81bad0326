#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::{Arc, OnceLock};
use tagwire::core::skip::skip_field;
use tagwire::{decode, encode, FieldSpec, FieldType, Schema};

fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let inner = Schema::builder("Inner")
            .field(FieldSpec::optional(1, "id", FieldType::Uint64))
            .field(FieldSpec::optional(2, "label", FieldType::String))
            .build()
            .expect("inner schema");
        Schema::builder("Fuzz")
            .field(FieldSpec::optional(1, "name", FieldType::String))
            .field(FieldSpec::optional(2, "count", FieldType::Int64))
            .field(FieldSpec::optional(3, "delta", FieldType::Sint64))
            .field(FieldSpec::optional(4, "crc", FieldType::Fixed32))
            .field(FieldSpec::optional(5, "ratio", FieldType::Double))
            .field(FieldSpec::optional(6, "inner", FieldType::Message(Arc::new(inner))))
            .build()
            .expect("schema")
    })
}

fuzz_target!(|data: &[u8]| {
    // Decode and skip must reject bad input with an error, never a panic
    let _ = skip_field(data, 0);

    if let Ok(record) = decode(data, schema()) {
        // Anything that decodes must re-encode to a stable byte form
        let bytes = encode(&record, schema()).expect("re-encode");
        let again = decode(&bytes, schema()).expect("re-decode");
        assert_eq!(encode(&again, schema()).expect("re-encode"), bytes);
    }
});
