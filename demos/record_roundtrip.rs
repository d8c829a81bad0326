//! Encode a record, decode it with an older schema, and print both.
//!
//! Run with: `cargo run --example record_roundtrip`

use std::sync::Arc;
use tagwire::config::LoggingConfig;
use tagwire::utils::metrics::{global_metrics, Timer};
use tagwire::utils::init_logging;
use tagwire::{Codec, CodecConfig, FieldSpec, FieldType, Record, Schema};

fn main() -> tagwire::Result<()> {
    let config = CodecConfig::default_with_overrides(|c| {
        c.logging = LoggingConfig {
            log_level: tracing::Level::DEBUG,
            ..LoggingConfig::default()
        };
    });
    config.validate_strict()?;
    init_logging(&config.logging)?;

    let address = Arc::new(
        Schema::builder("Address")
            .field(FieldSpec::required(1, "city", FieldType::String))
            .field(FieldSpec::optional(2, "zip", FieldType::Fixed32))
            .build()?,
    );
    let v2 = Schema::builder("Person")
        .field(FieldSpec::required(1, "name", FieldType::String))
        .field(FieldSpec::always(2, "age", FieldType::Uint32))
        .field(FieldSpec::optional(3, "score", FieldType::Sint64).with_default(-1i64))
        .field(FieldSpec::optional(4, "home", FieldType::Message(address)))
        .field(FieldSpec::optional(5, "nickname", FieldType::String))
        .build()?;
    let v1 = Schema::builder("Person")
        .field(FieldSpec::required(1, "name", FieldType::String))
        .field(FieldSpec::always(2, "age", FieldType::Uint32))
        .field(FieldSpec::optional(3, "score", FieldType::Sint64).with_default(-1i64))
        .build()?;

    let person = Record::new()
        .with(1, "Ada")
        .with(2, 36u32)
        .with(4, Record::new().with(1, "London").with(2, 12345u32))
        .with(5, "countess");

    let codec = Codec::from_config(&config);
    let bytes = {
        let _timer = Timer::start("encode");
        codec.encode(&person, &v2)?
    };
    println!("v2 record:  {}", v2.display(&person));
    println!("encoded:    {} bytes {:02X?}", bytes.len(), bytes);

    let seen_by_v1 = codec.decode(&bytes, &v1)?;
    println!("v1 decoded: {}", v1.display(&seen_by_v1));
    if let Some(score) = v1.value_or_default(&seen_by_v1, 3) {
        println!("v1 score (default): {}", score.as_i64().unwrap_or_default());
    }

    global_metrics().log_metrics();
    Ok(())
}
