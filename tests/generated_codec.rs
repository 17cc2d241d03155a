//! End-to-end tests driving generated record codecs through the registry,
//! including generic instantiations and nested container components.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use record_codec::record::{FieldMarker, FieldSchema, RecordCodecProvider, RecordSchema, Slots};
use record_codec::wire::raw::{RawDocumentReader, RawDocumentWriter};
use record_codec::wire::{DocumentReader, DocumentWriter, ElementType};
use record_codec::{
    Codec, CodecRegistry, ConfigurationError, DecoderContext, EncoderContext, TypeRef,
};

use record_codec::builtin::ContainerCodecProvider;

#[derive(Debug, PartialEq)]
struct Member {
    id: Option<String>,
    name: Option<String>,
    age: i32,
    hobbies: Option<Vec<String>>,
}

fn member_id(m: &Member) -> Option<&dyn Any> {
    m.id.as_ref().map(|v| v as &dyn Any)
}

fn member_name(m: &Member) -> Option<&dyn Any> {
    m.name.as_ref().map(|v| v as &dyn Any)
}

fn member_hobbies(m: &Member) -> Option<&dyn Any> {
    m.hobbies.as_ref().map(|v| v as &dyn Any)
}

fn member_schema() -> RecordSchema<Member> {
    RecordSchema::builder("Member", |slots: &mut Slots| Member {
        id: slots.reference(0),
        name: slots.reference(1),
        age: slots.int32(2),
        hobbies: slots.reference(3),
    })
    .field(
        FieldSchema::reference("id", TypeRef::string(), member_id).with_marker(FieldMarker::Id),
    )
    .field(FieldSchema::reference("name", TypeRef::string(), member_name))
    .field(
        FieldSchema::int32("age", |m: &Member| m.age)
            .with_marker(FieldMarker::Rename("a".to_owned())),
    )
    .field(FieldSchema::reference(
        "hobbies",
        TypeRef::list(TypeRef::string()),
        member_hobbies,
    ))
    .build()
}

#[derive(Debug, PartialEq)]
struct Embedded {
    label: Option<String>,
    count: i64,
}

fn embedded_label(e: &Embedded) -> Option<&dyn Any> {
    e.label.as_ref().map(|v| v as &dyn Any)
}

fn embedded_schema() -> RecordSchema<Embedded> {
    RecordSchema::builder("Embedded", |slots: &mut Slots| Embedded {
        label: slots.reference(0),
        count: slots.int64(1),
    })
    .field(FieldSchema::reference(
        "label",
        TypeRef::string(),
        embedded_label,
    ))
    .field(FieldSchema::int64("count", |e: &Embedded| e.count))
    .build()
}

#[derive(Debug, PartialEq)]
struct Parameterized {
    number: Option<f64>,
    item: Option<Embedded>,
}

fn parameterized_number(p: &Parameterized) -> Option<&dyn Any> {
    p.number.as_ref().map(|v| v as &dyn Any)
}

fn parameterized_item(p: &Parameterized) -> Option<&dyn Any> {
    p.item.as_ref().map(|v| v as &dyn Any)
}

fn parameterized_schema() -> RecordSchema<Parameterized> {
    RecordSchema::builder("Parameterized", |slots: &mut Slots| Parameterized {
        number: slots.reference(0),
        item: slots.reference(1),
    })
    .type_parameter("T")
    .field(FieldSchema::reference(
        "number",
        TypeRef::double(),
        parameterized_number,
    ))
    .field(FieldSchema::reference(
        "item",
        TypeRef::variable("T"),
        parameterized_item,
    ))
    .build()
}

fn test_registry() -> CodecRegistry {
    let embedded = TypeRef::named("Embedded");
    CodecRegistry::builder()
        .with_builtins()
        .provider(
            ContainerCodecProvider::builder()
                .list::<String>(TypeRef::string())
                .list::<Embedded>(embedded.clone())
                .list::<Vec<Embedded>>(TypeRef::list(embedded.clone()))
                .list::<Vec<Vec<Embedded>>>(TypeRef::list(TypeRef::list(embedded.clone())))
                .list::<HashMap<String, Embedded>>(TypeRef::map(embedded.clone()))
                .map::<Embedded>(embedded.clone())
                .map::<HashMap<String, Embedded>>(TypeRef::map(embedded))
                .build(),
        )
        .provider(
            RecordCodecProvider::builder()
                .record(member_schema())
                .record(embedded_schema())
                .record(parameterized_schema())
                .build(),
        )
        .build()
}

fn encode_value(codec: &dyn Codec, value: &dyn Any) -> Vec<u8> {
    let mut writer = RawDocumentWriter::new();
    codec
        .encode(&mut writer, value, &EncoderContext::builder().build())
        .unwrap();
    writer.into_bytes().unwrap()
}

fn decode_value<T: 'static>(codec: &dyn Codec, bytes: Vec<u8>) -> T {
    let mut reader = RawDocumentReader::new(bytes);
    let decoded = codec
        .decode(&mut reader, &DecoderContext::builder().build())
        .unwrap();
    *decoded.downcast::<T>().unwrap()
}

fn field_names(bytes: &[u8]) -> Vec<String> {
    let mut reader = RawDocumentReader::new(bytes.to_vec());
    reader.read_start_document().unwrap();
    let mut names = Vec::new();
    while reader.read_element_type().unwrap() != ElementType::EndOfDocument {
        names.push(reader.read_name().unwrap());
        reader.skip_value().unwrap();
    }
    reader.read_end_document().unwrap();
    names
}

#[test]
fn test_member_roundtrip_with_declared_field_order() {
    let registry = test_registry();
    let codec = registry.get(&TypeRef::named("Member")).unwrap();

    let member = Member {
        id: Some("42".to_owned()),
        name: Some("Liz".to_owned()),
        age: 56,
        hobbies: Some(vec!["pottery".to_owned()]),
    };
    let bytes = encode_value(codec.as_ref(), &member);
    assert_eq!(field_names(&bytes), vec!["_id", "name", "a", "hobbies"]);
    assert_eq!(decode_value::<Member>(codec.as_ref(), bytes), member);
}

#[test]
fn test_member_with_absent_references() {
    let registry = test_registry();
    let codec = registry.get(&TypeRef::named("Member")).unwrap();

    let member = Member {
        id: None,
        name: None,
        age: 0,
        hobbies: None,
    };
    let bytes = encode_value(codec.as_ref(), &member);
    assert_eq!(field_names(&bytes), vec!["a"]);
    assert_eq!(decode_value::<Member>(codec.as_ref(), bytes), member);
}

#[test]
fn test_generic_record_with_record_argument() {
    let registry = test_registry();
    let codec = registry
        .get(&TypeRef::parameterized(
            "Parameterized",
            vec![TypeRef::named("Embedded")],
        ))
        .unwrap();

    let value = Parameterized {
        number: Some(2.5),
        item: Some(Embedded {
            label: Some("inner".to_owned()),
            count: 7,
        }),
    };
    let bytes = encode_value(codec.as_ref(), &value);
    assert_eq!(decode_value::<Parameterized>(codec.as_ref(), bytes), value);
}

#[test]
fn test_generic_record_requires_type_argument() {
    let registry = test_registry();
    let err = registry.get(&TypeRef::named("Parameterized")).unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::MissingTypeArgument { .. }
    ));
}

#[test]
fn test_concurrent_lookup_and_encode() {
    let registry = std::sync::Arc::new(test_registry());
    let handles: Vec<_> = (0..4i64)
        .map(|i| {
            let registry = std::sync::Arc::clone(&registry);
            std::thread::spawn(move || {
                let codec = registry.get(&TypeRef::named("Embedded")).unwrap();
                let value = embedded("worker", i);
                let bytes = encode_value(codec.as_ref(), &value);
                assert_eq!(decode_value::<Embedded>(codec.as_ref(), bytes), value);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_instantiations_are_cached_and_shared() {
    let registry = test_registry();
    let ty = TypeRef::parameterized("Parameterized", vec![TypeRef::named("Embedded")]);
    let first = registry.get(&ty).unwrap();
    let second = registry.get(&ty).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

#[test]
fn test_unregistered_record_component_fails_generation() {
    // Member without the list codec: the hobbies child lookup fails.
    let registry = CodecRegistry::builder()
        .with_builtins()
        .provider(RecordCodecProvider::builder().record(member_schema()).build())
        .build();
    let err = registry.get(&TypeRef::named("Member")).unwrap_err();
    assert!(matches!(err, ConfigurationError::CodecNotFound { .. }));
}

#[test]
fn test_codec_reports_its_value_type() {
    let registry = test_registry();
    let codec = registry.get(&TypeRef::named("Member")).unwrap();
    assert_eq!(codec.value_type(), TypeId::of::<Member>());
    assert!(codec.value_type_name().ends_with("Member"));
}

/// Roundtrip a standalone container value by wrapping it in a one-field
/// document.
fn roundtrip_wrapped<T: 'static>(codec: &dyn Codec, value: &T) -> T {
    let mut writer = RawDocumentWriter::new();
    writer.write_start_document().unwrap();
    writer.write_name("v").unwrap();
    codec
        .encode(&mut writer, value, &EncoderContext::builder().build())
        .unwrap();
    writer.write_end_document().unwrap();

    let mut reader = RawDocumentReader::new(writer.into_bytes().unwrap());
    reader.read_start_document().unwrap();
    reader.read_element_type().unwrap();
    assert_eq!(reader.read_name().unwrap(), "v");
    let decoded = codec
        .decode(&mut reader, &DecoderContext::builder().build())
        .unwrap();
    assert_eq!(
        reader.read_element_type().unwrap(),
        ElementType::EndOfDocument
    );
    reader.read_end_document().unwrap();
    *decoded.downcast::<T>().unwrap()
}

fn embedded(label: &str, count: i64) -> Embedded {
    Embedded {
        label: Some(label.to_owned()),
        count,
    }
}

#[test]
fn test_list_of_list_of_list_of_records() {
    let registry = test_registry();
    let ty = TypeRef::list(TypeRef::list(TypeRef::list(TypeRef::named("Embedded"))));
    let codec = registry.get(&ty).unwrap();

    let value: Vec<Vec<Vec<Embedded>>> = vec![
        vec![vec![embedded("a", 1)], vec![]],
        vec![vec![embedded("b", 2), embedded("c", 3)]],
    ];
    assert_eq!(roundtrip_wrapped(codec.as_ref(), &value), value);
}

#[test]
fn test_list_of_map_of_records() {
    let registry = test_registry();
    let ty = TypeRef::list(TypeRef::map(TypeRef::named("Embedded")));
    let codec = registry.get(&ty).unwrap();

    let mut entry = HashMap::new();
    entry.insert("x".to_owned(), embedded("x", 10));
    let value: Vec<HashMap<String, Embedded>> = vec![entry, HashMap::new()];
    assert_eq!(roundtrip_wrapped(codec.as_ref(), &value), value);
}

#[test]
fn test_map_of_map_of_records() {
    let registry = test_registry();
    let ty = TypeRef::map(TypeRef::map(TypeRef::named("Embedded")));
    let codec = registry.get(&ty).unwrap();

    let mut inner = HashMap::new();
    inner.insert("deep".to_owned(), embedded("deep", -4));
    let mut value: HashMap<String, HashMap<String, Embedded>> = HashMap::new();
    value.insert("outer".to_owned(), inner);
    value.insert("empty".to_owned(), HashMap::new());
    assert_eq!(roundtrip_wrapped(codec.as_ref(), &value), value);
}
