//! Descriptors for unit tests.

use prost_reflect::{DescriptorPool, DynamicMessage, MessageDescriptor};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    FileDescriptorSet, MessageOptions,
};

fn field(name: &str, json_name: &str, number: i32, ty: Type, type_name: Option<&str>) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_owned()),
        json_name: Some(json_name.to_owned()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        type_name: type_name.map(str::to_owned),
        ..Default::default()
    }
}

fn repeated(mut field: FieldDescriptorProto) -> FieldDescriptorProto {
    field.label = Some(Label::Repeated as i32);
    field
}

/// `test.Greeting`: one field of each shape the form decoder handles.
pub fn descriptor() -> MessageDescriptor {
    let inner = DescriptorProto {
        name: Some("Inner".to_owned()),
        field: vec![field("id", "id", 1, Type::Int64, None)],
        ..Default::default()
    };
    let scores_entry = DescriptorProto {
        name: Some("ScoresEntry".to_owned()),
        field: vec![
            field("key", "key", 1, Type::String, None),
            field("value", "value", 2, Type::Int32, None),
        ],
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    };
    let mood = EnumDescriptorProto {
        name: Some("Mood".to_owned()),
        value: ["MOOD_UNKNOWN", "HAPPY", "SAD"]
            .iter()
            .zip(0..)
            .map(|(name, number)| EnumValueDescriptorProto {
                name: Some((*name).to_owned()),
                number: Some(number),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };

    let greeting = DescriptorProto {
        name: Some("Greeting".to_owned()),
        field: vec![
            field("name", "name", 1, Type::String, None),
            field("count", "count", 2, Type::Int32, None),
            field("loud", "loud", 3, Type::Bool, None),
            repeated(field("tags", "tags", 4, Type::String, None)),
            field("inner", "inner", 5, Type::Message, Some(".test.Greeting.Inner")),
            field("mood", "mood", 6, Type::Enum, Some(".test.Greeting.Mood")),
            repeated(field("scores", "scores", 7, Type::Message, Some(".test.Greeting.ScoresEntry"))),
            field("ratio", "ratio", 8, Type::Double, None),
            field("display_name", "displayName", 9, Type::String, None),
        ],
        nested_type: vec![inner, scores_entry],
        enum_type: vec![mood],
        ..Default::default()
    };

    let file = FileDescriptorProto {
        name: Some("test/greeting.proto".to_owned()),
        package: Some("test".to_owned()),
        message_type: vec![greeting],
        syntax: Some("proto3".to_owned()),
        ..Default::default()
    };

    DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: vec![file] })
        .unwrap()
        .get_message_by_name("test.Greeting")
        .unwrap()
}

pub fn greeting() -> DynamicMessage {
    DynamicMessage::new(descriptor())
}
