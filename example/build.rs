//! Builds the descriptors of the example protos, then runs the plugin on them
//! the way protoc would. `descriptor.bin` feeds the runtime descriptor pool;
//! the `.web.rs` files are included by `src/lib.rs`.

use std::error::Error;
use std::path::PathBuf;
use std::{env, fs};

use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet, MethodDescriptorProto,
    ServiceDescriptorProto,
};
use protoweb_compiler::binding::{HttpRule, HTTP_EXTENSION};
use protoweb_compiler::compile_request;
use protoweb_schema::descriptor::{RawCodeGeneratorRequest, RawFileDescriptorSet};

const TARGETS: [&str; 3] = ["acme/greeter.proto", "google/type/date.proto", "common.proto"];

fn field(name: &str, number: i32, ty: Type, type_name: Option<&str>) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_owned()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        type_name: type_name.map(str::to_owned),
        json_name: Some(name.to_owned()),
        ..Default::default()
    }
}

fn message(name: &str, fields: Vec<FieldDescriptorProto>, nested: Vec<DescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_owned()),
        field: fields,
        nested_type: nested,
        ..Default::default()
    }
}

fn file(name: &str, package: Option<&str>, deps: &[&str], messages: Vec<DescriptorProto>) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(name.to_owned()),
        package: package.map(str::to_owned),
        dependency: deps.iter().map(|d| d.to_string()).collect(),
        message_type: messages,
        syntax: Some("proto3".to_owned()),
        ..Default::default()
    }
}

fn method(name: &str, input: &str, output: &str) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.to_owned()),
        input_type: Some(input.to_owned()),
        output_type: Some(output.to_owned()),
        ..Default::default()
    }
}

fn descriptor_set() -> FileDescriptorSet {
    let mut greeter = file(
        "acme/greeter.proto",
        Some("acme"),
        &["google/protobuf/empty.proto", "google/protobuf/timestamp.proto", "google/type/date.proto", "common.proto"],
        vec![
            message(
                "HelloRequest",
                vec![
                    field("name", 1, Type::String, None),
                    field("times", 2, Type::Int32, None),
                    field("meta", 3, Type::Message, Some(".acme.HelloRequest.Meta")),
                ],
                vec![message("Meta", vec![field("trace", 1, Type::String, None)], vec![])],
            ),
            message("HelloReply", vec![field("message", 1, Type::String, None)], vec![]),
        ],
    );
    greeter.service.push(ServiceDescriptorProto {
        name: Some("Greeter".to_owned()),
        method: vec![
            method("SayHello", ".acme.HelloRequest", ".acme.HelloReply"),
            method("Shout", ".acme.HelloRequest", ".acme.HelloReply"),
            method("Ping", ".acme.HelloRequest", ".google.protobuf.Empty"),
            method("Now", ".google.protobuf.Empty", ".google.protobuf.Timestamp"),
            method("Birthday", ".google.type.Date", ".acme.HelloReply"),
            method("Tagged", ".Tag", ".acme.HelloReply"),
        ],
        ..Default::default()
    });

    FileDescriptorSet {
        file: vec![
            file("google/protobuf/empty.proto", Some("google.protobuf"), &[], vec![message("Empty", vec![], vec![])]),
            file(
                "google/protobuf/timestamp.proto",
                Some("google.protobuf"),
                &[],
                vec![message(
                    "Timestamp",
                    vec![field("seconds", 1, Type::Int64, None), field("nanos", 2, Type::Int32, None)],
                    vec![],
                )],
            ),
            file(
                "google/type/date.proto",
                Some("google.type"),
                &[],
                vec![message(
                    "Date",
                    vec![
                        field("year", 1, Type::Int32, None),
                        field("month", 2, Type::Int32, None),
                        field("day", 3, Type::Int32, None),
                    ],
                    vec![],
                )],
            ),
            file("common.proto", None, &[], vec![message("Tag", vec![field("label", 1, Type::String, None)], vec![])]),
            greeter,
        ],
    }
}

/// `MethodOptions` carrying only the `google.api.http` extension.
fn http_options(verb: &str, pattern: &str) -> Vec<u8> {
    let mut rule = HttpRule::default();
    match verb {
        "GET" => rule.get = pattern.to_owned(),
        _ => {
            rule.post = pattern.to_owned();
            rule.body = "*".to_owned();
        }
    }
    let mut buf = Vec::new();
    prost::encoding::message::encode(HTTP_EXTENSION, &rule, &mut buf);
    buf
}

fn bindings(method: &str) -> Option<(&'static str, &'static str)> {
    match method {
        "SayHello" => Some(("GET", "/v1/hello/{name}")),
        "Shout" => Some(("POST", "/v1/shout")),
        "Ping" => Some(("POST", "/v1/ping")),
        "Now" => Some(("GET", "/v1/now")),
        "Birthday" => Some(("POST", "/v1/birthday")),
        "Tagged" => Some(("GET", "/v1/tags")),
        _ => None,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let set = descriptor_set().encode_to_vec();
    fs::write(out_dir.join("descriptor.bin"), &set)?;

    // Extensions do not survive prost-types, so the annotations are added to
    // the raw descriptors the plugin reads.
    let mut raw = RawFileDescriptorSet::decode(set.as_slice())?;
    for service in raw.file.iter_mut().flat_map(|f| f.service.iter_mut()) {
        for method in &mut service.method {
            if let Some((verb, pattern)) = method.name.as_deref().and_then(bindings) {
                method.options = Some(http_options(verb, pattern));
            }
        }
    }

    let request = RawCodeGeneratorRequest {
        file_to_generate: TARGETS.iter().map(|t| t.to_string()).collect(),
        parameter: Some("module_root=crate::pb".to_owned()),
        proto_file: raw.file,
    };
    let response = compile_request(&request.encode_to_vec())?;

    for generated in response.file {
        let (Some(name), Some(content)) = (generated.name, generated.content) else {
            continue;
        };
        let path = out_dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    }

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
