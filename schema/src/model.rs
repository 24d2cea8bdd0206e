use std::collections::HashMap;

use prost::Message as _;

use crate::{
    descriptor::{RawCodeGeneratorRequest, RawFileDescriptor, RawFileDescriptorSet, RawMessage},
    error::SchemaError,
    EMPTY_MARKER, SCALAR_WRAPPERS,
};

/// A reference to a message type, carrying the identity of the file and
/// package that declare it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// Fully-qualified name without the leading dot (e.g. `helloworld.HelloRequest`).
    pub full_name: String,
    pub package:   String,
    /// Name of the `.proto` file declaring the type.
    pub file:      String,
    /// Message names from the package down to the type, outermost first.
    pub path:      Vec<String>,
}

impl TypeRef {
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    pub fn is_empty_marker(&self) -> bool {
        self.full_name == EMPTY_MARKER
    }

    /// `google.protobuf.StringValue` and the other scalar wrappers.
    pub fn is_scalar_wrapper(&self) -> bool {
        SCALAR_WRAPPERS.contains(&self.full_name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name:             String,
    pub input:            TypeRef,
    pub output:           TypeRef,
    pub client_streaming: bool,
    pub server_streaming: bool,
    /// Serialized `google.protobuf.MethodOptions`, extensions included.
    pub options:          Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub name:    String,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub full_name: String,
    /// Message names from the package down to this message, outermost first.
    pub path:      Vec<String>,
}

impl Message {
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub name:     String,
    pub package:  String,
    pub services: Vec<Service>,
    /// Every message declared in the file, nested ones included, in
    /// declaration order (parents before children). Map entries are left out.
    pub messages: Vec<Message>,
}

impl File {
    /// The file name with its `.proto` extension replaced by `ext`.
    pub fn output_path(&self, ext: &str) -> String {
        let stem = self.name.strip_suffix(".proto").unwrap_or(&self.name);
        format!("{}{}", stem, ext)
    }

    /// The file name without directories or extension.
    pub fn stem(&self) -> &str {
        let base = self.name.rsplit('/').next().unwrap_or(&self.name);
        base.strip_suffix(".proto").unwrap_or(base)
    }
}

/// All files of one protoc run, plus the subset protoc asked us to generate.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    files:   Vec<File>,
    targets: Vec<String>,
}

#[derive(Debug, Clone)]
struct Declared {
    file:    String,
    package: String,
    path:    Vec<String>,
}

impl Model {
    /// Resolve raw descriptors into a model. `targets` keeps its order; names
    /// with no matching descriptor are ignored.
    pub fn new(raw_files: Vec<RawFileDescriptor>, targets: Vec<String>) -> Result<Self, SchemaError> {
        let mut declared: HashMap<String, Declared> = HashMap::new();
        for raw in &raw_files {
            let file = raw.name.clone().ok_or(SchemaError::MissingFileName)?;
            let package = raw.package.clone().unwrap_or_default();
            for message in &raw.message_type {
                declare(message, &file, &package, &[], &mut declared);
            }
        }

        let mut files = Vec::with_capacity(raw_files.len());
        for raw in raw_files {
            files.push(resolve_file(raw, &declared)?);
        }

        Ok(Model { files, targets })
    }

    /// Decode a `CodeGeneratorRequest`, returning the model and the raw
    /// plugin parameter.
    pub fn decode_request(buf: &[u8]) -> Result<(Self, Option<String>), SchemaError> {
        let request = RawCodeGeneratorRequest::decode(buf)?;
        let model = Model::new(request.proto_file, request.file_to_generate)?;
        Ok((model, request.parameter))
    }

    /// Decode a `FileDescriptorSet`. When `targets` is empty every file in the
    /// set is a target.
    pub fn decode_descriptor_set(buf: &[u8], targets: Vec<String>) -> Result<Self, SchemaError> {
        let set = RawFileDescriptorSet::decode(buf)?;
        let targets = if targets.is_empty() {
            set.file.iter().filter_map(|f| f.name.clone()).collect()
        } else {
            targets
        };
        Model::new(set.file, targets)
    }

    pub fn files(&self) -> &[File] {
        &self.files
    }

    pub fn file(&self, name: &str) -> Option<&File> {
        self.files.iter().find(|f| f.name == name)
    }

    /// The files to generate, in the order protoc listed them.
    pub fn targets(&self) -> impl Iterator<Item = &File> {
        self.targets.iter().filter_map(move |name| self.file(name))
    }
}

fn is_map_entry(message: &RawMessage) -> bool {
    message
        .options
        .as_ref()
        .and_then(|o| o.map_entry)
        .unwrap_or(false)
}

fn full_name(package: &str, path: &[String]) -> String {
    if package.is_empty() {
        path.join(".")
    } else {
        format!("{}.{}", package, path.join("."))
    }
}

fn declare(
    message:  &RawMessage,
    file:     &str,
    package:  &str,
    parent:   &[String],
    declared: &mut HashMap<String, Declared>,
) {
    let mut path = parent.to_vec();
    path.push(message.name.clone().unwrap_or_default());

    declared.insert(
        full_name(package, &path),
        Declared {
            file:    file.to_string(),
            package: package.to_string(),
            path:    path.clone(),
        },
    );

    for nested in &message.nested_type {
        declare(nested, file, package, &path, declared);
    }
}

fn flatten(message: &RawMessage, package: &str, parent: &[String], out: &mut Vec<Message>) {
    if is_map_entry(message) {
        return;
    }

    let mut path = parent.to_vec();
    path.push(message.name.clone().unwrap_or_default());

    out.push(Message {
        full_name: full_name(package, &path),
        path:      path.clone(),
    });

    for nested in &message.nested_type {
        flatten(nested, package, &path, out);
    }
}

fn resolve_type(
    type_name: Option<&str>,
    method:    &str,
    declared:  &HashMap<String, Declared>,
) -> Result<TypeRef, SchemaError> {
    let type_name = type_name.unwrap_or_default();
    let key = type_name.trim_start_matches('.');
    let found = declared.get(key).ok_or_else(|| SchemaError::UnknownType {
        type_name: type_name.to_string(),
        method:    method.to_string(),
    })?;

    Ok(TypeRef {
        full_name: key.to_string(),
        package:   found.package.clone(),
        file:      found.file.clone(),
        path:      found.path.clone(),
    })
}

fn resolve_file(raw: RawFileDescriptor, declared: &HashMap<String, Declared>) -> Result<File, SchemaError> {
    let name = raw.name.unwrap_or_default();
    let package = raw.package.unwrap_or_default();

    let mut messages = Vec::new();
    for message in &raw.message_type {
        flatten(message, &package, &[], &mut messages);
    }

    let mut services = Vec::with_capacity(raw.service.len());
    for service in raw.service {
        let mut methods = Vec::with_capacity(service.method.len());
        for method in service.method {
            let method_name = method.name.unwrap_or_default();
            methods.push(Method {
                input:            resolve_type(method.input_type.as_deref(), &method_name, declared)?,
                output:           resolve_type(method.output_type.as_deref(), &method_name, declared)?,
                client_streaming: method.client_streaming.unwrap_or(false),
                server_streaming: method.server_streaming.unwrap_or(false),
                options:          method.options.unwrap_or_default(),
                name:             method_name,
            });
        }
        services.push(Service {
            name: service.name.unwrap_or_default(),
            methods,
        });
    }

    Ok(File { name, package, services, messages })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{RawMessageOptions, RawMethod, RawService};
    use prost::Message as _;

    fn message(name: &str, nested: Vec<RawMessage>) -> RawMessage {
        RawMessage {
            name:        Some(name.to_owned()),
            nested_type: nested,
            options:     None,
        }
    }

    fn map_entry(name: &str) -> RawMessage {
        RawMessage {
            name:        Some(name.to_owned()),
            nested_type: vec![],
            options:     Some(RawMessageOptions { map_entry: Some(true) }),
        }
    }

    fn files() -> Vec<RawFileDescriptor> {
        vec![
            RawFileDescriptor {
                name:         Some("google/protobuf/empty.proto".to_owned()),
                package:      Some("google.protobuf".to_owned()),
                message_type: vec![message("Empty", vec![])],
                service:      vec![],
            },
            RawFileDescriptor {
                name:         Some("helloworld/greeter.proto".to_owned()),
                package:      Some("helloworld".to_owned()),
                message_type: vec![
                    message("HelloRequest", vec![message("Meta", vec![]), map_entry("LabelsEntry")]),
                    message("HelloReply", vec![]),
                ],
                service: vec![RawService {
                    name:   Some("Greeter".to_owned()),
                    method: vec![
                        RawMethod {
                            name:        Some("SayHello".to_owned()),
                            input_type:  Some(".helloworld.HelloRequest".to_owned()),
                            output_type: Some(".helloworld.HelloReply".to_owned()),
                            ..Default::default()
                        },
                        RawMethod {
                            name:             Some("Watch".to_owned()),
                            input_type:       Some(".helloworld.HelloRequest.Meta".to_owned()),
                            output_type:      Some(".google.protobuf.Empty".to_owned()),
                            server_streaming: Some(true),
                            ..Default::default()
                        },
                    ],
                }],
            },
        ]
    }

    #[test]
    fn test_resolves_type_references() {
        let model = Model::new(files(), vec!["helloworld/greeter.proto".to_owned()]).unwrap();
        let file = model.targets().next().unwrap();
        assert_eq!(file.package, "helloworld");

        let watch = &file.services[0].methods[1];
        assert!(watch.server_streaming);
        assert_eq!(watch.input.path, vec!["HelloRequest", "Meta"]);
        assert_eq!(watch.input.name(), "Meta");
        assert_eq!(watch.output.file, "google/protobuf/empty.proto");
        assert_eq!(watch.output.package, "google.protobuf");
        assert!(watch.output.is_empty_marker());
        assert!(!watch.input.is_empty_marker());
        assert!(!watch.output.is_scalar_wrapper());

        let wrapper = TypeRef {
            full_name: "google.protobuf.StringValue".to_owned(),
            package:   "google.protobuf".to_owned(),
            file:      "google/protobuf/wrappers.proto".to_owned(),
            path:      vec!["StringValue".to_owned()],
        };
        assert!(wrapper.is_scalar_wrapper());
    }

    #[test]
    fn test_flattens_nested_messages_without_map_entries() {
        let model = Model::new(files(), vec![]).unwrap();
        let file = model.file("helloworld/greeter.proto").unwrap();
        let names: Vec<&str> = file.messages.iter().map(|m| m.full_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["helloworld.HelloRequest", "helloworld.HelloRequest.Meta", "helloworld.HelloReply"]
        );
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let mut raw = files();
        raw[1].service[0].method[0].input_type = Some(".helloworld.Missing".to_owned());
        let err = Model::new(raw, vec![]).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { .. }));
    }

    #[test]
    fn test_output_path_and_stem() {
        let model = Model::new(files(), vec![]).unwrap();
        let file = model.file("helloworld/greeter.proto").unwrap();
        assert_eq!(file.output_path(".web.rs"), "helloworld/greeter.web.rs");
        assert_eq!(file.stem(), "greeter");
    }

    #[test]
    fn test_decode_request_keeps_target_order() {
        let request = RawCodeGeneratorRequest {
            file_to_generate: vec!["helloworld/greeter.proto".to_owned(), "google/protobuf/empty.proto".to_owned()],
            parameter:        Some("ignore_packages=google.protobuf".to_owned()),
            proto_file:       files(),
        };
        let (model, parameter) = Model::decode_request(&request.encode_to_vec()).unwrap();
        let order: Vec<&str> = model.targets().map(|f| f.name.as_str()).collect();
        assert_eq!(order, vec!["helloworld/greeter.proto", "google/protobuf/empty.proto"]);
        assert_eq!(parameter.as_deref(), Some("ignore_packages=google.protobuf"));
    }
}
