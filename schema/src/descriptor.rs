//! Wire-level views of the protoc plugin request.
//!
//! These mirror the upstream `google.protobuf.compiler.CodeGeneratorRequest`
//! and `google.protobuf.FileDescriptorProto` messages, keeping only the fields
//! the generator reads. Unknown fields are skipped by prost while decoding.
//!
//! `RawMethod::options` is declared as `bytes` rather than as a
//! `MethodOptions` message. Both share the length-delimited wire type, so the
//! option payload arrives untouched, extensions included. Decoding it into
//! `prost_types::MethodOptions` would drop `google.api.http`.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RawCodeGeneratorRequest {
    #[prost(string, repeated, tag = "1")]
    pub file_to_generate: Vec<String>,
    #[prost(string, optional, tag = "2")]
    pub parameter: Option<String>,
    #[prost(message, repeated, tag = "15")]
    pub proto_file: Vec<RawFileDescriptor>,
}

/// `google.protobuf.FileDescriptorSet`, as written by
/// `protoc --descriptor_set_out --include_imports`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RawFileDescriptorSet {
    #[prost(message, repeated, tag = "1")]
    pub file: Vec<RawFileDescriptor>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RawFileDescriptor {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub package: Option<String>,
    #[prost(message, repeated, tag = "4")]
    pub message_type: Vec<RawMessage>,
    #[prost(message, repeated, tag = "6")]
    pub service: Vec<RawService>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RawMessage {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(message, repeated, tag = "3")]
    pub nested_type: Vec<RawMessage>,
    #[prost(message, optional, tag = "7")]
    pub options: Option<RawMessageOptions>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RawMessageOptions {
    /// Set on the synthetic entry messages protoc creates for `map<K, V>` fields.
    #[prost(bool, optional, tag = "7")]
    pub map_entry: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RawService {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(message, repeated, tag = "2")]
    pub method: Vec<RawMethod>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RawMethod {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub input_type: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub output_type: Option<String>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub options: Option<Vec<u8>>,
    #[prost(bool, optional, tag = "5")]
    pub client_streaming: Option<bool>,
    #[prost(bool, optional, tag = "6")]
    pub server_streaming: Option<bool>,
}
