//! The protobuf schema model consumed by the protoweb generator.
//!
//! protoc hands a plugin a `CodeGeneratorRequest` whose files are full
//! `FileDescriptorProto`s. The generator only needs a small slice of that:
//! packages, services, methods with their raw option bytes, and the message
//! tree. [`descriptor`] holds the wire types for that slice and [`model`]
//! resolves them into [`File`]s with type references that know which file
//! and package they came from.
//!
//! ```
//! use protoweb_schema::{descriptor::*, Model};
//!
//! let file = RawFileDescriptor {
//!     name: Some("greeter.proto".to_owned()),
//!     package: Some("helloworld".to_owned()),
//!     message_type: vec![RawMessage { name: Some("HelloRequest".to_owned()), ..Default::default() }],
//!     ..Default::default()
//! };
//! let model = Model::new(vec![file], vec!["greeter.proto".to_owned()]).unwrap();
//! assert_eq!(model.targets().count(), 1);
//! ```

pub mod descriptor;
pub mod error;
pub mod model;

pub use error::SchemaError;
pub use model::*;

/// Full name of the well-known type used as the "no payload" marker.
pub const EMPTY_MARKER: &str = "google.protobuf.Empty";

/// Wrapper well-known types. prost maps these to plain Rust scalars, which
/// carry no message descriptor of their own.
pub const SCALAR_WRAPPERS: [&str; 9] = [
    "google.protobuf.BoolValue",
    "google.protobuf.BytesValue",
    "google.protobuf.DoubleValue",
    "google.protobuf.FloatValue",
    "google.protobuf.Int32Value",
    "google.protobuf.Int64Value",
    "google.protobuf.StringValue",
    "google.protobuf.UInt32Value",
    "google.protobuf.UInt64Value",
];
