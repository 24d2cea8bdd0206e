//! The intermediate model handed from extraction/resolution to a renderer.
//! Nothing in here knows about the syntax of the generated code.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get    => "GET",
            Verb::Post   => "POST",
            Verb::Put    => "PUT",
            Verb::Patch  => "PATCH",
            Verb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One HTTP binding of an RPC method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub verb:    Verb,
    pub pattern: String,
    /// Empty when the body is not consumed, `*` or a field name otherwise.
    pub body:    String,
}

/// A message type as seen from the file being rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSpec {
    pub full_name: String,
    /// Path prefix when the type lives in another package: an import alias,
    /// or the module root for types declared outside any package.
    pub alias:     Option<String>,
    /// Message names from the package down to the type, outermost first.
    pub path:      Vec<String>,
    /// The type is the "no payload" marker and carries no data.
    pub empty:     bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSpec {
    /// RPC name as declared in the schema.
    pub method:           String,
    pub binding:          Binding,
    pub input:            TypeSpec,
    pub output:           TypeSpec,
    pub client_streaming: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSpec {
    pub name:   String,
    /// Routable methods only, in declaration order.
    pub routes: Vec<RouteSpec>,
}

/// A message that gets a JSON adapter pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterSpec {
    pub full_name: String,
    pub path:      Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    pub path:  String,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSpec {
    /// The `.proto` file this output is generated from.
    pub source:      String,
    pub package:     String,
    /// Identifier-safe stem of the source file.
    pub stem:        String,
    /// Prepended to every route pattern.
    pub path_prefix: String,
    /// Alias table of the file, sorted by path.
    pub imports:     Vec<Import>,
    pub services:    Vec<ServiceSpec>,
    pub adapters:    Vec<AdapterSpec>,
}

/// A rendered output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub name:    String,
    pub content: String,
}
