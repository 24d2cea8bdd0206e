//! Extraction of the `google.api.http` binding from method options.

use prost::Message as _;
use protoweb_schema::Method;
use tracing::debug;

use crate::types::{Binding, Verb};

/// Field number of the `google.api.http` extension on `MethodOptions`.
pub const HTTP_EXTENSION: u32 = 72295728;

/// `google.api.HttpRule`, reduced to the parts a binding is built from.
///
/// Upstream the verb fields form a `oneof`; here each one is an independent
/// field so that a rule carrying several of them still decodes and the
/// selection order decides.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpRule {
    #[prost(string, tag = "1")]
    pub selector: String,
    #[prost(string, tag = "2")]
    pub get: String,
    #[prost(string, tag = "3")]
    pub put: String,
    #[prost(string, tag = "4")]
    pub post: String,
    #[prost(string, tag = "5")]
    pub delete: String,
    #[prost(string, tag = "6")]
    pub patch: String,
    #[prost(string, tag = "7")]
    pub body: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
struct HttpMethodOptions {
    #[prost(message, optional, tag = "72295728")]
    http: Option<HttpRule>,
}

/// One verb slot of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpPattern {
    Get(String),
    Post(String),
    Put(String),
    Patch(String),
    Delete(String),
    None,
}

impl HttpPattern {
    fn slot(pattern: &str, verb: fn(String) -> HttpPattern) -> HttpPattern {
        if pattern.is_empty() {
            HttpPattern::None
        } else {
            verb(pattern.to_string())
        }
    }

    pub fn verb(&self) -> Option<(Verb, &str)> {
        match self {
            HttpPattern::Get(p)    => Some((Verb::Get, p)),
            HttpPattern::Post(p)   => Some((Verb::Post, p)),
            HttpPattern::Put(p)    => Some((Verb::Put, p)),
            HttpPattern::Patch(p)  => Some((Verb::Patch, p)),
            HttpPattern::Delete(p) => Some((Verb::Delete, p)),
            HttpPattern::None      => None,
        }
    }
}

impl HttpRule {
    /// The verb slots in selection order: GET, POST, PUT, PATCH, DELETE.
    pub fn patterns(&self) -> [HttpPattern; 5] {
        [
            HttpPattern::slot(&self.get, HttpPattern::Get),
            HttpPattern::slot(&self.post, HttpPattern::Post),
            HttpPattern::slot(&self.put, HttpPattern::Put),
            HttpPattern::slot(&self.patch, HttpPattern::Patch),
            HttpPattern::slot(&self.delete, HttpPattern::Delete),
        ]
    }

    /// The first populated slot, paired with the rule's body selector.
    pub fn binding(&self) -> Option<Binding> {
        select(&self.patterns()).map(|(verb, pattern)| Binding {
            verb,
            pattern: pattern.to_string(),
            body:    self.body.clone(),
        })
    }
}

pub fn select(patterns: &[HttpPattern]) -> Option<(Verb, &str)> {
    patterns.iter().find_map(HttpPattern::verb)
}

/// Decodes the HTTP rule out of serialized `MethodOptions`.
pub fn decode_rule(options: &[u8]) -> Option<HttpRule> {
    match HttpMethodOptions::decode(options) {
        Ok(opts) => opts.http,
        Err(e) => {
            debug!("Undecodable method options: {}", e);
            None
        }
    }
}

/// The method's binding, or `None` when it is not annotated.
pub fn extract(method: &Method) -> Option<Binding> {
    let binding = decode_rule(&method.options).and_then(|rule| rule.binding());
    if binding.is_none() {
        debug!("Method {} has no HTTP binding", method.name);
    }
    binding
}

#[cfg(test)]
mod tests {
    use super::*;
    use protoweb_schema::TypeRef;

    fn options(rule: HttpRule) -> Vec<u8> {
        HttpMethodOptions { http: Some(rule) }.encode_to_vec()
    }

    fn method(options: Vec<u8>) -> Method {
        let ty = TypeRef {
            full_name: "helloworld.HelloRequest".to_owned(),
            package:   "helloworld".to_owned(),
            file:      "greeter.proto".to_owned(),
            path:      vec!["HelloRequest".to_owned()],
        };
        Method {
            name:             "SayHello".to_owned(),
            input:            ty.clone(),
            output:           ty,
            client_streaming: false,
            server_streaming: false,
            options,
        }
    }

    #[test]
    fn test_single_verb() {
        let rule = HttpRule {
            put: "/v1/things/{id}".to_owned(),
            body: "*".to_owned(),
            ..Default::default()
        };
        let binding = extract(&method(options(rule))).unwrap();
        assert_eq!(binding.verb, Verb::Put);
        assert_eq!(binding.pattern, "/v1/things/{id}");
        assert_eq!(binding.body, "*");
    }

    #[test]
    fn test_no_verb_is_unbound() {
        let rule = HttpRule {
            body: "*".to_owned(),
            ..Default::default()
        };
        assert_eq!(extract(&method(options(rule))), None);
    }

    #[test]
    fn test_missing_extension_is_unbound() {
        assert_eq!(extract(&method(vec![])), None);
    }

    #[test]
    fn test_garbage_is_unbound() {
        assert_eq!(extract(&method(vec![0xff, 0xff, 0xff])), None);
    }

    #[test]
    fn test_get_wins_over_post() {
        let rule = HttpRule {
            get: "/a".to_owned(),
            post: "/b".to_owned(),
            ..Default::default()
        };
        let binding = extract(&method(options(rule))).unwrap();
        assert_eq!(binding.verb, Verb::Get);
        assert_eq!(binding.pattern, "/a");
    }

    #[test]
    fn test_selection_order() {
        let rule = HttpRule {
            put: "/put".to_owned(),
            patch: "/patch".to_owned(),
            delete: "/delete".to_owned(),
            ..Default::default()
        };
        assert_eq!(select(&rule.patterns()), Some((Verb::Put, "/put")));

        let rule = HttpRule {
            patch: "/patch".to_owned(),
            delete: "/delete".to_owned(),
            ..Default::default()
        };
        assert_eq!(select(&rule.patterns()), Some((Verb::Patch, "/patch")));
        assert_eq!(select(&[HttpPattern::None, HttpPattern::None]), None);
    }

    #[test]
    fn test_other_option_fields_are_skipped() {
        // deprecated = true (field 33) ahead of the extension
        let mut buf = vec![0x88, 0x02, 0x01];
        buf.extend(options(HttpRule {
            delete: "/v1/things/{id}".to_owned(),
            ..Default::default()
        }));
        let binding = extract(&method(buf)).unwrap();
        assert_eq!(binding.verb, Verb::Delete);
        assert_eq!(binding.body, "");
    }
}
