//! A greeter service served through the code `protoc-gen-web` generates.
//!
//! The prost types are written by hand next to the generated `.web.rs`
//! files, the way a crate using `prost-reflect-build` would lay them out.

use lazy_static::lazy_static;
use prost_reflect::DescriptorPool;
use protoweb::{Context, HandlerResult, Status};

lazy_static! {
    pub static ref DESCRIPTOR_POOL: DescriptorPool =
        DescriptorPool::decode(include_bytes!(concat!(env!("OUT_DIR"), "/descriptor.bin")).as_ref())
            .expect("descriptor set written by build.rs is valid");
}

pub mod pb {
    pub mod acme {
        #[derive(Clone, PartialEq, ::prost::Message, ::prost_reflect::ReflectMessage)]
        #[prost_reflect(descriptor_pool = "crate::DESCRIPTOR_POOL", message_name = "acme.HelloRequest")]
        pub struct HelloRequest {
            #[prost(string, tag = "1")]
            pub name: String,
            #[prost(int32, tag = "2")]
            pub times: i32,
            #[prost(message, optional, tag = "3")]
            pub meta: Option<hello_request::Meta>,
        }

        pub mod hello_request {
            #[derive(Clone, PartialEq, ::prost::Message, ::prost_reflect::ReflectMessage)]
            #[prost_reflect(descriptor_pool = "crate::DESCRIPTOR_POOL", message_name = "acme.HelloRequest.Meta")]
            pub struct Meta {
                #[prost(string, tag = "1")]
                pub trace: String,
            }
        }

        #[derive(Clone, PartialEq, ::prost::Message, ::prost_reflect::ReflectMessage)]
        #[prost_reflect(descriptor_pool = "crate::DESCRIPTOR_POOL", message_name = "acme.HelloReply")]
        pub struct HelloReply {
            #[prost(string, tag = "1")]
            pub message: String,
        }

        include!(concat!(env!("OUT_DIR"), "/acme/greeter.web.rs"));
    }

    pub mod google {
        pub mod r#type {
            #[derive(Clone, PartialEq, ::prost::Message, ::prost_reflect::ReflectMessage)]
            #[prost_reflect(descriptor_pool = "crate::DESCRIPTOR_POOL", message_name = "google.type.Date")]
            pub struct Date {
                #[prost(int32, tag = "1")]
                pub year: i32,
                #[prost(int32, tag = "2")]
                pub month: i32,
                #[prost(int32, tag = "3")]
                pub day: i32,
            }

            include!(concat!(env!("OUT_DIR"), "/google/type/date.web.rs"));
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message, ::prost_reflect::ReflectMessage)]
    #[prost_reflect(descriptor_pool = "crate::DESCRIPTOR_POOL", message_name = "Tag")]
    pub struct Tag {
        #[prost(string, tag = "1")]
        pub label: String,
    }

    include!(concat!(env!("OUT_DIR"), "/common.web.rs"));
}

use pb::acme::greeter_web::GreeterHandler;
use pb::acme::{HelloReply, HelloRequest};
use pb::google::r#type::Date;
use pb::Tag;

pub use pb::acme::greeter_web::register_greeter_web;

/// Fixed clock reading returned by `Now`.
pub const NOW_SECONDS: i64 = 1_700_000_000;

pub struct Greeter;

#[protoweb::async_trait]
impl GreeterHandler for Greeter {
    async fn say_hello(&self, ctx: Context, req: HelloRequest, resp: &mut HelloReply) -> HandlerResult {
        let greeting = format!("Hello, {}!", req.name);
        resp.message = vec![greeting; req.times.max(1) as usize].join(" ");
        if let Some(agent) = ctx.header("user-agent") {
            tracing::debug!("say_hello from {}", agent);
        }
        Ok(())
    }

    async fn shout(&self, _ctx: Context, req: HelloRequest, resp: &mut HelloReply) -> HandlerResult {
        if req.name.is_empty() {
            return Err(Box::new(Status::bad_request("acme.greeter.shout", "name is required")));
        }
        resp.message = req.name.to_uppercase();
        Ok(())
    }

    async fn ping(&self, _ctx: Context, req: HelloRequest, _resp: &mut ()) -> HandlerResult {
        tracing::debug!("ping from {}", req.name);
        Ok(())
    }

    async fn now(&self, _ctx: Context, _req: (), resp: &mut prost_types::Timestamp) -> HandlerResult {
        resp.seconds = NOW_SECONDS;
        Ok(())
    }

    async fn birthday(&self, _ctx: Context, req: Date, resp: &mut HelloReply) -> HandlerResult {
        resp.message = format!("{:04}-{:02}-{:02}", req.year, req.month, req.day);
        Ok(())
    }

    async fn tagged(&self, _ctx: Context, req: Tag, resp: &mut HelloReply) -> HandlerResult {
        resp.message = req.label;
        Ok(())
    }
}
