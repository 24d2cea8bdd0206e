use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Descriptor decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("File descriptor without a name")]
    MissingFileName,

    #[error("Unknown type \"{type_name}\" referenced by method \"{method}\"")]
    UnknownType {
        type_name: String,
        method:    String,
    },
}
