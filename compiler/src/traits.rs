use crate::types::FileSpec;

/// Turns the intermediate model of one file into source text in a single
/// target syntax.
pub trait Renderer {
    /// Replaces `.proto` in the artifact name.
    fn extension(&self) -> &str;

    fn render(&self, file: &FileSpec) -> String;
}
