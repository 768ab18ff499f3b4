pub(crate) mod document;
pub(crate) mod pipeline;
