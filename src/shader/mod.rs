pub(crate) mod base;
pub(crate) mod program;
pub(crate) mod slot;
