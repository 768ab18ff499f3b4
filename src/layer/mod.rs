pub(crate) mod accessor;
pub(crate) mod attributes;
pub(crate) mod capability;
pub(crate) mod context;
pub(crate) mod host;
pub(crate) mod path;
pub(crate) mod time_window;
