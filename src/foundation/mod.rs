pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod progress;
pub(crate) mod warn_once;
