pub(crate) mod bezier;
pub(crate) mod ease;
pub(crate) mod easing;
