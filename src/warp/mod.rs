pub(crate) mod lut;
pub(crate) mod mapper;
