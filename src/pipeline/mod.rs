pub(crate) mod retime;
pub(crate) mod teardown;
