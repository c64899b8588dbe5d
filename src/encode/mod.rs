pub(crate) mod tier;
