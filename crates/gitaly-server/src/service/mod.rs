pub mod commit;
pub mod convert;
pub mod errors;
pub mod identity;
pub mod mutation;
pub mod operations;
pub mod ref_;
pub mod resolver;
pub mod revision;

#[cfg(test)]
pub(crate) mod test_support;
