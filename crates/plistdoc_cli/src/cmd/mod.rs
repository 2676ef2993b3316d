/// File-level summary command.
pub mod info;
/// Text rendering of value trees.
pub mod print;
/// Value tree dump command.
pub mod show;
/// Schema validation command.
pub mod validate;
/// Canonical XML output command.
pub mod xml;

pub(crate) mod util;

#[cfg(test)]
pub(crate) mod test_support;
