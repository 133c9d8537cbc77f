pub(crate) mod access;
pub(crate) mod attempts;
pub(crate) mod identity;
pub(crate) mod questions;
