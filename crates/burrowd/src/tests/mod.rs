//! Test suites for the client lifecycle controller and host.

pub(crate) mod support;
