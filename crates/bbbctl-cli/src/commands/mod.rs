//! Command handlers grouped by API resource.

pub(crate) mod meetings;
pub(crate) mod recordings;
