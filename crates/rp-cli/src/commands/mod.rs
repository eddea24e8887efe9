//! CLI command implementations

pub(crate) mod common;
pub(crate) mod dashboard;
pub(crate) mod generate;
pub(crate) mod load;
pub(crate) mod ls;
pub(crate) mod pipeline;
pub(crate) mod run;
