pub(crate) mod chat;
pub(crate) mod migrate;
pub(crate) mod serve;
