pub(crate) mod backend;
pub(crate) mod bind;
pub(crate) mod recording;
