pub(crate) mod decode;
pub(crate) mod handle;
pub(crate) mod provider;
pub(crate) mod transport;
pub(crate) mod video;
