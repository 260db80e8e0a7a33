pub mod error;
pub mod msg;
pub mod policy;
pub mod signature;
pub mod signer;

#[cfg(feature = "testing")]
pub mod testing;
