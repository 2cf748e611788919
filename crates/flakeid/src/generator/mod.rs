#[cfg(feature = "atomic")]
mod atomic;
mod config;
mod interface;
#[cfg(feature = "lock")]
mod lock;
mod minter;
mod status;

#[cfg_attr(docsrs, doc(cfg(feature = "atomic")))]
#[cfg(feature = "atomic")]
pub use atomic::*;
pub use config::*;
pub use interface::*;
#[cfg_attr(docsrs, doc(cfg(feature = "lock")))]
#[cfg(feature = "lock")]
pub use lock::*;
pub use status::*;
