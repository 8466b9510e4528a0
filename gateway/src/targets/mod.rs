//! In-memory contracts the executor can front.

pub mod collectible;
pub mod token;

pub use collectible::{Collectible, ICollectible};
pub use token::{IVaultToken, TokenVault};
