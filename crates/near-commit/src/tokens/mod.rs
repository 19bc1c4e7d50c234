//! Token standard helpers.
//!
//! Only NEP-141 (fungible tokens) is provided, as call definitions:
//!
//! ```rust,no_run
//! use near_commit::*;
//! use near_commit::tokens::ft::{self, FtMetadata};
//!
//! # async fn example() -> Result<(), near_commit::Error> {
//! let near = Near::testnet().build();
//! let token = near.contract("token.testnet")?;
//!
//! let metadata: FtMetadata = token.read_as(&ft::ft_metadata()).await?;
//! println!("Token: {} ({})", metadata.name, metadata.symbol);
//! # Ok(())
//! # }
//! ```

pub mod ft;

pub use ft::{FtMetadata, StorageBalance};
