//! Network identification for NEAR Protocol.

use std::fmt;
use std::str::FromStr;

/// RPC endpoints of the public networks.
pub mod endpoints {
    pub const MAINNET: &str = "https://rpc.mainnet.near.org";
    pub const TESTNET: &str = "https://rpc.testnet.near.org";
    pub const BETANET: &str = "https://rpc.betanet.near.org";
    pub const LOCAL: &str = "http://127.0.0.1:3030";
}

/// The NEAR network the client is connected to.
///
/// The network id doubles as the credentials subdirectory name
/// (`~/.near-credentials/{network}/`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Betanet,
    /// A node on localhost.
    Local,
    /// Any other RPC endpoint.
    Custom(String),
}

impl Network {
    pub fn is_mainnet(&self) -> bool {
        matches!(self, Network::Mainnet)
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Network::Testnet)
    }

    /// Returns the network identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Betanet => "betanet",
            Network::Local => "local",
            Network::Custom(_) => "custom",
        }
    }

    /// The JSON-RPC endpoint for this network.
    pub fn rpc_url(&self) -> &str {
        match self {
            Network::Mainnet => endpoints::MAINNET,
            Network::Testnet => endpoints::TESTNET,
            Network::Betanet => endpoints::BETANET,
            Network::Local => endpoints::LOCAL,
            Network::Custom(url) => url,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a network name, or treats an `http(s)://` string as a custom URL.
impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "betanet" => Ok(Network::Betanet),
            "local" | "localnet" => Ok(Network::Local),
            _ if s.starts_with("http://") || s.starts_with("https://") => {
                Ok(Network::Custom(s.trim().to_string()))
            }
            _ => Err(format!(
                "Unknown network '{}'. Expected mainnet, testnet, betanet, local or an RPC URL",
                s
            )),
        }
    }
}
