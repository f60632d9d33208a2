/// Wallet configuration from environment variables
///
/// Controls which XRPL network the service talks to, the JSON-RPC endpoint,
/// and the transaction queue timings. Defaults to Testnet.
use std::env;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XrplNetwork {
    Mainnet,
    Testnet,
    Devnet,
}

impl XrplNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            XrplNetwork::Mainnet => "mainnet",
            XrplNetwork::Testnet => "testnet",
            XrplNetwork::Devnet => "devnet",
        }
    }

    /// Default public JSON-RPC endpoint for this network
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            XrplNetwork::Mainnet => "https://s1.ripple.com:51234/",
            XrplNetwork::Testnet => "https://s.altnet.rippletest.net:51234/",
            XrplNetwork::Devnet => "https://s.devnet.rippletest.net:51234/",
        }
    }
}

#[derive(Clone, Debug)]
pub struct WalletConfig {
    /// Which XRPL network this service submits to
    pub network: XrplNetwork,
    /// rippled JSON-RPC endpoint
    pub rpc_url: String,
    /// Fixed wait between finishing one queue item and attempting the next
    pub queue_cooldown: Duration,
    /// Bounded wait for a submitted transaction to appear in a validated ledger
    pub tx_wait_timeout: Duration,
}

impl WalletConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `XRPL_NETWORK`: "testnet" (default), "devnet" or "mainnet"
    /// - `XRPL_RPC_URL`: rippled JSON-RPC endpoint (optional, per-network defaults)
    /// - `QUEUE_COOLDOWN_MS`: inter-item cooldown in milliseconds (default 4000)
    /// - `TX_WAIT_TIMEOUT_MS`: validation wait in milliseconds (default 20000)
    pub fn from_env() -> Self {
        let network_str = env::var("XRPL_NETWORK")
            .unwrap_or_else(|_| "testnet".to_string())
            .to_lowercase();

        let network = match network_str.as_str() {
            "mainnet" => {
                log::info!("Using MAINNET network");
                XrplNetwork::Mainnet
            }
            "devnet" => {
                log::info!("Using DEVNET network");
                XrplNetwork::Devnet
            }
            "testnet" | "" => {
                log::info!("Using TESTNET network");
                XrplNetwork::Testnet
            }
            other => {
                log::warn!("Unknown network '{}', defaulting to Testnet", other);
                XrplNetwork::Testnet
            }
        };

        let rpc_url = env::var("XRPL_RPC_URL").unwrap_or_else(|_| {
            log::info!("RPC URL: {} ({} default)", network.default_rpc_url(), network.as_str());
            network.default_rpc_url().to_string()
        });

        let queue_cooldown = Duration::from_millis(
            env::var("QUEUE_COOLDOWN_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4_000),
        );

        let tx_wait_timeout = Duration::from_millis(
            env::var("TX_WAIT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20_000),
        );

        Self {
            network,
            rpc_url,
            queue_cooldown,
            tx_wait_timeout,
        }
    }
}

impl Default for WalletConfig {
    /// Default configuration (Testnet)
    fn default() -> Self {
        Self {
            network: XrplNetwork::Testnet,
            rpc_url: XrplNetwork::Testnet.default_rpc_url().to_string(),
            queue_cooldown: Duration::from_millis(4_000),
            tx_wait_timeout: Duration::from_millis(20_000),
        }
    }
}
