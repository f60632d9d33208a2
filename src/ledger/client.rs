//! rippled JSON-RPC client
//!
//! Thin wrapper over the ledger's HTTP JSON-RPC: network context queries
//! (sequence, fee), balance queries, and submit-and-wait semantics. A health
//! flag is cleared whenever a request fails so the next caller re-checks the
//! endpoint before submitting.

use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::WalletError;

/// How often to poll `tx` while waiting for validation
const VALIDATION_POLL_INTERVAL: Duration = Duration::from_millis(2_000);

pub struct LedgerClient {
    http: reqwest::Client,
    rpc_url: String,
    tx_wait_timeout: Duration,
    healthy: AtomicBool,
}

/// Provisional result of a submit call
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub engine_result: String,
    pub engine_result_message: String,
    pub tx_hash: Option<String>,
}

/// Final result once a transaction reached a validated ledger
#[derive(Debug, Clone)]
pub struct TerminalResult {
    pub tx_hash: String,
    pub result_code: String,
}

impl TerminalResult {
    pub fn succeeded(&self) -> bool {
        self.result_code == "tesSUCCESS"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrustLine {
    /// Counterparty (issuer) address
    pub account: String,
    pub currency: String,
    pub balance: String,
    pub limit: String,
}

#[derive(Debug, Clone)]
pub struct AccountInfo {
    pub balance_drops: u64,
    pub sequence: u32,
}

impl LedgerClient {
    pub fn new(rpc_url: String, tx_wait_timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            rpc_url,
            tx_wait_timeout,
            healthy: AtomicBool::new(false),
        }
    }

    /// Low-level JSON-RPC call. Maps transport failures to `Network` and
    /// rippled-reported errors to `Ledger`.
    async fn rpc(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let body = json!({
            "method": method,
            "params": [params],
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                self.healthy.store(false, Ordering::SeqCst);
                WalletError::Network(format!("{} request failed: {}", method, e))
            })?;

        if !response.status().is_success() {
            self.healthy.store(false, Ordering::SeqCst);
            return Err(WalletError::Network(format!(
                "{} returned HTTP {}",
                method,
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| WalletError::Network(format!("{} response not JSON: {}", method, e)))?;

        let result = payload
            .get("result")
            .cloned()
            .ok_or_else(|| WalletError::Ledger(format!("{} response missing result", method)))?;

        if result.get("status").and_then(Value::as_str) == Some("error") {
            let code = result
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            let message = result
                .get("error_message")
                .and_then(Value::as_str)
                .unwrap_or("");
            return Err(WalletError::Ledger(format!("{}: {} {}", method, code, message)));
        }

        Ok(result)
    }

    /// Check the endpoint is reachable, re-probing only after a failure
    pub async fn ensure_connected(&self) -> Result<(), WalletError> {
        if self.healthy.load(Ordering::SeqCst) {
            return Ok(());
        }

        log::info!("Checking ledger endpoint {}", self.rpc_url);
        self.rpc("server_state", json!({})).await?;
        self.healthy.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Balance and sequence from the last validated ledger
    pub async fn account_info(&self, address: &str) -> Result<AccountInfo, WalletError> {
        let result = self
            .rpc(
                "account_info",
                json!({"account": address, "ledger_index": "validated"}),
            )
            .await?;

        let account_data = result
            .get("account_data")
            .ok_or_else(|| WalletError::Ledger("account_info missing account_data".to_string()))?;

        let balance_drops = account_data
            .get("Balance")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| WalletError::Ledger("account_info missing Balance".to_string()))?;

        let sequence = account_data
            .get("Sequence")
            .and_then(Value::as_u64)
            .ok_or_else(|| WalletError::Ledger("account_info missing Sequence".to_string()))?
            as u32;

        Ok(AccountInfo {
            balance_drops,
            sequence,
        })
    }

    /// Next sequence number for finalizing a transaction (open ledger view)
    pub async fn fetch_sequence(&self, address: &str) -> Result<u32, WalletError> {
        let result = self
            .rpc(
                "account_info",
                json!({"account": address, "ledger_index": "current"}),
            )
            .await?;

        result
            .pointer("/account_data/Sequence")
            .and_then(Value::as_u64)
            .map(|s| s as u32)
            .ok_or_else(|| WalletError::Ledger("account_info missing Sequence".to_string()))
    }

    /// Open-ledger fee in drops
    pub async fn fetch_fee(&self) -> Result<u64, WalletError> {
        let result = self.rpc("fee", json!({})).await?;

        result
            .pointer("/drops/open_ledger_fee")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| WalletError::Ledger("fee missing open_ledger_fee".to_string()))
    }

    /// Issued-currency trust lines for an account
    pub async fn account_lines(&self, address: &str) -> Result<Vec<TrustLine>, WalletError> {
        let result = self
            .rpc("account_lines", json!({"account": address}))
            .await?;

        let lines = result
            .get("lines")
            .cloned()
            .ok_or_else(|| WalletError::Ledger("account_lines missing lines".to_string()))?;

        serde_json::from_value(lines)
            .map_err(|e| WalletError::Ledger(format!("account_lines parse: {}", e)))
    }

    /// Submit a transaction in sign-and-submit mode
    pub async fn sign_and_submit(
        &self,
        tx_json: Value,
        secret: &str,
    ) -> Result<SubmitOutcome, WalletError> {
        let result = self
            .rpc(
                "submit",
                json!({"tx_json": tx_json, "secret": secret, "fail_hard": false}),
            )
            .await?;

        Ok(Self::parse_submit_result(&result))
    }

    /// Submit a fully signed multi-party transaction
    pub async fn submit_multisigned(&self, tx_json: Value) -> Result<SubmitOutcome, WalletError> {
        let result = self
            .rpc("submit_multisigned", json!({"tx_json": tx_json}))
            .await?;

        Ok(Self::parse_submit_result(&result))
    }

    fn parse_submit_result(result: &Value) -> SubmitOutcome {
        SubmitOutcome {
            engine_result: result
                .get("engine_result")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            engine_result_message: result
                .get("engine_result_message")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            tx_hash: result
                .pointer("/tx_json/hash")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// Poll until the transaction appears in a validated ledger, up to the
    /// configured timeout. `txnNotFound` while polling means "not yet".
    pub async fn await_validation(&self, tx_hash: &str) -> Result<TerminalResult, WalletError> {
        let deadline = tokio::time::Instant::now() + self.tx_wait_timeout;

        loop {
            match self
                .rpc("tx", json!({"transaction": tx_hash, "binary": false}))
                .await
            {
                Ok(result) => {
                    if result.get("validated").and_then(Value::as_bool) == Some(true) {
                        let result_code = result
                            .pointer("/meta/TransactionResult")
                            .and_then(Value::as_str)
                            .unwrap_or("unknown")
                            .to_string();
                        return Ok(TerminalResult {
                            tx_hash: tx_hash.to_string(),
                            result_code,
                        });
                    }
                }
                Err(WalletError::Ledger(msg)) if msg.contains("txnNotFound") => {
                    log::debug!("Transaction {} not found yet, still polling", tx_hash);
                }
                Err(e) => return Err(e),
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(WalletError::Timeout(format!(
                    "transaction {} not validated within {:?}",
                    tx_hash, self.tx_wait_timeout
                )));
            }
            tokio::time::sleep(VALIDATION_POLL_INTERVAL).await;
        }
    }

    /// Sign, submit and wait for the terminal result
    pub async fn submit_and_wait(
        &self,
        tx_json: Value,
        secret: &str,
    ) -> Result<TerminalResult, WalletError> {
        let outcome = self.sign_and_submit(tx_json, secret).await?;
        self.wait_for_outcome(outcome).await
    }

    /// Submit a pre-signed multi-party transaction and wait for the terminal result
    pub async fn submit_multisigned_and_wait(
        &self,
        tx_json: Value,
    ) -> Result<TerminalResult, WalletError> {
        let outcome = self.submit_multisigned(tx_json).await?;
        self.wait_for_outcome(outcome).await
    }

    async fn wait_for_outcome(&self, outcome: SubmitOutcome) -> Result<TerminalResult, WalletError> {
        log::debug!(
            "Provisional result {}: {}",
            outcome.engine_result,
            outcome.engine_result_message
        );

        // tes/tec/ter results can still make it into a validated ledger;
        // tem/tef/tel class results never will.
        let provisional_ok = outcome.engine_result.starts_with("tes")
            || outcome.engine_result.starts_with("tec")
            || outcome.engine_result.starts_with("ter");

        if !provisional_ok {
            return Err(WalletError::Transaction(format!(
                "{}: {}",
                outcome.engine_result, outcome.engine_result_message
            )));
        }

        let tx_hash = outcome
            .tx_hash
            .ok_or_else(|| WalletError::Ledger("submit response missing tx hash".to_string()))?;

        let terminal = self.await_validation(&tx_hash).await?;
        if !terminal.succeeded() {
            return Err(WalletError::Transaction(format!(
                "{} ({})",
                terminal.result_code, terminal.tx_hash
            )));
        }

        Ok(terminal)
    }
}
