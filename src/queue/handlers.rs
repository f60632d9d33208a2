//! Per-kind item handlers
//!
//! Each handler turns an opaque payload into a concrete ledger transaction,
//! finalizes it against current network context (sequence, fee), submits it
//! with the item's signer and awaits the terminal result. The registry maps
//! every `ItemKind` to its handler once, at construction.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::WalletError;
use crate::ledger::types::{self, Amount, AssetRef, SignerEntry};
use crate::ledger::LedgerClient;
use crate::queue::item::ItemKind;
use crate::wallet::SignerHandle;

#[async_trait]
pub trait ItemHandler: Send + Sync {
    /// Process one item. The returned string is a short human-readable
    /// outcome detail used for logging only.
    async fn process(
        &self,
        payload: &Value,
        signer: Option<&SignerHandle>,
    ) -> Result<String, WalletError>;
}

pub struct HandlerRegistry {
    handlers: HashMap<ItemKind, Arc<dyn ItemHandler>>,
}

impl HandlerRegistry {
    /// Empty registry; used by tests that register their own handlers
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn with_handler(mut self, kind: ItemKind, handler: Arc<dyn ItemHandler>) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    pub fn get(&self, kind: ItemKind) -> Option<&Arc<dyn ItemHandler>> {
        self.handlers.get(&kind)
    }

    /// Full registry over a live ledger client, one handler per kind
    pub fn for_ledger(client: Arc<LedgerClient>) -> Self {
        Self::new()
            .with_handler(
                ItemKind::Payment,
                Arc::new(SubmitHandler::new(client.clone(), build_payment, true)),
            )
            .with_handler(
                ItemKind::TrustSet,
                Arc::new(SubmitHandler::new(client.clone(), build_trust_set, true)),
            )
            .with_handler(
                ItemKind::AmmCreate,
                Arc::new(SubmitHandler::new(client.clone(), build_amm_create, true)),
            )
            .with_handler(
                ItemKind::AmmDeposit,
                Arc::new(SubmitHandler::new(client.clone(), build_amm_deposit, true)),
            )
            .with_handler(
                ItemKind::AmmWithdraw,
                Arc::new(SubmitHandler::new(client.clone(), build_amm_withdraw, true)),
            )
            .with_handler(
                ItemKind::AmmVote,
                Arc::new(SubmitHandler::new(client.clone(), build_amm_vote, false)),
            )
            .with_handler(
                ItemKind::AccountSet,
                Arc::new(SubmitHandler::new(client.clone(), build_account_set, false)),
            )
            .with_handler(
                ItemKind::SignerListSet,
                Arc::new(SubmitHandler::new(client.clone(), build_signer_list_set, false)),
            )
            .with_handler(
                ItemKind::Multisigned,
                Arc::new(MultisignedHandler { client }),
            )
            .with_handler(ItemKind::Wait, Arc::new(WaitHandler))
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

type TxBuilder = fn(&Value, &str) -> Result<Value, WalletError>;

/// Shared submit path: build tx_json from the payload, autofill sequence and
/// fee, sign-and-submit with the item's signer, await validation.
struct SubmitHandler {
    client: Arc<LedgerClient>,
    build: TxBuilder,
    /// Re-fetch the signer's balance after success, for the log
    refresh_balance: bool,
}

impl SubmitHandler {
    fn new(client: Arc<LedgerClient>, build: TxBuilder, refresh_balance: bool) -> Self {
        Self {
            client,
            build,
            refresh_balance,
        }
    }
}

#[async_trait]
impl ItemHandler for SubmitHandler {
    async fn process(
        &self,
        payload: &Value,
        signer: Option<&SignerHandle>,
    ) -> Result<String, WalletError> {
        let signer = signer
            .ok_or_else(|| WalletError::Internal("item queued without a signer".to_string()))?;

        let mut tx_json = (self.build)(payload, &signer.address)?;

        let sequence = self.client.fetch_sequence(&signer.address).await?;
        let fee = self.client.fetch_fee().await?;
        tx_json["Sequence"] = serde_json::json!(sequence);
        tx_json["Fee"] = serde_json::json!(fee.to_string());

        let terminal = self.client.submit_and_wait(tx_json, signer.secret()).await?;

        if self.refresh_balance {
            match self.client.account_info(&signer.address).await {
                Ok(info) => log::info!(
                    "Balance of {} now {} XRP",
                    signer.address,
                    types::drops_to_xrp(info.balance_drops)
                ),
                Err(e) => log::debug!("Post-submit balance refresh failed: {}", e),
            }
        }

        Ok(format!("validated as {}", terminal.tx_hash))
    }
}

/// Pre-signed multi-party submission; the payload is the complete tx_json
/// including the collected Signers array.
struct MultisignedHandler {
    client: Arc<LedgerClient>,
}

#[async_trait]
impl ItemHandler for MultisignedHandler {
    async fn process(
        &self,
        payload: &Value,
        _signer: Option<&SignerHandle>,
    ) -> Result<String, WalletError> {
        let terminal = self
            .client
            .submit_multisigned_and_wait(payload.clone())
            .await?;
        Ok(format!("validated as {}", terminal.tx_hash))
    }
}

/// Wait-only step inside a multi-step flow
struct WaitHandler;

#[derive(Debug, Deserialize)]
struct WaitParams {
    duration_ms: u64,
}

#[async_trait]
impl ItemHandler for WaitHandler {
    async fn process(
        &self,
        payload: &Value,
        _signer: Option<&SignerHandle>,
    ) -> Result<String, WalletError> {
        let params: WaitParams = parse(payload)?;
        tokio::time::sleep(Duration::from_millis(params.duration_ms)).await;
        Ok(format!("waited {} ms", params.duration_ms))
    }
}

// ---------------------------------------------------------------------------
// Payload parsing and tx_json builders
// ---------------------------------------------------------------------------

fn parse<T: serde::de::DeserializeOwned>(payload: &Value) -> Result<T, WalletError> {
    serde_json::from_value(payload.clone())
        .map_err(|e| WalletError::Internal(format!("malformed queue payload: {}", e)))
}

#[derive(Debug, Deserialize)]
pub struct PaymentParams {
    pub destination: String,
    pub amount: Amount,
    #[serde(default)]
    pub destination_tag: Option<u32>,
}

fn build_payment(payload: &Value, account: &str) -> Result<Value, WalletError> {
    let params: PaymentParams = parse(payload)?;
    Ok(types::payment_tx(
        account,
        &params.destination,
        &params.amount,
        params.destination_tag,
    ))
}

#[derive(Debug, Deserialize)]
pub struct TrustSetParams {
    pub currency: String,
    pub issuer: String,
    pub limit: String,
}

fn build_trust_set(payload: &Value, account: &str) -> Result<Value, WalletError> {
    let params: TrustSetParams = parse(payload)?;
    Ok(types::trust_set_tx(
        account,
        &params.currency,
        &params.issuer,
        &params.limit,
    ))
}

#[derive(Debug, Deserialize)]
pub struct AmmCreateParams {
    pub amount: Amount,
    pub amount2: Amount,
    pub trading_fee: u16,
}

fn build_amm_create(payload: &Value, account: &str) -> Result<Value, WalletError> {
    let params: AmmCreateParams = parse(payload)?;
    Ok(types::amm_create_tx(
        account,
        &params.amount,
        &params.amount2,
        params.trading_fee,
    ))
}

#[derive(Debug, Deserialize)]
pub struct AmmDepositParams {
    pub asset: AssetRef,
    pub asset2: AssetRef,
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub amount2: Option<Amount>,
}

fn build_amm_deposit(payload: &Value, account: &str) -> Result<Value, WalletError> {
    let params: AmmDepositParams = parse(payload)?;
    Ok(types::amm_deposit_tx(
        account,
        &params.asset,
        &params.asset2,
        params.amount.as_ref(),
        params.amount2.as_ref(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct AmmWithdrawParams {
    pub asset: AssetRef,
    pub asset2: AssetRef,
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub amount2: Option<Amount>,
    #[serde(default)]
    pub withdraw_all: bool,
}

fn build_amm_withdraw(payload: &Value, account: &str) -> Result<Value, WalletError> {
    let params: AmmWithdrawParams = parse(payload)?;
    Ok(types::amm_withdraw_tx(
        account,
        &params.asset,
        &params.asset2,
        params.amount.as_ref(),
        params.amount2.as_ref(),
        params.withdraw_all,
    ))
}

#[derive(Debug, Deserialize)]
pub struct AmmVoteParams {
    pub asset: AssetRef,
    pub asset2: AssetRef,
    pub trading_fee: u16,
}

fn build_amm_vote(payload: &Value, account: &str) -> Result<Value, WalletError> {
    let params: AmmVoteParams = parse(payload)?;
    Ok(types::amm_vote_tx(
        account,
        &params.asset,
        &params.asset2,
        params.trading_fee,
    ))
}

#[derive(Debug, Deserialize)]
pub struct AccountSetParams {
    #[serde(default)]
    pub set_flag: Option<u32>,
    #[serde(default)]
    pub domain: Option<String>,
}

fn build_account_set(payload: &Value, account: &str) -> Result<Value, WalletError> {
    let params: AccountSetParams = parse(payload)?;
    Ok(types::account_set_tx(
        account,
        params.set_flag,
        params.domain.as_deref(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SignerListSetParams {
    pub quorum: u32,
    pub signers: Vec<SignerEntry>,
}

fn build_signer_list_set(payload: &Value, account: &str) -> Result<Value, WalletError> {
    let params: SignerListSetParams = parse(payload)?;
    Ok(types::signer_list_set_tx(
        account,
        params.quorum,
        &params.signers,
    ))
}
