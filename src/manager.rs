/// Wallet Manager - Orchestration Layer
///
/// Owns the configuration, wallet storage, ledger client and the serial
/// transaction queue. API handlers delegate here; every ledger-mutating
/// operation is validated first and then enqueued as its last step.
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::api::types::*;
use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::ledger::types::{drops_to_xrp, validate_currency, xrp_to_drops, Amount};
use crate::ledger::LedgerClient;
use crate::queue::{
    DisplaySurface, HandlerRegistry, ItemKind, QueueEntryView, QueueItem, TransactionQueue,
};
use crate::storage::Storage;
use crate::wallet::{keys, lifecycle, SignerHandle};

/// XRP sent to the receiver when a mint flow does not specify an amount;
/// covers the base reserve of a fresh account with headroom.
const DEFAULT_MINT_FUND_XRP: f64 = 20.0;

/// Default trust line limit set during a mint flow
const DEFAULT_MINT_TRUST_LIMIT: &str = "1000000000";

/// Settle time between funding a fresh receiver and its first own
/// transaction, as a wait-only queue step
const MINT_SETTLE_WAIT_MS: u64 = 5_000;

pub struct WalletManager {
    pub config: WalletConfig,
    pub storage: Storage,
    ledger: Arc<LedgerClient>,
    queue: TransactionQueue,
}

impl WalletManager {
    pub fn new() -> Self {
        let config = WalletConfig::from_env();
        Self::build(config, Storage::new())
    }

    /// Create WalletManager with custom storage (for testing)
    pub fn new_with_storage(storage: Storage) -> Self {
        let config = WalletConfig::from_env();
        Self::build(config, storage)
    }

    fn build(config: WalletConfig, storage: Storage) -> Self {
        let ledger = Arc::new(LedgerClient::new(
            config.rpc_url.clone(),
            config.tx_wait_timeout,
        ));
        let handlers = HandlerRegistry::for_ledger(ledger.clone());
        let queue = TransactionQueue::new(handlers, ledger.clone(), config.queue_cooldown);

        Self {
            config,
            storage,
            ledger,
            queue,
        }
    }

    // ============================================================================
    // Wallet Management
    // ============================================================================

    pub fn create_wallet(&self, name: &str) -> Result<WalletInfo, WalletError> {
        lifecycle::create_wallet(&self.storage, &self.config, name)
    }

    pub fn import_wallet(&self, name: &str, seed: &str) -> Result<WalletInfo, WalletError> {
        lifecycle::import_wallet(&self.storage, &self.config, name, seed)
    }

    pub fn list_wallets(&self) -> Result<Vec<WalletMetadata>, WalletError> {
        lifecycle::list_wallets(&self.storage)
    }

    pub fn delete_wallet(&self, name: &str) -> Result<(), WalletError> {
        lifecycle::delete_wallet(&self.storage, name)
    }

    // ============================================================================
    // Balance
    // ============================================================================

    pub async fn get_balance(&self, name: &str) -> Result<BalanceInfo, WalletError> {
        let metadata = self.load_metadata(name)?;

        let (info, lines) = futures::try_join!(
            self.ledger.account_info(&metadata.address),
            self.ledger.account_lines(&metadata.address)
        )?;

        Ok(BalanceInfo {
            address: metadata.address,
            balance_drops: info.balance_drops,
            balance_xrp: drops_to_xrp(info.balance_drops),
            sequence: info.sequence,
            lines: lines
                .into_iter()
                .map(|l| TrustLineBalance {
                    currency: l.currency,
                    issuer: l.account,
                    balance: l.balance,
                    limit: l.limit,
                })
                .collect(),
        })
    }

    // ============================================================================
    // Queued Operations
    // ============================================================================

    pub fn queue_payment(
        &self,
        name: &str,
        request: PaymentRequest,
    ) -> Result<QueuedResponse, WalletError> {
        let signer = self.load_signer(name)?;
        keys::validate_address(&request.destination)?;
        let amount = request.amount.to_ledger_amount()?;

        let description = format!(
            "Payment of {} {} from {} to {}",
            request.amount.value, request.amount.currency, name, request.destination
        );
        let payload = json!({
            "destination": request.destination,
            "amount": amount,
            "destination_tag": request.destination_tag,
        });

        let item = QueueItem::new(
            ItemKind::Payment,
            payload,
            Some(signer),
            description,
            DisplaySurface::Wallet,
        )
        .with_delay(Duration::from_millis(request.delay_ms.unwrap_or(0)));

        Ok(self.enqueue(item))
    }

    pub fn queue_trustline(
        &self,
        name: &str,
        request: TrustlineRequest,
    ) -> Result<QueuedResponse, WalletError> {
        let signer = self.load_signer(name)?;
        validate_currency(&request.currency)?;
        keys::validate_address(&request.issuer)?;
        request
            .limit
            .parse::<f64>()
            .ok()
            .filter(|v| *v >= 0.0)
            .ok_or_else(|| {
                WalletError::InvalidInput(format!("Invalid trust limit: {}", request.limit))
            })?;

        let description = format!(
            "Trust line {} {} -> {} (limit {})",
            request.currency, name, request.issuer, request.limit
        );
        let payload = json!({
            "currency": request.currency,
            "issuer": request.issuer,
            "limit": request.limit,
        });

        let item = QueueItem::new(
            ItemKind::TrustSet,
            payload,
            Some(signer),
            description,
            DisplaySurface::Wallet,
        )
        .with_delay(Duration::from_millis(request.delay_ms.unwrap_or(0)));

        Ok(self.enqueue(item))
    }

    pub fn queue_amm_create(
        &self,
        name: &str,
        request: AmmCreateRequest,
    ) -> Result<QueuedResponse, WalletError> {
        let signer = self.load_signer(name)?;
        let amount = request.amount.to_ledger_amount()?;
        let amount2 = request.amount2.to_ledger_amount()?;
        validate_trading_fee(request.trading_fee)?;

        let description = format!(
            "Create AMM {}/{} from {}",
            request.amount.currency, request.amount2.currency, name
        );
        let payload = json!({
            "amount": amount,
            "amount2": amount2,
            "trading_fee": request.trading_fee,
        });

        let item = QueueItem::new(
            ItemKind::AmmCreate,
            payload,
            Some(signer),
            description,
            DisplaySurface::LiquidityPool,
        );

        Ok(self.enqueue(item))
    }

    pub fn queue_amm_deposit(
        &self,
        name: &str,
        request: AmmDepositRequest,
    ) -> Result<QueuedResponse, WalletError> {
        let signer = self.load_signer(name)?;
        let asset = request.asset.to_asset_ref()?;
        let asset2 = request.asset2.to_asset_ref()?;
        let amount = request
            .amount
            .as_ref()
            .map(|a| a.to_ledger_amount())
            .transpose()?;
        let amount2 = request
            .amount2
            .as_ref()
            .map(|a| a.to_ledger_amount())
            .transpose()?;
        if amount.is_none() && amount2.is_none() {
            return Err(WalletError::InvalidInput(
                "AMM deposit needs at least one amount".to_string(),
            ));
        }

        let description = format!(
            "AMM deposit into {}/{} from {}",
            asset.currency, asset2.currency, name
        );
        let payload = json!({
            "asset": asset,
            "asset2": asset2,
            "amount": amount,
            "amount2": amount2,
        });

        let item = QueueItem::new(
            ItemKind::AmmDeposit,
            payload,
            Some(signer),
            description,
            DisplaySurface::LiquidityPool,
        );

        Ok(self.enqueue(item))
    }

    pub fn queue_amm_withdraw(
        &self,
        name: &str,
        request: AmmWithdrawRequest,
    ) -> Result<QueuedResponse, WalletError> {
        let signer = self.load_signer(name)?;
        let asset = request.asset.to_asset_ref()?;
        let asset2 = request.asset2.to_asset_ref()?;
        let amount = request
            .amount
            .as_ref()
            .map(|a| a.to_ledger_amount())
            .transpose()?;
        let amount2 = request
            .amount2
            .as_ref()
            .map(|a| a.to_ledger_amount())
            .transpose()?;
        if !request.withdraw_all && amount.is_none() && amount2.is_none() {
            return Err(WalletError::InvalidInput(
                "AMM withdraw needs an amount or withdraw_all".to_string(),
            ));
        }

        let description = format!(
            "AMM withdraw from {}/{} by {}",
            asset.currency, asset2.currency, name
        );
        let payload = json!({
            "asset": asset,
            "asset2": asset2,
            "amount": amount,
            "amount2": amount2,
            "withdraw_all": request.withdraw_all,
        });

        let item = QueueItem::new(
            ItemKind::AmmWithdraw,
            payload,
            Some(signer),
            description,
            DisplaySurface::LiquidityPool,
        );

        Ok(self.enqueue(item))
    }

    pub fn queue_amm_vote(
        &self,
        name: &str,
        request: AmmVoteRequest,
    ) -> Result<QueuedResponse, WalletError> {
        let signer = self.load_signer(name)?;
        let asset = request.asset.to_asset_ref()?;
        let asset2 = request.asset2.to_asset_ref()?;
        validate_trading_fee(request.trading_fee)?;

        let description = format!(
            "AMM vote on {}/{} fee {} by {}",
            asset.currency, asset2.currency, request.trading_fee, name
        );
        let payload = json!({
            "asset": asset,
            "asset2": asset2,
            "trading_fee": request.trading_fee,
        });

        let item = QueueItem::new(
            ItemKind::AmmVote,
            payload,
            Some(signer),
            description,
            DisplaySurface::LiquidityPool,
        );

        Ok(self.enqueue(item))
    }

    pub fn queue_account_set(
        &self,
        name: &str,
        request: AccountSetRequest,
    ) -> Result<QueuedResponse, WalletError> {
        let signer = self.load_signer(name)?;
        if request.set_flag.is_none() && request.domain.is_none() {
            return Err(WalletError::InvalidInput(
                "AccountSet needs a flag or a domain".to_string(),
            ));
        }

        let description = format!("Account settings update for {}", name);
        let payload = json!({
            "set_flag": request.set_flag,
            "domain": request.domain,
        });

        let item = QueueItem::new(
            ItemKind::AccountSet,
            payload,
            Some(signer),
            description,
            DisplaySurface::Wallet,
        );

        Ok(self.enqueue(item))
    }

    pub fn queue_signer_list(
        &self,
        name: &str,
        request: SignerListRequest,
    ) -> Result<QueuedResponse, WalletError> {
        let signer = self.load_signer(name)?;
        if request.signers.is_empty() {
            return Err(WalletError::InvalidInput(
                "Signer list must not be empty".to_string(),
            ));
        }
        for entry in &request.signers {
            keys::validate_address(&entry.account)?;
        }
        let total_weight: u32 = request.signers.iter().map(|s| s.weight as u32).sum();
        if request.quorum == 0 || request.quorum > total_weight {
            return Err(WalletError::InvalidInput(format!(
                "Quorum {} unreachable with total signer weight {}",
                request.quorum, total_weight
            )));
        }

        let description = format!(
            "Signer list of {} entries (quorum {}) for {}",
            request.signers.len(),
            request.quorum,
            name
        );
        let payload = json!({
            "quorum": request.quorum,
            "signers": request.signers.iter().map(|s| json!({
                "account": s.account,
                "weight": s.weight,
            })).collect::<Vec<_>>(),
        });

        let item = QueueItem::new(
            ItemKind::SignerListSet,
            payload,
            Some(signer),
            description,
            DisplaySurface::Wallet,
        );

        Ok(self.enqueue(item))
    }

    /// Queue a fully signed multi-party transaction for submission
    pub fn queue_multisigned(
        &self,
        request: MultisignSubmitRequest,
    ) -> Result<QueuedResponse, WalletError> {
        let tx_type = request
            .tx_json
            .get("TransactionType")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                WalletError::InvalidInput("tx_json missing TransactionType".to_string())
            })?;
        let has_signers = request
            .tx_json
            .get("Signers")
            .and_then(|v| v.as_array())
            .map(|a| !a.is_empty())
            .unwrap_or(false);
        if !has_signers {
            return Err(WalletError::InvalidInput(
                "tx_json has no collected signatures".to_string(),
            ));
        }

        let description = format!("Multi-signed {} submission", tx_type);
        let item = QueueItem::new(
            ItemKind::Multisigned,
            request.tx_json,
            None,
            description,
            DisplaySurface::Wallet,
        );

        Ok(self.enqueue(item))
    }

    /// Queue the token-minting flow: fund the receiver, wait for the funding
    /// to settle, open the receiver's trust line, then pay out the tokens.
    /// The four items share a flow id so that a failed step skips the rest.
    pub fn queue_mint(
        &self,
        issuer_name: &str,
        request: MintRequest,
    ) -> Result<MintQueuedResponse, WalletError> {
        let issuer = self.load_signer(issuer_name)?;
        let receiver = self.load_signer(&request.receiver)?;

        validate_currency(&request.currency)?;
        request
            .amount
            .parse::<f64>()
            .ok()
            .filter(|v| *v > 0.0)
            .ok_or_else(|| {
                WalletError::InvalidInput(format!("Invalid mint amount: {}", request.amount))
            })?;

        let fund_xrp = request.fund_xrp.unwrap_or(DEFAULT_MINT_FUND_XRP);
        let fund_amount = Amount::drops(xrp_to_drops(fund_xrp)?);
        let trust_limit = request
            .trust_limit
            .clone()
            .unwrap_or_else(|| DEFAULT_MINT_TRUST_LIMIT.to_string());

        let flow = Uuid::new_v4();
        let mut descriptions = Vec::new();

        let fund = QueueItem::new(
            ItemKind::Payment,
            json!({
                "destination": receiver.address,
                "amount": fund_amount,
                "destination_tag": null,
            }),
            Some(issuer.clone()),
            format!("Fund {} with {} XRP", request.receiver, fund_xrp),
            DisplaySurface::Minting,
        )
        .with_flow(flow);
        descriptions.push(fund.description.clone());

        let settle = QueueItem::new(
            ItemKind::Wait,
            json!({"duration_ms": MINT_SETTLE_WAIT_MS}),
            None,
            format!("Wait for {} funding to settle", request.receiver),
            DisplaySurface::Minting,
        )
        .with_flow(flow);
        descriptions.push(settle.description.clone());

        let trust = QueueItem::new(
            ItemKind::TrustSet,
            json!({
                "currency": request.currency,
                "issuer": issuer.address,
                "limit": trust_limit,
            }),
            Some(receiver.clone()),
            format!(
                "Trust line {} from {} to issuer {}",
                request.currency, request.receiver, issuer_name
            ),
            DisplaySurface::Minting,
        )
        .with_flow(flow);
        descriptions.push(trust.description.clone());

        let mint = QueueItem::new(
            ItemKind::Payment,
            json!({
                "destination": receiver.address,
                "amount": Amount::issued(&request.currency, &issuer.address, &request.amount),
                "destination_tag": null,
            }),
            Some(issuer),
            format!(
                "Mint {} {} to {}",
                request.amount, request.currency, request.receiver
            ),
            DisplaySurface::Minting,
        )
        .with_flow(flow);
        descriptions.push(mint.description.clone());

        for item in [fund, settle, trust, mint] {
            self.queue.enqueue(item);
        }

        Ok(MintQueuedResponse {
            descriptions,
            flow_id: flow.to_string(),
        })
    }

    // ============================================================================
    // Queue Introspection
    // ============================================================================

    pub fn queue_snapshot(&self) -> Vec<QueueEntryView> {
        self.queue.snapshot()
    }

    pub fn clear_queue(&self) -> usize {
        self.queue.clear()
    }

    // ============================================================================
    // Internals
    // ============================================================================

    fn enqueue(&self, item: QueueItem) -> QueuedResponse {
        let description = item.description.clone();
        self.queue.enqueue(item);
        QueuedResponse {
            description,
            position: self.queue.len(),
        }
    }

    fn load_metadata(&self, name: &str) -> Result<crate::storage::Metadata, WalletError> {
        if !self.storage.wallet_exists(name) {
            return Err(WalletError::WalletNotFound(name.to_string()));
        }
        Ok(self.storage.load_metadata(name)?)
    }

    fn load_signer(&self, name: &str) -> Result<SignerHandle, WalletError> {
        let metadata = self.load_metadata(name)?;
        let seed = self.storage.load_seed(name)?;
        Ok(SignerHandle::new(metadata.address, seed))
    }
}

impl Default for WalletManager {
    fn default() -> Self {
        Self::new()
    }
}

/// AMM trading fees are expressed in 1/100,000 units; 1000 (1%) is the cap
fn validate_trading_fee(fee: u16) -> Result<(), WalletError> {
    if fee > 1000 {
        return Err(WalletError::InvalidInput(format!(
            "Trading fee {} exceeds the 1000 (1%) maximum",
            fee
        )));
    }
    Ok(())
}
