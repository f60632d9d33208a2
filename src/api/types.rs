use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WalletError;
use crate::ledger::types::{validate_currency, xrp_to_drops, Amount, AssetRef};
use crate::wallet::keys;

#[derive(Debug, Deserialize)]
pub struct CreateWalletRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportWalletRequest {
    pub name: String,
    pub seed: String,
}

#[derive(Debug, Serialize)]
pub struct WalletInfo {
    pub name: String,
    pub address: String,
    pub public_key: String,
    /// Returned once, at creation/import time only
    pub seed: String,
}

#[derive(Debug, Serialize)]
pub struct WalletMetadata {
    pub name: String,
    pub address: String,
    pub network: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteWalletResponse {
    pub wallet_name: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct TrustLineBalance {
    pub currency: String,
    pub issuer: String,
    pub balance: String,
    pub limit: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceInfo {
    pub address: String,
    pub balance_drops: u64,
    pub balance_xrp: String,
    pub sequence: u32,
    pub lines: Vec<TrustLineBalance>,
}

/// Amount as the API accepts it: `{"currency": "XRP", "value": "12.5"}` or
/// `{"currency": "USD", "issuer": "r...", "value": "100"}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiAmount {
    pub currency: String,
    #[serde(default)]
    pub issuer: Option<String>,
    pub value: String,
}

impl ApiAmount {
    /// Validate and convert to the ledger wire representation
    pub fn to_ledger_amount(&self) -> Result<Amount, WalletError> {
        let value: f64 = self
            .value
            .parse()
            .map_err(|_| WalletError::InvalidInput(format!("Invalid amount: {}", self.value)))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(WalletError::InvalidInput(format!(
                "Amount must be positive, got {}",
                self.value
            )));
        }

        if self.currency.eq_ignore_ascii_case("XRP") {
            return Ok(Amount::drops(xrp_to_drops(value)?));
        }

        validate_currency(&self.currency)?;
        let issuer = self.issuer.as_deref().ok_or_else(|| {
            WalletError::InvalidInput(format!("Issuer required for {} amount", self.currency))
        })?;
        keys::validate_address(issuer)?;

        Ok(Amount::issued(&self.currency, issuer, &self.value))
    }
}

/// One side of an AMM asset pair as the API accepts it
#[derive(Debug, Clone, Deserialize)]
pub struct ApiAsset {
    pub currency: String,
    #[serde(default)]
    pub issuer: Option<String>,
}

impl ApiAsset {
    pub fn to_asset_ref(&self) -> Result<AssetRef, WalletError> {
        if self.currency.eq_ignore_ascii_case("XRP") {
            return Ok(AssetRef::xrp());
        }

        validate_currency(&self.currency)?;
        let issuer = self.issuer.as_deref().ok_or_else(|| {
            WalletError::InvalidInput(format!("Issuer required for asset {}", self.currency))
        })?;
        keys::validate_address(issuer)?;

        Ok(AssetRef::issued(&self.currency, issuer))
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub destination: String,
    pub amount: ApiAmount,
    #[serde(default)]
    pub destination_tag: Option<u32>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct TrustlineRequest {
    pub currency: String,
    pub issuer: String,
    pub limit: String,
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AmmCreateRequest {
    pub amount: ApiAmount,
    pub amount2: ApiAmount,
    /// Pool trading fee in units of 1/100,000 (maximum 1000 = 1%)
    pub trading_fee: u16,
}

#[derive(Debug, Deserialize)]
pub struct AmmDepositRequest {
    pub asset: ApiAsset,
    pub asset2: ApiAsset,
    #[serde(default)]
    pub amount: Option<ApiAmount>,
    #[serde(default)]
    pub amount2: Option<ApiAmount>,
}

#[derive(Debug, Deserialize)]
pub struct AmmWithdrawRequest {
    pub asset: ApiAsset,
    pub asset2: ApiAsset,
    #[serde(default)]
    pub amount: Option<ApiAmount>,
    #[serde(default)]
    pub amount2: Option<ApiAmount>,
    #[serde(default)]
    pub withdraw_all: bool,
}

#[derive(Debug, Deserialize)]
pub struct AmmVoteRequest {
    pub asset: ApiAsset,
    pub asset2: ApiAsset,
    pub trading_fee: u16,
}

#[derive(Debug, Deserialize)]
pub struct AccountSetRequest {
    #[serde(default)]
    pub set_flag: Option<u32>,
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignerListRequest {
    pub quorum: u32,
    pub signers: Vec<SignerEntryRequest>,
}

#[derive(Debug, Deserialize)]
pub struct SignerEntryRequest {
    pub account: String,
    pub weight: u16,
}

#[derive(Debug, Deserialize)]
pub struct MultisignSubmitRequest {
    /// Complete tx_json including the collected Signers array
    pub tx_json: Value,
}

#[derive(Debug, Deserialize)]
pub struct MintRequest {
    /// Name of the local wallet receiving the minted tokens
    pub receiver: String,
    pub currency: String,
    pub amount: String,
    /// XRP sent to the receiver in the funding step (default 20)
    #[serde(default)]
    pub fund_xrp: Option<f64>,
    /// Trust line limit set by the receiver (default 1000000000)
    #[serde(default)]
    pub trust_limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub description: String,
    /// 1-based position in the queue at enqueue time
    pub position: usize,
}

#[derive(Debug, Serialize)]
pub struct MintQueuedResponse {
    pub descriptions: Vec<String>,
    pub flow_id: String,
}

#[derive(Debug, Serialize)]
pub struct ClearQueueResponse {
    pub cleared: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_amount_xrp() {
        let amount = ApiAmount {
            currency: "XRP".to_string(),
            issuer: None,
            value: "2.5".to_string(),
        };
        assert_eq!(amount.to_ledger_amount().unwrap(), Amount::drops(2_500_000));
    }

    #[test]
    fn test_api_amount_issued_requires_issuer() {
        let amount = ApiAmount {
            currency: "USD".to_string(),
            issuer: None,
            value: "10".to_string(),
        };
        assert!(amount.to_ledger_amount().is_err());
    }

    #[test]
    fn test_api_amount_rejects_nonpositive() {
        let amount = ApiAmount {
            currency: "XRP".to_string(),
            issuer: None,
            value: "0".to_string(),
        };
        assert!(amount.to_ledger_amount().is_err());

        let amount = ApiAmount {
            currency: "XRP".to_string(),
            issuer: None,
            value: "abc".to_string(),
        };
        assert!(amount.to_ledger_amount().is_err());
    }

    #[test]
    fn test_api_asset_xrp_has_no_issuer() {
        let asset = ApiAsset {
            currency: "xrp".to_string(),
            issuer: None,
        };
        let asset_ref = asset.to_asset_ref().unwrap();
        assert_eq!(asset_ref.currency, "XRP");
        assert!(asset_ref.issuer.is_none());
    }
}
