//! XRPL wire types and tx_json templates
//!
//! Transaction JSON uses the ledger's PascalCase field names. Amounts are
//! either a drops string (XRP) or a `{currency, issuer, value}` object
//! (issued currencies).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::WalletError;

/// One XRP in drops
pub const DROPS_PER_XRP: u64 = 1_000_000;

/// Total XRP supply, the upper bound for any single payment
const MAX_XRP: f64 = 100_000_000_000.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Amount {
    /// XRP, expressed in drops
    Drops(String),
    /// Issued currency amount
    Issued(IssuedAmount),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssuedAmount {
    pub currency: String,
    pub issuer: String,
    pub value: String,
}

impl Amount {
    pub fn drops(drops: u64) -> Self {
        Amount::Drops(drops.to_string())
    }

    pub fn issued(currency: &str, issuer: &str, value: &str) -> Self {
        Amount::Issued(IssuedAmount {
            currency: currency.to_string(),
            issuer: issuer.to_string(),
            value: value.to_string(),
        })
    }
}

/// Convert a decimal XRP amount to drops
pub fn xrp_to_drops(xrp: f64) -> Result<u64, WalletError> {
    if !xrp.is_finite() || xrp <= 0.0 {
        return Err(WalletError::InvalidInput(format!(
            "XRP amount must be positive, got {}",
            xrp
        )));
    }
    if xrp > MAX_XRP {
        return Err(WalletError::InvalidInput(format!(
            "XRP amount {} exceeds total supply",
            xrp
        )));
    }

    Ok((xrp * DROPS_PER_XRP as f64).round() as u64)
}

/// Format a drops balance as a decimal XRP string
pub fn drops_to_xrp(drops: u64) -> String {
    let whole = drops / DROPS_PER_XRP;
    let frac = drops % DROPS_PER_XRP;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:06}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// One side of an AMM asset pair, as the ledger's `Asset` field expects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetRef {
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

impl AssetRef {
    pub fn xrp() -> Self {
        Self {
            currency: "XRP".to_string(),
            issuer: None,
        }
    }

    pub fn issued(currency: &str, issuer: &str) -> Self {
        Self {
            currency: currency.to_string(),
            issuer: Some(issuer.to_string()),
        }
    }
}

/// AMMDeposit / AMMWithdraw mode flags
pub mod amm_flags {
    pub const TF_LP_TOKEN: u32 = 0x0001_0000;
    pub const TF_WITHDRAW_ALL: u32 = 0x0002_0000;
    pub const TF_SINGLE_ASSET: u32 = 0x0008_0000;
    pub const TF_TWO_ASSET: u32 = 0x0010_0000;
}

pub fn payment_tx(
    account: &str,
    destination: &str,
    amount: &Amount,
    destination_tag: Option<u32>,
) -> Value {
    let mut tx = json!({
        "TransactionType": "Payment",
        "Account": account,
        "Destination": destination,
        "Amount": amount,
    });
    if let Some(tag) = destination_tag {
        tx["DestinationTag"] = json!(tag);
    }
    tx
}

pub fn trust_set_tx(account: &str, currency: &str, issuer: &str, limit: &str) -> Value {
    json!({
        "TransactionType": "TrustSet",
        "Account": account,
        "LimitAmount": {
            "currency": currency,
            "issuer": issuer,
            "value": limit,
        },
    })
}

pub fn amm_create_tx(account: &str, amount: &Amount, amount2: &Amount, trading_fee: u16) -> Value {
    json!({
        "TransactionType": "AMMCreate",
        "Account": account,
        "Amount": amount,
        "Amount2": amount2,
        "TradingFee": trading_fee,
    })
}

pub fn amm_deposit_tx(
    account: &str,
    asset: &AssetRef,
    asset2: &AssetRef,
    amount: Option<&Amount>,
    amount2: Option<&Amount>,
) -> Value {
    let flags = if amount.is_some() && amount2.is_some() {
        amm_flags::TF_TWO_ASSET
    } else {
        amm_flags::TF_SINGLE_ASSET
    };

    let mut tx = json!({
        "TransactionType": "AMMDeposit",
        "Account": account,
        "Asset": asset,
        "Asset2": asset2,
        "Flags": flags,
    });
    if let Some(a) = amount {
        tx["Amount"] = json!(a);
    }
    if let Some(a) = amount2 {
        tx["Amount2"] = json!(a);
    }
    tx
}

pub fn amm_withdraw_tx(
    account: &str,
    asset: &AssetRef,
    asset2: &AssetRef,
    amount: Option<&Amount>,
    amount2: Option<&Amount>,
    withdraw_all: bool,
) -> Value {
    let flags = if withdraw_all {
        amm_flags::TF_WITHDRAW_ALL
    } else if amount.is_some() && amount2.is_some() {
        amm_flags::TF_TWO_ASSET
    } else {
        amm_flags::TF_SINGLE_ASSET
    };

    let mut tx = json!({
        "TransactionType": "AMMWithdraw",
        "Account": account,
        "Asset": asset,
        "Asset2": asset2,
        "Flags": flags,
    });
    if let Some(a) = amount {
        tx["Amount"] = json!(a);
    }
    if let Some(a) = amount2 {
        tx["Amount2"] = json!(a);
    }
    tx
}

pub fn amm_vote_tx(account: &str, asset: &AssetRef, asset2: &AssetRef, trading_fee: u16) -> Value {
    json!({
        "TransactionType": "AMMVote",
        "Account": account,
        "Asset": asset,
        "Asset2": asset2,
        "TradingFee": trading_fee,
    })
}

pub fn account_set_tx(account: &str, set_flag: Option<u32>, domain: Option<&str>) -> Value {
    let mut tx = json!({
        "TransactionType": "AccountSet",
        "Account": account,
    });
    if let Some(flag) = set_flag {
        tx["SetFlag"] = json!(flag);
    }
    if let Some(domain) = domain {
        // Domain travels as uppercase hex of the ASCII string
        tx["Domain"] = json!(hex::encode_upper(domain.as_bytes()));
    }
    tx
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerEntry {
    pub account: String,
    pub weight: u16,
}

pub fn signer_list_set_tx(account: &str, quorum: u32, signers: &[SignerEntry]) -> Value {
    let entries: Vec<Value> = signers
        .iter()
        .map(|s| {
            json!({
                "SignerEntry": {
                    "Account": s.account,
                    "SignerWeight": s.weight,
                }
            })
        })
        .collect();

    json!({
        "TransactionType": "SignerListSet",
        "Account": account,
        "SignerQuorum": quorum,
        "SignerEntries": entries,
    })
}

/// Currency codes are 3-character ASCII or 40-character hex
pub fn validate_currency(code: &str) -> Result<(), WalletError> {
    let ok = (code.len() == 3 && code.chars().all(|c| c.is_ascii_alphanumeric()))
        || (code.len() == 40 && code.chars().all(|c| c.is_ascii_hexdigit()));

    if !ok {
        return Err(WalletError::InvalidInput(format!(
            "Invalid currency code: {}",
            code
        )));
    }
    if code == "XRP" {
        return Err(WalletError::InvalidInput(
            "XRP is not an issued currency".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xrp_to_drops() {
        assert_eq!(xrp_to_drops(1.0).unwrap(), 1_000_000);
        assert_eq!(xrp_to_drops(0.000001).unwrap(), 1);
        assert_eq!(xrp_to_drops(12.5).unwrap(), 12_500_000);
        assert!(xrp_to_drops(0.0).is_err());
        assert!(xrp_to_drops(-1.0).is_err());
        assert!(xrp_to_drops(f64::NAN).is_err());
        assert!(xrp_to_drops(200_000_000_000.0).is_err());
    }

    #[test]
    fn test_drops_to_xrp() {
        assert_eq!(drops_to_xrp(1_000_000), "1");
        assert_eq!(drops_to_xrp(1_500_000), "1.5");
        assert_eq!(drops_to_xrp(1), "0.000001");
        assert_eq!(drops_to_xrp(0), "0");
    }

    #[test]
    fn test_amount_serialization() {
        let drops = serde_json::to_value(Amount::drops(42)).unwrap();
        assert_eq!(drops, json!("42"));

        let issued = serde_json::to_value(Amount::issued("USD", "rIssuer", "1.5")).unwrap();
        assert_eq!(
            issued,
            json!({"currency": "USD", "issuer": "rIssuer", "value": "1.5"})
        );
    }

    #[test]
    fn test_payment_template() {
        let tx = payment_tx("rAlice", "rBob", &Amount::drops(1_000_000), Some(7));
        assert_eq!(tx["TransactionType"], "Payment");
        assert_eq!(tx["Account"], "rAlice");
        assert_eq!(tx["Destination"], "rBob");
        assert_eq!(tx["Amount"], "1000000");
        assert_eq!(tx["DestinationTag"], 7);
    }

    #[test]
    fn test_trust_set_template() {
        let tx = trust_set_tx("rAlice", "USD", "rIssuer", "1000");
        assert_eq!(tx["TransactionType"], "TrustSet");
        assert_eq!(tx["LimitAmount"]["currency"], "USD");
        assert_eq!(tx["LimitAmount"]["issuer"], "rIssuer");
        assert_eq!(tx["LimitAmount"]["value"], "1000");
    }

    #[test]
    fn test_amm_deposit_flags() {
        let xrp = AssetRef::xrp();
        let usd = AssetRef::issued("USD", "rIssuer");
        let a = Amount::drops(1_000_000);
        let b = Amount::issued("USD", "rIssuer", "10");

        let both = amm_deposit_tx("rAlice", &xrp, &usd, Some(&a), Some(&b));
        assert_eq!(both["Flags"], amm_flags::TF_TWO_ASSET);

        let single = amm_deposit_tx("rAlice", &xrp, &usd, Some(&a), None);
        assert_eq!(single["Flags"], amm_flags::TF_SINGLE_ASSET);
        assert!(single.get("Amount2").is_none());
    }

    #[test]
    fn test_amm_withdraw_all() {
        let tx = amm_withdraw_tx(
            "rAlice",
            &AssetRef::xrp(),
            &AssetRef::issued("USD", "rIssuer"),
            None,
            None,
            true,
        );
        assert_eq!(tx["Flags"], amm_flags::TF_WITHDRAW_ALL);
    }

    #[test]
    fn test_signer_list_template() {
        let tx = signer_list_set_tx(
            "rAlice",
            2,
            &[
                SignerEntry {
                    account: "rBob".to_string(),
                    weight: 1,
                },
                SignerEntry {
                    account: "rCarol".to_string(),
                    weight: 1,
                },
            ],
        );
        assert_eq!(tx["SignerQuorum"], 2);
        assert_eq!(tx["SignerEntries"][0]["SignerEntry"]["Account"], "rBob");
    }

    #[test]
    fn test_validate_currency() {
        assert!(validate_currency("USD").is_ok());
        assert!(validate_currency("0158415500000000C1F76FF6ECB0BAC600000000").is_ok());
        assert!(validate_currency("XRP").is_err());
        assert!(validate_currency("TOOLONG").is_err());
        assert!(validate_currency("U$").is_err());
    }

    #[test]
    fn test_account_set_domain_hex() {
        let tx = account_set_tx("rAlice", None, Some("example.com"));
        assert_eq!(tx["Domain"], "6578616D706C652E636F6D".to_string());
    }
}
