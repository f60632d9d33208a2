use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::types::*;
use crate::error::WalletError;
use crate::manager::WalletManager;
use crate::queue::QueueEntryView;

pub async fn create_wallet_handler(
    State(manager): State<Arc<WalletManager>>,
    Json(req): Json<CreateWalletRequest>,
) -> Result<Json<WalletInfo>, WalletError> {
    let wallet_info = manager.create_wallet(&req.name)?;
    Ok(Json(wallet_info))
}

pub async fn import_wallet_handler(
    State(manager): State<Arc<WalletManager>>,
    Json(req): Json<ImportWalletRequest>,
) -> Result<Json<WalletInfo>, WalletError> {
    let wallet_info = manager.import_wallet(&req.name, &req.seed)?;
    Ok(Json(wallet_info))
}

pub async fn list_wallets_handler(
    State(manager): State<Arc<WalletManager>>,
) -> Result<Json<Vec<WalletMetadata>>, WalletError> {
    let wallets = manager.list_wallets()?;
    Ok(Json(wallets))
}

pub async fn delete_wallet_handler(
    State(manager): State<Arc<WalletManager>>,
    Path(name): Path<String>,
) -> Result<Json<DeleteWalletResponse>, WalletError> {
    manager.delete_wallet(&name)?;

    Ok(Json(DeleteWalletResponse {
        wallet_name: name,
        status: "deleted".to_string(),
    }))
}

pub async fn get_balance_handler(
    State(manager): State<Arc<WalletManager>>,
    Path(name): Path<String>,
) -> Result<Json<BalanceInfo>, WalletError> {
    let balance = manager.get_balance(&name).await?;
    Ok(Json(balance))
}

pub async fn payment_handler(
    State(manager): State<Arc<WalletManager>>,
    Path(name): Path<String>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<QueuedResponse>, WalletError> {
    let queued = manager.queue_payment(&name, req)?;
    Ok(Json(queued))
}

pub async fn trustline_handler(
    State(manager): State<Arc<WalletManager>>,
    Path(name): Path<String>,
    Json(req): Json<TrustlineRequest>,
) -> Result<Json<QueuedResponse>, WalletError> {
    let queued = manager.queue_trustline(&name, req)?;
    Ok(Json(queued))
}

pub async fn amm_create_handler(
    State(manager): State<Arc<WalletManager>>,
    Path(name): Path<String>,
    Json(req): Json<AmmCreateRequest>,
) -> Result<Json<QueuedResponse>, WalletError> {
    let queued = manager.queue_amm_create(&name, req)?;
    Ok(Json(queued))
}

pub async fn amm_deposit_handler(
    State(manager): State<Arc<WalletManager>>,
    Path(name): Path<String>,
    Json(req): Json<AmmDepositRequest>,
) -> Result<Json<QueuedResponse>, WalletError> {
    let queued = manager.queue_amm_deposit(&name, req)?;
    Ok(Json(queued))
}

pub async fn amm_withdraw_handler(
    State(manager): State<Arc<WalletManager>>,
    Path(name): Path<String>,
    Json(req): Json<AmmWithdrawRequest>,
) -> Result<Json<QueuedResponse>, WalletError> {
    let queued = manager.queue_amm_withdraw(&name, req)?;
    Ok(Json(queued))
}

pub async fn amm_vote_handler(
    State(manager): State<Arc<WalletManager>>,
    Path(name): Path<String>,
    Json(req): Json<AmmVoteRequest>,
) -> Result<Json<QueuedResponse>, WalletError> {
    let queued = manager.queue_amm_vote(&name, req)?;
    Ok(Json(queued))
}

pub async fn account_set_handler(
    State(manager): State<Arc<WalletManager>>,
    Path(name): Path<String>,
    Json(req): Json<AccountSetRequest>,
) -> Result<Json<QueuedResponse>, WalletError> {
    let queued = manager.queue_account_set(&name, req)?;
    Ok(Json(queued))
}

pub async fn signer_list_handler(
    State(manager): State<Arc<WalletManager>>,
    Path(name): Path<String>,
    Json(req): Json<SignerListRequest>,
) -> Result<Json<QueuedResponse>, WalletError> {
    let queued = manager.queue_signer_list(&name, req)?;
    Ok(Json(queued))
}

pub async fn mint_handler(
    State(manager): State<Arc<WalletManager>>,
    Path(name): Path<String>,
    Json(req): Json<MintRequest>,
) -> Result<Json<MintQueuedResponse>, WalletError> {
    let queued = manager.queue_mint(&name, req)?;
    Ok(Json(queued))
}

pub async fn multisign_submit_handler(
    State(manager): State<Arc<WalletManager>>,
    Json(req): Json<MultisignSubmitRequest>,
) -> Result<Json<QueuedResponse>, WalletError> {
    let queued = manager.queue_multisigned(req)?;
    Ok(Json(queued))
}

pub async fn queue_snapshot_handler(
    State(manager): State<Arc<WalletManager>>,
) -> Json<Vec<QueueEntryView>> {
    Json(manager.queue_snapshot())
}

pub async fn clear_queue_handler(
    State(manager): State<Arc<WalletManager>>,
) -> Json<ClearQueueResponse> {
    Json(ClearQueueResponse {
        cleared: manager.clear_queue(),
    })
}
