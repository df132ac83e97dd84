use std::collections::BTreeMap;
use std::sync::Arc;

use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    error::GatewayError,
    gateway::Gateway,
    models::gateway::{
        AccountEnvelope, AddressQuery, AssetQuery, BalancesEnvelope, BroadcastRequest,
        BroadcastResponse, BuildRequest, BuildResponse, GatewayResult, HealthResponse,
        TransactionsEnvelope, TransactionsQuery,
    },
    network::Network,
};

/// Account state of an address
///
/// Unknown addresses come back as a zero-balance account, not as an error.
#[get("/api/account")]
async fn get_account(
    gateway: web::Data<Arc<Gateway>>,
    query: web::Query<AddressQuery>,
) -> Result<HttpResponse, GatewayError> {
    let network = gateway.resolver.select(query.network.as_deref());
    let address = query.address.as_deref().unwrap_or_default();
    info!("Account request for '{}' on {}", address, network);

    let account = gateway.accounts.fetch(address, network).await?;
    Ok(HttpResponse::Ok().json(GatewayResult::success(AccountEnvelope { account })))
}

#[get("/api/balance")]
async fn get_balance(
    gateway: web::Data<Arc<Gateway>>,
    query: web::Query<AddressQuery>,
) -> Result<HttpResponse, GatewayError> {
    let network = gateway.resolver.select(query.network.as_deref());
    let address = query.address.as_deref().unwrap_or_default();
    info!("Balance request for '{}' on {}", address, network);

    let assets = gateway.accounts.fetch_balances(address, network).await?;
    Ok(HttpResponse::Ok().json(GatewayResult::success(BalancesEnvelope {
        address: address.trim().to_string(),
        assets,
    })))
}

#[get("/api/transactions")]
async fn get_transactions(
    gateway: web::Data<Arc<Gateway>>,
    query: web::Query<TransactionsQuery>,
) -> Result<HttpResponse, GatewayError> {
    let network = gateway.resolver.select(query.network.as_deref());
    let address = query.address.as_deref().unwrap_or_default();
    info!("Transaction history request for '{}' on {}", address, network);

    let transactions = gateway
        .accounts
        .list_transactions(address, network, query.limit)
        .await?;
    Ok(HttpResponse::Ok().json(GatewayResult::success(TransactionsEnvelope {
        address: address.trim().to_string(),
        transactions,
    })))
}

/// Asset metadata, returned exactly as the node serves it
#[get("/api/asset")]
async fn get_asset(
    gateway: web::Data<Arc<Gateway>>,
    query: web::Query<AssetQuery>,
) -> Result<HttpResponse, GatewayError> {
    let network = gateway.resolver.select(query.network.as_deref());
    let asset_id = query.asset_id.as_deref().unwrap_or_default();
    info!("Asset request for '{}' on {}", asset_id, network);

    let asset = gateway.assets.lookup(asset_id, network).await?;
    Ok(HttpResponse::Ok().json(asset))
}

/// Build an unsigned smart-contract invoke transaction for the wallet to sign
#[post("/api/swap/build")]
async fn build_swap(
    req: HttpRequest,
    gateway: web::Data<Arc<Gateway>>,
    body: web::Json<BuildRequest>,
) -> Result<HttpResponse, GatewayError> {
    debug!(
        "Received build request from {}",
        req.peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );
    let network = gateway.resolver.select(body.network.as_deref());

    let built = gateway.builder.build(&body, network).await?;
    Ok(HttpResponse::Ok().json(BuildResponse {
        success: true,
        unsigned_tx: built.unsigned_tx,
        nonce: built.nonce,
    }))
}

/// Relay a wallet-signed transaction to the node
#[post("/api/swap/broadcast")]
async fn broadcast_swap(
    gateway: web::Data<Arc<Gateway>>,
    body: web::Json<BroadcastRequest>,
) -> Result<HttpResponse, GatewayError> {
    let network = gateway.resolver.select(body.network.as_deref());
    let signed_tx = body.signed_tx.as_ref().unwrap_or(&Value::Null);
    info!("Broadcast request on {}", network);

    let tx_hash = gateway.broadcaster.broadcast(signed_tx, network).await?;
    Ok(HttpResponse::Ok().json(BroadcastResponse {
        success: true,
        tx_hash,
    }))
}

/// Liveness check; does not contact the node
#[get("/api/health")]
async fn health_check(gateway: web::Data<Arc<Gateway>>) -> HttpResponse {
    let networks = [Network::Mainnet, Network::Testnet]
        .into_iter()
        .map(|network| {
            (
                network.as_str(),
                gateway.resolver.profile(network).api_url.to_string(),
            )
        })
        .collect::<BTreeMap<_, _>>();

    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        default_network: gateway.resolver.default_network(),
        networks,
    })
}

/// Configure the API routes for the service
///
/// Malformed JSON bodies and query strings are reported through the same
/// failure body as every other validation error.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        warn!("Rejected request body: {}", err);
        GatewayError::Validation(format!("Invalid request body: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        warn!("Rejected query string: {}", err);
        GatewayError::Validation(format!("Invalid query: {}", err)).into()
    }))
    .service(get_account)
    .service(get_balance)
    .service(get_transactions)
    .service(get_asset)
    .service(build_swap)
    .service(broadcast_swap)
    .service(health_check);
}
