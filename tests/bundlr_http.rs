//! Integration tests for `BundlrHttp` and `HttpNotifier` against a throwaway
//! axum server standing in for a Bundlr node / indexing API.

#![cfg(feature = "http")]

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use certweave::bundlr::client::address_from_owner;
use certweave::prelude::*;
use certweave::shared::b64url_encode;

const OWNER_BYTE: u8 = 0x11;
const SIGNATURE_BYTE: u8 = 0x22;

// ── Mock node ────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct NodeState {
    posted: Arc<Mutex<Vec<Vec<u8>>>>,
    balance_queries: Arc<Mutex<Vec<String>>>,
    json_posts: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn price(Path((_currency, bytes)): Path<(String, u64)>) -> String {
    (bytes * 10).to_string()
}

async fn balance(
    State(state): State<NodeState>,
    Path(_currency): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let address = params.get("address").cloned().unwrap_or_default();
    state.balance_queries.lock().unwrap().push(address);
    Json(json!({ "balance": "5000000000000" }))
}

async fn tx(State(state): State<NodeState>, body: Bytes) -> Json<Value> {
    let signature = &body[2..514];
    let id = b64url_encode(&Sha256::digest(signature));
    state.posted.lock().unwrap().push(body.to_vec());
    Json(json!({ "id": id, "timestamp": 1_700_000_000_000u64 }))
}

async fn certificates(
    State(state): State<NodeState>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let auth = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.json_posts.lock().unwrap().push((auth, body));
    StatusCode::CREATED
}

async fn spawn_server(app: Router) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        let _ = server.await;
    });
    (addr, shutdown_tx)
}

async fn spawn_node() -> (String, NodeState, oneshot::Sender<()>) {
    let state = NodeState::default();
    let app = Router::new()
        .route("/price/:currency/:bytes", get(price))
        .route("/account/balance/:currency", get(balance))
        .route("/tx/:currency", post(tx))
        .route("/certificates", post(certificates))
        .with_state(state.clone());
    let (addr, shutdown) = spawn_server(app).await;
    (format!("http://{addr}"), state, shutdown)
}

// ── Signer double ────────────────────────────────────────────────────────────

#[derive(Default)]
struct FixedSigner {
    messages: RefCell<Vec<Vec<u8>>>,
}

#[async_trait(?Send)]
impl Signer for FixedSigner {
    async fn public_key(&self) -> Result<Vec<u8>, CertError> {
        Ok(vec![OWNER_BYTE; 512])
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CertError> {
        self.messages.borrow_mut().push(message.to_vec());
        Ok(vec![SIGNATURE_BYTE; 512])
    }
}

fn client(base_url: &str, signer: Rc<FixedSigner>) -> BundlrHttp {
    BundlrHttp::new(base_url, Currency::arweave(), signer).expect("client should build")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ready_then_balance_uses_derived_address() {
    let (url, state, _shutdown) = spawn_node().await;
    let mut bundlr = client(&url, Rc::new(FixedSigner::default()));

    bundlr.ready().await.unwrap();
    let expected = address_from_owner(&[OWNER_BYTE; 512]);
    assert_eq!(bundlr.address(), Some(expected.as_str()));

    let balance = bundlr.loaded_balance().await.unwrap();
    assert_eq!(balance, Amount(5_000_000_000_000));
    assert_eq!(bundlr.to_display(balance).unwrap(), "5");
    assert_eq!(state.balance_queries.lock().unwrap().as_slice(), [expected]);
}

#[tokio::test]
async fn test_balance_before_ready_is_not_ready() {
    let (url, _state, _shutdown) = spawn_node().await;
    let bundlr = client(&url, Rc::new(FixedSigner::default()));

    let err = bundlr.loaded_balance().await.unwrap_err();
    assert!(matches!(err, CertError::Upload(UploadError::NotReady)));
}

#[tokio::test]
async fn test_price_parses_bare_integer() {
    let (url, _state, _shutdown) = spawn_node().await;
    let bundlr = client(&format!("{url}/"), Rc::new(FixedSigner::default()));

    assert_eq!(bundlr.price(1234).await.unwrap(), Amount(12_340));
}

#[tokio::test]
async fn test_upload_posts_signed_data_item() {
    let (url, state, _shutdown) = spawn_node().await;
    let signer = Rc::new(FixedSigner::default());
    let mut bundlr = client(&url, signer.clone());
    bundlr.ready().await.unwrap();

    let tags = vec![
        Tag::new("Content-Type", "application/pdf"),
        Tag::new("hash", "abc123"),
    ];
    let receipt = bundlr.upload(b"certificate body", &tags).await.unwrap();

    let expected_id = b64url_encode(&Sha256::digest([SIGNATURE_BYTE; 512]));
    assert_eq!(receipt.id.as_str(), expected_id);
    assert_eq!(receipt.timestamp, Some(1_700_000_000_000));

    let messages = signer.messages.borrow();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].len(), 48);

    let posted = state.posted.lock().unwrap();
    assert_eq!(posted.len(), 1);
    let item = &posted[0];
    assert_eq!(&item[0..2], &[1, 0]);
    assert!(item[2..514].iter().all(|b| *b == SIGNATURE_BYTE));
    assert!(item[514..1026].iter().all(|b| *b == OWNER_BYTE));
    assert_eq!(item[1026], 0);
    assert_eq!(item[1027], 1);
    let tag_count = u64::from_le_bytes(item[1060..1068].try_into().unwrap());
    assert_eq!(tag_count, 2);
    assert!(item.ends_with(b"certificate body"));
}

#[tokio::test]
async fn test_status_codes_map_to_http_errors() {
    let app = Router::new()
        .route(
            "/price/:currency/:bytes",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "node syncing") }),
        )
        .route(
            "/account/balance/:currency",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
    let (addr, _shutdown) = spawn_server(app).await;
    let mut bundlr = client(&format!("http://{addr}"), Rc::new(FixedSigner::default()));
    bundlr.ready().await.unwrap();

    match bundlr.price(10).await.unwrap_err() {
        CertError::Http(HttpError::ServerError { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "node syncing");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matches!(
        bundlr.loaded_balance().await.unwrap_err(),
        CertError::Http(HttpError::RateLimited)
    ));
}

#[tokio::test]
async fn test_http_notifier_posts_record_with_bearer() {
    let (url, state, _shutdown) = spawn_node().await;
    let notifier = HttpNotifier::new(&format!("{url}/certificates"))
        .unwrap()
        .with_api_key("secret");

    let record = CertificateRecord {
        hash: "ab".repeat(32),
        transaction_id: TxId::from("tx-1"),
        holder: "Ana".into(),
        course: "Intro".into(),
        issue_date: "2024-01-01".into(),
        url: "https://arweave.net/tx-1".into(),
        timestamp: Utc::now(),
        size: 321,
        wallet: "Arweave.app".into(),
        network: NetworkProfile::Testnet,
    };
    notifier.notify(&record).await.unwrap();

    let posts = state.json_posts.lock().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].0.as_deref(), Some("Bearer secret"));
    assert_eq!(posts[0].1["transactionId"], "tx-1");
    assert_eq!(posts[0].1["issueDate"], "2024-01-01");
    assert_eq!(posts[0].1["size"], 321);
}

fn empty_record() -> CertificateRecord {
    CertificateRecord {
        hash: String::new(),
        transaction_id: TxId::from("tx"),
        holder: String::new(),
        course: String::new(),
        issue_date: String::new(),
        url: String::new(),
        timestamp: Utc::now(),
        size: 0,
        wallet: String::new(),
        network: NetworkProfile::Mainnet,
    }
}

#[tokio::test]
async fn test_http_notifier_maps_client_errors() {
    let (url, _state, _shutdown) = spawn_node().await;
    let notifier = HttpNotifier::new(&format!("{url}/missing")).unwrap();
    match notifier.notify(&empty_record()).await.unwrap_err() {
        CertError::Http(HttpError::NotFound(_)) => {}
        other => panic!("unexpected error: {other:?}"),
    }

    let app = Router::new().route(
        "/certificates",
        post(|| async { (StatusCode::UNAUTHORIZED, "bad token") }),
    );
    let (addr, _shutdown) = spawn_server(app).await;
    let notifier = HttpNotifier::new(&format!("http://{addr}/certificates"))
        .unwrap()
        .with_api_key("stale");
    assert!(matches!(
        notifier.notify(&empty_record()).await.unwrap_err(),
        CertError::Http(HttpError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_http_notifier_server_error_keeps_status() {
    let app = Router::new().route(
        "/certificates",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let (addr, _shutdown) = spawn_server(app).await;
    let notifier = HttpNotifier::new(&format!("http://{addr}/certificates")).unwrap();
    match notifier.notify(&empty_record()).await.unwrap_err() {
        CertError::Http(HttpError::ServerError { status, body }) => {
            assert_eq!(status, 502);
            assert_eq!(body, "upstream down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
