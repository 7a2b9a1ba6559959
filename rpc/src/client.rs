//! [`LedgerClient`] over HTTP JSON-RPC.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use vanguard_client::{
    AccountPower, LedgerClient, LedgerError, SubmitError, TransferStream, VoteReceipt,
    VoteRequest,
};
use vanguard_types::{Block, ContentSnapshot, Credential, HistoryEntry, Slug, Transfer};

use crate::wire::{
    history_entry, RawAccount, RawBlock, RawContent, RawDiscussion, RawGlobalProperties,
    RawHistoryOp, RpcResponse, SignerRequest, SignerResponse,
};
use crate::{classify, RpcConfig, RpcError};

const STREAM_CAPACITY: usize = 256;

struct Inner {
    http: Client,
    url: String,
    signer_url: Option<String>,
    poll_interval: Duration,
    next_id: AtomicU64,
}

#[derive(Clone)]
pub struct RpcClient {
    inner: Arc<Inner>,
}

impl RpcClient {
    pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        info!(url = %config.url, "ledger client initialized");
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                url: config.url.clone(),
                signer_url: config.signer_url.clone(),
                poll_interval: config.poll_interval(),
                next_id: AtomicU64::new(1),
            }),
        })
    }
}

impl Inner {
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        self.call_nullable(method, params)
            .await?
            .ok_or_else(|| RpcError::Decode(format!("{method}: empty result")))
    }

    /// Like [`Inner::call`], but a `null` result is `None`.
    async fn call_nullable<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": format!("condenser_api.{method}"),
            "params": params,
        });
        debug!(method, id, "→ rpc");

        let response = self.http.post(&self.url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(RpcError::Status(response.status().as_u16()));
        }

        let envelope: RpcResponse<T> = response.json().await?;
        if let Some(error) = envelope.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(envelope.result)
    }

    async fn global_properties(&self) -> Result<RawGlobalProperties, RpcError> {
        self.call("get_dynamic_global_properties", json!([])).await
    }

    async fn block(&self, number: u64) -> Result<Option<Block>, RpcError> {
        let raw: Option<RawBlock> = self.call_nullable("get_block", json!([number])).await?;
        raw.map(|b| b.into_block(number)).transpose()
    }

    /// Follow the head block until the receiving session goes away.
    async fn follow(self: Arc<Self>, tx: mpsc::Sender<Result<Transfer, LedgerError>>) {
        tokio::select! {
            _ = tx.closed() => debug!("transfer stream dropped, head poll stopped"),
            _ = self.poll_head(&tx) => {}
        }
    }

    /// Poll the head block, sending every transfer in order.
    async fn poll_head(&self, tx: &mpsc::Sender<Result<Transfer, LedgerError>>) {
        let mut next = match self.global_properties().await {
            Ok(props) => props.head_block_number,
            Err(e) => {
                let _ = tx.send(Err(e.into())).await;
                return;
            }
        };
        let mut ticker = tokio::time::interval(self.poll_interval);

        loop {
            ticker.tick().await;
            let head = match self.global_properties().await {
                Ok(props) => props.head_block_number,
                Err(e) => {
                    let _ = tx.send(Err(e.into())).await;
                    return;
                }
            };
            while next <= head {
                match self.block(next).await {
                    Ok(Some(block)) => {
                        for transfer in block.transfers {
                            if tx.send(Ok(transfer)).await.is_err() {
                                return;
                            }
                        }
                        next += 1;
                    }
                    // Not produced yet on this node.
                    Ok(None) => break,
                    Err(e) => {
                        let _ = tx.send(Err(e.into())).await;
                        return;
                    }
                }
            }
        }
    }
}

#[async_trait]
impl LedgerClient for RpcClient {
    async fn stream_transfers(&self) -> Result<TransferStream, LedgerError> {
        let (tx, rx) = mpsc::channel(STREAM_CAPACITY);
        tokio::spawn(Arc::clone(&self.inner).follow(tx));
        Ok(rx)
    }

    async fn get_content(&self, slug: &Slug) -> Result<ContentSnapshot, LedgerError> {
        let raw: RawContent = self
            .inner
            .call("get_content", json!([slug.author, slug.permlink]))
            .await?;
        if raw.is_empty() {
            return Err(LedgerError::NotFound(slug.to_string()));
        }
        Ok(raw.into_snapshot()?)
    }

    async fn get_accounts_power(&self, names: &[String]) -> Result<Vec<AccountPower>, LedgerError> {
        let raw: Vec<RawAccount> = self.inner.call("get_accounts", json!([names])).await?;
        raw.into_iter()
            .map(|a| a.into_power().map_err(LedgerError::from))
            .collect()
    }

    async fn get_account_history(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<HistoryEntry>, LedgerError> {
        let raw: Vec<(u64, RawHistoryOp)> = self
            .inner
            .call("get_account_history", json!([name, -1, limit]))
            .await?;
        Ok(raw.into_iter().map(history_entry).collect())
    }

    async fn submit_vote(
        &self,
        credential: &Credential,
        vote: &VoteRequest,
    ) -> Result<VoteReceipt, SubmitError> {
        let url = self
            .inner
            .signer_url
            .as_deref()
            .ok_or_else(|| SubmitError::Other(RpcError::NoSigner.to_string()))?;
        let body = SignerRequest {
            voter: &vote.voter,
            credential: credential.expose(),
            author: &vote.author,
            permlink: &vote.permlink,
            weight: vote.weight.hundredths(),
        };

        let response = self
            .inner
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SubmitError::from(LedgerError::from(RpcError::from(e))))?;
        let status = response.status();
        let parsed: SignerResponse = response
            .json()
            .await
            .map_err(|e| SubmitError::Other(format!("signer status {status}: {e}")))?;

        match parsed.error {
            Some(error) => Err(classify(error.kind.as_deref(), &error.message)),
            None if status.is_success() => Ok(VoteReceipt {
                transaction_id: parsed.transaction_id,
            }),
            None => Err(SubmitError::Other(format!("signer status {status}"))),
        }
    }

    async fn last_irreversible_block(&self) -> Result<u64, LedgerError> {
        Ok(self.inner.global_properties().await?.last_irreversible_block_num)
    }

    async fn get_block_range(&self, low: u64, high: u64) -> Result<Vec<Block>, LedgerError> {
        let mut blocks = Vec::new();
        for number in low..=high {
            match self.inner.block(number).await? {
                Some(block) => blocks.push(block),
                None => warn!(number, "block not available"),
            }
        }
        Ok(blocks)
    }

    async fn get_trending_reputations(&self, limit: u32) -> Result<Vec<i64>, LedgerError> {
        let raw: Vec<RawDiscussion> = self
            .inner
            .call(
                "get_discussions_by_trending",
                json!([{ "tag": "", "limit": limit }]),
            )
            .await?;
        raw.iter()
            .map(|d| d.author_reputation.as_i64().map_err(LedgerError::from))
            .collect()
    }
}
