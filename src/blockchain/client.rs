// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only client for the tip jar registry and tip jar contracts.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, ProviderBuilder, RootProvider,
    },
    transports::RpcError,
};

use super::contracts::{ITipJar, ITipJarFactory};
use super::types::{format_ether, TipJarInfo, TipRecord};
use crate::config::ChainConfig;

/// HTTP provider type (with the default fillers).
pub(crate) type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Errors that can occur during blockchain reads.
#[derive(Debug, thiserror::Error)]
pub enum BlockchainError {
    #[error("Blockchain access is not configured")]
    NotConfigured,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    /// Transport failure or unreachable node.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Revert, missing contract or ABI decode failure.
    #[error("Contract error: {0}")]
    Contract(String),

    #[error("RPC call timed out")]
    Timeout,
}

impl From<alloy::contract::Error> for BlockchainError {
    fn from(e: alloy::contract::Error) -> Self {
        match e {
            alloy::contract::Error::TransportError(RpcError::Transport(kind)) => {
                BlockchainError::Rpc(kind.to_string())
            }
            alloy::contract::Error::TransportError(RpcError::NullResp) => {
                BlockchainError::Rpc("null response from node".to_string())
            }
            other => BlockchainError::Contract(other.to_string()),
        }
    }
}

/// Parse a user-supplied address.
pub fn parse_address(raw: &str) -> Result<Address, BlockchainError> {
    Address::from_str(raw.trim()).map_err(|e| BlockchainError::InvalidAddress(e.to_string()))
}

/// Tip jar read client.
pub struct TipJarClient {
    provider: HttpProvider,
    factory: Address,
    chain_id: u64,
    timeout: Duration,
}

impl TipJarClient {
    /// Create a client for the given chain settings. No network I/O happens
    /// until the first call.
    pub fn new(config: &ChainConfig) -> Result<Self, BlockchainError> {
        let url: url::Url = config
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| BlockchainError::InvalidRpcUrl(e.to_string()))?;
        let factory = parse_address(&config.factory_address)?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self {
            provider,
            factory,
            chain_id: config.chain_id,
            timeout: config.timeout,
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn factory_address(&self) -> Address {
        self.factory
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, BlockchainError>
    where
        F: Future<Output = Result<T, BlockchainError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| BlockchainError::Timeout)?
    }

    /// Tip jar of `creator`, or `None` if the registry holds the zero address.
    pub async fn get_tip_jar_address(&self, creator: &str) -> Result<Option<Address>, BlockchainError> {
        let creator = parse_address(creator)?;
        let factory = ITipJarFactory::new(self.factory, self.provider.clone());

        let jar = self
            .bounded(async { Ok(factory.getTipJar(creator).call().await?) })
            .await?;

        Ok((jar != Address::ZERO).then_some(jar))
    }

    pub async fn has_tip_jar(&self, creator: &str) -> Result<bool, BlockchainError> {
        Ok(self.get_tip_jar_address(creator).await?.is_some())
    }

    /// Read the four scalar fields of a tip jar concurrently.
    pub async fn get_tip_jar_info(&self, jar: Address) -> Result<TipJarInfo, BlockchainError> {
        let contract = ITipJar::new(jar, self.provider.clone());

        let (creator, min_tip, total_tips, tip_counter) = self
            .bounded(async {
                let creator = contract.creator();
                let min_tip = contract.minTip();
                let total_tips = contract.totalTips();
                let tip_counter = contract.tipCounter();
                Ok(tokio::try_join!(
                    async { creator.call().await },
                    async { min_tip.call().await },
                    async { total_tips.call().await },
                    async { tip_counter.call().await },
                )?)
            })
            .await?;

        Ok(TipJarInfo {
            address: jar.to_string(),
            creator: creator.to_string(),
            min_tip: format_ether(min_tip),
            total_tips: format_ether(total_tips),
            tip_counter: saturating_u64(tip_counter),
        })
    }

    pub async fn get_recent_tips(&self, jar: Address) -> Result<Vec<TipRecord>, BlockchainError> {
        let contract = ITipJar::new(jar, self.provider.clone());

        let tips = self
            .bounded(async { Ok(contract.getAllRecentTips().call().await?) })
            .await?;

        Ok(tips
            .into_iter()
            .map(|tip| TipRecord {
                tipper: tip.tipper.to_string(),
                amount: format_ether(tip.amount),
            })
            .collect())
    }

    pub async fn get_all_tip_jars(&self) -> Result<Vec<Address>, BlockchainError> {
        let factory = ITipJarFactory::new(self.factory, self.provider.clone());
        self.bounded(async { Ok(factory.getAllTipJars().call().await?) })
            .await
    }
}

fn saturating_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
