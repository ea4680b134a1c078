// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sending tips from a local wallet.

use alloy::{
    network::{EthereumWallet, ReceiptResponse},
    primitives::{utils::parse_ether, Address, TxHash},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};

use super::ClientError;
use crate::blockchain::{contracts::ITipJar, parse_address, BlockchainError};

/// Signs and sends `tip()` calls to tip jar contracts.
#[derive(Clone)]
pub struct TipSender {
    provider: DynProvider,
    from: Address,
}

impl TipSender {
    pub fn new(rpc_url: &str, signer: PrivateKeySigner) -> Result<Self, ClientError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| BlockchainError::InvalidRpcUrl(e.to_string()))?;
        let from = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();
        Ok(Self { provider, from })
    }

    /// Address the tips are sent from.
    pub fn address(&self) -> Address {
        self.from
    }

    /// Send `amount_ether` (decimal, e.g. `"0.01"`) to the tip jar at `jar`
    /// and wait for it to be mined.
    pub async fn send_tip(&self, jar: &str, amount_ether: &str) -> Result<TxHash, ClientError> {
        let jar = parse_address(jar)?;
        let value = parse_tip_amount(amount_ether)?;

        let contract = ITipJar::new(jar, self.provider.clone());
        let pending = contract
            .tip()
            .value(value)
            .send()
            .await
            .map_err(BlockchainError::from)?;
        let tx_hash = *pending.tx_hash();
        tracing::info!(jar = %jar, from = %self.from, %tx_hash, amount = amount_ether, "Tip sent");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| BlockchainError::Rpc(e.to_string()))?;
        if !receipt.status() {
            return Err(BlockchainError::Contract(format!("tip transaction {tx_hash} reverted")).into());
        }
        Ok(receipt.transaction_hash)
    }
}

fn parse_tip_amount(amount_ether: &str) -> Result<alloy::primitives::U256, ClientError> {
    let amount = amount_ether.trim();
    // parse_ether returns the absolute value of signed input.
    if amount.starts_with('-') {
        return Err(ClientError::InvalidAmount(format!("{amount} is negative")));
    }
    let value = parse_ether(amount).map_err(|e| ClientError::InvalidAmount(e.to_string()))?;
    if value.is_zero() {
        return Err(ClientError::InvalidAmount("tip amount must be positive".to_string()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    #[test]
    fn amounts_are_parsed_as_ether() {
        assert_eq!(parse_tip_amount("1").unwrap(), U256::from(10u64).pow(U256::from(18u64)));
        assert_eq!(parse_tip_amount(" 0.01 ").unwrap(), U256::from(10_000_000_000_000_000u64));
    }

    #[test]
    fn bad_amounts_are_rejected() {
        assert!(matches!(parse_tip_amount("0"), Err(ClientError::InvalidAmount(_))));
        assert!(matches!(parse_tip_amount("ten"), Err(ClientError::InvalidAmount(_))));
        assert!(matches!(parse_tip_amount("-1"), Err(ClientError::InvalidAmount(_))));
    }

    #[tokio::test]
    async fn input_is_checked_before_any_rpc_call() {
        let sender = TipSender::new("http://127.0.0.1:1", PrivateKeySigner::random()).unwrap();

        let err = sender.send_tip("0xnot-an-address", "0.1").await.unwrap_err();
        assert!(matches!(err, ClientError::Blockchain(BlockchainError::InvalidAddress(_))));

        let err = sender
            .send_tip("0x5FbDB2315678afecb367f032d93F642f64180aa3", "lots")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidAmount(_)));
    }

    #[test]
    fn invalid_rpc_url_is_rejected() {
        let err = TipSender::new("not a url", PrivateKeySigner::random()).err().unwrap();
        assert!(matches!(err, ClientError::Blockchain(BlockchainError::InvalidRpcUrl(_))));
    }
}
