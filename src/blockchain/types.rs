// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and unit conversion.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Decimals of the native currency.
pub const ETHER_DECIMALS: u8 = 18;

/// Snapshot of a tip jar contract.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TipJarInfo {
    /// Tip jar contract address (checksummed)
    pub address: String,
    /// Creator wallet that receives the tips (checksummed)
    pub creator: String,
    /// Minimum accepted tip, in ether
    pub min_tip: String,
    /// Sum of all tips received, in ether
    pub total_tips: String,
    /// Number of tips received
    pub tip_counter: u64,
}

/// One entry of a tip jar's recent-tips history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TipRecord {
    pub tipper: String,
    /// Amount in ether
    pub amount: String,
}

/// Format a wei amount as a decimal ether string.
///
/// Whole amounts keep one fractional digit (`"1.0"`); otherwise trailing
/// zeros are trimmed and full precision is kept.
pub fn format_ether(wei: U256) -> String {
    format_units(wei, ETHER_DECIMALS)
}

/// Format a base-unit amount with the given number of decimals.
pub fn format_units(amount: U256, decimals: u8) -> String {
    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        return format!("{whole}.0");
    }

    let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
    let trimmed = decimal_str.trim_end_matches('0');
    format!("{whole}.{trimmed}")
}
