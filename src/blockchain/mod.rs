// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration for the tip jar contracts.
//!
//! This module provides:
//! - Tip jar lookup through the registry (factory) contract
//! - Read-only tip jar snapshots and recent-tip history
//! - Wei to ether conversion at the boundary
//!
//! Tips themselves are sent by the wallet straight to the tip jar; see
//! [`crate::client::TipSender`].

pub mod client;
pub mod contracts;
pub mod types;

pub use client::{parse_address, BlockchainError, TipJarClient};
pub use types::*;
