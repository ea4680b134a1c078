// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tip jar contract interfaces.

use alloy::sol;

sol! {
    /// Registry mapping creators to their tip jar.
    #[sol(rpc)]
    interface ITipJarFactory {
        function getTipJar(address creator) external view returns (address);
        function getAllTipJars() external view returns (address[]);
    }
}

sol! {
    /// Per-creator tip jar.
    #[sol(rpc)]
    interface ITipJar {
        struct Tip {
            address tipper;
            uint256 amount;
        }

        function creator() external view returns (address);
        function minTip() external view returns (uint256);
        function totalTips() external view returns (uint256);
        function tipCounter() external view returns (uint256);
        function getAllRecentTips() external view returns (Tip[] memory);
        function tip() external payable;
    }
}
