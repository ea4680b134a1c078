// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EIP-191 (`personal_sign`) signer recovery.

use std::str::FromStr;

use alloy::primitives::{Address, Signature};

/// Recover the signer of `message` and compare it to `address`.
///
/// Any parse or recovery failure is reported as `false`.
pub fn verify_signature(address: &str, message: &str, signature: &str) -> bool {
    let Ok(expected) = Address::from_str(address.trim()) else {
        return false;
    };
    let Ok(signature) = Signature::from_str(signature.trim()) else {
        return false;
    };
    match signature.recover_address_from_msg(message) {
        Ok(recovered) => recovered == expected,
        Err(e) => {
            tracing::debug!(error = %e, "Signature recovery failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::signers::{local::PrivateKeySigner, SignerSync};

    fn sign(signer: &PrivateKeySigner, message: &str) -> String {
        let signature = signer.sign_message_sync(message.as_bytes()).unwrap();
        format!("0x{}", alloy::hex::encode(signature.as_bytes()))
    }

    #[test]
    fn recovers_signer_case_insensitively() {
        let signer = PrivateKeySigner::random();
        let message = "Sign this message to authenticate: abc";
        let signature = sign(&signer, message);

        let checksummed = signer.address().to_checksum(None);
        assert!(verify_signature(&checksummed, message, &signature));
        assert!(verify_signature(&checksummed.to_lowercase(), message, &signature));
    }

    #[test]
    fn wrong_message_or_signer_fails() {
        let signer = PrivateKeySigner::random();
        let other = PrivateKeySigner::random();
        let signature = sign(&signer, "hello");

        assert!(!verify_signature(&signer.address().to_string(), "goodbye", &signature));
        assert!(!verify_signature(&other.address().to_string(), "hello", &signature));
    }

    #[test]
    fn garbage_is_false_not_panic() {
        let signer = PrivateKeySigner::random();
        let address = signer.address().to_string();
        assert!(!verify_signature(&address, "hello", "0x1234"));
        assert!(!verify_signature(&address, "hello", "not hex at all"));
        assert!(!verify_signature("0xnope", "hello", &sign(&signer, "hello")));
    }
}
