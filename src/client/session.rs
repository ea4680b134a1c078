// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet login on top of [`ApiClient`].

use alloy::signers::{local::PrivateKeySigner, Signer};

use super::{ApiClient, ClientError};
use crate::models::{VerifyResponse, WalletAddress};

/// Login state of one wallet against one server.
#[derive(Debug, Clone)]
pub struct WalletSession {
    client: ApiClient,
    address: Option<WalletAddress>,
}

impl WalletSession {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            address: None,
        }
    }

    /// Request a nonce, sign the challenge with EIP-191 and exchange it for
    /// a session token, which is kept on the client.
    pub async fn login(&mut self, signer: &PrivateKeySigner) -> Result<VerifyResponse, ClientError> {
        let address = signer.address().to_checksum(None);
        let challenge = self.client.get_nonce(&address).await?;

        let signature = signer
            .sign_message(challenge.message.as_bytes())
            .await
            .map_err(|e| ClientError::Signing(e.to_string()))?;
        let signature = format!("0x{}", alloy::hex::encode(signature.as_bytes()));

        let session = self.client.verify(&address, &signature).await?;
        self.client.set_token(session.token.clone());
        self.address = Some(session.address.clone());
        tracing::debug!(address = %session.address, "Logged in");
        Ok(session)
    }

    pub fn logout(&mut self) {
        self.client.clear_token();
        self.address = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.token().is_some()
    }

    /// Lowercase address of the logged-in wallet.
    pub fn address(&self) -> Option<&WalletAddress> {
        self.address.as_ref()
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut ApiClient {
        &mut self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::state::test_state;
    use crate::storage::ContentRepository;

    /// Serve the router on an ephemeral port and return the API base URL.
    async fn serve(state: crate::state::AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    #[tokio::test]
    async fn login_stores_a_token_the_server_accepts() {
        let (state, _dir) = test_state();
        let base = serve(state.clone()).await;
        let signer = PrivateKeySigner::random();

        let mut session = WalletSession::new(ApiClient::new(&base).unwrap());
        assert!(!session.is_authenticated());

        let verified = session.login(&signer).await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(
            session.address().unwrap().as_str(),
            signer.address().to_string().to_lowercase()
        );
        assert_eq!(state.auth.verify_token(&verified.token).unwrap().address, verified.address.as_str());

        let content = ContentRepository::new(&state.db)
            .create(crate::models::NewContent {
                creator_address: verified.address.clone(),
                category: crate::models::Category::Music,
                title: "Song".into(),
                description: None,
                media_url: "/uploads/song.mp3".into(),
                thumbnail_url: None,
            })
            .unwrap();
        let liked = session.client().toggle_like(&content.id).await.unwrap();
        assert!(liked.liked);

        session.logout();
        assert!(!session.is_authenticated());
        let err = session.client().toggle_like(&content.id).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn api_errors_carry_the_server_message() {
        let (state, _dir) = test_state();
        let base = serve(state).await;
        let client = ApiClient::new(&base).unwrap();

        let err = client.get_content("missing").await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Content not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
