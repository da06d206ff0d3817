//! # Issuer Flows
//!
//! Deployment, minting and administration of the issuer program, end to
//! end through `IssuerContract` and the simulated ledger.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use eartton_protocol::prelude::*;

    use crate::ledger_sim::SimulatedLedger;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const METADATA_URL: &str = "https://example.com/eartton-metadata.json";

    fn owner() -> Address {
        Address::new(0, Hash::new([0xa1; 32]))
    }

    fn stranger() -> Address {
        Address::new(0, Hash::new([0x5e; 32]))
    }

    fn issuer_config(ledger: &SimulatedLedger) -> IssuerConfig {
        let content = offchain_content(METADATA_URL).unwrap();
        IssuerConfig::new(owner(), content, ledger.account_code())
    }

    async fn deployed_issuer(ledger: &Arc<SimulatedLedger>) -> IssuerContract {
        crate::init_tracing();
        let issuer = IssuerContract::create_from_config(
            &issuer_config(ledger),
            ledger.issuer_code(),
            &ledger.protocol(),
        )
        .unwrap();
        issuer.send_deploy(&ledger.wallet(owner())).await.unwrap();
        issuer
    }

    // =============================================================================
    // DEPLOYMENT
    // =============================================================================

    #[tokio::test]
    async fn test_deploy_then_query_params() {
        let ledger = SimulatedLedger::new(0);
        let client = ledger.query_client();
        let issuer = deployed_issuer(&ledger).await;

        assert!(ledger.is_deployed(issuer.address()));
        let params = issuer.get_eartton_params(&client).await.unwrap();
        assert_eq!(params.burn_rate, 100);
        assert_eq!(params.staking_apr, 1000);
        assert_eq!(params.farming_pool_size, Amount::from_whole_tokens(1_000_000));
        assert!(!params.paused);
    }

    #[test]
    fn test_deploy_payload_decodes_to_initial_state() {
        let ledger = SimulatedLedger::new(0);
        let config = issuer_config(&ledger);
        let issuer =
            IssuerContract::create_from_config(&config, ledger.issuer_code(), &ledger.protocol())
                .unwrap();

        let payload = issuer.instance().deploy_payload().unwrap();
        assert_eq!(payload.address, derive_address(0, &payload.code, &payload.data));

        let state = IssuerState::from_cell(&payload.data).unwrap();
        assert_eq!(state, config.initial_state());
        assert_eq!(state.total_supply, Amount::ZERO);
        assert_eq!(parse_offchain_content(&state.content).unwrap(), METADATA_URL);
    }

    #[tokio::test]
    async fn test_redeploy_is_idempotent() {
        let ledger = SimulatedLedger::new(0);
        let issuer = deployed_issuer(&ledger).await;
        issuer.send_deploy(&ledger.wallet(owner())).await.unwrap();
        assert_eq!(
            ledger.issuer_state(issuer.address()).unwrap().total_supply,
            Amount::ZERO
        );
    }

    // =============================================================================
    // MINTING
    // =============================================================================

    #[tokio::test]
    async fn test_mint_credits_holder_account() {
        let ledger = SimulatedLedger::new(0);
        let client = ledger.query_client();
        let issuer = deployed_issuer(&ledger).await;

        issuer
            .send_mint(
                &ledger.wallet(owner()),
                owner(),
                Amount::from_whole_tokens(1000),
                0,
            )
            .await
            .unwrap();

        let wallet = issuer.get_wallet_address(&client, owner()).await.unwrap();
        let expected = AccountContract::create_from_config(
            owner(),
            issuer.address(),
            ledger.account_code(),
            &ledger.protocol(),
        )
        .unwrap();
        assert_eq!(wallet, expected.address());

        let data = AccountContract::from_address(wallet)
            .get_wallet_data(&client)
            .await
            .unwrap();
        assert_eq!(data.balance, Amount::from_whole_tokens(1000));
        assert_eq!(data.owner, owner());
        assert_eq!(data.issuer, issuer.address());
        assert_eq!(
            ledger.issuer_state(issuer.address()).unwrap().total_supply,
            Amount::from_whole_tokens(1000)
        );
    }

    #[tokio::test]
    async fn test_only_owner_mints() {
        let ledger = SimulatedLedger::new(0);
        let issuer = deployed_issuer(&ledger).await;

        let result = issuer
            .send_mint(&ledger.wallet(stranger()), stranger(), Amount::from_whole_tokens(1), 0)
            .await;
        assert!(matches!(
            result,
            Err(ContractError::Transport(TransportError::Rejected(_)))
        ));
    }

    #[tokio::test]
    async fn test_pause_blocks_mint_until_unpaused() {
        let ledger = SimulatedLedger::new(0);
        let client = ledger.query_client();
        let wallet = ledger.wallet(owner());
        let issuer = deployed_issuer(&ledger).await;

        issuer.send_pause(&wallet, 1).await.unwrap();
        assert!(issuer.get_eartton_params(&client).await.unwrap().paused);
        assert!(issuer
            .send_mint(&wallet, owner(), Amount::from_whole_tokens(1), 2)
            .await
            .is_err());

        issuer.send_unpause(&wallet, 3).await.unwrap();
        issuer
            .send_mint(&wallet, owner(), Amount::from_whole_tokens(1), 4)
            .await
            .unwrap();
    }

    // =============================================================================
    // ADMINISTRATION
    // =============================================================================

    #[tokio::test]
    async fn test_blacklist_round_trip() {
        let ledger = SimulatedLedger::new(0);
        let client = ledger.query_client();
        let wallet = ledger.wallet(owner());
        let issuer = deployed_issuer(&ledger).await;

        assert!(!issuer.is_address_blacklisted(&client, stranger()).await.unwrap());
        issuer.send_add_to_blacklist(&wallet, stranger(), 0).await.unwrap();
        assert!(issuer.is_address_blacklisted(&client, stranger()).await.unwrap());
        issuer
            .send_remove_from_blacklist(&wallet, stranger(), 0)
            .await
            .unwrap();
        assert!(!issuer.is_address_blacklisted(&client, stranger()).await.unwrap());
    }

    #[tokio::test]
    async fn test_parameter_updates() {
        let ledger = SimulatedLedger::new(0);
        let client = ledger.query_client();
        let wallet = ledger.wallet(owner());
        let issuer = deployed_issuer(&ledger).await;

        issuer.send_update_staking_apr(&wallet, 1500, 0).await.unwrap();
        issuer.send_update_burn_rate(&wallet, 250, 0).await.unwrap();

        let params = issuer.get_eartton_params(&client).await.unwrap();
        assert_eq!(params.staking_apr, 1500);
        assert_eq!(params.burn_rate, 250);
    }

    #[tokio::test]
    async fn test_unknown_get_method_fails() {
        let ledger = SimulatedLedger::new(0);
        let client = ledger.query_client();
        let issuer = deployed_issuer(&ledger).await;

        let err = client
            .invoke(issuer.address(), "get_jetton_data", Vec::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ContractError::GetMethodFailed {
                method: "get_jetton_data".into(),
                exit_code: crate::ledger_sim::EXIT_METHOD_NOT_FOUND,
            }
        );
    }
}
