//! # Holder Flows
//!
//! Transfers, burns, staking and farming through `AccountContract` and
//! `StakingPoolContract` against the simulated ledger.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use eartton_protocol::prelude::*;

    use crate::ledger_sim::SimulatedLedger;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn owner() -> Address {
        Address::new(0, Hash::new([0xa1; 32]))
    }

    fn alice() -> Address {
        Address::new(0, Hash::new([0xa2; 32]))
    }

    fn bob() -> Address {
        Address::new(0, Hash::new([0xb0; 32]))
    }

    fn tokens(n: u64) -> Amount {
        Amount::from_whole_tokens(n)
    }

    /// Deploys the issuer and mints 1000 tokens to alice.
    async fn setup() -> (Arc<SimulatedLedger>, IssuerContract, AccountContract) {
        crate::init_tracing();
        let ledger = SimulatedLedger::new(0);
        let config = IssuerConfig::new(owner(), Cell::empty(), ledger.account_code());
        let issuer =
            IssuerContract::create_from_config(&config, ledger.issuer_code(), &ledger.protocol())
                .unwrap();
        let admin = ledger.wallet(owner());
        issuer.send_deploy(&admin).await.unwrap();
        issuer.send_mint(&admin, alice(), tokens(1000), 0).await.unwrap();

        let account = AccountContract::create_from_config(
            alice(),
            issuer.address(),
            ledger.account_code(),
            &ledger.protocol(),
        )
        .unwrap();
        (ledger, issuer, account)
    }

    async fn balance(ledger: &Arc<SimulatedLedger>, issuer: &IssuerContract, holder: Address) -> Amount {
        let client = ledger.query_client();
        let wallet = issuer.get_wallet_address(&client, holder).await.unwrap();
        AccountContract::from_address(wallet)
            .get_wallet_data(&client)
            .await
            .unwrap()
            .balance
    }

    // =============================================================================
    // TRANSFER / BURN
    // =============================================================================

    #[tokio::test]
    async fn test_transfer_applies_burn_rate() {
        let (ledger, issuer, account) = setup().await;
        account
            .send_transfer(
                &ledger.wallet(alice()),
                TransferRequest::new(bob(), tokens(100)),
            )
            .await
            .unwrap();

        assert_eq!(balance(&ledger, &issuer, alice()).await, tokens(900));
        assert_eq!(balance(&ledger, &issuer, bob()).await, tokens(99));
        assert_eq!(
            ledger.issuer_state(issuer.address()).unwrap().total_supply,
            tokens(999)
        );
    }

    #[tokio::test]
    async fn test_transfer_over_balance_rejected() {
        let (ledger, _, account) = setup().await;
        let result = account
            .send_transfer(
                &ledger.wallet(alice()),
                TransferRequest::new(bob(), tokens(1001)),
            )
            .await;
        assert!(matches!(
            result,
            Err(ContractError::Transport(TransportError::Rejected(_)))
        ));
    }

    #[tokio::test]
    async fn test_blacklisted_holder_cannot_transfer() {
        let (ledger, issuer, account) = setup().await;
        issuer
            .send_add_to_blacklist(&ledger.wallet(owner()), alice(), 0)
            .await
            .unwrap();
        assert!(account
            .send_transfer(
                &ledger.wallet(alice()),
                TransferRequest::new(bob(), tokens(1)),
            )
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_only_holder_operates_account() {
        let (ledger, _, account) = setup().await;
        assert!(account
            .send_burn(&ledger.wallet(bob()), tokens(1), 0)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_burn_reduces_supply() {
        let (ledger, issuer, account) = setup().await;
        account
            .send_burn(&ledger.wallet(alice()), tokens(250), 0)
            .await
            .unwrap();
        assert_eq!(balance(&ledger, &issuer, alice()).await, tokens(750));
        assert_eq!(
            ledger.issuer_state(issuer.address()).unwrap().total_supply,
            tokens(750)
        );
    }

    // =============================================================================
    // STAKING
    // =============================================================================

    #[tokio::test]
    async fn test_stake_lock_and_release() {
        let (ledger, _, account) = setup().await;
        let client = ledger.query_client();
        let wallet = ledger.wallet(alice());

        account.send_stake(&wallet, tokens(100), 3600, 0).await.unwrap();
        let staking = account.get_staking_data(&client).await.unwrap();
        assert_eq!(staking.locked_balance, tokens(100));
        assert!(staking.unlock_time > 0);

        assert!(account.send_unstake(&wallet, 0).await.is_err());
        ledger.advance(3600);
        account.send_unstake(&wallet, 0).await.unwrap();

        let data = account.get_wallet_data(&client).await.unwrap();
        assert_eq!(data.balance, tokens(1000));
        assert_eq!(data.locked_balance, Amount::ZERO);
    }

    // =============================================================================
    // FARMING
    // =============================================================================

    #[tokio::test]
    async fn test_farming_deposit_withdraw_claim() {
        let (ledger, issuer, account) = setup().await;
        let client = ledger.query_client();
        let wallet = ledger.wallet(alice());

        let pool = StakingPoolContract::create_from_config(
            issuer.address(),
            100,
            ledger.pool_code(),
            &ledger.protocol(),
        )
        .unwrap();
        pool.send_deploy(&ledger.wallet(owner())).await.unwrap();

        account.send_deposit(&wallet, tokens(500), 0).await.unwrap();
        assert_eq!(
            pool.get_pool_data(&client).await.unwrap(),
            PoolData {
                total_deposited: tokens(500),
                reward_rate: 100,
            }
        );

        account.send_withdraw(&wallet, tokens(200), 0).await.unwrap();
        let user = pool.get_user_data(&client, alice()).await.unwrap();
        assert_eq!(user.deposited, tokens(300));
        assert_eq!(user.rewards, tokens(3));

        account.send_claim(&wallet, 0).await.unwrap();
        assert_eq!(balance(&ledger, &issuer, alice()).await, tokens(703));
    }

    #[tokio::test]
    async fn test_withdraw_over_deposit_changes_nothing() {
        let (ledger, issuer, account) = setup().await;
        let client = ledger.query_client();
        let wallet = ledger.wallet(alice());

        let pool = StakingPoolContract::create_from_config(
            issuer.address(),
            100,
            ledger.pool_code(),
            &ledger.protocol(),
        )
        .unwrap();
        pool.send_deploy(&ledger.wallet(owner())).await.unwrap();
        account.send_deposit(&wallet, tokens(300), 0).await.unwrap();

        let pool_before = pool.get_pool_data(&client).await.unwrap();
        let user_before = pool.get_user_data(&client, alice()).await.unwrap();
        let balance_before = balance(&ledger, &issuer, alice()).await;

        assert!(account
            .send_withdraw(&wallet, tokens(301), 0)
            .await
            .is_err());

        assert_eq!(pool.get_pool_data(&client).await.unwrap(), pool_before);
        assert_eq!(pool.get_user_data(&client, alice()).await.unwrap(), user_before);
        assert_eq!(balance(&ledger, &issuer, alice()).await, balance_before);

        // Bob never deposited.
        let bob_account = AccountContract::create_from_config(
            bob(),
            issuer.address(),
            ledger.account_code(),
            &ledger.protocol(),
        )
        .unwrap();
        assert!(bob_account
            .send_withdraw(&ledger.wallet(bob()), tokens(1), 0)
            .await
            .is_err());
        assert_eq!(pool.get_pool_data(&client).await.unwrap(), pool_before);
    }

    #[tokio::test]
    async fn test_only_issuer_owner_sets_reward_rate() {
        let (ledger, issuer, _) = setup().await;
        let client = ledger.query_client();
        let pool = StakingPoolContract::create_from_config(
            issuer.address(),
            100,
            ledger.pool_code(),
            &ledger.protocol(),
        )
        .unwrap();
        pool.send_deploy(&ledger.wallet(owner())).await.unwrap();

        assert!(pool
            .send_update_reward_rate(&ledger.wallet(alice()), 500, 0)
            .await
            .is_err());
        pool.send_update_reward_rate(&ledger.wallet(owner()), 500, 0)
            .await
            .unwrap();
        assert_eq!(pool.get_pool_data(&client).await.unwrap().reward_rate, 500);
    }
}
