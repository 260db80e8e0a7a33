use cosmwasm_std::{coin, coins, to_json_binary, Addr, Binary, Coin, Uint128};
use counterfact_account_utils::{
    error::SignatureError,
    msg::{BatchItem, ExecuteMsg as AccountExecuteMsg, QueryMsg as AccountQueryMsg},
    policy::SignerAction,
    signer::SignerRole,
    testing::{assert_err_chain, AccountTestSuite, AccountTestSuiteBase, TestSigner, DENOM},
};
use counterfact_mock_target::msg::ExecuteMsg as TargetExecuteMsg;
use cw_multi_test::{error::AnyResult, App, AppResponse, ContractWrapper, Executor};
use cw_ownable::{Ownership, OwnershipError};
use getset::Getters;

use crate::{
    error::ContractError,
    msg::{ExecuteMsg, InstantiateMsg, QueryMsg},
    state::Config,
};

const ONE_THOUSAND: u128 = 1_000_000_000_u128;

#[derive(Getters)]
struct RelayerTestSuite {
    #[getset(get)]
    inner: AccountTestSuiteBase,
    #[getset(get)]
    relayer: Addr,
    #[getset(get)]
    target: Addr,
    #[getset(get)]
    bundler: Addr,
    #[getset(get)]
    alice: TestSigner,
    #[getset(get)]
    bob: TestSigner,
}

impl Default for RelayerTestSuite {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl RelayerTestSuite {
    pub fn new() -> Self {
        let account_code = ContractWrapper::new(
            counterfact_smart_account::contract::execute,
            counterfact_smart_account::contract::instantiate,
            counterfact_smart_account::contract::query,
        );
        let mut inner = AccountTestSuiteBase::new(Box::new(account_code));

        let relayer_code = ContractWrapper::new(
            crate::contract::execute,
            crate::contract::instantiate,
            crate::contract::query,
        );
        let relayer_code_id = inner.app_mut().store_code(Box::new(relayer_code));

        let init_msg = InstantiateMsg {
            owner: None,
            account_code_id: inner.account_code_id(),
            denom: DENOM.to_string(),
        };
        let relayer = inner.contract_init(relayer_code_id, "relayer", &init_msg, &[]);
        let target = inner.mock_target_init();
        let bundler = inner.api().addr_make("bundler");

        Self {
            inner,
            relayer,
            target,
            bundler,
            alice: TestSigner::new("alice"),
            bob: TestSigner::new("bob"),
        }
    }

    fn relay_as(
        &mut self,
        sender: Addr,
        target: &Addr,
        signature: Binary,
        payload: Binary,
        funds: &[Coin],
    ) -> AnyResult<AppResponse> {
        let relayer = self.relayer.clone();
        self.app_mut().execute_contract(
            sender,
            relayer,
            &ExecuteMsg::Relay {
                target: target.to_string(),
                signature,
                payload,
            },
            funds,
        )
    }

    /// Relays a batch signed by `signer` to the signer's own account.
    fn relay_batch(&mut self, signer: &str, items: Vec<BatchItem>) -> AnyResult<AppResponse> {
        let signer = TestSigner::new(signer);
        let account = self.address_for(&signer);
        let signature = signer.sign_target(&account);
        let payload = to_json_binary(&AccountExecuteMsg::batch(items)).unwrap();
        let bundler = self.bundler.clone();
        self.relay_as(bundler, &account, signature, payload, &[])
    }

    fn buy(&self, signer: &TestSigner, item: &str, reward: u128, nonce: u64) -> BatchItem {
        let data = to_json_binary(&TargetExecuteMsg::Buy {
            item: item.to_string(),
        })
        .unwrap();
        signer.sign_item(&self.target, reward, 0, data, nonce)
    }

    fn withdraw(&mut self, sender: Addr, amount: u128) -> AnyResult<AppResponse> {
        let relayer = self.relayer.clone();
        let recipient = self.api().addr_make("treasury");
        self.app_mut().execute_contract(
            sender,
            relayer,
            &ExecuteMsg::Withdraw {
                recipient: recipient.to_string(),
                amount: Uint128::new(amount),
            },
            &[],
        )
    }

    fn address_for(&self, signer: &TestSigner) -> Addr {
        self.query_wasm(
            &self.relayer,
            &QueryMsg::AddressFor {
                user: signer.address(),
            },
        )
    }

    fn deployed_for(&self, signer: &TestSigner) -> Option<Addr> {
        self.query_wasm(
            &self.relayer,
            &QueryMsg::DeployedFor {
                user: signer.address(),
            },
        )
    }

    fn refunds(&self) -> Coin {
        self.query_wasm(&self.relayer, &QueryMsg::Refunds {})
    }

    fn account_nonce(&self, account: &Addr) -> u64 {
        self.query_wasm(account, &AccountQueryMsg::Nonce {})
    }
}

impl AccountTestSuite for RelayerTestSuite {
    fn app(&self) -> &App {
        self.inner.app()
    }

    fn app_mut(&mut self) -> &mut App {
        self.inner.app_mut()
    }

    fn owner(&self) -> &Addr {
        self.inner.owner()
    }

    fn account_code_id(&self) -> u64 {
        self.inner.account_code_id()
    }

    fn mock_target_code_id(&self) -> u64 {
        self.inner.mock_target_code_id()
    }
}

#[test]
fn instantiate_defaults_owner_to_sender() {
    let suite = RelayerTestSuite::default();

    let ownership: Ownership<Addr> = suite.query_wasm(suite.relayer(), &QueryMsg::Ownership {});
    assert_eq!(ownership.owner, Some(suite.owner().clone()));

    let config: Config = suite.query_wasm(suite.relayer(), &QueryMsg::Config {});
    assert_eq!(
        config,
        Config {
            account_code_id: suite.account_code_id(),
            denom: DENOM.to_string(),
        }
    );
}

#[test]
fn addresses_are_deterministic_per_user() {
    let suite = RelayerTestSuite::default();

    let alice = suite.address_for(suite.alice());
    assert_eq!(alice, suite.address_for(suite.alice()));
    assert_ne!(alice, suite.address_for(suite.bob()));
    assert_eq!(suite.deployed_for(suite.alice()), None);
}

#[test]
fn address_for_rejects_malformed_user() {
    let suite = RelayerTestSuite::default();

    let res = suite.app().wrap().query_wasm_smart::<Addr>(
        suite.relayer(),
        &QueryMsg::AddressFor {
            user: "0x1234".to_string(),
        },
    );
    assert!(res.is_err());
}

#[test]
fn relay_deploys_funded_counterfactual_account() {
    let mut suite = RelayerTestSuite::default();

    // Funds arrive before the account exists
    let account = suite.address_for(suite.alice());
    suite.init_balance(&account, coins(ONE_THOUSAND, DENOM));

    let item = suite.buy(suite.alice(), "apple", 10, 0);
    suite.relay_batch("alice", vec![item]).unwrap();

    assert_eq!(suite.deployed_for(suite.alice()), Some(account.clone()));
    assert_eq!(suite.address_for(suite.alice()), account);
    let target = suite.target().clone();
    assert!(suite.mock_target_bought(&target, "apple"));

    let role: SignerRole = suite.query_wasm(
        &account,
        &AccountQueryMsg::RoleOf {
            address: suite.alice().address(),
        },
    );
    assert_eq!(role, SignerRole::Owner);
    assert_eq!(suite.account_nonce(&account), 1);

    // Rewards are paid to the relayer contract, not the bundler
    assert_eq!(suite.refunds(), coin(10, DENOM));
    let bundler = suite.bundler().clone();
    suite.assert_balance(&bundler, coin(0, DENOM));
    suite.assert_balance(&account, coin(ONE_THOUSAND - 10, DENOM));
}

#[test]
fn first_relay_configures_new_account() {
    let mut suite = RelayerTestSuite::default();
    let account = suite.address_for(suite.alice());
    let bob = suite.bob().addr();

    // Second item targets the account before it exists
    let guardian = to_json_binary(&suite.alice().signer_action(SignerAction::AddGuardian, &bob))
        .unwrap();
    let items = vec![
        suite.buy(suite.alice(), "apple", 0, 0),
        suite.alice().sign_item(&account, 0, 0, guardian, 0),
    ];
    suite.relay_batch("alice", items).unwrap();

    let role = |address: String| -> SignerRole {
        suite
            .query_wasm(&account, &AccountQueryMsg::RoleOf { address })
    };
    assert_eq!(role(suite.alice().address()), SignerRole::Owner);
    assert_eq!(role(bob.to_string()), SignerRole::Guardian);
    let target = suite.target().clone();
    assert!(suite.mock_target_bought(&target, "apple"));
}

#[test]
fn second_relay_reuses_account() {
    let mut suite = RelayerTestSuite::default();
    let account = suite.address_for(suite.alice());
    suite.init_balance(&account, coins(ONE_THOUSAND, DENOM));

    let item = suite.buy(suite.alice(), "apple", 5, 0);
    let res = suite.relay_batch("alice", vec![item]).unwrap();
    assert!(res
        .events
        .iter()
        .any(|e| e.attributes.iter().any(|a| a.key == "deployed")));

    let item = suite.buy(suite.alice(), "pear", 5, 1);
    let res = suite.relay_batch("alice", vec![item]).unwrap();
    assert!(!res
        .events
        .iter()
        .any(|e| e.attributes.iter().any(|a| a.key == "deployed")));

    assert_eq!(suite.account_nonce(&account), 2);
    assert_eq!(suite.refunds(), coin(10, DENOM));
}

#[test]
fn users_get_separate_accounts() {
    let mut suite = RelayerTestSuite::default();

    let item = suite.buy(suite.alice(), "apple", 0, 0);
    suite.relay_batch("alice", vec![item]).unwrap();
    let item = suite.buy(suite.bob(), "pear", 0, 0);
    suite.relay_batch("bob", vec![item]).unwrap();

    let alice = suite.deployed_for(suite.alice()).unwrap();
    let bob = suite.deployed_for(suite.bob()).unwrap();
    assert_ne!(alice, bob);

    // bob holds no role on alice's account
    let role: SignerRole = suite.query_wasm(
        &alice,
        &AccountQueryMsg::RoleOf {
            address: suite.bob().address(),
        },
    );
    assert_eq!(role, SignerRole::None);
}

#[test]
fn failed_forward_reverts_deployment() {
    let mut suite = RelayerTestSuite::default();
    let account = suite.address_for(suite.alice());

    let fail = to_json_binary(&TargetExecuteMsg::Fail {}).unwrap();
    let target = suite.target().clone();
    let item = suite.alice().sign_item(&target, 0, 0, fail, 0);
    let err = suite.relay_batch("alice", vec![item]).unwrap_err();
    assert_err_chain(err, counterfact_mock_target::contract::ContractError::Forced {});

    assert_eq!(suite.deployed_for(suite.alice()), None);
    assert!(suite
        .app()
        .wrap()
        .query_wasm_contract_info(account.as_str())
        .is_err());
}

#[test]
fn relay_rejects_invalid_signature() {
    let mut suite = RelayerTestSuite::default();
    let account = suite.address_for(suite.alice());
    let bundler = suite.bundler().clone();

    let err = suite
        .relay_as(
            bundler,
            &account,
            Binary::from(vec![7u8; 64]),
            Binary::default(),
            &[],
        )
        .unwrap_err();
    assert_err_chain(
        err,
        ContractError::InvalidSignature(SignatureError::InvalidLength(64)),
    );
}

#[test]
fn relay_forwards_attached_funds() {
    let mut suite = RelayerTestSuite::default();
    let bundler = suite.bundler().clone();
    suite.init_balance(&bundler, coins(500, DENOM));

    let account = suite.address_for(suite.alice());
    let signature = suite.alice().sign_target(&account);
    let item = suite.buy(suite.alice(), "apple", 0, 0);
    let payload = to_json_binary(&AccountExecuteMsg::batch(vec![item])).unwrap();

    suite
        .relay_as(
            bundler.clone(),
            &account,
            signature,
            payload,
            &coins(500, DENOM),
        )
        .unwrap();

    suite.assert_balance(&account, coin(500, DENOM));
    suite.assert_balance(&bundler, coin(0, DENOM));
    let relayer = suite.relayer().clone();
    suite.assert_balance(&relayer, coin(0, DENOM));
}

#[test]
fn owner_withdraws_refunds() {
    let mut suite = RelayerTestSuite::default();
    let account = suite.address_for(suite.alice());
    suite.init_balance(&account, coins(ONE_THOUSAND, DENOM));

    let item = suite.buy(suite.alice(), "apple", 100, 0);
    suite.relay_batch("alice", vec![item]).unwrap();

    let owner = suite.owner().clone();
    let res = suite.withdraw(owner, 60).unwrap();
    assert!(res.events.iter().any(|e| e.ty == "wasm-withdraw"));

    let treasury = suite.api().addr_make("treasury");
    suite.assert_balance(&treasury, coin(60, DENOM));
    assert_eq!(suite.refunds(), coin(40, DENOM));
}

#[test]
fn withdraw_is_owner_only() {
    let mut suite = RelayerTestSuite::default();
    let relayer = suite.relayer().clone();
    suite.init_balance(&relayer, coins(100, DENOM));

    let bundler = suite.bundler().clone();
    let err = suite.withdraw(bundler, 10).unwrap_err();
    assert_err_chain(err, ContractError::Ownership(OwnershipError::NotOwner));
    assert_eq!(suite.refunds(), coin(100, DENOM));
}

#[test]
fn withdraw_rejects_bad_amounts() {
    let mut suite = RelayerTestSuite::default();
    let relayer = suite.relayer().clone();
    suite.init_balance(&relayer, coins(100, DENOM));
    let owner = suite.owner().clone();

    let err = suite.withdraw(owner.clone(), 0).unwrap_err();
    assert_err_chain(err, ContractError::ZeroAmount);

    let err = suite.withdraw(owner, 101).unwrap_err();
    assert_err_chain(
        err,
        ContractError::InsufficientRefunds {
            requested: Uint128::new(101),
            available: Uint128::new(100),
        },
    );
    assert_eq!(suite.refunds(), coin(100, DENOM));
}

#[test]
fn ownership_can_be_transferred() {
    let mut suite = RelayerTestSuite::default();
    let relayer = suite.relayer().clone();
    let owner = suite.owner().clone();
    let new_owner = suite.api().addr_make("new_owner");

    suite
        .app_mut()
        .execute_contract(
            owner,
            relayer.clone(),
            &ExecuteMsg::UpdateOwnership(cw_ownable::Action::TransferOwnership {
                new_owner: new_owner.to_string(),
                expiry: None,
            }),
            &[],
        )
        .unwrap();
    suite
        .app_mut()
        .execute_contract(
            new_owner.clone(),
            relayer.clone(),
            &ExecuteMsg::UpdateOwnership(cw_ownable::Action::AcceptOwnership {}),
            &[],
        )
        .unwrap();

    let ownership: Ownership<Addr> = suite.query_wasm(&relayer, &QueryMsg::Ownership {});
    assert_eq!(ownership.owner, Some(new_owner));
}
