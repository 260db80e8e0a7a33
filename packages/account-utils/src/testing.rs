use cosmwasm_std::{testing::MockApi, Addr, Binary, Coin, Empty, Uint128};
use cw_multi_test::{
    error::{AnyError, AnyResult},
    next_block, App, AppResponse, Contract, ContractWrapper, Executor,
};
use k256::{ecdsa::SigningKey, elliptic_curve::sec1::ToEncodedPoint, PublicKey};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt::Debug;

use crate::{
    msg::{BatchItem, ExecuteMsg},
    policy::SignerAction,
    signature::{action_hash, execution_hash, target_hash, to_signed_message_hash},
    signer::SignerAddr,
};

pub const DENOM: &str = "untrn";

/// Off-band key holder used to produce real secp256k1 signatures in tests.
pub struct TestSigner {
    key: SigningKey,
    addr: SignerAddr,
}

impl TestSigner {
    /// Deterministic key derived from `name`.
    pub fn new(name: &str) -> Self {
        let seed = Sha256::digest(name.as_bytes());
        let key = SigningKey::from_slice(&seed).expect("valid secp256k1 scalar");
        let point = PublicKey::from(key.verifying_key()).to_encoded_point(false);
        let addr = SignerAddr::from_uncompressed_pubkey(point.as_bytes())
            .expect("uncompressed public key");
        Self { key, addr }
    }

    pub fn addr(&self) -> SignerAddr {
        self.addr
    }

    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Signs the prefixed form of `hash`, returning `r || s || v` with v in {27, 28}.
    pub fn sign_hash(&self, hash: &[u8; 32]) -> Binary {
        let digest = to_signed_message_hash(hash);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .expect("signing a prehash");
        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(recovery_id.to_byte() + 27);
        Binary::from(bytes)
    }

    pub fn sign_item(
        &self,
        target: &Addr,
        reward: u128,
        value: u128,
        data: Binary,
        nonce: u64,
    ) -> BatchItem {
        let reward = Uint128::new(reward);
        let value = Uint128::new(value);
        let hash = execution_hash(&data, reward, value, target.as_str(), nonce);
        BatchItem {
            target: target.to_string(),
            reward,
            value,
            data,
            signature: self.sign_hash(&hash),
        }
    }

    /// Self-delegated signer management message authorized by this signer.
    pub fn signer_action(&self, action: SignerAction, subject: &SignerAddr) -> ExecuteMsg {
        let hash = action_hash(subject);
        ExecuteMsg::signer_action(
            action,
            subject.to_string(),
            Binary::from(hash.to_vec()),
            self.sign_hash(&hash),
        )
    }

    pub fn sign_target(&self, target: &Addr) -> Binary {
        self.sign_hash(&target_hash(target.as_str()))
    }
}

/// Asserts that `expected` shows up somewhere in the error chain. Contract
/// errors of nested calls are wrapped in context by the router.
pub fn assert_err_chain(err: AnyError, expected: impl ToString) {
    let expected = expected.to_string();
    assert!(
        err.chain().any(|cause| cause.to_string() == expected),
        "expected `{expected}` in error chain: {err:?}"
    );
}

pub struct AccountTestSuiteBase {
    app: App,
    owner: Addr,
    account_code_id: u64,
    mock_target_code_id: u64,
}

#[allow(dead_code)]
impl AccountTestSuiteBase {
    pub fn new(account_contract: Box<dyn Contract<Empty>>) -> Self {
        let mut app = App::default();

        let owner = app.api().addr_make("owner");

        let account_code_id = app.store_code(account_contract);

        let mock_target_code = ContractWrapper::new(
            counterfact_mock_target::contract::execute,
            counterfact_mock_target::contract::instantiate,
            counterfact_mock_target::contract::query,
        );

        let mock_target_code_id = app.store_code(Box::new(mock_target_code));

        Self {
            app,
            owner,
            account_code_id,
            mock_target_code_id,
        }
    }
}

pub trait AccountTestSuite {
    fn app(&self) -> &App;
    fn app_mut(&mut self) -> &mut App;
    fn owner(&self) -> &Addr;
    fn account_code_id(&self) -> u64;
    fn mock_target_code_id(&self) -> u64;

    fn api(&self) -> &MockApi {
        self.app().api()
    }

    fn contract_init<T: Serialize>(
        &mut self,
        code_id: u64,
        label: &str,
        init_msg: &T,
        funds: &[Coin],
    ) -> Addr {
        let owner = self.owner().clone();
        self.app_mut()
            .instantiate_contract(
                code_id,
                owner.clone(),
                &init_msg,
                funds,
                label,
                Some(owner.to_string()),
            )
            .unwrap()
    }

    fn contract_execute<T: Serialize + Debug>(
        &mut self,
        addr: Addr,
        msg: &T,
    ) -> AnyResult<AppResponse> {
        let sender = self.owner().clone();
        self.app_mut().execute_contract(sender, addr, &msg, &[])
    }

    fn next_block(&mut self) {
        self.app_mut().update_block(next_block);
    }

    fn query_balance(&self, addr: &Addr, denom: &str) -> Coin {
        self.app().wrap().query_balance(addr, denom).unwrap()
    }

    fn assert_balance(&self, addr: &Addr, coin: Coin) {
        let bal = self.query_balance(addr, &coin.denom);
        assert_eq!(bal, coin);
    }

    fn init_balance(&mut self, addr: &Addr, amounts: Vec<Coin>) {
        self.app_mut().init_modules(|router, _, store| {
            router.bank.init_balance(store, addr, amounts).unwrap();
        });
    }

    fn query_wasm<T, U>(&self, addr: &Addr, query: &T) -> U
    where
        T: Serialize,
        U: serde::de::DeserializeOwned,
    {
        self.app()
            .wrap()
            .query_wasm_smart::<U>(addr, &query)
            .unwrap()
    }

    fn send_tokens(&mut self, sender: &Addr, recipient: &Addr, amount: &[Coin]) -> AppResponse {
        self.app_mut()
            .send_tokens(sender.clone(), recipient.clone(), amount)
            .unwrap()
    }

    fn mock_target_init(&mut self) -> Addr {
        let code_id = self.mock_target_code_id();
        self.contract_init(
            code_id,
            "mock_target",
            &counterfact_mock_target::msg::InstantiateMsg {},
            &[],
        )
    }

    fn mock_target_bought(&self, target: &Addr, item: &str) -> bool {
        self.query_wasm(
            target,
            &counterfact_mock_target::msg::QueryMsg::Bought {
                item: item.to_string(),
            },
        )
    }
}

#[allow(dead_code)]
impl AccountTestSuite for AccountTestSuiteBase {
    fn app(&self) -> &App {
        &self.app
    }

    fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    fn owner(&self) -> &Addr {
        &self.owner
    }

    fn account_code_id(&self) -> u64 {
        self.account_code_id
    }

    fn mock_target_code_id(&self) -> u64 {
        self.mock_target_code_id
    }
}
