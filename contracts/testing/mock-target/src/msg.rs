use cosmwasm_schema::{cw_serde, QueryResponses};

#[cw_serde]
pub struct InstantiateMsg {}

#[cw_serde]
pub enum ExecuteMsg {
    Buy { item: String },
    // Always errors, used to exercise batch rollback
    Fail {},
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(bool)]
    Bought { item: String },
    #[returns(Option<PurchaseResponse>)]
    Purchase { item: String },
}

#[cw_serde]
pub struct PurchaseResponse {
    pub buyer: String,
    pub paid: cosmwasm_std::Uint128,
}
