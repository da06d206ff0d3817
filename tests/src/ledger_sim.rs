//! # Simulated Ledger
//!
//! In-process stand-in for the ledger: it accepts the messages the proxies
//! send, applies the token rules of the three programs, and answers their
//! get-methods. Used to run the client end to end without a network.
//!
//! The rules here are a simplified model of the on-ledger programs:
//!
//! | Program | Rules |
//! |---------|-------|
//! | Issuer | owner-only admin ops, mint blocked while paused |
//! | Account | owner-only ops, transfer burns `burn_rate` bps, blacklist and pause block transfers |
//! | StakingPool | deposits tracked per holder, reward = deposit × rate / 10000 per claim |

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use eartton_protocol::contracts::AccountContract;
use eartton_protocol::domain::services::state_init_address;
use eartton_protocol::prelude::*;

/// Basis-point denominator.
const BPS: u128 = 10_000;

/// Exit code returned for a method the program does not have.
pub const EXIT_METHOD_NOT_FOUND: i32 = 11;

/// Builds a stand-in code cell for a program kind.
#[must_use]
pub fn program_code(tag: u32) -> Cell {
    let mut b = CellBuilder::new();
    b.append_uint(u128::from(tag), 32)
        .expect("32 bits fit an empty cell");
    b.finalize()
}

// =============================================================================
// LEDGER STATE
// =============================================================================

#[derive(Clone, Debug)]
enum Program {
    Issuer(IssuerState),
    Account(AccountState),
    Pool(PoolState),
}

#[derive(Clone, Copy, Debug, Default)]
struct Position {
    deposited: u128,
    last_claim_time: u32,
}

#[derive(Default)]
struct LedgerState {
    programs: HashMap<Address, Program>,
    blacklist: HashSet<Address>,
    positions: HashMap<(Address, Address), Position>,
    pool: Option<Address>,
}

/// Simulated ledger shared by any number of wallets.
pub struct SimulatedLedger {
    workchain: i8,
    issuer_code: Cell,
    account_code: Cell,
    pool_code: Cell,
    now: RwLock<u32>,
    state: RwLock<LedgerState>,
}

fn rejected(reason: impl Into<String>) -> TransportError {
    TransportError::Rejected(reason.into())
}

fn amount(nano: u128) -> Result<Amount, TransportError> {
    Amount::new(nano).map_err(|e| rejected(e.to_string()))
}

fn debit(balance: Amount, by: Amount) -> Result<Amount, TransportError> {
    balance
        .nano()
        .checked_sub(by.nano())
        .ok_or_else(|| rejected("insufficient balance"))
        .and_then(amount)
}

fn credit(balance: Amount, by: Amount) -> Result<Amount, TransportError> {
    amount(balance.nano() + by.nano())
}

impl SimulatedLedger {
    /// Ledger on `workchain` with distinct stand-in codes per program.
    #[must_use]
    pub fn new(workchain: i8) -> Arc<Self> {
        Arc::new(Self {
            workchain,
            issuer_code: program_code(0x1551_0e40),
            account_code: program_code(0xacc0_0471),
            pool_code: program_code(0x9001_9001),
            now: RwLock::new(1_700_000_000),
            state: RwLock::new(LedgerState::default()),
        })
    }

    /// Code the ledger recognises as the issuer program.
    #[must_use]
    pub fn issuer_code(&self) -> Cell {
        self.issuer_code.clone()
    }

    /// Code the ledger recognises as the account program.
    #[must_use]
    pub fn account_code(&self) -> Cell {
        self.account_code.clone()
    }

    /// Code the ledger recognises as the staking pool program.
    #[must_use]
    pub fn pool_code(&self) -> Cell {
        self.pool_code.clone()
    }

    /// Protocol settings deploying to this ledger's workchain.
    #[must_use]
    pub fn protocol(&self) -> ProtocolConfig {
        ProtocolConfig {
            workchain: self.workchain,
            ..ProtocolConfig::default()
        }
    }

    /// Moves the ledger clock forward.
    pub fn advance(&self, seconds: u32) {
        *self.now.write() += seconds;
    }

    /// Wallet sending from `address`.
    #[must_use]
    pub fn wallet(self: &Arc<Self>, address: Address) -> SimWallet {
        SimWallet {
            ledger: Arc::clone(self),
            address,
        }
    }

    /// Query client over this ledger.
    #[must_use]
    pub fn query_client(self: &Arc<Self>) -> QueryClient {
        QueryClient::new(Arc::clone(self) as Arc<dyn GetMethodExecutor>)
    }

    /// Current issuer data at `address`.
    #[must_use]
    pub fn issuer_state(&self, address: Address) -> Option<IssuerState> {
        match self.state.read().programs.get(&address) {
            Some(Program::Issuer(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Whether any program lives at `address`.
    #[must_use]
    pub fn is_deployed(&self, address: Address) -> bool {
        self.state.read().programs.contains_key(&address)
    }

    fn account_address(&self, owner: Address, issuer: Address) -> Result<Address, TransportError> {
        AccountContract::create_from_config(owner, issuer, self.account_code.clone(), &self.protocol())
            .map(|c| c.address())
            .map_err(|e| rejected(e.to_string()))
    }

    // -------------------------------------------------------------------------
    // Message delivery
    // -------------------------------------------------------------------------

    fn deliver(&self, from: Address, message: OutboundMessage) -> Result<(), TransportError> {
        let mut state = self.state.write();
        let to = message.destination;

        if let Some(init) = &message.state_init {
            if state_init_address(self.workchain, init) != to {
                return Err(rejected("state-init does not hash to destination"));
            }
            if !state.programs.contains_key(&to) {
                let decoded = if init.code == self.issuer_code {
                    IssuerState::from_cell(&init.data).map(Program::Issuer)
                } else if init.code == self.pool_code {
                    PoolState::from_cell(&init.data).map(Program::Pool)
                } else {
                    return Err(rejected("unknown program code"));
                };
                let program = decoded.map_err(|e| rejected(e.to_string()))?;
                if matches!(program, Program::Pool(_)) {
                    state.pool = Some(to);
                }
                state.programs.insert(to, program);
            }
        }

        let op = Operation::decode(&message.body).map_err(|e| rejected(e.to_string()))?;
        let program = state
            .programs
            .get(&to)
            .cloned()
            .ok_or_else(|| rejected("destination not deployed"))?;

        match program {
            Program::Issuer(issuer) => self.apply_issuer(&mut state, from, to, issuer, op),
            Program::Account(account) => self.apply_account(&mut state, from, to, account, op),
            Program::Pool(pool) => Self::apply_pool(&mut state, from, to, pool, &op),
        }
    }

    fn apply_issuer(
        &self,
        state: &mut LedgerState,
        from: Address,
        at: Address,
        mut issuer: IssuerState,
        op: Operation,
    ) -> Result<(), TransportError> {
        if op == Operation::Deploy {
            return Ok(());
        }
        if from != issuer.owner {
            return Err(rejected("sender is not the issuer owner"));
        }
        match op {
            Operation::Mint { to, amount, .. } => {
                if issuer.paused {
                    return Err(rejected("token is paused"));
                }
                let wallet = self.account_address(to, at)?;
                let mut account = match state.programs.get(&wallet) {
                    Some(Program::Account(a)) => a.clone(),
                    _ => AccountState::initial(to, at),
                };
                account.balance = credit(account.balance, amount)?;
                issuer.total_supply = credit(issuer.total_supply, amount)?;
                state.programs.insert(wallet, Program::Account(account));
            }
            Operation::Pause { .. } => issuer.paused = true,
            Operation::Unpause { .. } => issuer.paused = false,
            Operation::AddToBlacklist { address, .. } => {
                state.blacklist.insert(address);
            }
            Operation::RemoveFromBlacklist { address, .. } => {
                state.blacklist.remove(&address);
            }
            Operation::UpdateStakingApr { apr, .. } => issuer.staking_apr = apr,
            Operation::UpdateBurnRate { burn_rate, .. } => issuer.burn_rate = burn_rate,
            other => return Err(rejected(format!("issuer does not accept {}", other.name()))),
        }
        state.programs.insert(at, Program::Issuer(issuer));
        Ok(())
    }

    fn apply_account(
        &self,
        state: &mut LedgerState,
        from: Address,
        at: Address,
        mut account: AccountState,
        op: Operation,
    ) -> Result<(), TransportError> {
        if from != account.owner {
            return Err(rejected("sender does not own this account"));
        }
        let Some(Program::Issuer(mut issuer)) = state.programs.get(&account.issuer).cloned() else {
            return Err(rejected("issuer missing"));
        };
        let now = *self.now.read();

        match op {
            Operation::Transfer {
                amount, destination, ..
            } => {
                if issuer.paused {
                    return Err(rejected("token is paused"));
                }
                if state.blacklist.contains(&from) || state.blacklist.contains(&destination) {
                    return Err(rejected("address is blacklisted"));
                }
                account.balance = debit(account.balance, amount)?;
                let burned = self::amount(amount.nano() * u128::from(issuer.burn_rate) / BPS)?;
                let received = debit(amount, burned)?;

                let wallet = self.account_address(destination, account.issuer)?;
                if wallet == at {
                    return Err(rejected("transfer to self"));
                }
                let mut receiver = match state.programs.get(&wallet) {
                    Some(Program::Account(a)) => a.clone(),
                    _ => AccountState::initial(destination, account.issuer),
                };
                receiver.balance = credit(receiver.balance, received)?;
                issuer.total_supply = debit(issuer.total_supply, burned)?;
                state.programs.insert(wallet, Program::Account(receiver));
            }
            Operation::Burn { amount, .. } => {
                account.balance = debit(account.balance, amount)?;
                issuer.total_supply = debit(issuer.total_supply, amount)?;
            }
            Operation::Stake {
                amount, duration, ..
            } => {
                account.balance = debit(account.balance, amount)?;
                account.locked_balance = credit(account.locked_balance, amount)?;
                account.unlock_time = now.saturating_add(duration);
            }
            Operation::Unstake { .. } => {
                if now < account.unlock_time {
                    return Err(rejected("stake still locked"));
                }
                account.balance = credit(account.balance, account.locked_balance)?;
                account.locked_balance = Amount::ZERO;
                account.unlock_time = 0;
            }
            Operation::Deposit { amount, .. } => {
                let pool_addr = state.pool.ok_or_else(|| rejected("no farming pool"))?;
                account.balance = debit(account.balance, amount)?;
                Self::update_pool(state, pool_addr, |pool| {
                    pool.total_deposited = credit(pool.total_deposited, amount)?;
                    Ok(())
                })?;
                let position = state.positions.entry((pool_addr, from)).or_default();
                position.deposited += amount.nano();
                if position.last_claim_time == 0 {
                    position.last_claim_time = now;
                }
            }
            Operation::Withdraw { amount, .. } => {
                let pool_addr = state.pool.ok_or_else(|| rejected("no farming pool"))?;
                let remaining = state
                    .positions
                    .get(&(pool_addr, from))
                    .map_or(0, |position| position.deposited)
                    .checked_sub(amount.nano())
                    .ok_or_else(|| rejected("withdrawal exceeds deposit"))?;
                let balance = credit(account.balance, amount)?;
                Self::update_pool(state, pool_addr, |pool| {
                    pool.total_deposited = debit(pool.total_deposited, amount)?;
                    Ok(())
                })?;
                // Pool debited; commit the position last.
                state.positions.entry((pool_addr, from)).or_default().deposited = remaining;
                account.balance = balance;
            }
            Operation::Claim { .. } => {
                let pool_addr = state.pool.ok_or_else(|| rejected("no farming pool"))?;
                let reward_rate = match state.programs.get(&pool_addr) {
                    Some(Program::Pool(p)) => p.reward_rate,
                    _ => return Err(rejected("pool missing")),
                };
                let position = state.positions.entry((pool_addr, from)).or_default();
                let reward = amount(position.deposited * u128::from(reward_rate) / BPS)?;
                position.last_claim_time = now;
                account.balance = credit(account.balance, reward)?;
                issuer.total_supply = credit(issuer.total_supply, reward)?;
            }
            other => return Err(rejected(format!("account does not accept {}", other.name()))),
        }

        let issuer_addr = account.issuer;
        state.programs.insert(at, Program::Account(account));
        state.programs.insert(issuer_addr, Program::Issuer(issuer));
        Ok(())
    }

    fn apply_pool(
        state: &mut LedgerState,
        from: Address,
        at: Address,
        mut pool: PoolState,
        op: &Operation,
    ) -> Result<(), TransportError> {
        match op {
            Operation::Deploy => Ok(()),
            Operation::UpdateRewardRate { reward_rate, .. } => {
                let owner = match state.programs.get(&pool.issuer) {
                    Some(Program::Issuer(i)) => i.owner,
                    _ => return Err(rejected("pool issuer missing")),
                };
                if from != owner {
                    return Err(rejected("sender is not the issuer owner"));
                }
                pool.reward_rate = *reward_rate;
                state.programs.insert(at, Program::Pool(pool));
                Ok(())
            }
            other => Err(rejected(format!("pool does not accept {}", other.name()))),
        }
    }

    fn update_pool<F>(state: &mut LedgerState, at: Address, f: F) -> Result<(), TransportError>
    where
        F: FnOnce(&mut PoolState) -> Result<(), TransportError>,
    {
        match state.programs.get_mut(&at) {
            Some(Program::Pool(pool)) => f(pool),
            _ => Err(rejected("pool missing")),
        }
    }

    // -------------------------------------------------------------------------
    // Get-methods
    // -------------------------------------------------------------------------

    fn run(
        &self,
        address: Address,
        method: &str,
        args: Vec<StackValue>,
    ) -> Result<GetMethodOutput, TransportError> {
        let state = self.state.read();
        let program = state
            .programs
            .get(&address)
            .ok_or_else(|| rejected("program not deployed"))?;
        let arg_address = || {
            let mut args = QueryResult::new(args.clone());
            args.read_address().map_err(|e| rejected(e.to_string()))
        };
        let slice = |a: &Address| StackValue::address(a).map_err(|e| rejected(e.to_string()));
        let int = |a: Amount| StackValue::Int(a.nano() as i128);

        let stack = match (program, method) {
            (Program::Issuer(i), "get_eartton_params") => vec![
                StackValue::Int(i128::from(i.burn_rate)),
                StackValue::Int(i128::from(i.staking_apr)),
                int(i.farming_pool_size),
                StackValue::Int(if i.paused { -1 } else { 0 }),
            ],
            (Program::Issuer(_), "get_wallet_address") => {
                let owner = arg_address()?;
                vec![slice(&self.account_address(owner, address)?)?]
            }
            (Program::Issuer(_), "is_address_blacklisted") => {
                let listed = state.blacklist.contains(&arg_address()?);
                vec![StackValue::Int(if listed { -1 } else { 0 })]
            }
            (Program::Account(a), "get_wallet_data") => vec![
                int(a.balance),
                slice(&a.owner)?,
                slice(&a.issuer)?,
                int(a.locked_balance),
            ],
            (Program::Account(a), "get_staking_data") => vec![
                int(a.locked_balance),
                StackValue::Int(i128::from(a.unlock_time)),
            ],
            (Program::Pool(p), "get_pool_data") => vec![
                int(p.total_deposited),
                StackValue::Int(i128::from(p.reward_rate)),
            ],
            (Program::Pool(p), "get_user_data") => {
                let user = arg_address()?;
                let position = state
                    .positions
                    .get(&(address, user))
                    .copied()
                    .unwrap_or_default();
                let pending = position.deposited * u128::from(p.reward_rate) / BPS;
                vec![
                    StackValue::Int(position.deposited as i128),
                    StackValue::Int(i128::from(position.last_claim_time)),
                    StackValue::Int(pending as i128),
                ]
            }
            _ => {
                return Ok(GetMethodOutput {
                    exit_code: EXIT_METHOD_NOT_FOUND,
                    stack: Vec::new(),
                })
            }
        };
        Ok(GetMethodOutput::success(stack))
    }
}

#[async_trait]
impl GetMethodExecutor for SimulatedLedger {
    async fn run_get_method(
        &self,
        address: Address,
        method: &str,
        args: Vec<StackValue>,
    ) -> Result<GetMethodOutput, TransportError> {
        self.run(address, method, args)
    }
}

// =============================================================================
// WALLET
// =============================================================================

/// A wallet submitting messages to a [`SimulatedLedger`].
#[derive(Clone)]
pub struct SimWallet {
    ledger: Arc<SimulatedLedger>,
    address: Address,
}

#[async_trait]
impl MessageSender for SimWallet {
    fn address(&self) -> Option<Address> {
        Some(self.address)
    }

    async fn send_message(&self, message: OutboundMessage) -> Result<(), TransportError> {
        self.ledger.deliver(self.address, message)
    }
}
