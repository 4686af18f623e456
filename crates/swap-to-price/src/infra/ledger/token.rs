use {
    crate::domain::{
        chain::Error,
        eth::{Address, U256},
    },
    std::collections::HashMap,
};

/// Balances and allowances of an ERC20 token.
#[derive(Clone, Debug)]
pub struct Token {
    symbol: String,
    total_supply: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

impl Token {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            total_supply: U256::ZERO,
            balances: Default::default(),
            allowances: Default::default(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn mint(&mut self, to: Address, amount: U256) -> Result<(), Error> {
        // Balances never exceed the total supply, so they can't overflow if
        // the supply doesn't.
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), Error> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(Error::InsufficientBalance);
        }
        self.balances.insert(from, balance - amount);
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }

    /// Transfers on behalf of `from`, consuming the allowance it granted to
    /// `spender`. An allowance of `U256::MAX` is never consumed.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), Error> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(Error::InsufficientAllowance);
        }
        self.transfer(from, to, amount)?;
        if allowance != U256::MAX {
            self.allowances.insert((from, spender), allowance - amount);
        }
        Ok(())
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.insert((owner, spender), amount);
    }
}
