use {
    crate::domain::{
        eth::{Address, TokenPair},
        sizing::Fee,
    },
    alloy_primitives::{B256, keccak256},
    std::collections::HashMap,
};

/// Computes the deterministic address a factory deploys the pool of a token
/// pair to.
#[derive(Clone, Copy, Debug)]
pub struct PairProvider {
    pub factory: Address,
    pub init_code_digest: B256,
}

impl PairProvider {
    pub fn pair_address(&self, pair: &TokenPair) -> Address {
        let (token0, token1) = pair.get();

        // https://uniswap.org/docs/v2/javascript-SDK/getting-pair-addresses/
        let salt = {
            let mut buffer = [0u8; 40];
            buffer[0..20].copy_from_slice(token0.0.as_slice());
            buffer[20..40].copy_from_slice(token1.0.as_slice());
            keccak256(buffer)
        };
        create2_target_address(self.factory, &salt, &self.init_code_digest)
    }
}

fn create2_target_address(creator: Address, salt: &B256, init_code_digest: &B256) -> Address {
    let mut preimage = [0xff; 85];
    preimage[1..21].copy_from_slice(creator.as_slice());
    preimage[21..53].copy_from_slice(salt.as_slice());
    preimage[53..85].copy_from_slice(init_code_digest.as_slice());
    Address::from_slice(&keccak256(preimage)[12..])
}

/// The registry of pools. At most one pool exists per unordered token pair.
#[derive(Clone, Debug)]
pub struct Factory {
    provider: PairProvider,
    fee: Fee,
    pairs: HashMap<TokenPair, Address>,
}

impl Factory {
    pub fn new(provider: PairProvider, fee: Fee) -> Self {
        Self {
            provider,
            fee,
            pairs: Default::default(),
        }
    }

    /// The fee of the pools this factory creates.
    pub fn fee(&self) -> Fee {
        self.fee
    }

    pub fn get_pair(&self, pair: &TokenPair) -> Option<Address> {
        self.pairs.get(pair).copied()
    }

    /// Registers the pool for `pair`, returning its address, or `None` if it
    /// already exists.
    pub fn create_pair(&mut self, pair: TokenPair) -> Option<Address> {
        if self.pairs.contains_key(&pair) {
            return None;
        }
        let address = self.provider.pair_address(&pair);
        self.pairs.insert(pair, address);
        Some(address)
    }
}
