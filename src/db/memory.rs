use alloy::primitives::Address;
use rustc_hash::FxHashMap;

use crate::db::{
    models::{Bundle, Factory, Pool, Token},
    EntityStore, PairRegistry,
};

/// In-memory entity store and pair registry.
///
/// Backs the replay binary and the tests. Pair keys are stored with the
/// lower address first so lookups are order-independent, like the factory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tokens: FxHashMap<Address, Token>,
    pools: FxHashMap<Address, Pool>,
    pairs: FxHashMap<(Address, Address), Address>,
    bundle: Option<Bundle>,
    factory: Option<Factory>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}

fn pair_key(token_a: &Address, token_b: &Address) -> (Address, Address) {
    if token_a < token_b {
        (*token_a, *token_b)
    } else {
        (*token_b, *token_a)
    }
}

impl EntityStore for MemoryStore {
    fn load_token(&self, address: &Address) -> Option<Token> {
        self.tokens.get(address).cloned()
    }

    fn load_pool(&self, address: &Address) -> Option<Pool> {
        self.pools.get(address).cloned()
    }

    fn load_bundle(&self) -> Option<Bundle> {
        self.bundle.clone()
    }

    fn load_factory(&self) -> Option<Factory> {
        self.factory.clone()
    }

    fn save_token(&mut self, token: Token) {
        self.tokens.insert(token.address, token);
    }

    fn save_pool(&mut self, pool: Pool) {
        self.pools.insert(pool.address, pool);
    }

    fn save_bundle(&mut self, bundle: Bundle) {
        self.bundle = Some(bundle);
    }

    fn save_factory(&mut self, factory: Factory) {
        self.factory = Some(factory);
    }
}

impl PairRegistry for MemoryStore {
    fn get_pair(&self, token_a: &Address, token_b: &Address) -> Address {
        self.pairs
            .get(&pair_key(token_a, token_b))
            .copied()
            .unwrap_or(Address::ZERO)
    }

    fn register_pair(&mut self, token_a: Address, token_b: Address, pair: Address) {
        self.pairs.insert(pair_key(&token_a, &token_b), pair);
    }
}
