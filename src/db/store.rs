use alloy::primitives::Address;

use crate::db::models::{Bundle, Factory, Pool, Token};

/// Entity persistence used by the pricing engine.
///
/// Every load exposes absence explicitly; a missing entity is a normal
/// "not created yet" branch, never an error.
pub trait EntityStore {
    fn load_token(&self, address: &Address) -> Option<Token>;
    fn load_pool(&self, address: &Address) -> Option<Pool>;
    fn load_bundle(&self) -> Option<Bundle>;
    fn load_factory(&self) -> Option<Factory>;

    fn save_token(&mut self, token: Token);
    fn save_pool(&mut self, pool: Pool);
    fn save_bundle(&mut self, bundle: Bundle);
    fn save_factory(&mut self, factory: Factory);

    /// Load the anchor record, creating it with a zero price on first access.
    fn load_or_create_bundle(&mut self) -> Bundle {
        match self.load_bundle() {
            Some(bundle) => bundle,
            None => {
                let bundle = Bundle::new();
                self.save_bundle(bundle.clone());
                bundle
            },
        }
    }

    /// Load the DEX-wide aggregates, creating them on first access.
    fn load_or_create_factory(&mut self) -> Factory {
        match self.load_factory() {
            Some(factory) => factory,
            None => {
                let factory = Factory::new();
                self.save_factory(factory.clone());
                factory
            },
        }
    }
}

/// Canonical pair-address resolver (the factory's `getPair`).
pub trait PairRegistry {
    /// Pair address for the unordered token pair, or `Address::ZERO` when no
    /// pair has been created.
    fn get_pair(&self, token_a: &Address, token_b: &Address) -> Address;

    fn register_pair(&mut self, token_a: Address, token_b: Address, pair: Address);

    /// Same as [`PairRegistry::get_pair`] with the zero-address sentinel mapped to `None`.
    fn find_pair(&self, token_a: &Address, token_b: &Address) -> Option<Address> {
        let pair = self.get_pair(token_a, token_b);
        if pair.is_zero() {
            None
        } else {
            Some(pair)
        }
    }
}
