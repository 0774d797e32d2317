mod bundle;
mod factory;
mod pool;
mod token;

pub use bundle::Bundle;
pub use factory::Factory;
pub use pool::{Pool, PoolSide};
pub use token::Token;
