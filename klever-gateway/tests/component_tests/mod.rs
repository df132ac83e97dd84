//! Component tests
//!
//! Each gateway component is exercised against a mocked relay so the number
//! of node calls can be asserted exactly.

use std::sync::Once;

use bech32::{Bech32, Hrp};
use klever_gateway::network::{EndpointResolver, Network, NetworkProfile};
use tracing_subscriber::EnvFilter;

pub mod broadcast_tests;
pub mod resolver_tests;

static INIT: Once = Once::new();

/// Initializes the global logger (only once).
pub fn init_logger() {
    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env()
            .add_directive("klever_gateway=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// Resolver addressing the public klever.org hosts, mainnet by default
pub fn test_resolver() -> EndpointResolver {
    let mainnet = NetworkProfile::from_domain(Network::Mainnet, "klever.org", "100420").unwrap();
    let testnet = NetworkProfile::from_domain(Network::Testnet, "klever.org", "109").unwrap();
    EndpointResolver::new(mainnet, testnet, Network::Mainnet)
}

/// Deterministic `klv1...` address whose 32 key bytes are all `seed`
pub fn klv_address(seed: u8) -> String {
    let hrp = Hrp::parse("klv").unwrap();
    bech32::encode::<Bech32>(hrp, &[seed; 32]).unwrap()
}
