use std::sync::{Arc, Once};

use bech32::{Bech32, Hrp};
use httpmock::MockServer;
use klever_gateway::{
    gateway::Gateway,
    network::{EndpointResolver, Network, NetworkProfile},
    relay::HttpRelay,
    transaction::FeeSchedule,
};
use tracing_subscriber::EnvFilter;
use url::Url;

static INIT: Once = Once::new();

/// Initializes the global logger (only once).
pub fn init_logger() {
    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env()
            .add_directive("klever_gateway=debug".parse().unwrap())
            .add_directive("actix_web=error".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// Builds a gateway whose node is the given mock server.
///
/// Mainnet is served from the server root and testnet from `/testnet`, so a
/// test can tell which network a request was routed to.
pub fn gateway_for(server: &MockServer) -> Arc<Gateway> {
    let base = Url::parse(&server.base_url()).unwrap();
    let testnet_base = Url::parse(&server.url("/testnet")).unwrap();

    let mainnet = NetworkProfile::new(base.clone(), base, "100420");
    let testnet = NetworkProfile::new(testnet_base.clone(), testnet_base, "109");
    let resolver = EndpointResolver::new(mainnet, testnet, Network::Mainnet);

    let relay = HttpRelay::new().expect("Failed to build relay");
    Arc::new(Gateway::new(Arc::new(relay), resolver, FeeSchedule::default()))
}

/// Deterministic `klv1...` address whose 32 key bytes are all `seed`
pub fn klv_address(seed: u8) -> String {
    let hrp = Hrp::parse("klv").unwrap();
    bech32::encode::<Bech32>(hrp, &[seed; 32]).unwrap()
}
