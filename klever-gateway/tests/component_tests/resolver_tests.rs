//! Endpoint resolution and network selection

use klever_gateway::network::{EndpointResolver, Network, NetworkProfile};
use url::Url;

use crate::test_resolver;

#[test]
fn test_known_networks_resolve_to_their_hosts() {
    let resolver = test_resolver();

    let mainnet = resolver.select(Some("mainnet"));
    let testnet = resolver.select(Some(" TestNet "));

    assert_eq!(mainnet, Network::Mainnet);
    assert_eq!(testnet, Network::Testnet);
    assert_eq!(
        resolver.account_url(mainnet, "klv1abc").as_str(),
        "https://api.mainnet.klever.org/v1.0/address/klv1abc"
    );
    assert_eq!(
        resolver.account_url(testnet, "klv1abc").as_str(),
        "https://api.testnet.klever.org/v1.0/address/klv1abc"
    );
}

#[test]
fn test_unrecognized_network_resolves_like_mainnet() {
    let resolver = test_resolver();

    for selector in ["devnet", "MAIN", "1", "testnet2"] {
        let network = resolver.select(Some(selector));
        assert_eq!(network, Network::Mainnet, "selector {selector}");
        assert_eq!(
            resolver.account_url(network, "klv1abc"),
            resolver.account_url(Network::Mainnet, "klv1abc")
        );
    }
}

#[test]
fn test_absent_network_uses_configured_default() {
    let mainnet = NetworkProfile::from_domain(Network::Mainnet, "klever.org", "100420").unwrap();
    let testnet = NetworkProfile::from_domain(Network::Testnet, "klever.org", "109").unwrap();
    let resolver = EndpointResolver::new(mainnet, testnet, Network::Testnet);

    assert_eq!(resolver.select(None), Network::Testnet);
    assert_eq!(resolver.select(Some("  ")), Network::Testnet);
    // An unknown name is not "absent": it still falls back to mainnet.
    assert_eq!(resolver.select(Some("bogus")), Network::Mainnet);
}

#[test]
fn test_every_endpoint_is_a_well_formed_url() {
    let resolver = test_resolver();

    for network in [Network::Mainnet, Network::Testnet] {
        let mut urls = vec![
            resolver.account_url(network, "klv1abc"),
            resolver.account_assets_url(network, "klv1abc"),
            resolver.transactions_url(network, "klv1abc", 10),
            resolver.broadcast_url(network),
        ];
        urls.extend(resolver.asset_candidates(network, "DGKO-V3QL"));

        for url in urls {
            let reparsed = Url::parse(url.as_str()).expect("resolver produced an invalid URL");
            assert_eq!(reparsed.scheme(), "https");
            assert!(reparsed
                .host_str()
                .unwrap()
                .ends_with(&format!("{}.klever.org", network)));
        }
    }
}

#[test]
fn test_broadcast_and_api_share_the_domain_suffix() {
    let resolver = test_resolver();

    assert_eq!(
        resolver.broadcast_url(Network::Mainnet).as_str(),
        "https://node.mainnet.klever.org/transaction/broadcast"
    );
    assert_eq!(
        resolver.broadcast_url(Network::Testnet).as_str(),
        "https://node.testnet.klever.org/transaction/broadcast"
    );
}

#[test]
fn test_asset_candidates_follow_documented_order() {
    let resolver = test_resolver();

    let candidates: Vec<String> = resolver
        .asset_candidates(Network::Mainnet, "KLV")
        .iter()
        .map(|url| url.path().to_string())
        .collect();

    assert_eq!(
        candidates,
        vec!["/v1.0/assets/KLV", "/v1.0/asset/KLV", "/assets/KLV", "/asset/KLV"]
    );
}

#[test]
fn test_path_input_cannot_escape_its_segment() {
    let resolver = test_resolver();

    let url = resolver.account_url(Network::Mainnet, "../admin?x=1");

    assert_eq!(url.path(), "/v1.0/address/..%2Fadmin%3Fx=1");
    assert_eq!(url.query(), None);
}

#[test]
fn test_transactions_url_carries_limit() {
    let resolver = test_resolver();

    let url = resolver.transactions_url(Network::Testnet, "klv1abc", 25);

    assert_eq!(
        url.as_str(),
        "https://api.testnet.klever.org/v1.0/transaction/list/klv1abc?limit=25"
    );
}
