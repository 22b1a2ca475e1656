//! Property tests: share links must stay parseable no matter what operators
//! type into name and SNI fields.

use proptest::prelude::*;
use relay_profile::generate_share_url;
use relay_types::{Inbound, InboundWithNode, Node, Protocol, User};
use url::Url;

fn view(inbound_name: &str, node_name: &str, sni: &str, protocol: Protocol) -> InboundWithNode {
    let node = Node::new(1, node_name.to_string(), "198.51.100.7".to_string());
    let mut inbound = Inbound::new(1, 1, inbound_name.to_string(), protocol);
    inbound.sni = sni.to_string();
    inbound.public_key = "PUBKEY".to_string();
    inbound.short_id = "abcd1234".to_string();
    InboundWithNode { inbound, node }
}

proptest! {
    // Names carry spaces, dashes, unicode; the fragment must keep the URI valid.
    #[test]
    fn share_url_survives_arbitrary_names(
        inbound_name in "[a-zA-Z0-9 #?&/=%-]{1,24}",
        node_name in "\\PC{1,16}",
    ) {
        let user = User::new(1, "alice".to_string());
        let view = view(&inbound_name, &node_name, "cdn.example.com", Protocol::Reality);
        let url = generate_share_url(&user, &view).unwrap();

        let parsed = Url::parse(&url).unwrap();
        let uuid = user.uuid.to_string();
        prop_assert_eq!(parsed.scheme(), "vless");
        prop_assert_eq!(parsed.username(), uuid.as_str());
        prop_assert!(parsed.fragment().is_some());
    }

    #[test]
    fn query_values_round_trip_through_encoding(sni in "[a-z0-9.-]{1,32}") {
        let user = User::new(1, "alice".to_string());
        let view = view("main", "node-A", &sni, Protocol::WsTls);
        let url = generate_share_url(&user, &view).unwrap();

        let parsed = Url::parse(&url).unwrap();
        let sni_back = parsed
            .query_pairs()
            .find(|(k, _)| k == "sni")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        prop_assert_eq!(sni_back, sni);
    }
}
