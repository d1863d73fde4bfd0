//! Scenario: duplicate ARP-resolve flows in a router datapath listing.
//!
//! # Invariants under test
//!
//! 1. Only selected stage + router-port outport lines are grouped.
//! 2. A key with N distinct lines yields one group of size N, listing order kept.
//! 3. A key with one line yields no group.
//! 4. A listing with no qualifying lines yields no groups.

use ovnr_dups::{fetch_duplicates, find_duplicates, DuplicateFilter, LflowLister};
use ovnr_schemas::CommandFailure;

const LISTING: &str = r#"Datapath: "neutron-1b2c3d4e-aaaa-bbbb-cccc-0123456789ab" (8d5f0d2e-0a3b-4c5d-9e8f-7a6b5c4d3e2f)  Pipeline: ingress
  table=0 (lr_in_admission    ), priority=100  , match=(vlan.present || eth.src[40]), action=(drop;)
  table=12(lr_in_arp_resolve  ), priority=500  , match=(ip4.mcast || ip6.mcast), action=(next;)
  table=12(lr_in_arp_resolve  ), priority=100  , match=(outport == "lrp-f85096df-74b7-4c75-917c-cb6726319bfb" && reg0 == 172.16.0.141), action=(eth.dst = fa:16:3e:a1:27:b3; next;)
  table=12(lr_in_arp_resolve  ), priority=100  , match=(outport == "lrp-f85096df-74b7-4c75-917c-cb6726319bfb" && reg0 == 172.16.0.141), action=(eth.dst = fa:16:3e:69:92:0f; next;)
  table=12(lr_in_arp_resolve  ), priority=100  , match=(outport == "lrp-f85096df-74b7-4c75-917c-cb6726319bfb" && reg0 == 172.16.0.150), action=(eth.dst = fa:16:3e:11:22:33; next;)
  table=12(lr_in_arp_resolve  ), priority=100  , match=(outport == "lrp-f85096df-74b7-4c75-917c-cb6726319bfb" && reg0 == 172.16.0.182), action=(eth.dst = fa:16:3e:73:7f:0b; next;)
  table=12(lr_in_arp_resolve  ), priority=100  , match=(outport == "lrp-f85096df-74b7-4c75-917c-cb6726319bfb" && reg0 == 172.16.0.182), action=(eth.dst = fa:16:3e:f5:a7:95; next;)
  table=12(lr_in_arp_resolve  ), priority=100  , match=(outport == "cr-lrp-0a1b" && reg0 == 172.16.0.9), action=(eth.dst = fa:16:3e:00:00:01; next;)
  table=12(lr_in_arp_resolve  ), priority=100  , match=(outport == "cr-lrp-0a1b" && reg0 == 172.16.0.9), action=(eth.dst = fa:16:3e:00:00:02; next;)
  table=13(lr_in_chk_pkt_len  ), priority=0    , match=(1), action=(next;)
Datapath: "neutron-1b2c3d4e-aaaa-bbbb-cccc-0123456789ab" (8d5f0d2e-0a3b-4c5d-9e8f-7a6b5c4d3e2f)  Pipeline: egress
  table=0 (lr_out_chk_dnat_local), priority=0    , match=(1), action=(reg9[4] = 0; next;)
"#;

const KEY_141: &str = r#"table=12(lr_in_arp_resolve  ), priority=100  , match=(outport == "lrp-f85096df-74b7-4c75-917c-cb6726319bfb" && reg0 == 172.16.0.141)"#;
const KEY_182: &str = r#"table=12(lr_in_arp_resolve  ), priority=100  , match=(outport == "lrp-f85096df-74b7-4c75-917c-cb6726319bfb" && reg0 == 172.16.0.182)"#;

#[test]
fn groups_only_colliding_router_port_flows() {
    let groups = find_duplicates(LISTING, &DuplicateFilter::default());

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].key_text, KEY_141);
    assert_eq!(groups[1].key_text, KEY_182);

    assert_eq!(
        groups[0].lines,
        vec![
            format!("{KEY_141}, action=(eth.dst = fa:16:3e:a1:27:b3; next;)"),
            format!("{KEY_141}, action=(eth.dst = fa:16:3e:69:92:0f; next;)"),
        ]
    );
    assert_eq!(
        groups[1].lines,
        vec![
            format!("{KEY_182}, action=(eth.dst = fa:16:3e:73:7f:0b; next;)"),
            format!("{KEY_182}, action=(eth.dst = fa:16:3e:f5:a7:95; next;)"),
        ]
    );
}

#[test]
fn n_distinct_lines_make_one_group_of_n() {
    let base = r#"  table=12(lr_in_arp_resolve  ), priority=100  , match=(outport == "lrp-x" && reg0 == 10.0.0.1), action=(eth.dst = fa:16:3e:00:00:0"#;
    let listing: String = (1..=4)
        .map(|i| format!("{base}{i}; next;)\n"))
        .collect();

    let groups = find_duplicates(&listing, &DuplicateFilter::default());
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 4);
    assert_eq!(groups[0].key.priority, 100);
}

#[test]
fn repeated_identical_line_is_not_a_duplicate() {
    let line = r#"  table=12(lr_in_arp_resolve  ), priority=100  , match=(outport == "lrp-x" && reg0 == 10.0.0.1), action=(eth.dst = fa:16:3e:00:00:01; next;)"#;
    let listing = format!("{line}\n{line}\n");
    assert!(find_duplicates(&listing, &DuplicateFilter::default()).is_empty());
}

#[test]
fn listing_without_qualifying_lines_is_clean() {
    let listing = r#"Datapath: "neutron-x" (1)  Pipeline: ingress
  table=0 (lr_in_admission    ), priority=100  , match=(vlan.present), action=(drop;)
  table=12(lr_in_arp_resolve  ), priority=500  , match=(ip4.mcast || ip6.mcast), action=(next;)
"#;
    assert!(find_duplicates(listing, &DuplicateFilter::default()).is_empty());
}

#[test]
fn custom_filter_selects_another_outport_family() {
    let filter = DuplicateFilter {
        outport_prefix: "cr-lrp-".to_string(),
        ..DuplicateFilter::default()
    };
    let groups = find_duplicates(LISTING, &filter);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

struct FixedLister;

impl LflowLister for FixedLister {
    fn lflow_list(&self, datapath: &str) -> Result<String, CommandFailure> {
        assert_eq!(datapath, "zuul-tests_router");
        Ok(LISTING.to_string())
    }
}

#[test]
fn fetch_runs_detection_over_lister_output() {
    let groups =
        fetch_duplicates(&FixedLister, "zuul-tests_router", &DuplicateFilter::default()).unwrap();
    assert_eq!(groups.len(), 2);
}
