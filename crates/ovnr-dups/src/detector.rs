use std::collections::HashMap;

use ovnr_flow::RuleKey;
use ovnr_schemas::CommandFailure;
use tracing::debug;

use crate::lflow::LogicalFlow;

/// Source of `ovn-sbctl lflow-list <datapath>` output.
pub trait LflowLister {
    fn lflow_list(&self, datapath: &str) -> Result<String, CommandFailure>;
}

/// Which flows are candidates for duplicate detection.
///
/// Defaults select the router ARP-resolve stage (destination port -> resolved
/// MAC) restricted to router-port outports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateFilter {
    pub stage: String,
    pub outport_prefix: String,
}

impl Default for DuplicateFilter {
    fn default() -> Self {
        Self {
            stage: "lr_in_arp_resolve".to_string(),
            outport_prefix: "lrp-".to_string(),
        }
    }
}

impl DuplicateFilter {
    pub fn selects(&self, flow: &LogicalFlow) -> bool {
        flow.stage == self.stage
            && flow
                .match_clause()
                .strip_prefix("outport == \"")
                .is_some_and(|rest| rest.starts_with(&self.outport_prefix))
    }
}

/// All listing lines sharing one [`RuleKey`], in listing order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub key: RuleKey,
    /// Key as printed in the listing (used verbatim in reports).
    pub key_text: String,
    pub lines: Vec<String>,
}

impl DuplicateGroup {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Group selected flows by key and keep only keys with two or more distinct lines.
///
/// Groups come back in order of first appearance; lines within a group keep
/// listing order. An identical line listed twice counts once.
pub fn find_duplicates(listing: &str, filter: &DuplicateFilter) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    let mut by_key: HashMap<RuleKey, usize> = HashMap::new();

    for raw in listing.lines() {
        let flow = match LogicalFlow::parse(raw) {
            Ok(f) => f,
            Err(_) => continue,
        };
        if !filter.selects(&flow) {
            continue;
        }

        let idx = *by_key.entry(flow.key.clone()).or_insert_with(|| {
            groups.push(DuplicateGroup {
                key: flow.key.clone(),
                key_text: flow.key_text.clone(),
                lines: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[idx];
        if !group.lines.contains(&flow.line) {
            group.lines.push(flow.line);
        }
    }

    let total = groups.len();
    groups.retain(|g| g.len() > 1);
    debug!(keys = total, duplicated = groups.len(), "lflow grouping done");
    groups
}

/// Fetch the listing for `datapath` and run [`find_duplicates`] over it.
pub fn fetch_duplicates(
    lister: &dyn LflowLister,
    datapath: &str,
    filter: &DuplicateFilter,
) -> Result<Vec<DuplicateGroup>, CommandFailure> {
    let listing = lister.lflow_list(datapath)?;
    Ok(find_duplicates(&listing, filter))
}
