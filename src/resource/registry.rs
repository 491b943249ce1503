//! Resource Registry - the closed table of backend resource kinds
//!
//! Maps each resource kind to its API path segment and display name, and
//! fixes the enumeration order used when building full snapshots. The set of
//! kinds is closed: it mirrors the backend's endpoint table and is known at
//! compile time, so the registry is an enum rather than a runtime lookup.

use crate::error::NbxError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a kind's report labels are ordered after deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOrder {
    /// Plain lexicographic string ordering (the default)
    Lexicographic,
    /// Numeric IP-address ordering, e.g. `10.0.0.9` before `10.0.0.10`
    IpNumeric,
}

/// A backend-managed resource kind.
///
/// `Ord` follows declaration order, which is the registry enumeration order;
/// ordered maps keyed by kind therefore iterate in registry order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    CustomFields,
    Vms,
    ClusterTypes,
    Clusters,
    IpAddresses,
    IpRanges,
    IpPrefixes,
    VlanGroups,
    Vlans,
    Sites,
    Locations,
    Racks,
    Owners,
    Manufacturers,
    Platforms,
    DeviceRoles,
    DeviceTypes,
    Devices,
}

impl ResourceKind {
    /// All registered kinds, in registry enumeration order
    pub const ALL: [ResourceKind; 18] = [
        ResourceKind::CustomFields,
        ResourceKind::Vms,
        ResourceKind::ClusterTypes,
        ResourceKind::Clusters,
        ResourceKind::IpAddresses,
        ResourceKind::IpRanges,
        ResourceKind::IpPrefixes,
        ResourceKind::VlanGroups,
        ResourceKind::Vlans,
        ResourceKind::Sites,
        ResourceKind::Locations,
        ResourceKind::Racks,
        ResourceKind::Owners,
        ResourceKind::Manufacturers,
        ResourceKind::Platforms,
        ResourceKind::DeviceRoles,
        ResourceKind::DeviceTypes,
        ResourceKind::Devices,
    ];

    /// API path segment under the backend base URL
    pub const fn path(&self) -> &'static str {
        match self {
            ResourceKind::CustomFields => "extras/custom-fields",
            ResourceKind::Vms => "virtualization/virtual-machines",
            ResourceKind::ClusterTypes => "virtualization/cluster-types",
            ResourceKind::Clusters => "virtualization/clusters",
            ResourceKind::IpAddresses => "ipam/ip-addresses",
            ResourceKind::IpRanges => "ipam/ip-ranges",
            ResourceKind::IpPrefixes => "ipam/prefixes",
            ResourceKind::VlanGroups => "ipam/vlan-groups",
            ResourceKind::Vlans => "ipam/vlans",
            ResourceKind::Sites => "dcim/sites",
            ResourceKind::Locations => "dcim/locations",
            ResourceKind::Racks => "dcim/racks",
            ResourceKind::Owners => "tenancy/contacts",
            ResourceKind::Manufacturers => "dcim/manufacturers",
            ResourceKind::Platforms => "dcim/platforms",
            ResourceKind::DeviceRoles => "dcim/device-roles",
            ResourceKind::DeviceTypes => "dcim/device-types",
            ResourceKind::Devices => "dcim/devices",
        }
    }

    /// Human label used in log lines
    pub const fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::CustomFields => "Custom Fields",
            ResourceKind::Vms => "Virtual Machines",
            ResourceKind::ClusterTypes => "Cluster Types",
            ResourceKind::Clusters => "Clusters",
            ResourceKind::IpAddresses => "IP Addresses",
            ResourceKind::IpRanges => "IP Ranges",
            ResourceKind::IpPrefixes => "IP Prefixes",
            ResourceKind::VlanGroups => "VLAN Groups",
            ResourceKind::Vlans => "VLANs",
            ResourceKind::Sites => "Sites",
            ResourceKind::Locations => "Locations",
            ResourceKind::Racks => "Racks",
            ResourceKind::Owners => "Owners",
            ResourceKind::Manufacturers => "Manufacturers",
            ResourceKind::Platforms => "Platforms",
            ResourceKind::DeviceRoles => "Device Roles",
            ResourceKind::DeviceTypes => "Device Types",
            ResourceKind::Devices => "Devices",
        }
    }

    /// Snake-case key, as used in CLI args and snapshot files
    pub const fn key(&self) -> &'static str {
        match self {
            ResourceKind::CustomFields => "custom_fields",
            ResourceKind::Vms => "vms",
            ResourceKind::ClusterTypes => "cluster_types",
            ResourceKind::Clusters => "clusters",
            ResourceKind::IpAddresses => "ip_addresses",
            ResourceKind::IpRanges => "ip_ranges",
            ResourceKind::IpPrefixes => "ip_prefixes",
            ResourceKind::VlanGroups => "vlan_groups",
            ResourceKind::Vlans => "vlans",
            ResourceKind::Sites => "sites",
            ResourceKind::Locations => "locations",
            ResourceKind::Racks => "racks",
            ResourceKind::Owners => "owners",
            ResourceKind::Manufacturers => "manufacturers",
            ResourceKind::Platforms => "platforms",
            ResourceKind::DeviceRoles => "device_roles",
            ResourceKind::DeviceTypes => "device_types",
            ResourceKind::Devices => "devices",
        }
    }

    /// Look up a kind by its snake-case key
    pub fn from_key(key: &str) -> Result<ResourceKind, NbxError> {
        ResourceKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.key() == key)
            .ok_or_else(|| NbxError::UnknownKind(key.to_string()))
    }

    /// Ordering applied to this kind's report labels
    pub fn label_order(&self) -> LabelOrder {
        match self {
            ResourceKind::IpAddresses => LabelOrder::IpNumeric,
            _ => LabelOrder::Lexicographic,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ResourceKind {
    type Err = NbxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::from_key(s)
    }
}
