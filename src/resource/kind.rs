//! Resource kind registry
//!
//! The closed set of resource kinds this tool understands, each with a static
//! definition: how to list it, where the records sit in the wire response,
//! which fields carry identity, and the column layout for tabular output.

use std::fmt;
use std::str::FromStr;

/// Column definition for tabular output.
///
/// `json_path` is a dot-notation path into the (enriched) remote record;
/// `_name` and `_id` are computed fields injected before rendering.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub header: &'static str,
    pub json_path: &'static str,
    pub width: usize,
}

/// Static definition of one resource kind.
#[derive(Debug, Clone, Copy)]
pub struct KindDef {
    /// CLI token, e.g. `route-table`.
    pub key: &'static str,
    pub display_name: &'static str,
    /// Cache key; each collection kind owns its own region -> snapshot map.
    pub collection_name: &'static str,
    /// Remote service the kind belongs to.
    pub service: &'static str,
    /// Action name for the list call.
    pub list_action: &'static str,
    /// Key of the record list in the list response body.
    pub response_path: &'static str,
    /// Some kinds nest their records one level deeper (instances inside
    /// reservations, routes inside route tables); extraction flattens this.
    pub nested_items: Option<&'static str>,
    /// Field of the remote record holding the kind-specific id.
    pub id_field: &'static str,
    /// Field holding a first-class name, when the kind has one. Everything
    /// else falls back to the `Name` tag.
    pub name_field: Option<&'static str>,
    /// Request parameter used to describe a single resource by id. Kinds
    /// without one cannot be described individually.
    pub id_filter: Option<&'static str>,
    /// A list filter the kind cannot be fetched without (e.g. transit
    /// gateway routes only exist per route table).
    pub required_filter: Option<&'static str>,
    pub columns: &'static [ColumnDef],
}

impl KindDef {
    /// Pull the record list out of a raw list-response body, flattening one
    /// nesting level where the wire shape demands it (reservations around
    /// instances, route tables around routes).
    pub fn extract_records(&self, body: &serde_json::Value) -> Vec<serde_json::Value> {
        let outer = body
            .get(self.response_path)
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let Some(nested) = self.nested_items else {
            return outer;
        };

        let mut records = Vec::new();
        for container in &outer {
            if let Some(items) = container.get(nested).and_then(|v| v.as_array()) {
                records.extend(items.iter().cloned());
            }
        }
        records
    }
}

/// The closed enumeration of resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Vpc,
    Subnet,
    Secret,
    Route,
    RouteTable,
    Igw,
    Eip,
    Tgw,
    TgwRoute,
    TgwRouteTable,
    SecurityGroup,
    Ec2Instance,
    Natgw,
}

impl ResourceKind {
    pub const ALL: &'static [ResourceKind] = &[
        ResourceKind::Vpc,
        ResourceKind::Subnet,
        ResourceKind::Secret,
        ResourceKind::Route,
        ResourceKind::RouteTable,
        ResourceKind::Igw,
        ResourceKind::Eip,
        ResourceKind::Tgw,
        ResourceKind::TgwRoute,
        ResourceKind::TgwRouteTable,
        ResourceKind::SecurityGroup,
        ResourceKind::Ec2Instance,
        ResourceKind::Natgw,
    ];

    /// Static definition for this kind.
    pub fn def(self) -> &'static KindDef {
        match self {
            ResourceKind::Vpc => &VPC,
            ResourceKind::Subnet => &SUBNET,
            ResourceKind::Secret => &SECRET,
            ResourceKind::Route => &ROUTE,
            ResourceKind::RouteTable => &ROUTE_TABLE,
            ResourceKind::Igw => &IGW,
            ResourceKind::Eip => &EIP,
            ResourceKind::Tgw => &TGW,
            ResourceKind::TgwRoute => &TGW_ROUTE,
            ResourceKind::TgwRouteTable => &TGW_ROUTE_TABLE,
            ResourceKind::SecurityGroup => &SECURITY_GROUP,
            ResourceKind::Ec2Instance => &EC2_INSTANCE,
            ResourceKind::Natgw => &NATGW,
        }
    }

    pub fn key(self) -> &'static str {
        self.def().key
    }

    /// All CLI tokens (for help text and autocomplete).
    pub fn all_keys() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.key()).collect()
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.key() == s)
            .ok_or_else(|| format!("unknown resource kind '{s}'"))
    }
}

static VPC: KindDef = KindDef {
    key: "vpc",
    display_name: "VPCs",
    collection_name: "vpcs",
    service: "ec2",
    list_action: "DescribeVpcs",
    response_path: "Vpcs",
    nested_items: None,
    id_field: "VpcId",
    name_field: None,
    id_filter: Some("VpcIds"),
    required_filter: None,
    columns: &[
        ColumnDef { header: "NAME", json_path: "_name", width: 28 },
        ColumnDef { header: "VPC ID", json_path: "VpcId", width: 22 },
        ColumnDef { header: "CIDR", json_path: "CidrBlock", width: 18 },
        ColumnDef { header: "STATE", json_path: "State", width: 10 },
        ColumnDef { header: "DEFAULT", json_path: "IsDefault", width: 8 },
    ],
};

static SUBNET: KindDef = KindDef {
    key: "subnet",
    display_name: "Subnets",
    collection_name: "subnets",
    service: "ec2",
    list_action: "DescribeSubnets",
    response_path: "Subnets",
    nested_items: None,
    id_field: "SubnetId",
    name_field: None,
    id_filter: Some("SubnetIds"),
    required_filter: None,
    columns: &[
        ColumnDef { header: "NAME", json_path: "_name", width: 28 },
        ColumnDef { header: "SUBNET ID", json_path: "SubnetId", width: 26 },
        ColumnDef { header: "VPC", json_path: "VpcId", width: 22 },
        ColumnDef { header: "CIDR", json_path: "CidrBlock", width: 18 },
        ColumnDef { header: "AZ", json_path: "AvailabilityZone", width: 15 },
        ColumnDef { header: "STATE", json_path: "State", width: 10 },
    ],
};

static SECRET: KindDef = KindDef {
    key: "secret",
    display_name: "Secrets",
    collection_name: "secrets",
    service: "secretsmanager",
    list_action: "ListSecrets",
    response_path: "SecretList",
    nested_items: None,
    id_field: "ARN",
    name_field: Some("Name"),
    id_filter: Some("SecretId"),
    required_filter: None,
    columns: &[
        ColumnDef { header: "NAME", json_path: "_name", width: 48 },
        ColumnDef { header: "DESCRIPTION", json_path: "Description", width: 40 },
        ColumnDef { header: "LAST CHANGED", json_path: "LastChangedDate", width: 20 },
    ],
};

// Routes have no standalone list API; they ride along inside their route
// table's record, so listing requires a RouteTableIds filter.
static ROUTE: KindDef = KindDef {
    key: "route",
    display_name: "Routes",
    collection_name: "routes",
    service: "ec2",
    list_action: "DescribeRouteTables",
    response_path: "RouteTables",
    nested_items: Some("Routes"),
    id_field: "DestinationCidrBlock",
    name_field: None,
    id_filter: None,
    required_filter: Some("RouteTableIds"),
    columns: &[
        ColumnDef { header: "DESTINATION", json_path: "DestinationCidrBlock", width: 20 },
        ColumnDef { header: "TARGET", json_path: "GatewayId", width: 24 },
        ColumnDef { header: "STATE", json_path: "State", width: 10 },
        ColumnDef { header: "ORIGIN", json_path: "Origin", width: 22 },
    ],
};

static ROUTE_TABLE: KindDef = KindDef {
    key: "route-table",
    display_name: "Route Tables",
    collection_name: "route_tables",
    service: "ec2",
    list_action: "DescribeRouteTables",
    response_path: "RouteTables",
    nested_items: None,
    id_field: "RouteTableId",
    name_field: None,
    id_filter: Some("RouteTableIds"),
    required_filter: None,
    columns: &[
        ColumnDef { header: "NAME", json_path: "_name", width: 28 },
        ColumnDef { header: "ROUTE TABLE ID", json_path: "RouteTableId", width: 24 },
        ColumnDef { header: "VPC", json_path: "VpcId", width: 22 },
    ],
};

static IGW: KindDef = KindDef {
    key: "igw",
    display_name: "Internet Gateways",
    collection_name: "igws",
    service: "ec2",
    list_action: "DescribeInternetGateways",
    response_path: "InternetGateways",
    nested_items: None,
    id_field: "InternetGatewayId",
    name_field: None,
    id_filter: Some("InternetGatewayIds"),
    required_filter: None,
    columns: &[
        ColumnDef { header: "NAME", json_path: "_name", width: 28 },
        ColumnDef { header: "IGW ID", json_path: "InternetGatewayId", width: 22 },
        ColumnDef { header: "VPC", json_path: "Attachments.0.VpcId", width: 22 },
    ],
};

static EIP: KindDef = KindDef {
    key: "eip",
    display_name: "Elastic IPs",
    collection_name: "eips",
    service: "ec2",
    list_action: "DescribeAddresses",
    response_path: "Addresses",
    nested_items: None,
    id_field: "AllocationId",
    name_field: None,
    id_filter: Some("AllocationIds"),
    required_filter: None,
    columns: &[
        ColumnDef { header: "NAME", json_path: "_name", width: 28 },
        ColumnDef { header: "ALLOCATION ID", json_path: "AllocationId", width: 26 },
        ColumnDef { header: "PUBLIC IP", json_path: "PublicIp", width: 16 },
        ColumnDef { header: "DOMAIN", json_path: "Domain", width: 8 },
        ColumnDef { header: "INSTANCE", json_path: "InstanceId", width: 20 },
    ],
};

static TGW: KindDef = KindDef {
    key: "tgw",
    display_name: "Transit Gateways",
    collection_name: "tgws",
    service: "ec2",
    list_action: "DescribeTransitGateways",
    response_path: "TransitGateways",
    nested_items: None,
    id_field: "TransitGatewayId",
    name_field: None,
    id_filter: Some("TransitGatewayIds"),
    required_filter: None,
    columns: &[
        ColumnDef { header: "NAME", json_path: "_name", width: 28 },
        ColumnDef { header: "TGW ID", json_path: "TransitGatewayId", width: 24 },
        ColumnDef { header: "STATE", json_path: "State", width: 12 },
        ColumnDef { header: "OWNER", json_path: "OwnerId", width: 14 },
    ],
};

static TGW_ROUTE: KindDef = KindDef {
    key: "tgw-route",
    display_name: "Transit Gateway Routes",
    collection_name: "tgw_routes",
    service: "ec2",
    list_action: "SearchTransitGatewayRoutes",
    response_path: "Routes",
    nested_items: None,
    id_field: "DestinationCidrBlock",
    name_field: None,
    id_filter: None,
    required_filter: Some("TransitGatewayRouteTableId"),
    columns: &[
        ColumnDef { header: "DESTINATION", json_path: "DestinationCidrBlock", width: 20 },
        ColumnDef { header: "TYPE", json_path: "Type", width: 12 },
        ColumnDef { header: "STATE", json_path: "State", width: 10 },
    ],
};

static TGW_ROUTE_TABLE: KindDef = KindDef {
    key: "tgw-route-table",
    display_name: "Transit Gateway Route Tables",
    collection_name: "tgw_route_tables",
    service: "ec2",
    list_action: "DescribeTransitGatewayRouteTables",
    response_path: "TransitGatewayRouteTables",
    nested_items: None,
    id_field: "TransitGatewayRouteTableId",
    name_field: None,
    id_filter: Some("TransitGatewayRouteTableIds"),
    required_filter: None,
    columns: &[
        ColumnDef { header: "NAME", json_path: "_name", width: 28 },
        ColumnDef { header: "TGW ROUTE TABLE ID", json_path: "TransitGatewayRouteTableId", width: 28 },
        ColumnDef { header: "TGW", json_path: "TransitGatewayId", width: 24 },
        ColumnDef { header: "STATE", json_path: "State", width: 12 },
    ],
};

static SECURITY_GROUP: KindDef = KindDef {
    key: "sg",
    display_name: "Security Groups",
    collection_name: "security_groups",
    service: "ec2",
    list_action: "DescribeSecurityGroups",
    response_path: "SecurityGroups",
    nested_items: None,
    id_field: "GroupId",
    name_field: Some("GroupName"),
    id_filter: Some("GroupIds"),
    required_filter: None,
    columns: &[
        ColumnDef { header: "NAME", json_path: "_name", width: 28 },
        ColumnDef { header: "GROUP ID", json_path: "GroupId", width: 22 },
        ColumnDef { header: "VPC", json_path: "VpcId", width: 22 },
        ColumnDef { header: "DESCRIPTION", json_path: "Description", width: 36 },
    ],
};

// DescribeInstances nests instances inside reservations.
static EC2_INSTANCE: KindDef = KindDef {
    key: "instance",
    display_name: "EC2 Instances",
    collection_name: "ec2_instances",
    service: "ec2",
    list_action: "DescribeInstances",
    response_path: "Reservations",
    nested_items: Some("Instances"),
    id_field: "InstanceId",
    name_field: None,
    id_filter: Some("InstanceIds"),
    required_filter: None,
    columns: &[
        ColumnDef { header: "NAME", json_path: "_name", width: 28 },
        ColumnDef { header: "INSTANCE ID", json_path: "InstanceId", width: 20 },
        ColumnDef { header: "TYPE", json_path: "InstanceType", width: 14 },
        ColumnDef { header: "STATE", json_path: "State.Name", width: 12 },
        ColumnDef { header: "PRIVATE IP", json_path: "PrivateIpAddress", width: 16 },
        ColumnDef { header: "AZ", json_path: "Placement.AvailabilityZone", width: 15 },
    ],
};

static NATGW: KindDef = KindDef {
    key: "natgw",
    display_name: "NAT Gateways",
    collection_name: "natgws",
    service: "ec2",
    list_action: "DescribeNatGateways",
    response_path: "NatGateways",
    nested_items: None,
    id_field: "NatGatewayId",
    name_field: None,
    id_filter: Some("NatGatewayIds"),
    required_filter: None,
    columns: &[
        ColumnDef { header: "NAME", json_path: "_name", width: 28 },
        ColumnDef { header: "NAT GW ID", json_path: "NatGatewayId", width: 22 },
        ColumnDef { header: "VPC", json_path: "VpcId", width: 22 },
        ColumnDef { header: "SUBNET", json_path: "SubnetId", width: 26 },
        ColumnDef { header: "STATE", json_path: "State", width: 10 },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_definition() {
        for kind in ResourceKind::ALL {
            let def = kind.def();
            assert!(!def.key.is_empty());
            assert!(!def.id_field.is_empty());
            assert!(!def.columns.is_empty(), "{kind} should declare columns");
        }
    }

    #[test]
    fn collection_names_are_unique() {
        let mut names: Vec<_> = ResourceKind::ALL.iter().map(|k| k.def().collection_name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ResourceKind::ALL.len());
    }

    #[test]
    fn kind_round_trips_through_its_key() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.key().parse::<ResourceKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!("bucket".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn extract_records_reads_the_response_path() {
        let body = serde_json::json!({ "Vpcs": [ {"VpcId": "vpc-1"}, {"VpcId": "vpc-2"} ] });
        let records = ResourceKind::Vpc.def().extract_records(&body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["VpcId"], "vpc-1");
    }

    #[test]
    fn extract_records_flattens_reservations() {
        let body = serde_json::json!({
            "Reservations": [
                { "ReservationId": "r-1", "Instances": [ {"InstanceId": "i-1"}, {"InstanceId": "i-2"} ] },
                { "ReservationId": "r-2", "Instances": [ {"InstanceId": "i-3"} ] },
            ]
        });
        let records = ResourceKind::Ec2Instance.def().extract_records(&body);
        assert_eq!(records.len(), 3);
        assert_eq!(records[2]["InstanceId"], "i-3");
    }

    #[test]
    fn extract_records_tolerates_missing_path() {
        let records = ResourceKind::Vpc.def().extract_records(&serde_json::json!({}));
        assert!(records.is_empty());
    }

    #[test]
    fn dependent_kinds_declare_their_parent_filter() {
        assert_eq!(ResourceKind::Route.def().required_filter, Some("RouteTableIds"));
        assert_eq!(
            ResourceKind::TgwRoute.def().required_filter,
            Some("TransitGatewayRouteTableId")
        );
    }
}
