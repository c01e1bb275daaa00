//! Attribute table patches for Philips/Signify clusters.
//!
//! Hue motion sensors expose two manufacturer-specific sensitivity attributes
//! on the standard OccupancySensing cluster (0x0406), and Hue remotes need a
//! Philips attribute on the Basic cluster (0x0000) written during bind before
//! they start sending `notification` commands.

use crate::error::Result;
use async_trait::async_trait;
use log::{info, warn};
use std::collections::BTreeMap;
use strum::{Display, IntoStaticStr};

/// Zigbee Cluster ID for Basic
pub const BASIC_CLUSTER_ID: u16 = 0x0000;

/// Zigbee Cluster ID for OccupancySensing
pub const OCCUPANCY_SENSING_CLUSTER_ID: u16 = 0x0406;

/// Manufacturer code used for Philips-specific attribute access
pub const PHILIPS_MANUFACTURER_CODE: u16 = 0x100B;

/// Philips attribute on the Basic cluster
pub const PHILIPS_ATTRIBUTE_ID: u16 = 0x0031;

/// Value written to the Philips attribute during bind
pub const PHILIPS_ATTRIBUTE_CONFIG: u16 = 0x000B;

/// ZCL data types used by the patched tables.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum DataType {
    Uint8,
    Uint16,
    Enum8,
    Bitmap8,
    Bitmap16,
    CharacterString,
}

/// One attribute of a cluster's schema.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AttributeDef {
    pub id: u16,
    pub name: &'static str,
    pub data_type: DataType,
    pub is_manufacturer_specific: bool,
}

impl AttributeDef {
    pub const fn new(id: u16, name: &'static str, data_type: DataType) -> Self {
        Self {
            id,
            name,
            data_type,
            is_manufacturer_specific: false,
        }
    }

    pub const fn manufacturer_specific(id: u16, name: &'static str, data_type: DataType) -> Self {
        Self {
            id,
            name,
            data_type,
            is_manufacturer_specific: true,
        }
    }
}

/// Attribute schema of a cluster, keyed by attribute ID.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeTable {
    attributes: BTreeMap<u16, AttributeDef>,
}

impl AttributeTable {
    pub fn from_defs(defs: &[AttributeDef]) -> Self {
        Self {
            attributes: defs.iter().map(|def| (def.id, *def)).collect(),
        }
    }

    /// Return a copy of this table with `def` added or replaced.
    pub fn with(&self, def: AttributeDef) -> Self {
        let mut patched = self.clone();
        patched.attributes.insert(def.id, def);
        patched
    }

    pub fn get(&self, id: u16) -> Option<&AttributeDef> {
        self.attributes.get(&id)
    }

    pub fn by_name(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.values().find(|def| def.name == name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeDef> {
        self.attributes.values()
    }
}

const OCCUPANCY_SENSING_ATTRIBUTES: &[AttributeDef] = &[
    AttributeDef::new(0x0000, "occupancy", DataType::Bitmap8),
    AttributeDef::new(0x0001, "occupancy_sensor_type", DataType::Enum8),
    AttributeDef::new(0x0002, "occupancy_sensor_type_bitmap", DataType::Bitmap8),
    AttributeDef::new(0x0010, "pir_o_to_u_delay", DataType::Uint16),
    AttributeDef::new(0x0011, "pir_u_to_o_delay", DataType::Uint16),
    AttributeDef::new(0x0012, "pir_u_to_o_threshold", DataType::Uint8),
];

const BASIC_ATTRIBUTES: &[AttributeDef] = &[
    AttributeDef::new(0x0000, "zcl_version", DataType::Uint8),
    AttributeDef::new(0x0001, "app_version", DataType::Uint8),
    AttributeDef::new(0x0002, "stack_version", DataType::Uint8),
    AttributeDef::new(0x0003, "hw_version", DataType::Uint8),
    AttributeDef::new(0x0004, "manufacturer", DataType::CharacterString),
    AttributeDef::new(0x0005, "model", DataType::CharacterString),
    AttributeDef::new(0x0006, "date_code", DataType::CharacterString),
    AttributeDef::new(0x0007, "power_source", DataType::Enum8),
    AttributeDef::new(0x4000, "sw_build_id", DataType::CharacterString),
];

/// OccupancySensing attributes with the Philips sensitivity extension.
pub fn occupancy_sensing_attributes() -> AttributeTable {
    AttributeTable::from_defs(OCCUPANCY_SENSING_ATTRIBUTES)
        .with(AttributeDef::manufacturer_specific(
            0x0030,
            "sensitivity",
            DataType::Uint8,
        ))
        .with(AttributeDef::manufacturer_specific(
            0x0031,
            "sensitivity_max",
            DataType::Uint8,
        ))
}

/// Basic cluster attributes with the Philips configuration attribute.
pub fn basic_attributes() -> AttributeTable {
    AttributeTable::from_defs(BASIC_ATTRIBUTES).with(AttributeDef::manufacturer_specific(
        PHILIPS_ATTRIBUTE_ID,
        "philips",
        DataType::Bitmap16,
    ))
}

/// Typed attribute value for writes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AttributeValue {
    Uint8(u8),
    Uint16(u16),
    Bitmap16(u16),
}

impl AttributeValue {
    pub fn data_type(&self) -> DataType {
        match self {
            AttributeValue::Uint8(_) => DataType::Uint8,
            AttributeValue::Uint16(_) => DataType::Uint16,
            AttributeValue::Bitmap16(_) => DataType::Bitmap16,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WriteAttributeRecord {
    pub attribute: u16,
    pub value: AttributeValue,
}

/// ZCL status code.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ZclStatus(pub u8);

impl ZclStatus {
    pub const SUCCESS: ZclStatus = ZclStatus(0x00);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WriteAttributeStatus {
    pub attribute: u16,
    pub status: ZclStatus,
}

/// Cluster-level operations provided by the Zigbee stack.
#[async_trait]
pub trait ZclTransport: Send + Sync {
    /// Bind the cluster on the device to the coordinator.
    async fn bind(&self, cluster_id: u16) -> Result<ZclStatus>;

    /// Write attributes, optionally as manufacturer-specific.
    async fn write_attributes(
        &self,
        cluster_id: u16,
        records: &[WriteAttributeRecord],
        manufacturer: Option<u16>,
    ) -> Result<Vec<WriteAttributeStatus>>;
}

/// OccupancySensing cluster of Hue motion sensors.
pub struct PhilipsOccupancySensing {
    attributes: AttributeTable,
}

impl PhilipsOccupancySensing {
    pub const CLUSTER_ID: u16 = OCCUPANCY_SENSING_CLUSTER_ID;

    pub fn new() -> Self {
        Self {
            attributes: occupancy_sensing_attributes(),
        }
    }

    pub fn attributes(&self) -> &AttributeTable {
        &self.attributes
    }
}

impl Default for PhilipsOccupancySensing {
    fn default() -> Self {
        Self::new()
    }
}

/// Basic cluster of Hue remotes.
pub struct PhilipsBasicCluster {
    attributes: AttributeTable,
    attr_config: Vec<WriteAttributeRecord>,
}

impl PhilipsBasicCluster {
    pub const CLUSTER_ID: u16 = BASIC_CLUSTER_ID;

    pub fn new() -> Self {
        Self {
            attributes: basic_attributes(),
            attr_config: vec![WriteAttributeRecord {
                attribute: PHILIPS_ATTRIBUTE_ID,
                value: AttributeValue::Bitmap16(PHILIPS_ATTRIBUTE_CONFIG),
            }],
        }
    }

    pub fn attributes(&self) -> &AttributeTable {
        &self.attributes
    }

    /// Records written during bind.
    pub fn attr_config(&self) -> &[WriteAttributeRecord] {
        &self.attr_config
    }

    /// Bind the cluster, then write the Philips configuration attribute.
    ///
    /// Returns the bind status. Rejected attribute writes are logged but do
    /// not fail the bind; transport errors are propagated.
    pub async fn bind(&self, transport: &dyn ZclTransport) -> Result<ZclStatus> {
        let result = transport.bind(Self::CLUSTER_ID).await?;

        let statuses = transport
            .write_attributes(
                Self::CLUSTER_ID,
                &self.attr_config,
                Some(PHILIPS_MANUFACTURER_CODE),
            )
            .await?;

        for status in statuses.iter().filter(|s| !s.status.is_success()) {
            warn!(
                "[Hue] Basic cluster rejected write of 0x{:04X}: status 0x{:02X}",
                status.attribute, status.status.0
            );
        }

        info!(
            "[Hue] Basic cluster bound (status 0x{:02X}), Philips config written",
            result.0
        );
        Ok(result)
    }
}

impl Default for PhilipsBasicCluster {
    fn default() -> Self {
        Self::new()
    }
}
