// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::model::{Equipment, MaintenanceSchedule, RepairHistory, Supplier};
use crate::{EquipmentId, MaintenanceId, RepairId, SupplierId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Equipment,
    Maintenance,
    Repair,
    Supplier,
}

impl SearchKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equipment => "equipment",
            Self::Maintenance => "maintenance",
            Self::Repair => "repair",
            Self::Supplier => "supplier",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "equipment" => Some(Self::Equipment),
            "maintenance" => Some(Self::Maintenance),
            "repair" => Some(Self::Repair),
            "supplier" => Some(Self::Supplier),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SearchKind,
}

impl SearchHit {
    pub fn route(&self) -> DetailRoute {
        match self.kind {
            SearchKind::Equipment => DetailRoute::Equipment(EquipmentId::new(self.id)),
            SearchKind::Maintenance => DetailRoute::Maintenance(MaintenanceId::new(self.id)),
            SearchKind::Repair => DetailRoute::Repair(RepairId::new(self.id)),
            SearchKind::Supplier => DetailRoute::Supplier(SupplierId::new(self.id)),
        }
    }
}

/// Where selecting a search hit navigates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailRoute {
    Equipment(EquipmentId),
    Maintenance(MaintenanceId),
    Repair(RepairId),
    Supplier(SupplierId),
}

impl DetailRoute {
    pub fn path(self) -> String {
        match self {
            Self::Equipment(id) => format!("/equipments/{id}"),
            Self::Maintenance(id) => format!("/maintenance/{id}"),
            Self::Repair(id) => format!("/repair/{id}"),
            Self::Supplier(id) => format!("/suppliers/{id}"),
        }
    }
}

/// Body of a detail lookup by search kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchDetail {
    Equipment(Equipment),
    Maintenance(MaintenanceSchedule),
    Repair(RepairHistory),
    Supplier(Supplier),
}

impl SearchDetail {
    pub fn kind(&self) -> SearchKind {
        match self {
            Self::Equipment(_) => SearchKind::Equipment,
            Self::Maintenance(_) => SearchKind::Maintenance,
            Self::Repair(_) => SearchKind::Repair,
            Self::Supplier(_) => SearchKind::Supplier,
        }
    }
}
