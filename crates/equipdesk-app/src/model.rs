// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

use crate::ids::*;
use crate::resource::{Resource, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    Active,
    Maintenance,
    Inactive,
}

impl EquipmentStatus {
    pub const ALL: [Self; 3] = [Self::Active, Self::Maintenance, Self::Inactive];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Maintenance => "maintenance",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "maintenance" => Some(Self::Maintenance),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "in use",
            Self::Maintenance => "under maintenance",
            Self::Inactive => "broken",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Pending,
    #[serde(alias = "in progress")]
    InProgress,
    Completed,
    #[serde(alias = "cancelled")]
    Canceled,
}

impl MaintenanceStatus {
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Canceled,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "in_progress" | "in progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "canceled" | "cancelled" => Some(Self::Canceled),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Technician,
    Viewer,
}

impl UserRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Technician => "technician",
            Self::Viewer => "viewer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "technician" => Some(Self::Technician),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: EquipmentId,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    pub status: EquipmentStatus,
    #[serde(default, with = "wire_time")]
    pub purchase_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
    #[serde(default, with = "wire_time", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,
    #[serde(default, with = "wire_time", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceSchedule {
    pub id: MaintenanceId,
    pub equipment_id: EquipmentId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, with = "wire_time")]
    pub scheduled_date: Option<OffsetDateTime>,
    pub status: MaintenanceStatus,
    #[serde(default)]
    pub technician_id: Option<UserId>,
    #[serde(default, with = "wire_time", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairHistory {
    pub id: RepairId,
    pub maintenance_id: MaintenanceId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub issue_description: String,
    #[serde(default, with = "wire_time")]
    pub repair_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub technician_id: Option<UserId>,
    #[serde(default, with = "wire_time", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    pub role: UserRole,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default, with = "wire_time")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "wire_time")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentDetail {
    pub equipment: Equipment,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub schedules: Vec<MaintenanceSchedule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierDetail {
    #[serde(flatten)]
    pub supplier: Supplier,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub equipments: Vec<Equipment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceDetail {
    pub maintenance: MaintenanceSchedule,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub history: Vec<RepairHistory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EquipmentStats {
    pub total: u64,
    pub active: u64,
    pub maintenance: u64,
    pub inactive: u64,
}

impl EquipmentStats {
    pub fn from_counts(counts: &[StatusCount]) -> Self {
        let count_for = |status: EquipmentStatus| -> u64 {
            counts
                .iter()
                .filter(|row| EquipmentStatus::parse(&row.status) == Some(status))
                .map(|row| row.count)
                .sum()
        };
        Self {
            total: counts.iter().map(|row| row.count).sum(),
            active: count_for(EquipmentStatus::Active),
            maintenance: count_for(EquipmentStatus::Maintenance),
            inactive: count_for(EquipmentStatus::Inactive),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentInput {
    pub name: String,
    pub price: f64,
    pub status: EquipmentStatus,
    #[serde(with = "wire_time")]
    pub purchase_date: Option<OffsetDateTime>,
    pub supplier_id: Option<SupplierId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupplierInput {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceInput {
    pub equipment_id: EquipmentId,
    pub description: String,
    #[serde(with = "wire_time")]
    pub scheduled_date: Option<OffsetDateTime>,
    pub status: MaintenanceStatus,
    #[serde(serialize_with = "id_or_zero")]
    pub technician_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepairInput {
    pub maintenance_id: MaintenanceId,
    pub issue_description: String,
    #[serde(with = "wire_time")]
    pub repair_date: Option<OffsetDateTime>,
    pub cost: f64,
    pub technician_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInput {
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

impl Resource for Equipment {
    type Id = EquipmentId;
    type Input = EquipmentInput;
    const KIND: ResourceKind = ResourceKind::Equipment;

    fn id(&self) -> EquipmentId {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn matches(&self, needle: &str) -> bool {
        contains_folded(&self.name, needle) || contains_folded(self.status.as_str(), needle)
    }

    fn keep_server_fields(&mut self, stored: &Self) {
        self.created_at = self.created_at.or(stored.created_at);
    }
}

impl Resource for Supplier {
    type Id = SupplierId;
    type Input = SupplierInput;
    const KIND: ResourceKind = ResourceKind::Supplier;

    fn id(&self) -> SupplierId {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn matches(&self, needle: &str) -> bool {
        [&self.name, &self.phone, &self.email, &self.address]
            .into_iter()
            .any(|field| contains_folded(field, needle))
    }

    fn keep_server_fields(&mut self, stored: &Self) {
        self.created_at = self.created_at.or(stored.created_at);
    }
}

impl Resource for MaintenanceSchedule {
    type Id = MaintenanceId;
    type Input = MaintenanceInput;
    const KIND: ResourceKind = ResourceKind::Maintenance;

    fn id(&self) -> MaintenanceId {
        self.id
    }

    fn label(&self) -> &str {
        &self.description
    }

    fn matches(&self, needle: &str) -> bool {
        contains_folded(&self.description, needle)
            || contains_folded(self.status.as_str(), needle)
    }

    fn keep_server_fields(&mut self, stored: &Self) {
        self.created_at = self.created_at.or(stored.created_at);
    }
}

impl Resource for RepairHistory {
    type Id = RepairId;
    type Input = RepairInput;
    const KIND: ResourceKind = ResourceKind::RepairHistory;

    fn id(&self) -> RepairId {
        self.id
    }

    fn label(&self) -> &str {
        &self.issue_description
    }

    fn matches(&self, needle: &str) -> bool {
        contains_folded(&self.issue_description, needle)
    }

    fn keep_server_fields(&mut self, stored: &Self) {
        self.created_at = self.created_at.or(stored.created_at);
    }
}

impl Resource for User {
    type Id = UserId;
    type Input = UserInput;
    const KIND: ResourceKind = ResourceKind::User;

    fn id(&self) -> UserId {
        self.id
    }

    fn label(&self) -> &str {
        &self.username
    }

    fn matches(&self, needle: &str) -> bool {
        contains_folded(&self.username, needle)
            || contains_folded(&self.email, needle)
            || contains_folded(self.role.as_str(), needle)
    }

    fn keep_server_fields(&mut self, stored: &Self) {
        self.created_at = self.created_at.or(stored.created_at);
        self.updated_at = self.updated_at.or(stored.updated_at);
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn id_or_zero<S>(value: &Option<UserId>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(value.map_or(0, UserId::get))
}

/// Timestamps as the backend writes them: RFC 3339, with `0001-01-01` meaning unset.
pub mod wire_time {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;
    use time::macros::format_description;

    pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => {
                let formatted = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse(raw)
                .map(|parsed| Some(parsed).filter(|parsed| parsed.year() > 1))
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {raw:?}"))),
        }
    }

    /// Accepts full RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
    pub fn parse(raw: &str) -> Option<OffsetDateTime> {
        if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
            return Some(parsed);
        }
        let date = time::Date::parse(raw, format_description!("[year]-[month]-[day]")).ok()?;
        Some(date.midnight().assume_utc())
    }
}
