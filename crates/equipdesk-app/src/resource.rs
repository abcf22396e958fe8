// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Equipment,
    Supplier,
    Maintenance,
    RepairHistory,
    User,
}

impl ResourceKind {
    pub const ALL: [Self; 5] = [
        Self::Equipment,
        Self::Supplier,
        Self::Maintenance,
        Self::RepairHistory,
        Self::User,
    ];

    /// Collection segment under `/api`.
    pub const fn collection_path(self) -> &'static str {
        match self {
            Self::Equipment => "equipments",
            Self::Supplier => "suppliers",
            Self::Maintenance => "maintenance",
            Self::RepairHistory => "repair-history",
            Self::User => "users",
        }
    }

    pub const fn noun(self) -> &'static str {
        match self {
            Self::Equipment => "equipment",
            Self::Supplier => "supplier",
            Self::Maintenance => "maintenance schedule",
            Self::RepairHistory => "repair record",
            Self::User => "user",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "equipment" | "equipments" => Some(Self::Equipment),
            "supplier" | "suppliers" => Some(Self::Supplier),
            "maintenance" | "maintenances" => Some(Self::Maintenance),
            "repair" | "repairs" | "repair-history" => Some(Self::RepairHistory),
            "user" | "users" => Some(Self::User),
            _ => None,
        }
    }
}

/// A backend-managed entity type that can be listed and mutated.
pub trait Resource: Clone {
    type Id: Copy + Eq + fmt::Debug + fmt::Display;
    type Input;

    const KIND: ResourceKind;

    fn id(&self) -> Self::Id;

    /// Human-readable name used by foreign-key lookups.
    fn label(&self) -> &str;

    /// Case-insensitive match for client-side filtering.
    fn matches(&self, needle: &str) -> bool;

    /// Fills server-assigned fields an echoed copy left out from the stored row.
    fn keep_server_fields(&mut self, _stored: &Self) {}
}

/// What a create/update call answered with.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationReply<R> {
    /// The server echoed the authoritative record.
    Record(R),
    /// The server only acknowledged the write.
    Acknowledged,
}

impl<R> MutationReply<R> {
    pub fn into_record(self) -> Option<R> {
        match self {
            Self::Record(record) => Some(record),
            Self::Acknowledged => None,
        }
    }
}

pub trait ResourceBackend<R: Resource> {
    fn list(&mut self) -> Result<Vec<R>>;
    fn create(&mut self, input: &R::Input) -> Result<MutationReply<R>>;
    fn update(&mut self, id: R::Id, input: &R::Input) -> Result<MutationReply<R>>;
    fn delete(&mut self, id: R::Id) -> Result<()>;
}
