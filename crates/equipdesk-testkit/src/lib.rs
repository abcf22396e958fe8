// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use equipdesk_app::{
    Equipment, EquipmentId, EquipmentInput, EquipmentStatus, MaintenanceId, MaintenanceInput,
    MaintenanceSchedule, MaintenanceStatus, MutationReply, RepairHistory, RepairId, RepairInput,
    Resource, ResourceBackend, Supplier, SupplierId, SupplierInput, User, UserId, UserInput,
    UserRole,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use time::{Date, Duration, Month, OffsetDateTime, Time};

const EQUIPMENT_NAMES: [&str; 12] = [
    "Printer",
    "Projector",
    "Laptop",
    "Scanner",
    "Router",
    "Server",
    "Monitor",
    "Copier",
    "Switch",
    "UPS",
    "Camera",
    "Workstation",
];

const EQUIPMENT_MODELS: [&str; 8] = ["X", "Pro", "Lite", "200", "S5", "Max", "Mini", "Plus"];

const SUPPLIER_PREFIXES: [&str; 8] = [
    "Phuong Nam", "Hoang Long", "Sao Viet", "Minh Anh", "Thanh Dat", "An Phat", "Viet Tin",
    "Dai Loc",
];
const SUPPLIER_SUFFIXES: [&str; 4] = ["Trading", "Technology", "Supply", "Solutions"];

const CITIES: [&str; 6] = ["Ha Noi", "Da Nang", "Hue", "Can Tho", "Hai Phong", "Nha Trang"];

const USERNAMES: [&str; 10] = [
    "linh", "minh", "trang", "duc", "hoa", "khanh", "nam", "quynh", "tuan", "vy",
];

const MAINTENANCE_TASKS: [&str; 8] = [
    "Replace toner",
    "Clean optics",
    "Firmware update",
    "Inspect power supply",
    "Replace fan",
    "Calibrate sensor",
    "Check cabling",
    "Lubricate rollers",
];

const REPAIR_ISSUES: [&str; 7] = [
    "Paper jam in feeder",
    "Overheating under load",
    "Dead pixel cluster",
    "Loose power connector",
    "Fan bearing noise",
    "Network port failure",
    "Cracked housing",
];

const REFERENCE_YEAR: i32 = 2026;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Deterministic records for tests and demos. Same seed, same data.
#[derive(Debug, Clone)]
pub struct DeskFaker {
    rng: DeterministicRng,
}

impl DeskFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn equipment(&mut self, id: i64) -> Equipment {
        let name = format!(
            "{} {}",
            self.pick(&EQUIPMENT_NAMES),
            self.pick(&EQUIPMENT_MODELS)
        );
        let status = EquipmentStatus::ALL[self.rng.int_n(EquipmentStatus::ALL.len())];
        let supplier_id = if self.rng.int_n(4) == 0 {
            None
        } else {
            Some(SupplierId::new(self.int_range(1, 5)))
        };
        Equipment {
            id: EquipmentId::new(id),
            name,
            price: (self.int_range(5, 500) * 100_000) as f64,
            status,
            purchase_date: Some(self.past_date(1825)),
            supplier_id,
            created_at: Some(reference_now()),
        }
    }

    pub fn supplier(&mut self, id: i64) -> Supplier {
        let prefix = self.pick(&SUPPLIER_PREFIXES);
        let name = format!("{prefix} {}", self.pick(&SUPPLIER_SUFFIXES));
        let slug: String = prefix
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        Supplier {
            id: SupplierId::new(id),
            name,
            phone: format!("09{:08}", self.int_range(0, 99_999_999)),
            email: format!("sales@{slug}.vn"),
            address: format!("{} {}", self.int_range(1, 400), self.pick(&CITIES)),
            created_at: Some(reference_now()),
        }
    }

    pub fn maintenance(&mut self, id: i64, equipment_id: EquipmentId) -> MaintenanceSchedule {
        let status = MaintenanceStatus::ALL[self.rng.int_n(MaintenanceStatus::ALL.len())];
        MaintenanceSchedule {
            id: MaintenanceId::new(id),
            equipment_id,
            description: self.pick(&MAINTENANCE_TASKS).to_owned(),
            scheduled_date: Some(self.past_date(365)),
            status,
            technician_id: None,
            created_at: Some(reference_now()),
        }
    }

    pub fn repair(&mut self, id: i64, maintenance_id: MaintenanceId) -> RepairHistory {
        RepairHistory {
            id: RepairId::new(id),
            maintenance_id,
            issue_description: self.pick(&REPAIR_ISSUES).to_owned(),
            repair_date: Some(self.past_date(365)),
            cost: (self.int_range(1, 80) * 50_000) as f64,
            technician_id: None,
            created_at: Some(reference_now()),
        }
    }

    pub fn user(&mut self, id: i64, role: UserRole) -> User {
        let username = format!("{}{}", self.pick(&USERNAMES), id);
        User {
            id: UserId::new(id),
            email: format!("{username}@equipdesk.test"),
            username,
            role,
            phone: format!("09{:08}", self.int_range(0, 99_999_999)),
            created_at: Some(reference_now()),
            updated_at: Some(reference_now()),
        }
    }

    pub fn equipments(&mut self, count: usize) -> Vec<Equipment> {
        (1..=count as i64).map(|id| self.equipment(id)).collect()
    }

    pub fn suppliers(&mut self, count: usize) -> Vec<Supplier> {
        (1..=count as i64).map(|id| self.supplier(id)).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }

    fn past_date(&mut self, window_days: i64) -> OffsetDateTime {
        let back = self.int_range(0, window_days.max(0));
        (reference_now() - Duration::days(back))
            .date()
            .midnight()
            .assume_utc()
    }
}

/// Builds a record from the payload a create/update would send.
pub trait Materialize: Resource {
    fn materialize(id: Self::Id, input: &Self::Input) -> Self;
}

impl Materialize for Equipment {
    fn materialize(id: EquipmentId, input: &EquipmentInput) -> Self {
        Self {
            id,
            name: input.name.clone(),
            price: input.price,
            status: input.status,
            purchase_date: input.purchase_date,
            supplier_id: input.supplier_id,
            created_at: None,
        }
    }
}

impl Materialize for Supplier {
    fn materialize(id: SupplierId, input: &SupplierInput) -> Self {
        Self {
            id,
            name: input.name.clone(),
            phone: input.phone.clone(),
            email: input.email.clone(),
            address: input.address.clone(),
            created_at: None,
        }
    }
}

impl Materialize for MaintenanceSchedule {
    fn materialize(id: MaintenanceId, input: &MaintenanceInput) -> Self {
        Self {
            id,
            equipment_id: input.equipment_id,
            description: input.description.clone(),
            scheduled_date: input.scheduled_date,
            status: input.status,
            technician_id: input.technician_id,
            created_at: None,
        }
    }
}

impl Materialize for RepairHistory {
    fn materialize(id: RepairId, input: &RepairInput) -> Self {
        Self {
            id,
            maintenance_id: input.maintenance_id,
            issue_description: input.issue_description.clone(),
            repair_date: input.repair_date,
            cost: input.cost,
            technician_id: input.technician_id,
            created_at: None,
        }
    }
}

impl Materialize for User {
    fn materialize(id: UserId, input: &UserInput) -> Self {
        Self {
            id,
            username: input.username.clone(),
            email: input.email.clone(),
            role: input.role,
            phone: input.phone.clone(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall<Id> {
    List,
    Create,
    Update(Id),
    Delete(Id),
}

/// How the fake answers successful creates and updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStyle {
    Record,
    Acknowledge,
}

/// Server-side collection held in memory, with scripted failures.
#[derive(Debug, Clone)]
pub struct InMemoryBackend<R: Resource> {
    records: Vec<R>,
    next_id: i64,
    reply: ReplyStyle,
    failures: VecDeque<String>,
    calls: Vec<BackendCall<R::Id>>,
}

impl<R> InMemoryBackend<R>
where
    R: Materialize,
    R::Id: From<i64>,
{
    pub fn new(records: Vec<R>) -> Self {
        let next_id = records.len() as i64 + 1;
        Self {
            records,
            next_id,
            reply: ReplyStyle::Record,
            failures: VecDeque::new(),
            calls: Vec::new(),
        }
    }

    pub fn with_reply(mut self, reply: ReplyStyle) -> Self {
        self.reply = reply;
        self
    }

    /// The next call of any kind fails with `message`.
    pub fn fail_next(&mut self, message: &str) {
        self.failures.push_back(message.to_owned());
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn calls(&self) -> &[BackendCall<R::Id>] {
        &self.calls
    }

    pub fn list_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BackendCall::List))
            .count()
    }

    fn take_failure(&mut self) -> Result<()> {
        if let Some(message) = self.failures.pop_front() {
            bail!("{message}");
        }
        Ok(())
    }

    fn reply_with(&self, record: R) -> MutationReply<R> {
        match self.reply {
            ReplyStyle::Record => MutationReply::Record(record),
            ReplyStyle::Acknowledge => MutationReply::Acknowledged,
        }
    }
}

impl<R> ResourceBackend<R> for InMemoryBackend<R>
where
    R: Materialize,
    R::Id: From<i64>,
{
    fn list(&mut self) -> Result<Vec<R>> {
        self.calls.push(BackendCall::List);
        self.take_failure()?;
        Ok(self.records.clone())
    }

    fn create(&mut self, input: &R::Input) -> Result<MutationReply<R>> {
        self.calls.push(BackendCall::Create);
        self.take_failure()?;
        let record = R::materialize(R::Id::from(self.next_id), input);
        self.next_id += 1;
        self.records.push(record.clone());
        Ok(self.reply_with(record))
    }

    fn update(&mut self, id: R::Id, input: &R::Input) -> Result<MutationReply<R>> {
        self.calls.push(BackendCall::Update(id));
        self.take_failure()?;
        let slot = self
            .records
            .iter_mut()
            .find(|record| record.id() == id)
            .with_context(|| format!("{} {id} not found", R::KIND.noun()))?;
        *slot = R::materialize(id, input);
        let record = slot.clone();
        Ok(self.reply_with(record))
    }

    fn delete(&mut self, id: R::Id) -> Result<()> {
        self.calls.push(BackendCall::Delete(id));
        self.take_failure()?;
        let before = self.records.len();
        self.records.retain(|record| record.id() != id);
        if self.records.len() == before {
            bail!("{} {id} not found", R::KIND.noun());
        }
        Ok(())
    }
}

pub fn temp_state_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("state.toml");
    Ok((dir, path))
}

pub fn reference_now() -> OffsetDateTime {
    midnight_utc(REFERENCE_YEAR, Month::January, 1)
}

fn midnight_utc(year: i32, month: Month, day: u8) -> OffsetDateTime {
    match Date::from_calendar_date(year, month, day) {
        Ok(date) => date.with_time(Time::MIDNIGHT).assume_utc(),
        Err(_) => OffsetDateTime::UNIX_EPOCH,
    }
}
