// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use time::OffsetDateTime;

use crate::format::date_input_value;
use crate::model::{
    Equipment, EquipmentInput, EquipmentStatus, MaintenanceInput, MaintenanceSchedule,
    MaintenanceStatus, RepairHistory, RepairInput, Supplier, SupplierInput, User, UserInput,
    UserRole, wire_time,
};
use crate::resource::Resource;

pub type IdOf<D> = <<D as Draft>::Record as Resource>::Id;
pub type InputOf<D> = <<D as Draft>::Record as Resource>::Input;

/// Raw form text for one resource, turned into a wire payload on submit.
pub trait Draft: Clone + Default {
    type Record: Resource;

    fn from_record(record: &Self::Record) -> Self;

    /// Coerces and validates the raw fields.
    fn normalize(&self) -> Result<InputOf<Self>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode<Id> {
    Add,
    Edit(Id),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState<Id> {
    Closed,
    Open(FormMode<Id>),
    Submitting(FormMode<Id>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission<Id, Input> {
    pub mode: FormMode<Id>,
    pub input: Input,
}

#[derive(Debug, Clone)]
pub struct FormModal<D: Draft> {
    state: ModalState<IdOf<D>>,
    draft: D,
    error: Option<String>,
}

impl<D: Draft> Default for FormModal<D> {
    fn default() -> Self {
        Self {
            state: ModalState::Closed,
            draft: D::default(),
            error: None,
        }
    }
}

impl<D: Draft> FormModal<D> {
    pub fn state(&self) -> ModalState<IdOf<D>> {
        self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, ModalState::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, ModalState::Submitting(_))
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    /// Editable only while open and idle.
    pub fn draft_mut(&mut self) -> Option<&mut D> {
        match self.state {
            ModalState::Open(_) => Some(&mut self.draft),
            ModalState::Closed | ModalState::Submitting(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn open_add(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.draft = D::default();
        self.error = None;
        self.state = ModalState::Open(FormMode::Add);
        Ok(())
    }

    pub fn open_edit(&mut self, record: &D::Record) -> Result<()> {
        self.ensure_idle()?;
        self.draft = D::from_record(record);
        self.error = None;
        self.state = ModalState::Open(FormMode::Edit(record.id()));
        Ok(())
    }

    pub fn cancel(&mut self) -> bool {
        match self.state {
            ModalState::Open(_) => {
                self.close();
                true
            }
            ModalState::Closed | ModalState::Submitting(_) => false,
        }
    }

    /// Moves `Open -> Submitting` and returns the normalized payload. A
    /// validation failure keeps the form open with the error recorded.
    pub fn begin_submit(&mut self) -> Result<Submission<IdOf<D>, InputOf<D>>> {
        let mode = match self.state {
            ModalState::Open(mode) => mode,
            ModalState::Submitting(_) => bail!("form is already submitting -- wait for it to finish"),
            ModalState::Closed => bail!("no form is open"),
        };
        match self.draft.normalize() {
            Ok(input) => {
                self.error = None;
                self.state = ModalState::Submitting(mode);
                Ok(Submission { mode, input })
            }
            Err(error) => {
                self.error = Some(format!("{error:#}"));
                Err(error)
            }
        }
    }

    /// Closes on success; on failure reopens with the draft untouched.
    pub fn finish_submit(&mut self, outcome: Result<(), String>) {
        let ModalState::Submitting(mode) = self.state else {
            return;
        };
        match outcome {
            Ok(()) => self.close(),
            Err(message) => {
                self.error = Some(message);
                self.state = ModalState::Open(mode);
            }
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.is_submitting() {
            bail!("form is already submitting -- wait for it to finish");
        }
        Ok(())
    }

    fn close(&mut self) {
        self.state = ModalState::Closed;
        self.draft = D::default();
        self.error = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentDraft {
    pub name: String,
    pub price: String,
    pub status: EquipmentStatus,
    pub purchase_date: String,
    pub supplier_id: String,
}

impl Default for EquipmentDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            price: String::new(),
            status: EquipmentStatus::Active,
            purchase_date: String::new(),
            supplier_id: String::new(),
        }
    }
}

impl Draft for EquipmentDraft {
    type Record = Equipment;

    fn from_record(record: &Equipment) -> Self {
        Self {
            name: record.name.clone(),
            price: record.price.to_string(),
            status: record.status,
            purchase_date: date_input_value(record.purchase_date),
            supplier_id: optional_id_text(record.supplier_id.map(|id| id.get())),
        }
    }

    fn normalize(&self) -> Result<EquipmentInput> {
        let name = required_text(&self.name, "equipment name")?;
        let price = parse_amount(&self.price, "equipment price")?;
        if price <= 0.0 {
            bail!("equipment price must be positive");
        }
        Ok(EquipmentInput {
            name,
            price,
            status: self.status,
            purchase_date: parse_optional_date(&self.purchase_date, "purchase date")?,
            supplier_id: parse_optional_id(&self.supplier_id, "supplier")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplierDraft {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

impl Draft for SupplierDraft {
    type Record = Supplier;

    fn from_record(record: &Supplier) -> Self {
        Self {
            name: record.name.clone(),
            phone: record.phone.clone(),
            email: record.email.clone(),
            address: record.address.clone(),
        }
    }

    fn normalize(&self) -> Result<SupplierInput> {
        let email = self.email.trim().to_owned();
        if !email.is_empty() && !email.contains('@') {
            bail!("supplier email {email:?} is not an email address");
        }
        Ok(SupplierInput {
            name: required_text(&self.name, "supplier name")?,
            phone: self.phone.trim().to_owned(),
            email,
            address: self.address.trim().to_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceDraft {
    pub equipment_id: String,
    pub description: String,
    pub scheduled_date: String,
    pub status: MaintenanceStatus,
    pub technician_id: String,
}

impl Default for MaintenanceDraft {
    fn default() -> Self {
        Self {
            equipment_id: String::new(),
            description: String::new(),
            scheduled_date: String::new(),
            status: MaintenanceStatus::Pending,
            technician_id: String::new(),
        }
    }
}

impl Draft for MaintenanceDraft {
    type Record = MaintenanceSchedule;

    fn from_record(record: &MaintenanceSchedule) -> Self {
        Self {
            equipment_id: record.equipment_id.to_string(),
            description: record.description.clone(),
            scheduled_date: date_input_value(record.scheduled_date),
            status: record.status,
            technician_id: optional_id_text(record.technician_id.map(|id| id.get())),
        }
    }

    fn normalize(&self) -> Result<MaintenanceInput> {
        let Some(equipment_id) = parse_optional_id(&self.equipment_id, "equipment")? else {
            bail!("maintenance equipment is required -- choose equipment and retry");
        };
        Ok(MaintenanceInput {
            equipment_id,
            description: required_text(&self.description, "maintenance description")?,
            scheduled_date: parse_optional_date(&self.scheduled_date, "scheduled date")?,
            status: self.status,
            technician_id: parse_optional_id(&self.technician_id, "technician")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairDraft {
    pub maintenance_id: String,
    pub issue_description: String,
    pub repair_date: String,
    pub cost: String,
    pub technician_id: String,
}

impl Draft for RepairDraft {
    type Record = RepairHistory;

    fn from_record(record: &RepairHistory) -> Self {
        Self {
            maintenance_id: record.maintenance_id.to_string(),
            issue_description: record.issue_description.clone(),
            repair_date: date_input_value(record.repair_date),
            cost: record.cost.to_string(),
            technician_id: optional_id_text(record.technician_id.map(|id| id.get())),
        }
    }

    fn normalize(&self) -> Result<RepairInput> {
        let Some(maintenance_id) = parse_optional_id(&self.maintenance_id, "maintenance")? else {
            bail!("repair maintenance is required -- choose a maintenance schedule and retry");
        };
        let cost = if self.cost.trim().is_empty() {
            0.0
        } else {
            parse_amount(&self.cost, "repair cost")?
        };
        if cost < 0.0 {
            bail!("repair cost cannot be negative");
        }
        Ok(RepairInput {
            maintenance_id,
            issue_description: required_text(&self.issue_description, "issue description")?,
            repair_date: parse_optional_date(&self.repair_date, "repair date")?,
            cost,
            technician_id: parse_optional_id(&self.technician_id, "technician")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub phone: String,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            role: UserRole::Viewer,
            phone: String::new(),
        }
    }
}

impl Draft for UserDraft {
    type Record = User;

    fn from_record(record: &User) -> Self {
        Self {
            username: record.username.clone(),
            email: record.email.clone(),
            role: record.role,
            phone: record.phone.clone(),
        }
    }

    fn normalize(&self) -> Result<UserInput> {
        let email = required_text(&self.email, "user email")?;
        if !email.contains('@') {
            bail!("user email {email:?} is not an email address");
        }
        Ok(UserInput {
            username: required_text(&self.username, "username")?,
            email,
            role: self.role,
            phone: self.phone.trim().to_owned(),
        })
    }
}

fn required_text(raw: &str, field: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        bail!("{field} is required -- enter a value and retry");
    }
    Ok(value.to_owned())
}

fn parse_amount(raw: &str, field: &str) -> Result<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ',' | '_' | ' '))
        .collect();
    let value = cleaned
        .parse::<f64>()
        .with_context(|| format!("{field} {raw:?} is not a number"))?;
    if !value.is_finite() {
        bail!("{field} {raw:?} is not a number");
    }
    Ok(value)
}

fn parse_optional_date(raw: &str, field: &str) -> Result<Option<OffsetDateTime>> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match wire_time::parse(value) {
        Some(parsed) => Ok(Some(parsed)),
        None => bail!("{field} {value:?} must be YYYY-MM-DD"),
    }
}

fn parse_optional_id<Id: From<i64>>(raw: &str, field: &str) -> Result<Option<Id>> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let id = value
        .parse::<i64>()
        .with_context(|| format!("{field} id {value:?} is not a number"))?;
    if id <= 0 {
        bail!("{field} id must be positive");
    }
    Ok(Some(Id::from(id)))
}

fn optional_id_text(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{
        Draft, EquipmentDraft, FormModal, FormMode, MaintenanceDraft, ModalState, RepairDraft,
        SupplierDraft, UserDraft,
    };
    use crate::model::{Equipment, EquipmentStatus};
    use crate::{EquipmentId, MaintenanceId, SupplierId};
    use time::macros::datetime;

    fn printer_draft() -> EquipmentDraft {
        EquipmentDraft {
            name: " Printer X ".to_owned(),
            price: "1500000".to_owned(),
            status: EquipmentStatus::Active,
            purchase_date: "2024-01-10".to_owned(),
            supplier_id: "3".to_owned(),
        }
    }

    fn printer() -> Equipment {
        Equipment {
            id: EquipmentId::new(11),
            name: "Printer X".to_owned(),
            price: 1_500_000.0,
            status: EquipmentStatus::Active,
            purchase_date: Some(datetime!(2024-01-10 0:00 UTC)),
            supplier_id: Some(SupplierId::new(3)),
            created_at: None,
        }
    }

    #[test]
    fn equipment_draft_normalizes_numbers_dates_and_keys() {
        let input = printer_draft().normalize().expect("valid draft");
        assert_eq!(input.name, "Printer X");
        assert_eq!(input.price, 1_500_000.0);
        assert_eq!(input.purchase_date, Some(datetime!(2024-01-10 0:00 UTC)));
        assert_eq!(input.supplier_id, Some(SupplierId::new(3)));

        let blank_supplier = EquipmentDraft {
            supplier_id: "  ".to_owned(),
            ..printer_draft()
        };
        let input = blank_supplier.normalize().expect("valid draft");
        assert_eq!(input.supplier_id, None);
    }

    #[test]
    fn equipment_draft_rejects_bad_values() {
        for draft in [
            EquipmentDraft {
                name: String::new(),
                ..printer_draft()
            },
            EquipmentDraft {
                price: "0".to_owned(),
                ..printer_draft()
            },
            EquipmentDraft {
                price: "cheap".to_owned(),
                ..printer_draft()
            },
            EquipmentDraft {
                purchase_date: "10/01/2024".to_owned(),
                ..printer_draft()
            },
            EquipmentDraft {
                supplier_id: "-2".to_owned(),
                ..printer_draft()
            },
        ] {
            assert!(draft.normalize().is_err(), "draft {draft:?}");
        }
    }

    #[test]
    fn edit_draft_prefills_from_record() {
        let draft = EquipmentDraft::from_record(&printer());
        assert_eq!(draft.name, "Printer X");
        assert_eq!(draft.price, "1500000");
        assert_eq!(draft.purchase_date, "2024-01-10");
        assert_eq!(draft.supplier_id, "3");
    }

    #[test]
    fn maintenance_draft_requires_equipment() {
        let draft = MaintenanceDraft {
            description: "Replace toner".to_owned(),
            ..MaintenanceDraft::default()
        };
        let err = draft.normalize().expect_err("missing equipment");
        assert!(err.to_string().contains("equipment is required"));

        let draft = MaintenanceDraft {
            equipment_id: "5".to_owned(),
            ..draft
        };
        let input = draft.normalize().expect("valid draft");
        assert_eq!(input.equipment_id, EquipmentId::new(5));
        assert_eq!(input.technician_id, None);
    }

    #[test]
    fn repair_draft_allows_zero_cost_but_not_negative() {
        let draft = RepairDraft {
            maintenance_id: "7".to_owned(),
            issue_description: "Jammed feeder".to_owned(),
            ..RepairDraft::default()
        };
        let input = draft.normalize().expect("valid draft");
        assert_eq!(input.cost, 0.0);
        assert_eq!(input.maintenance_id, MaintenanceId::new(7));

        let negative = RepairDraft {
            cost: "-1".to_owned(),
            ..draft
        };
        assert!(negative.normalize().is_err());
    }

    #[test]
    fn supplier_and_user_drafts_check_email() {
        let supplier = SupplierDraft {
            name: "Acme".to_owned(),
            email: "sales".to_owned(),
            ..SupplierDraft::default()
        };
        assert!(supplier.normalize().is_err());

        let user = UserDraft {
            username: "linh".to_owned(),
            email: "linh@example.com".to_owned(),
            ..UserDraft::default()
        };
        assert!(user.normalize().is_ok());
    }

    #[test]
    fn modal_add_submit_success_closes() {
        let mut modal = FormModal::<EquipmentDraft>::default();
        modal.open_add().expect("open add");
        assert_eq!(modal.state(), ModalState::Open(FormMode::Add));

        *modal.draft_mut().expect("draft editable") = printer_draft();
        let submission = modal.begin_submit().expect("valid submission");
        assert_eq!(submission.mode, FormMode::Add);
        assert!(modal.is_submitting());
        assert!(modal.draft_mut().is_none());

        modal.finish_submit(Ok(()));
        assert_eq!(modal.state(), ModalState::Closed);
        assert_eq!(modal.draft(), &EquipmentDraft::default());
    }

    #[test]
    fn modal_refuses_second_submit() {
        let mut modal = FormModal::<EquipmentDraft>::default();
        modal.open_add().expect("open add");
        *modal.draft_mut().expect("draft editable") = printer_draft();
        modal.begin_submit().expect("first submit");

        assert!(modal.begin_submit().is_err());
        assert!(modal.open_add().is_err());
        assert!(!modal.cancel());
    }

    #[test]
    fn modal_failure_reopens_with_last_values() {
        let mut modal = FormModal::<EquipmentDraft>::default();
        modal.open_edit(&printer()).expect("open edit");
        assert_eq!(
            modal.state(),
            ModalState::Open(FormMode::Edit(EquipmentId::new(11)))
        );

        modal.draft_mut().expect("draft editable").name = "Printer Y".to_owned();
        modal.begin_submit().expect("valid submission");
        modal.finish_submit(Err("server said no".to_owned()));

        assert_eq!(
            modal.state(),
            ModalState::Open(FormMode::Edit(EquipmentId::new(11)))
        );
        assert_eq!(modal.draft().name, "Printer Y");
        assert_eq!(modal.error(), Some("server said no"));
    }

    #[test]
    fn modal_validation_failure_stays_open() {
        let mut modal = FormModal::<EquipmentDraft>::default();
        modal.open_add().expect("open add");
        assert!(modal.begin_submit().is_err());
        assert_eq!(modal.state(), ModalState::Open(FormMode::Add));
        assert!(modal.error().is_some_and(|error| error.contains("required")));

        assert!(modal.cancel());
        assert!(!modal.is_open());
    }
}
