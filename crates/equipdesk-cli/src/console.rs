// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use equipdesk_api::{ApiError, Client};
use equipdesk_app::format::{format_date, format_price};
use equipdesk_app::{
    Credentials, DeleteConfirmation, Equipment, EquipmentDraft, EquipmentId, FormModal,
    ListController, LoadMode, MaintenanceId, MaintenanceSchedule,
    MutationCoordinator, Registration, RepairHistory, RepairId, Resource, ResourceBackend,
    ResourceKind, SearchDetail, SearchKind, Supplier, SupplierId, User, UserId, lookup,
};
use std::io::Write;

use crate::state::StateFile;

/// Related collections used to turn foreign keys into names.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    pub suppliers: Vec<Supplier>,
    pub equipments: Vec<Equipment>,
    pub schedules: Vec<MaintenanceSchedule>,
    pub users: Vec<User>,
}

pub trait TableRow: Resource {
    const HEADERS: &'static [&'static str];

    fn cells(&self, lookups: &Lookups) -> Vec<String>;
}

impl TableRow for Equipment {
    const HEADERS: &'static [&'static str] =
        &["ID", "NAME", "PRICE", "STATUS", "PURCHASED", "SUPPLIER"];

    fn cells(&self, lookups: &Lookups) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            format_price(self.price),
            self.status.label().to_owned(),
            format_date(self.purchase_date),
            lookup::supplier_name(self.supplier_id, &lookups.suppliers).to_owned(),
        ]
    }
}

impl TableRow for Supplier {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "PHONE", "EMAIL", "ADDRESS"];

    fn cells(&self, _lookups: &Lookups) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.phone.clone(),
            self.email.clone(),
            self.address.clone(),
        ]
    }
}

impl TableRow for MaintenanceSchedule {
    const HEADERS: &'static [&'static str] = &[
        "ID",
        "EQUIPMENT",
        "DESCRIPTION",
        "SCHEDULED",
        "STATUS",
        "TECHNICIAN",
    ];

    fn cells(&self, lookups: &Lookups) -> Vec<String> {
        vec![
            self.id.to_string(),
            lookup::equipment_name(self.equipment_id, &lookups.equipments).to_owned(),
            self.description.clone(),
            format_date(self.scheduled_date),
            self.status.label().to_owned(),
            lookup::technician_name(self.technician_id, &lookups.users).to_owned(),
        ]
    }
}

impl TableRow for RepairHistory {
    const HEADERS: &'static [&'static str] =
        &["ID", "MAINTENANCE", "ISSUE", "DATE", "COST", "TECHNICIAN"];

    fn cells(&self, lookups: &Lookups) -> Vec<String> {
        vec![
            self.id.to_string(),
            lookup::maintenance_label(self.maintenance_id, &lookups.schedules).to_owned(),
            self.issue_description.clone(),
            format_date(self.repair_date),
            format_price(self.cost),
            lookup::technician_name(self.technician_id, &lookups.users).to_owned(),
        ]
    }
}

impl TableRow for User {
    const HEADERS: &'static [&'static str] = &["ID", "USERNAME", "EMAIL", "ROLE", "PHONE"];

    fn cells(&self, _lookups: &Lookups) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.username.clone(),
            self.email.clone(),
            self.role.as_str().to_owned(),
            self.phone.clone(),
        ]
    }
}

/// Left-aligned columns separated by two spaces, header first.
pub fn render_table<R: TableRow>(rows: &[&R], lookups: &Lookups) -> String {
    let cells: Vec<Vec<String>> = rows.iter().map(|row| row.cells(lookups)).collect();
    let mut widths: Vec<usize> = R::HEADERS
        .iter()
        .map(|header| header.chars().count())
        .collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, R::HEADERS.iter().copied(), &widths);
    for row in &cells {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    pub page: Option<usize>,
    pub rows: Option<usize>,
    pub filter: Option<String>,
}

pub struct Console<W: Write> {
    client: Client,
    state: StateFile,
    rows_per_page: usize,
    coordinator: MutationCoordinator,
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(client: Client, state: StateFile, rows_per_page: usize, out: W) -> Self {
        Self {
            client,
            state,
            rows_per_page,
            coordinator: MutationCoordinator::default(),
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<()> {
        self.client.login(&Credentials {
            email: email.trim().to_owned(),
            password: password.to_owned(),
        })?;
        self.state.set_token(self.client.session().token())?;
        writeln!(self.out, "logged in to {}", self.client.base_url())?;
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.client.logout();
        self.state.clear_token()?;
        writeln!(self.out, "logged out")?;
        Ok(())
    }

    pub fn register(&mut self, registration: &Registration) -> Result<()> {
        let message = self.client.register(registration)?;
        if message.is_empty() {
            writeln!(self.out, "registered {}", registration.username)?;
        } else {
            writeln!(self.out, "{message}")?;
        }
        Ok(())
    }

    pub fn set_rows(&mut self, rows: usize) -> Result<()> {
        self.state.set_rows_per_page(rows)?;
        self.rows_per_page = rows;
        writeln!(self.out, "showing {rows} rows per page")?;
        Ok(())
    }

    pub fn list(&mut self, kind: ResourceKind, args: &ListArgs) -> Result<()> {
        match kind {
            ResourceKind::Equipment => self.list_resource::<Equipment>(args),
            ResourceKind::Supplier => self.list_resource::<Supplier>(args),
            ResourceKind::Maintenance => self.list_resource::<MaintenanceSchedule>(args),
            ResourceKind::RepairHistory => self.list_resource::<RepairHistory>(args),
            ResourceKind::User => self.list_resource::<User>(args),
        }
    }

    fn list_resource<R>(&mut self, args: &ListArgs) -> Result<()>
    where
        R: TableRow,
        Client: ResourceBackend<R>,
    {
        let mut list = ListController::<R>::new(self.rows_per_page);
        if let Some(rows) = args.rows {
            list.set_rows_per_page(rows)?;
        }
        self.load(&mut list)?;
        if let Some(filter) = &args.filter {
            list.set_filter(filter);
        }
        if let Some(page) = args.page {
            list.set_page(page);
        }

        let lookups = self.lookups_for(R::KIND);
        let visible = list.visible();
        if visible.is_empty() {
            writeln!(self.out, "no {} records", R::KIND.noun())?;
            return Ok(());
        }
        write!(self.out, "{}", render_table(&visible, &lookups))?;
        writeln!(
            self.out,
            "page {} of {} ({} rows)",
            list.current_page(),
            list.total_pages(),
            list.row_count()
        )?;
        Ok(())
    }

    fn load<R>(&mut self, list: &mut ListController<R>) -> Result<()>
    where
        R: Resource,
        Client: ResourceBackend<R>,
    {
        list.try_load(&mut self.client, LoadMode::Reset).map(|_| ())
    }

    /// Missing lookups degrade to placeholders instead of failing the listing.
    fn lookups_for(&self, kind: ResourceKind) -> Lookups {
        let mut lookups = Lookups::default();
        match kind {
            ResourceKind::Equipment => {
                lookups.suppliers = best_effort("suppliers", self.client.list_suppliers());
            }
            ResourceKind::Maintenance => {
                lookups.equipments = best_effort("equipment", self.client.list_equipments());
                lookups.users = best_effort("technicians", self.client.list_technicians());
            }
            ResourceKind::RepairHistory => {
                lookups.schedules =
                    best_effort("maintenance schedules", self.client.list_maintenance());
                lookups.users = best_effort("technicians", self.client.list_technicians());
            }
            ResourceKind::Supplier | ResourceKind::User => {}
        }
        lookups
    }

    pub fn show(&mut self, kind: SearchKind, id: i64) -> Result<()> {
        match kind {
            SearchKind::Equipment => {
                let detail = self.client.get_equipment(EquipmentId::new(id))?;
                let suppliers = best_effort("suppliers", self.client.list_suppliers());
                let equipment = &detail.equipment;
                self.field("name", &equipment.name)?;
                self.field("price", &format_price(equipment.price))?;
                self.field("status", equipment.status.label())?;
                self.field("purchased", &format_date(equipment.purchase_date))?;
                self.field(
                    "supplier",
                    lookup::supplier_name(equipment.supplier_id, &suppliers),
                )?;
                let lookups = Lookups {
                    equipments: vec![equipment.clone()],
                    ..Lookups::default()
                };
                self.section("maintenance schedules", &detail.schedules, &lookups)
            }
            SearchKind::Supplier => {
                let detail = self.client.get_supplier(SupplierId::new(id))?;
                self.field("name", &detail.supplier.name)?;
                self.field("phone", &detail.supplier.phone)?;
                self.field("email", &detail.supplier.email)?;
                self.field("address", &detail.supplier.address)?;
                let lookups = Lookups {
                    suppliers: vec![detail.supplier.clone()],
                    ..Lookups::default()
                };
                self.section("equipment", &detail.equipments, &lookups)
            }
            SearchKind::Maintenance => {
                let detail = self.client.get_maintenance(MaintenanceId::new(id))?;
                let maintenance = &detail.maintenance;
                self.field("description", &maintenance.description)?;
                self.field("scheduled", &format_date(maintenance.scheduled_date))?;
                self.field("status", maintenance.status.label())?;
                let lookups = Lookups {
                    schedules: vec![maintenance.clone()],
                    ..Lookups::default()
                };
                self.section("repair history", &detail.history, &lookups)
            }
            SearchKind::Repair => {
                let Some(SearchDetail::Repair(repair)) =
                    self.client.search_detail(SearchKind::Repair, id)?
                else {
                    bail!("repair record {id} not found -- run `equipdesk search` to find its id");
                };
                self.field("issue", &repair.issue_description)?;
                self.field("date", &format_date(repair.repair_date))?;
                self.field("cost", &format_price(repair.cost))?;
                self.field("maintenance", &repair.maintenance_id.to_string())
            }
        }
    }

    fn field(&mut self, name: &str, value: &str) -> Result<()> {
        let value = if value.is_empty() { lookup::MISSING } else { value };
        writeln!(self.out, "{name:<12} {value}")?;
        Ok(())
    }

    fn section<R: TableRow>(&mut self, title: &str, rows: &[R], lookups: &Lookups) -> Result<()> {
        writeln!(self.out)?;
        if rows.is_empty() {
            writeln!(self.out, "no {title}")?;
            return Ok(());
        }
        writeln!(self.out, "{title}:")?;
        let rows: Vec<&R> = rows.iter().collect();
        write!(self.out, "{}", render_table(&rows, lookups))?;
        Ok(())
    }

    pub fn stats(&mut self) -> Result<()> {
        let stats = self.client.equipment_stats()?;
        writeln!(self.out, "{:<12} {}", "total", stats.total)?;
        writeln!(self.out, "{:<12} {}", "in use", stats.active)?;
        writeln!(self.out, "{:<12} {}", "maintenance", stats.maintenance)?;
        writeln!(self.out, "{:<12} {}", "broken", stats.inactive)?;
        Ok(())
    }

    pub fn search(&mut self, query: &str) -> Result<()> {
        let hits = self
            .client
            .search(query)
            .with_context(|| format!("search for {:?}", query.trim()))?;
        if hits.is_empty() {
            writeln!(self.out, "no matches for {:?}", query.trim())?;
            return Ok(());
        }
        for hit in hits {
            writeln!(
                self.out,
                "{:<12} {:>5}  {}  {}",
                hit.kind.as_str(),
                hit.id,
                hit.name,
                hit.route().path()
            )?;
        }
        Ok(())
    }

    pub fn add_equipment(&mut self, draft: EquipmentDraft) -> Result<()> {
        let mut list = ListController::<Equipment>::new(self.rows_per_page);
        self.load(&mut list)?;

        let mut form = FormModal::<EquipmentDraft>::default();
        form.open_add()?;
        if let Some(editable) = form.draft_mut() {
            *editable = draft;
        }
        let result = self
            .coordinator
            .submit(&mut self.client, &mut list, &mut form);
        self.report(result)
    }

    /// Asks `confirm` before deleting; a "no" leaves everything untouched.
    pub fn delete<F>(&mut self, kind: ResourceKind, id: i64, confirm: F) -> Result<()>
    where
        F: FnOnce(&str) -> Result<bool>,
    {
        match kind {
            ResourceKind::Equipment => {
                self.delete_resource::<Equipment, _>(EquipmentId::new(id), confirm)
            }
            ResourceKind::Supplier => {
                self.delete_resource::<Supplier, _>(SupplierId::new(id), confirm)
            }
            ResourceKind::Maintenance => {
                self.delete_resource::<MaintenanceSchedule, _>(MaintenanceId::new(id), confirm)
            }
            ResourceKind::RepairHistory => {
                self.delete_resource::<RepairHistory, _>(RepairId::new(id), confirm)
            }
            ResourceKind::User => self.delete_resource::<User, _>(UserId::new(id), confirm),
        }
    }

    fn delete_resource<R, F>(&mut self, id: R::Id, confirm: F) -> Result<()>
    where
        R: Resource,
        Client: ResourceBackend<R>,
        F: FnOnce(&str) -> Result<bool>,
    {
        let noun = R::KIND.noun();
        let mut list = ListController::<R>::new(self.rows_per_page);
        self.load(&mut list)?;
        let Some(record) = list.find(id) else {
            bail!(
                "{noun} {id} not found -- run `equipdesk list {}` to see current ids",
                R::KIND.collection_path()
            );
        };
        let prompt = format!("delete {noun} {id} ({})?", record.label());

        let mut confirmation = DeleteConfirmation::default();
        confirmation.open(id);
        if !confirm(&prompt)? {
            confirmation.cancel();
        }
        let Some(confirmed) = confirmation.accept() else {
            writeln!(self.out, "cancelled; {noun} {id} was not deleted")?;
            return Ok(());
        };
        let result = self.coordinator.delete(&mut self.client, &mut list, confirmed);
        self.report(result)
    }

    /// Prints queued notices on success. On failure the error carries the
    /// message already.
    fn report(&mut self, result: Result<()>) -> Result<()> {
        let notices = self.coordinator.take_notices();
        result?;
        for notice in notices {
            writeln!(self.out, "{}: {}", notice.level.as_str(), notice.message)?;
        }
        Ok(())
    }
}

/// True when the failure traces back to a rejected or missing session.
pub fn needs_login(error: &anyhow::Error) -> bool {
    error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<ApiError>())
        .any(ApiError::is_unauthorized)
}

fn best_effort<T, E: std::fmt::Display>(what: &str, result: Result<Vec<T>, E>) -> Vec<T> {
    result.unwrap_or_else(|error| {
        tracing::warn!(lookup = what, error = %error, "lookup unavailable; showing placeholders");
        Vec::new()
    })
}
