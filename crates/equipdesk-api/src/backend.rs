// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use equipdesk_app::{
    Equipment, EquipmentId, EquipmentInput, MaintenanceId, MaintenanceInput, MaintenanceSchedule,
    MutationReply, RepairHistory, RepairId, RepairInput, ResourceBackend, Supplier, SupplierId,
    SupplierInput, User, UserId, UserInput,
};

use crate::Client;

impl ResourceBackend<Equipment> for Client {
    fn list(&mut self) -> Result<Vec<Equipment>> {
        Ok(self.list_equipments().context("load equipment")?)
    }

    fn create(&mut self, input: &EquipmentInput) -> Result<MutationReply<Equipment>> {
        Ok(self.create_equipment(input)?)
    }

    fn update(&mut self, id: EquipmentId, input: &EquipmentInput) -> Result<MutationReply<Equipment>> {
        Ok(self.update_equipment(id, input)?)
    }

    fn delete(&mut self, id: EquipmentId) -> Result<()> {
        Ok(self.delete_equipment(id)?)
    }
}

impl ResourceBackend<Supplier> for Client {
    fn list(&mut self) -> Result<Vec<Supplier>> {
        Ok(self.list_suppliers().context("load suppliers")?)
    }

    fn create(&mut self, input: &SupplierInput) -> Result<MutationReply<Supplier>> {
        Ok(self.create_supplier(input)?)
    }

    fn update(&mut self, id: SupplierId, input: &SupplierInput) -> Result<MutationReply<Supplier>> {
        Ok(self.update_supplier(id, input)?)
    }

    fn delete(&mut self, id: SupplierId) -> Result<()> {
        Ok(self.delete_supplier(id)?)
    }
}

impl ResourceBackend<MaintenanceSchedule> for Client {
    fn list(&mut self) -> Result<Vec<MaintenanceSchedule>> {
        Ok(self
            .list_maintenance()
            .context("load maintenance schedules")?)
    }

    fn create(&mut self, input: &MaintenanceInput) -> Result<MutationReply<MaintenanceSchedule>> {
        Ok(self.create_maintenance(input)?)
    }

    fn update(
        &mut self,
        id: MaintenanceId,
        input: &MaintenanceInput,
    ) -> Result<MutationReply<MaintenanceSchedule>> {
        Ok(self.update_maintenance(id, input)?)
    }

    fn delete(&mut self, id: MaintenanceId) -> Result<()> {
        Ok(self.delete_maintenance(id)?)
    }
}

impl ResourceBackend<RepairHistory> for Client {
    fn list(&mut self) -> Result<Vec<RepairHistory>> {
        Ok(self.list_repairs().context("load repair history")?)
    }

    fn create(&mut self, input: &RepairInput) -> Result<MutationReply<RepairHistory>> {
        Ok(self.create_repair(input)?)
    }

    fn update(&mut self, id: RepairId, input: &RepairInput) -> Result<MutationReply<RepairHistory>> {
        Ok(self.update_repair(id, input)?)
    }

    fn delete(&mut self, id: RepairId) -> Result<()> {
        Ok(self.delete_repair(id)?)
    }
}

impl ResourceBackend<User> for Client {
    fn list(&mut self) -> Result<Vec<User>> {
        Ok(self.list_users(None).context("load users")?)
    }

    fn create(&mut self, _input: &UserInput) -> Result<MutationReply<User>> {
        bail!("users cannot be created here -- use `equipdesk register`");
    }

    fn update(&mut self, id: UserId, input: &UserInput) -> Result<MutationReply<User>> {
        Ok(self.update_user(id, input)?)
    }

    fn delete(&mut self, id: UserId) -> Result<()> {
        Ok(self.delete_user(id)?)
    }
}

/// The equipment list nested under one supplier's detail page.
pub struct SupplierEquipments<'a> {
    client: &'a Client,
    supplier_id: SupplierId,
}

impl<'a> SupplierEquipments<'a> {
    pub fn new(client: &'a Client, supplier_id: SupplierId) -> Self {
        Self {
            client,
            supplier_id,
        }
    }

    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    fn pinned(&self, input: &EquipmentInput) -> EquipmentInput {
        EquipmentInput {
            supplier_id: Some(self.supplier_id),
            ..input.clone()
        }
    }
}

impl ResourceBackend<Equipment> for SupplierEquipments<'_> {
    fn list(&mut self) -> Result<Vec<Equipment>> {
        let detail = self
            .client
            .get_supplier(self.supplier_id)
            .with_context(|| format!("load supplier {}", self.supplier_id))?;
        Ok(detail.equipments)
    }

    fn create(&mut self, input: &EquipmentInput) -> Result<MutationReply<Equipment>> {
        Ok(self
            .client
            .add_supplier_equipment(self.supplier_id, &self.pinned(input))?)
    }

    fn update(&mut self, id: EquipmentId, input: &EquipmentInput) -> Result<MutationReply<Equipment>> {
        Ok(self
            .client
            .update_supplier_equipment(self.supplier_id, id, &self.pinned(input))?)
    }

    fn delete(&mut self, id: EquipmentId) -> Result<()> {
        Ok(self.client.delete_equipment(id)?)
    }
}
