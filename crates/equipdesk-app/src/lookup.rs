// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{Equipment, MaintenanceSchedule, Supplier, User};
use crate::resource::Resource;
use crate::{EquipmentId, MaintenanceId, SupplierId, UserId};

pub const MISSING: &str = "-";
pub const UNASSIGNED: &str = "unassigned";

/// Label of the record with `id` in `collection`, or `placeholder` when the
/// id is absent or dangling.
pub fn label_for<'a, R: Resource>(
    id: Option<R::Id>,
    collection: &'a [R],
    placeholder: &'static str,
) -> &'a str {
    id.and_then(|id| collection.iter().find(|record| record.id() == id))
        .map_or(placeholder, |record| record.label())
}

pub fn supplier_name(id: Option<SupplierId>, suppliers: &[Supplier]) -> &str {
    label_for(id, suppliers, MISSING)
}

pub fn equipment_name(id: EquipmentId, equipments: &[Equipment]) -> &str {
    label_for(Some(id), equipments, MISSING)
}

pub fn maintenance_label(id: MaintenanceId, schedules: &[MaintenanceSchedule]) -> &str {
    label_for(Some(id), schedules, MISSING)
}

pub fn technician_name(id: Option<UserId>, users: &[User]) -> &str {
    label_for(id, users, UNASSIGNED)
}

#[cfg(test)]
mod tests {
    use super::{MISSING, UNASSIGNED, supplier_name, technician_name};
    use crate::model::{Supplier, User, UserRole};
    use crate::{SupplierId, UserId};

    fn supplier(id: i64, name: &str) -> Supplier {
        Supplier {
            id: SupplierId::new(id),
            name: name.to_owned(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
            created_at: None,
        }
    }

    #[test]
    fn resolves_known_supplier() {
        let suppliers = vec![supplier(1, "Acme"), supplier(3, "Globex")];
        assert_eq!(supplier_name(Some(SupplierId::new(3)), &suppliers), "Globex");
    }

    #[test]
    fn dangling_or_missing_id_yields_placeholder() {
        let suppliers = vec![supplier(1, "Acme")];
        assert_eq!(supplier_name(Some(SupplierId::new(9)), &suppliers), MISSING);
        assert_eq!(supplier_name(None, &suppliers), MISSING);
        assert_eq!(supplier_name(Some(SupplierId::new(1)), &[]), MISSING);
    }

    #[test]
    fn missing_technician_reads_unassigned() {
        let users = vec![User {
            id: UserId::new(2),
            username: "linh".to_owned(),
            email: "linh@example.com".to_owned(),
            role: UserRole::Technician,
            phone: String::new(),
            created_at: None,
            updated_at: None,
        }];
        assert_eq!(technician_name(Some(UserId::new(2)), &users), "linh");
        assert_eq!(technician_name(None, &users), UNASSIGNED);
        assert_eq!(technician_name(Some(UserId::new(0)), &users), UNASSIGNED);
    }
}
