// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use equipdesk_api::{ApiError, Client, Session, SupplierEquipments, SupplierQuery};
use equipdesk_app::{
    Credentials, DeleteConfirmation, DetailRoute, EquipmentId, EquipmentInput, EquipmentStatus,
    ListController, LoadMode, MaintenanceId, MaintenanceInput, MaintenanceSchedule,
    MaintenanceStatus, MutationCoordinator, MutationReply, Reconcile, SearchDetail, SearchKind,
    SupplierId,
};
use std::io::Read;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Response, Server};

#[derive(Debug, Clone)]
struct Seen {
    method: String,
    url: String,
    authorization: Option<String>,
    body: String,
}

/// Answers each request in order with the scripted status and body.
fn serve(script: Vec<(u16, &'static str)>) -> Result<(String, JoinHandle<Vec<Seen>>)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in script {
            let mut request = server.recv().expect("request expected");
            let authorization = request
                .headers()
                .iter()
                .find(|header| header.field.equiv("Authorization"))
                .map(|header| header.value.as_str().to_owned());
            let mut payload = String::new();
            request
                .as_reader()
                .read_to_string(&mut payload)
                .expect("read request body");
            seen.push(Seen {
                method: request.method().as_str().to_owned(),
                url: request.url().to_owned(),
                authorization,
                body: payload,
            });
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(
                    Header::from_bytes("Content-Type", "application/json")
                        .expect("valid content type header"),
                );
            request.respond(response).expect("response should succeed");
        }
        seen
    });

    Ok((addr, handle))
}

fn client(addr: &str, session: Session) -> Result<Client> {
    Client::new(addr, Duration::from_secs(2), session)
}

#[test]
fn unreachable_server_is_transport_error() -> Result<()> {
    let client = client("http://127.0.0.1:1", Session::default())?;
    let error = client
        .list_equipments()
        .expect_err("request should fail for unreachable endpoint");
    assert!(matches!(error, ApiError::Transport { .. }));
    assert!(error.to_string().contains("server].base_url"));
    Ok(())
}

#[test]
fn login_stores_token_and_later_calls_carry_it() -> Result<()> {
    let (addr, handle) = serve(vec![(200, r#"{"token":"abc.def"}"#), (200, "[]")])?;
    let mut client = client(&addr, Session::default())?;

    client.login(&Credentials {
        email: "admin@example.com".to_owned(),
        password: "secret".to_owned(),
    })?;
    assert_eq!(client.session().token(), Some("abc.def"));
    assert!(client.list_suppliers()?.is_empty());

    let seen = handle.join().expect("server thread should join");
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].url, "/api/login");
    assert_eq!(seen[0].authorization, None);
    assert!(seen[0].body.contains("\"email\":\"admin@example.com\""));
    assert_eq!(seen[1].url, "/api/suppliers");
    assert_eq!(seen[1].authorization.as_deref(), Some("Bearer abc.def"));
    Ok(())
}

#[test]
fn logout_drops_authorization_header() -> Result<()> {
    let (addr, handle) = serve(vec![(200, "null")])?;
    let mut client = client(&addr, Session::with_token("abc"))?;
    client.logout();
    assert!(!client.session().is_authenticated());

    assert!(client.list_equipments()?.is_empty());
    let seen = handle.join().expect("server thread should join");
    assert_eq!(seen[0].authorization, None);
    Ok(())
}

#[test]
fn list_endpoints_normalize_envelopes() -> Result<()> {
    let (addr, handle) = serve(vec![
        (
            200,
            r#"{"data":[{"id":1,"name":"Printer X","price":1500000,"status":"active","purchase_date":"2024-01-10T00:00:00Z","supplier_id":3}]}"#,
        ),
        (200, "null\n"),
        (200, r#"{"rows":[]}"#),
    ])?;
    let client = client(&addr, Session::with_token("t"))?;

    let equipments = client.list_equipments()?;
    assert_eq!(equipments.len(), 1);
    assert_eq!(equipments[0].supplier_id, Some(SupplierId::new(3)));

    assert!(client.list_repairs()?.is_empty());

    let error = client.list_suppliers().expect_err("unexpected shape");
    assert!(matches!(error, ApiError::Shape { .. }));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn error_bodies_become_status_messages() -> Result<()> {
    let (addr, handle) = serve(vec![
        (400, r#"{"message":"Equipment name is required"}"#),
        (404, r#"{"error":"No user found to delete"}"#),
        (500, "sql: database is closed\n"),
        (502, "<html><body>bad gateway</body></html>"),
    ])?;
    let client = client(&addr, Session::with_token("t"))?;

    let input = EquipmentInput {
        name: String::new(),
        price: 1.0,
        status: EquipmentStatus::Active,
        purchase_date: None,
        supplier_id: None,
    };
    let error = client.create_equipment(&input).expect_err("400");
    assert_eq!(error.status(), Some(400));
    assert_eq!(error.to_string(), "Equipment name is required");

    let error = client
        .delete_user(equipdesk_app::UserId::new(9))
        .expect_err("404");
    assert_eq!(error.to_string(), "No user found to delete");

    let error = client.list_maintenance().expect_err("500");
    assert_eq!(error.to_string(), "sql: database is closed");

    let error = client.equipment_stats().expect_err("502");
    assert_eq!(error.to_string(), "request failed with status 502");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn search_hit_routes_to_equipment_detail() -> Result<()> {
    let (addr, handle) = serve(vec![
        (
            200,
            r#"[{"id":5,"name":"Printer X","type":"equipment"},{"id":3,"name":"Printer toner swap","type":"maintenance"}]"#,
        ),
        (
            200,
            r#"{"id":5,"name":"Printer X","price":1500000,"status":"active","purchase_date":"0001-01-01T00:00:00Z","supplier_id":null}"#,
        ),
        (200, "null"),
    ])?;
    let client = client(&addr, Session::with_token("t"))?;

    let hits = client.search(" printer ")?;
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].route(), DetailRoute::Equipment(EquipmentId::new(5)));
    assert_eq!(hits[0].route().path(), "/equipments/5");

    let detail = client.search_detail(SearchKind::Equipment, 5)?;
    match detail {
        Some(SearchDetail::Equipment(equipment)) => {
            assert_eq!(equipment.name, "Printer X");
            assert!(equipment.purchase_date.is_none());
        }
        other => panic!("unexpected detail {other:?}"),
    }
    assert!(client.search_detail(SearchKind::Repair, 404)?.is_none());

    let seen = handle.join().expect("server thread should join");
    assert_eq!(seen[0].url, "/api/search?q=printer");
    assert_eq!(seen[1].url, "/api/search/detail?type=equipment&id=5");
    Ok(())
}

#[test]
fn blank_search_skips_request() -> Result<()> {
    let client = client("http://127.0.0.1:1", Session::default())?;
    assert!(client.search("   ")?.is_empty());
    Ok(())
}

#[test]
fn supplier_search_sends_only_filled_criteria() -> Result<()> {
    let (addr, handle) = serve(vec![(200, r#"[{"id":2,"name":"Acme"}]"#)])?;
    let client = client(&addr, Session::with_token("t"))?;

    let suppliers = client.search_suppliers(&SupplierQuery {
        name: " Acme ".to_owned(),
        ..SupplierQuery::default()
    })?;
    assert_eq!(suppliers.len(), 1);

    let seen = handle.join().expect("server thread should join");
    assert_eq!(seen[0].url, "/api/suppliers/search?name=Acme");
    Ok(())
}

#[test]
fn maintenance_create_posts_under_equipment() -> Result<()> {
    let (addr, handle) = serve(vec![(201, "")])?;
    let client = client(&addr, Session::with_token("t"))?;

    let reply = client.create_maintenance(&MaintenanceInput {
        equipment_id: EquipmentId::new(5),
        description: "Replace toner".to_owned(),
        scheduled_date: None,
        status: MaintenanceStatus::Pending,
        technician_id: None,
    })?;
    assert_eq!(reply, MutationReply::Acknowledged);

    let seen = handle.join().expect("server thread should join");
    assert_eq!(seen[0].url, "/api/equipments/5/maintenance");
    let body: serde_json::Value = serde_json::from_str(&seen[0].body)?;
    assert_eq!(body["technician_id"], 0);
    assert_eq!(body["equipment_id"], 5);
    Ok(())
}

#[test]
fn technicians_are_filtered_by_role() -> Result<()> {
    let (addr, handle) = serve(vec![(
        200,
        r#"[{"id":1,"username":"root","email":"root@example.com","role":"admin"},{"id":2,"username":"linh","email":"linh@example.com","role":"technician"}]"#,
    )])?;
    let client = client(&addr, Session::with_token("t"))?;

    let technicians = client.list_technicians()?;
    assert_eq!(technicians.len(), 1);
    assert_eq!(technicians[0].username, "linh");

    let seen = handle.join().expect("server thread should join");
    assert_eq!(seen[0].url, "/api/users?role=technician");
    Ok(())
}

const SCHEDULES: &str = r#"[
  {"id":6,"equipment_id":1,"description":"Clean optics","scheduled_date":"2024-03-01T00:00:00Z","status":"pending","technician_id":null},
  {"id":7,"equipment_id":5,"description":"Replace toner","scheduled_date":"2024-03-02T00:00:00Z","status":"in_progress","technician_id":2}
]"#;

const SCHEDULES_AFTER_DELETE: &str = r#"[
  {"id":6,"equipment_id":1,"description":"Clean optics","scheduled_date":"2024-03-01T00:00:00Z","status":"pending","technician_id":null}
]"#;

#[test]
fn confirmed_delete_reloads_maintenance_list() -> Result<()> {
    let (addr, handle) = serve(vec![
        (200, SCHEDULES),
        (204, ""),
        (200, SCHEDULES_AFTER_DELETE),
    ])?;
    let mut client = client(&addr, Session::with_token("t"))?;
    let mut list = ListController::<MaintenanceSchedule>::new(10);
    list.load(&mut client, LoadMode::Reset);
    assert_eq!(list.len(), 2);

    let mut confirm = DeleteConfirmation::default();
    confirm.open(MaintenanceId::new(7));
    let token = confirm.accept().expect("user confirmed");
    MutationCoordinator::new(Reconcile::Reload).delete(&mut client, &mut list, token)?;

    assert!(list.find(MaintenanceId::new(7)).is_none());
    let seen = handle.join().expect("server thread should join");
    assert_eq!(seen[1].method, "DELETE");
    assert_eq!(seen[1].url, "/api/maintenance/7");
    Ok(())
}

#[test]
fn rejected_delete_keeps_maintenance_row() -> Result<()> {
    let (addr, handle) = serve(vec![
        (200, SCHEDULES),
        (500, "Failed to delete maintenance"),
    ])?;
    let mut client = client(&addr, Session::with_token("t"))?;
    let mut list = ListController::<MaintenanceSchedule>::new(10);
    list.load(&mut client, LoadMode::Reset);

    let mut confirm = DeleteConfirmation::default();
    confirm.open(MaintenanceId::new(7));
    let token = confirm.accept().expect("user confirmed");
    let mut coordinator = MutationCoordinator::new(Reconcile::Reload);
    let error = coordinator
        .delete(&mut client, &mut list, token)
        .expect_err("server refused");

    assert!(format!("{error:#}").contains("Failed to delete maintenance"));
    assert!(list.find(MaintenanceId::new(7)).is_some());
    assert_eq!(list.len(), 2);
    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn supplier_equipment_patch_uses_returned_record() -> Result<()> {
    let (addr, handle) = serve(vec![
        (
            200,
            r#"{"id":3,"name":"Acme","phone":"","email":"","address":"","equipments":null}"#,
        ),
        (
            201,
            r#"{"id":40,"name":"Router S5","price":2500000,"status":"active","purchase_date":"2024-05-01T00:00:00Z","supplier_id":3}"#,
        ),
    ])?;
    let client = client(&addr, Session::with_token("t"))?;
    let mut nested = SupplierEquipments::new(&client, SupplierId::new(3));
    let mut list = ListController::new(10);
    list.load(&mut nested, LoadMode::Reset);
    assert!(list.is_empty());

    let mut coordinator = MutationCoordinator::new(Reconcile::Patch);
    let id = coordinator.create(
        &mut nested,
        &mut list,
        &EquipmentInput {
            name: "Router S5".to_owned(),
            price: 2_500_000.0,
            status: EquipmentStatus::Active,
            purchase_date: None,
            supplier_id: None,
        },
    )?;
    assert_eq!(id, Some(EquipmentId::new(40)));
    assert_eq!(list.len(), 1);

    let seen = handle.join().expect("server thread should join");
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].url, "/api/suppliers/3/equipments");
    let body: serde_json::Value = serde_json::from_str(&seen[1].body)?;
    assert_eq!(body["supplier_id"], 3);
    Ok(())
}
