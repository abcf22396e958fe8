// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod backend;
mod error;
mod wire;

pub use backend::SupplierEquipments;
pub use error::{ApiError, status_error};
pub use wire::{decode_list, decode_reply};

use anyhow::{Context, Result, bail};
use equipdesk_app::{
    Credentials, Equipment, EquipmentDetail, EquipmentId, EquipmentInput, EquipmentStats,
    MaintenanceDetail, MaintenanceId, MaintenanceInput, MaintenanceSchedule, MutationReply,
    Registration, RepairHistory, RepairId, RepairInput, SearchDetail, SearchHit, SearchKind,
    StatusCount, Supplier, SupplierDetail, SupplierId, SupplierInput, User, UserId, UserInput,
    UserRole,
};
use reqwest::Method;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Bearer token carried on every request once set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn with_token(token: impl Into<String>) -> Self {
        let mut session = Self::default();
        session.set_token(token);
        session
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        let token = token.trim();
        self.token = if token.is_empty() {
            None
        } else {
            Some(token.to_owned())
        };
    }

    pub fn clear(&mut self) {
        self.token = None;
    }
}

/// Criteria for the supplier search endpoint. Blank fields are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplierQuery {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

impl SupplierQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("name", &self.name),
            ("phone", &self.phone),
            ("email", &self.email),
            ("address", &self.address),
        ]
        .into_iter()
        .map(|(key, value)| (key, value.trim()))
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key, value.to_owned()))
        .collect()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Default, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    api_root: Url,
    timeout: Duration,
    http: HttpClient,
    session: Session,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration, session: Session) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("server.base_url must not be empty");
        }
        let root = if base_url.ends_with("/api") {
            format!("{base_url}/")
        } else {
            format!("{base_url}/api/")
        };
        let api_root =
            Url::parse(&root).with_context(|| format!("server.base_url {base_url:?} is not a URL"))?;
        if !matches!(api_root.scheme(), "http" | "https") {
            bail!("server.base_url must use http or https, got {base_url:?}");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            api_root,
            timeout,
            http,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    // equipment

    pub fn list_equipments(&self) -> Result<Vec<Equipment>, ApiError> {
        self.get_list("equipments", &[])
    }

    pub fn equipment_stats(&self) -> Result<EquipmentStats, ApiError> {
        let counts: Vec<StatusCount> = self.get_list("equipments/stats", &[])?;
        Ok(EquipmentStats::from_counts(&counts))
    }

    pub fn get_equipment(&self, id: EquipmentId) -> Result<EquipmentDetail, ApiError> {
        self.get_json(&format!("equipments/{id}"), &[])
    }

    pub fn create_equipment(
        &self,
        input: &EquipmentInput,
    ) -> Result<MutationReply<Equipment>, ApiError> {
        self.mutate(Method::POST, "equipments", input)
    }

    pub fn update_equipment(
        &self,
        id: EquipmentId,
        input: &EquipmentInput,
    ) -> Result<MutationReply<Equipment>, ApiError> {
        self.mutate(Method::PUT, &format!("equipments/{id}"), input)
    }

    pub fn delete_equipment(&self, id: EquipmentId) -> Result<(), ApiError> {
        self.send_delete(&format!("equipments/{id}"))
    }

    // suppliers

    pub fn list_suppliers(&self) -> Result<Vec<Supplier>, ApiError> {
        self.get_list("suppliers", &[])
    }

    pub fn get_supplier(&self, id: SupplierId) -> Result<SupplierDetail, ApiError> {
        self.get_json(&format!("suppliers/{id}"), &[])
    }

    pub fn search_suppliers(&self, query: &SupplierQuery) -> Result<Vec<Supplier>, ApiError> {
        self.get_list("suppliers/search", &query.pairs())
    }

    pub fn create_supplier(
        &self,
        input: &SupplierInput,
    ) -> Result<MutationReply<Supplier>, ApiError> {
        self.mutate(Method::POST, "suppliers", input)
    }

    pub fn update_supplier(
        &self,
        id: SupplierId,
        input: &SupplierInput,
    ) -> Result<MutationReply<Supplier>, ApiError> {
        self.mutate(Method::PUT, &format!("suppliers/{id}"), input)
    }

    pub fn delete_supplier(&self, id: SupplierId) -> Result<(), ApiError> {
        self.send_delete(&format!("suppliers/{id}"))
    }

    pub fn add_supplier_equipment(
        &self,
        supplier_id: SupplierId,
        input: &EquipmentInput,
    ) -> Result<MutationReply<Equipment>, ApiError> {
        self.mutate(
            Method::POST,
            &format!("suppliers/{supplier_id}/equipments"),
            input,
        )
    }

    pub fn update_supplier_equipment(
        &self,
        supplier_id: SupplierId,
        equipment_id: EquipmentId,
        input: &EquipmentInput,
    ) -> Result<MutationReply<Equipment>, ApiError> {
        self.mutate(
            Method::PUT,
            &format!("suppliers/{supplier_id}/equipments/{equipment_id}"),
            input,
        )
    }

    // maintenance

    pub fn list_maintenance(&self) -> Result<Vec<MaintenanceSchedule>, ApiError> {
        self.get_list("maintenance", &[])
    }

    pub fn get_maintenance(&self, id: MaintenanceId) -> Result<MaintenanceDetail, ApiError> {
        self.get_json(&format!("maintenances/{id}"), &[])
    }

    /// Posts under the owning equipment; the server also flags that
    /// equipment as under maintenance.
    pub fn create_maintenance(
        &self,
        input: &MaintenanceInput,
    ) -> Result<MutationReply<MaintenanceSchedule>, ApiError> {
        self.mutate(
            Method::POST,
            &format!("equipments/{}/maintenance", input.equipment_id),
            input,
        )
    }

    pub fn update_maintenance(
        &self,
        id: MaintenanceId,
        input: &MaintenanceInput,
    ) -> Result<MutationReply<MaintenanceSchedule>, ApiError> {
        self.mutate(Method::PUT, &format!("maintenance/{id}"), input)
    }

    pub fn delete_maintenance(&self, id: MaintenanceId) -> Result<(), ApiError> {
        self.send_delete(&format!("maintenance/{id}"))
    }

    // repair history

    pub fn list_repairs(&self) -> Result<Vec<RepairHistory>, ApiError> {
        self.get_list("repair-history", &[])
    }

    pub fn create_repair(
        &self,
        input: &RepairInput,
    ) -> Result<MutationReply<RepairHistory>, ApiError> {
        self.mutate(
            Method::POST,
            &format!("maintenance/{}/repair-history", input.maintenance_id),
            input,
        )
    }

    pub fn update_repair(
        &self,
        id: RepairId,
        input: &RepairInput,
    ) -> Result<MutationReply<RepairHistory>, ApiError> {
        self.mutate(Method::PUT, &format!("repair-history/{id}"), input)
    }

    pub fn delete_repair(&self, id: RepairId) -> Result<(), ApiError> {
        self.send_delete(&format!("repair-history/{id}"))
    }

    // users

    pub fn list_users(&self, role: Option<UserRole>) -> Result<Vec<User>, ApiError> {
        let query: Vec<(&'static str, String)> = role
            .map(|role| vec![("role", role.as_str().to_owned())])
            .unwrap_or_default();
        let users: Vec<User> = self.get_list("users", &query)?;
        Ok(match role {
            Some(role) => users.into_iter().filter(|user| user.role == role).collect(),
            None => users,
        })
    }

    pub fn list_technicians(&self) -> Result<Vec<User>, ApiError> {
        self.list_users(Some(UserRole::Technician))
    }

    pub fn update_user(
        &self,
        id: UserId,
        input: &UserInput,
    ) -> Result<MutationReply<User>, ApiError> {
        self.mutate(Method::PUT, &format!("users/{id}"), input)
    }

    pub fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.send_delete(&format!("users/{id}"))
    }

    /// Exchanges credentials for a token and keeps it in the session.
    pub fn login(&mut self, credentials: &Credentials) -> Result<(), ApiError> {
        let body = self.send_text(self.request(Method::POST, "login", &[])?.json(credentials), "login")?;
        let parsed: TokenResponse = wire::decode_value("login", &body)?;
        if parsed.token.trim().is_empty() {
            return Err(ApiError::Shape {
                path: "login".to_owned(),
                detail: "empty token".to_owned(),
            });
        }
        self.session.set_token(parsed.token);
        tracing::info!(base_url = %self.base_url, "logged in");
        Ok(())
    }

    /// Returns the server's confirmation text.
    pub fn register(&self, registration: &Registration) -> Result<String, ApiError> {
        let body = self.send_text(
            self.request(Method::POST, "register", &[])?.json(registration),
            "register",
        )?;
        if body.trim().is_empty() {
            return Ok(String::new());
        }
        let parsed: MessageResponse = wire::decode_value("register", &body)?;
        Ok(parsed.message)
    }

    pub fn logout(&mut self) {
        self.session.clear();
        tracing::info!(base_url = %self.base_url, "logged out");
    }

    // search

    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.get_list("search", &[("q", query.to_owned())])
            .inspect_err(|error| tracing::warn!(query, error = %error, "search failed"))
    }

    /// `None` when the server has no record of that kind and id.
    pub fn search_detail(&self, kind: SearchKind, id: i64) -> Result<Option<SearchDetail>, ApiError> {
        let path = "search/detail";
        let body = self.send_text(
            self.request(
                Method::GET,
                path,
                &[("type", kind.as_str().to_owned()), ("id", id.to_string())],
            )?,
            path,
        )?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }
        let detail = match kind {
            SearchKind::Equipment => SearchDetail::Equipment(wire::decode_value(path, trimmed)?),
            SearchKind::Maintenance => {
                SearchDetail::Maintenance(wire::decode_value(path, trimmed)?)
            }
            SearchKind::Repair => SearchDetail::Repair(wire::decode_value(path, trimmed)?),
            SearchKind::Supplier => SearchDetail::Supplier(wire::decode_value(path, trimmed)?),
        };
        Ok(Some(detail))
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<RequestBuilder, ApiError> {
        let mut url = self.api_root.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        tracing::debug!(method = %method, url = %url, "request");
        let builder = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        Ok(match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    fn send_text(&self, builder: RequestBuilder, path: &str) -> Result<String, ApiError> {
        let response = builder.send().map_err(|source| ApiError::Transport {
            base_url: self.base_url.clone(),
            source,
        })?;
        let status = response.status();
        let body = response.text().map_err(|source| ApiError::Transport {
            base_url: self.base_url.clone(),
            source,
        })?;
        if !status.is_success() {
            let error = status_error(status, &body);
            tracing::warn!(path, status = status.as_u16(), error = %error, "request failed");
            return Err(error);
        }
        Ok(body)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let body = self.send_text(self.request(Method::GET, path, query)?, path)?;
        wire::decode_value(path, &body)
    }

    fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ApiError> {
        let body = self.send_text(self.request(Method::GET, path, query)?, path)?;
        wire::decode_list(path, &body)
    }

    fn mutate<B, T>(&self, method: Method, path: &str, payload: &B) -> Result<MutationReply<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.send_text(self.request(method, path, &[])?.json(payload), path)?;
        wire::decode_reply(path, &body)
    }

    fn send_delete(&self, path: &str) -> Result<(), ApiError> {
        self.send_text(self.request(Method::DELETE, path, &[])?, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Client, Session, SupplierQuery};
    use std::time::Duration;

    #[test]
    fn base_url_gains_api_root_once() {
        let client = Client::new("http://localhost:8080/", Duration::from_secs(1), Session::default())
            .expect("valid client");
        assert_eq!(client.api_root.as_str(), "http://localhost:8080/api/");

        let client = Client::new(
            "http://localhost:8080/api",
            Duration::from_secs(1),
            Session::default(),
        )
        .expect("valid client");
        assert_eq!(client.api_root.as_str(), "http://localhost:8080/api/");
    }

    #[test]
    fn base_url_must_be_http() {
        assert!(Client::new("", Duration::from_secs(1), Session::default()).is_err());
        assert!(Client::new("ftp://files", Duration::from_secs(1), Session::default()).is_err());
        assert!(Client::new("not a url", Duration::from_secs(1), Session::default()).is_err());
    }

    #[test]
    fn blank_tokens_do_not_authenticate() {
        let mut session = Session::with_token("  ");
        assert!(!session.is_authenticated());
        session.set_token("abc");
        assert_eq!(session.token(), Some("abc"));
        session.clear();
        assert_eq!(session.token(), None);
    }

    #[test]
    fn supplier_query_omits_blank_and_trims() {
        let query = SupplierQuery {
            name: "  Acme ".to_owned(),
            phone: " ".to_owned(),
            email: String::new(),
            address: "Hue".to_owned(),
        };
        assert_eq!(
            query.pairs(),
            vec![("name", "Acme".to_owned()), ("address", "Hue".to_owned())]
        );
    }
}
