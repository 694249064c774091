//! reqwest-based backend client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::query::{check_envelope, column, form_encode, sql_literal, text, QueryRequest};
use super::{AbstractaBackend, AccessToken, BackendError, DataSourceRef, ServicePath};
use crate::agent::{ApiBuilderPayload, DqRuleBuilderPayload, ProfileBuilderPayload};
use crate::config::BackendConfig;

const SERVICE_COLUMNS: &str = "org_name, app_name, dqdb_db_name, dtbl_table_name, dtbl_version";

/// Talks to the Abstracta metadata, query and auth endpoints.
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// Create a client with the configured timeout.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .user_agent("abstracta-assist")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(BackendError::Client)?;
        Ok(Self { client, config })
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    fn metadata_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.metadata_api_url.trim_end_matches('/'),
            path
        )
    }

    fn system_url(&self, table: &str, version: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.data_api_url.trim_end_matches('/'),
            self.config.system_service.trim_matches('/'),
            table,
            version
        )
    }

    fn query(&self, where_clause: impl Into<String>, from: u32, to: u32) -> QueryRequest {
        QueryRequest::new(where_clause, from, to).on_behalf_of(
            self.config.for_user.clone(),
            self.config.for_user_secret.clone(),
        )
    }

    async fn send(&self, action: &str, url: &str, request: RequestBuilder) -> Result<Value, BackendError> {
        debug!("{}: POST {}", action, url);
        let response = request.send().await.map_err(|source| BackendError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| BackendError::Http {
            url: url.to_string(),
            source,
        })?;
        if !status.is_success() {
            return Err(BackendError::Status {
                action: action.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| BackendError::InvalidResponse {
            action: action.to_string(),
            message: e.to_string(),
        })
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        action: &str,
        url: &str,
        token: &AccessToken,
        body: &B,
    ) -> Result<Value, BackendError> {
        let request = self.client.post(url).bearer_auth(token.secret()).json(body);
        let value = self.send(action, url, request).await?;
        check_envelope(action, &value)?;
        Ok(value)
    }

    async fn system_query(
        &self,
        action: &str,
        token: &AccessToken,
        table: &str,
        version: &str,
        query: &QueryRequest,
    ) -> Result<Value, BackendError> {
        let url = self.system_url(table, version);
        self.post_json(action, &url, token, query).await
    }

    async fn organizations(&self, token: &AccessToken) -> Result<Value, BackendError> {
        let query = self.query("1 = 1", 1, 100);
        self.system_query("get organizations", token, "dq_org", "0.0.0", &query)
            .await
    }

    async fn org_id(&self, token: &AccessToken, org: &str) -> Result<Value, BackendError> {
        let orgs = self.organizations(token).await?;
        find_field(&orgs, "org_name", org, "org_sys_no").ok_or_else(|| BackendError::NotFound {
            what: "org".to_string(),
            name: org.to_string(),
        })
    }

    async fn profiles(&self, token: &AccessToken, org: &str) -> Result<Value, BackendError> {
        let query = self.query(
            format!(
                "prof_org_sys_no = (select org_sys_no from dq_org where org_name = '{}')",
                sql_literal(org)
            ),
            0,
            100,
        );
        self.system_query("get profiles", token, "dq_profiles", "0.0.0", &query)
            .await
    }

    async fn users(&self, token: &AccessToken) -> Result<Value, BackendError> {
        let query = self.query("", 0, 10000);
        self.system_query("get users", token, "vw_users", "0.0.0", &query)
            .await
    }
}

/// `records[i][field]` of the first record whose `key` equals `name`.
fn find_field(records: &Value, key: &str, name: &str, field: &str) -> Option<Value> {
    records
        .as_array()?
        .iter()
        .find(|r| r.get(key).and_then(Value::as_str) == Some(name))
        .and_then(|r| r.get(field).cloned())
}

#[async_trait]
impl AbstractaBackend for HttpBackend {
    async fn authenticate(&self) -> Result<AccessToken, BackendError> {
        let cfg = &self.config;
        let body = form_encode(&[
            ("grant_type", "client_credentials"),
            ("client_id", cfg.client_id.as_deref().unwrap_or_default()),
            ("client_secret", cfg.client_secret.as_deref().unwrap_or_default()),
            ("audience", cfg.audience.as_deref().unwrap_or_default()),
        ]);
        let request = self
            .client
            .post(&cfg.auth_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body);

        let response = self.send("authenticate", &cfg.auth_url, request).await?;
        response
            .get("access_token")
            .and_then(Value::as_str)
            .map(AccessToken::new)
            .ok_or_else(|| BackendError::InvalidResponse {
                action: "authenticate".to_string(),
                message: "no access_token in response".to_string(),
            })
    }

    async fn create_api(
        &self,
        token: &AccessToken,
        payload: &ApiBuilderPayload,
    ) -> Result<Value, BackendError> {
        let url = self.metadata_url(&format!(
            "{}/{}/connectors/{}/find/{}/services/add",
            payload.org_name,
            payload.app_name,
            payload.connector_type.as_str(),
            payload.datasource_name
        ));
        self.post_json("create API", &url, token, payload).await
    }

    async fn grant_service_access(
        &self,
        token: &AccessToken,
        path: &ServicePath,
        users: &[String],
        roles: &[String],
    ) -> Result<Value, BackendError> {
        let url = self.metadata_url(&format!(
            "{}/{}/connectors/rdbms/find/{}/services/find/{}/{}/grant",
            path.org, path.app, path.datasource, path.service, path.version
        ));
        let body = json!({
            "userIdCsv": users.join(","),
            "roleNameCsv": roles.join(","),
        });
        self.post_json("grant service access", &url, token, &body)
            .await
    }

    async fn add_data_quality_rule(
        &self,
        token: &AccessToken,
        payload: &DqRuleBuilderPayload,
    ) -> Result<Value, BackendError> {
        let params = payload
            .parameters()
            .map_err(|e| BackendError::InvalidRequest {
                message: e.to_string(),
            })?;
        let url = self.metadata_url(&format!(
            "{}/{}/connectors/rdbms/find/{}/services/find/{}/{}/fields/find/{}/dqchecks/find/{}",
            payload.org_name,
            payload.app_name,
            payload.datasource_name,
            payload.service_name,
            payload.version,
            payload.field_name,
            payload.dq_check_name
        ));
        self.post_json("add data quality rule", &url, token, &params)
            .await
    }

    async fn add_profile(
        &self,
        token: &AccessToken,
        payload: &ProfileBuilderPayload,
    ) -> Result<Value, BackendError> {
        let org_id = self.org_id(token, &payload.org_name).await?;
        let url = self.metadata_url(&format!("admin/orgs/find/{}/profiles/add", text(&org_id)));
        let body = json!({
            "name": payload.profile_name(),
            "desc": payload.profile_description,
            "orgId": org_id,
        });
        self.post_json("add profile", &url, token, &body).await
    }

    async fn assign_profile_to_users(
        &self,
        token: &AccessToken,
        payload: &ProfileBuilderPayload,
    ) -> Result<Vec<String>, BackendError> {
        // The org lookup only confirms the org exists; profiles are scoped by name.
        self.org_id(token, &payload.org_name).await?;

        let profile_name = payload.profile_name();
        let profiles = self.profiles(token, &payload.org_name).await?;
        let profile_id = find_field(&profiles, "prof_name", &profile_name, "prof_sys_no")
            .ok_or_else(|| BackendError::NotFound {
                what: "profile".to_string(),
                name: profile_name.clone(),
            })?;

        let users = self.users(token).await?;
        let mut matched = Vec::new();
        for name in &payload.user_names {
            match find_field(&users, "user_id", name, "user_sys_no") {
                Some(id) => matched.push((name.clone(), id)),
                None => warn!("Skipping unknown user '{}'", name),
            }
        }
        if matched.is_empty() {
            return Err(BackendError::NotFound {
                what: "users".to_string(),
                name: payload.user_names.join(", "),
            });
        }

        let mut assigned = Vec::with_capacity(matched.len());
        for (name, user_id) in matched {
            let url = self.metadata_url(&format!(
                "admin/users/find/{}/profileAttributes/manage",
                text(&user_id)
            ));
            let body = json!({
                "id": null,
                "deleteAction": false,
                "userSysNo": user_id,
                "profileSysNo": profile_id,
            });
            self.post_json("assign profile", &url, token, &body).await?;
            assigned.push(name);
        }
        Ok(assigned)
    }

    async fn fetch_data(
        &self,
        token: &AccessToken,
        path: &ServicePath,
    ) -> Result<Value, BackendError> {
        let url = self.api_url(path);
        let query = self.query("1 = 1", 1, self.config.preview_rows);
        self.post_json("get data", &url, token, &query).await
    }

    async fn list_organizations(&self, token: &AccessToken) -> Result<Vec<String>, BackendError> {
        let orgs = self.organizations(token).await?;
        column("get organizations", &orgs, "org_name")
    }

    async fn list_applications(
        &self,
        token: &AccessToken,
        org: &str,
    ) -> Result<Vec<String>, BackendError> {
        let query = self
            .query(
                format!(
                    "app_org_sys_no = (select org_sys_no from dq_org where org_name = '{}')",
                    sql_literal(org)
                ),
                0,
                100,
            )
            .columns("app_name");
        let apps = self
            .system_query("get applications", token, "dq_apps", "2.0.0", &query)
            .await?;
        column("get applications", &apps, "app_name")
    }

    async fn list_data_sources(
        &self,
        token: &AccessToken,
        org: &str,
        app: &str,
    ) -> Result<Vec<String>, BackendError> {
        let query = self
            .query(
                format!(
                    "dqdb_app_sys_no = (select app_sys_no from dq_apps where app_name = '{}' and \
                     app_org_sys_no = (select org_sys_no from dq_org where org_name = '{}'))",
                    sql_literal(app),
                    sql_literal(org)
                ),
                1,
                100,
            )
            .columns("dqdb_db_name");
        let sources = self
            .system_query("get data sources", token, "dq_databases", "0.0.0", &query)
            .await?;
        column("get data sources", &sources, "dqdb_db_name")
    }

    async fn list_services(
        &self,
        token: &AccessToken,
        scope: Option<&DataSourceRef>,
    ) -> Result<Vec<ServicePath>, BackendError> {
        let query = match scope {
            Some(scope) => self.query(
                format!(
                    "org_name = '{}' AND app_name = '{}' AND dqdb_db_name = '{}'",
                    sql_literal(&scope.org),
                    sql_literal(&scope.app),
                    sql_literal(&scope.datasource)
                ),
                1,
                100,
            ),
            None => self.query("1 = 1", 1, 1000).order_by("dtbl_when_created desc"),
        }
        .columns(SERVICE_COLUMNS);

        let records = self
            .system_query("get services", token, "vw_db_tables", "0.0.0", &query)
            .await?;
        let items = records
            .as_array()
            .ok_or_else(|| BackendError::InvalidResponse {
                action: "get services".to_string(),
                message: "expected a list of records".to_string(),
            })?;

        Ok(items
            .iter()
            .map(|r| {
                let field = |name: &str| r.get(name).map(text).unwrap_or_default();
                ServicePath::new(
                    field("org_name"),
                    field("app_name"),
                    field("dqdb_db_name"),
                    field("dtbl_table_name"),
                    field("dtbl_version"),
                )
            })
            .collect())
    }

    fn api_url(&self, path: &ServicePath) -> String {
        format!("{}/{}", self.config.data_api_url.trim_end_matches('/'), path)
    }

    fn web_url(&self, path: &ServicePath) -> String {
        format!("{}/{}", self.config.web_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> HttpBackend {
        HttpBackend::new(BackendConfig::default()).unwrap()
    }

    fn path() -> ServicePath {
        ServicePath::new("o", "a", "d", "s", "1.0.0")
    }

    #[test]
    fn urls_use_configured_bases() {
        let backend = backend();
        assert_eq!(
            backend.api_url(&path()),
            "http://localhost:8080/rest/data/queryv2/o/a/d/s/1.0.0"
        );
        assert_eq!(backend.web_url(&path()), "http://localhost/services/o/a/d/s/1.0.0");
    }

    #[test]
    fn system_url_targets_repository_service() {
        assert_eq!(
            backend().system_url("dq_apps", "2.0.0"),
            "http://localhost:8080/rest/data/queryv2/ekahaa/abstracta/dq_repo/dq_apps/2.0.0"
        );
    }

    #[test]
    fn timeout_from_config() {
        assert_eq!(backend().timeout(), Duration::from_secs(30));
    }

    #[test]
    fn find_field_matches_by_name() {
        let records = json!([
            {"org_name": "a", "org_sys_no": 1},
            {"org_name": "b", "org_sys_no": 2}
        ]);
        assert_eq!(find_field(&records, "org_name", "b", "org_sys_no"), Some(json!(2)));
        assert_eq!(find_field(&records, "org_name", "c", "org_sys_no"), None);
    }
}
