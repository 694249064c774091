//! Structured payloads the agent produces from user prose.

use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::checks::{catalog_json, DqCheckId, ParameterKind};
use super::AgentError;

/// A payload an agent can be asked to produce.
pub trait BuilderPayload: Serialize + DeserializeOwned + JsonSchema + Send {
    /// Name the agent runs under, used in logs and schema names.
    const AGENT_NAME: &'static str;

    /// System instructions for the model.
    fn instructions() -> String;

    /// Check what the JSON schema alone cannot express.
    fn validate(&self) -> Result<(), AgentError>;
}

/// How a service reads its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceType {
    Direct,
    CustomSql,
}

/// Backend connector kind. Only relational sources are supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorType {
    #[default]
    Rdbms,
}

impl ConnectorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rdbms => "rdbms",
        }
    }
}

/// Which part of the service version to bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum VersionType {
    Major,
    Minor,
    Revision,
}

/// Everything needed to create an API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiBuilderPayload {
    /// The name of the service used to query the data source
    pub service_name: String,
    /// The display name of the service
    pub service_display_name: String,
    /// The description of the service
    pub service_desc: String,
    /// The organization name used for querying
    pub org_name: String,
    /// The application name inside the organization
    pub app_name: String,
    /// The data source name inside the app
    pub datasource_name: String,
    /// The backend resource name
    pub original_resource_name: String,
    /// Service type: DIRECT or CUSTOMSQL
    pub service_type: ServiceType,
    /// Custom SQL query (for CUSTOMSQL only)
    #[serde(rename = "serviceCustomSQL")]
    pub service_custom_sql: String,
    /// The connector type, always 'rdbms'
    pub connector_type: ConnectorType,
    /// Comments for this version
    pub version_comments: String,
    /// Version type: MAJOR, MINOR, or REVISION
    pub version_type: VersionType,
    /// The data security filter
    pub data_security_filter: String,
}

impl BuilderPayload for ApiBuilderPayload {
    const AGENT_NAME: &'static str = "APIBuilderAgent";

    fn instructions() -> String {
        "You are an expert API builder agent. \
         Your job is to collect information from the user about the API they want to build. \
         APIs are hierarchically stored in Abstracta. The first level is the organization, \
         the second level is the application, the third level is the data source, and the \
         fourth level is the API. APIs can have multiple versions as they undergo changes. \
         Consolidate this information and organize it in a structured way. \
         Respond with a JSON. Do not add any other text."
            .to_string()
    }

    fn validate(&self) -> Result<(), AgentError> {
        require_filled(&[
            ("serviceName", &self.service_name),
            ("orgName", &self.org_name),
            ("appName", &self.app_name),
            ("datasourceName", &self.datasource_name),
        ])?;
        if self.service_type == ServiceType::CustomSql && self.service_custom_sql.trim().is_empty() {
            return Err(invalid("serviceCustomSQL is required for CUSTOMSQL services"));
        }
        if self.service_type == ServiceType::Direct && self.original_resource_name.trim().is_empty() {
            return Err(invalid("originalResourceName is required for DIRECT services"));
        }
        Ok(())
    }
}

/// A data-quality rule for one field of an existing API version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DqRuleBuilderPayload {
    /// The organization name used for querying
    pub org_name: String,
    /// The application name inside the organization
    pub app_name: String,
    /// The connector type, always 'rdbms'
    #[serde(default)]
    pub connector_type: ConnectorType,
    /// The data source name inside the app
    pub datasource_name: String,
    /// The name of the service used to query the data source
    pub service_name: String,
    /// Service version in the format {major}.{minor}.{revision}. For e.g. 1.4.10
    pub version: String,
    /// Name of the data quality check. Uppercase only. No special characters.
    pub dq_check_name: DqCheckId,
    /// Name of the field to apply the rule to.
    pub field_name: String,
    /// A string containing a JSON object of parameter name and value for the given dqCheckName.
    pub dq_rule_parameters_payload_json: String,
}

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").unwrap());

impl DqRuleBuilderPayload {
    /// Parse and check the rule parameters against the check catalog.
    pub fn parameters(&self) -> Result<Map<String, Value>, AgentError> {
        let raw = self.dq_rule_parameters_payload_json.trim();
        let parsed: Value = if raw.is_empty() {
            Value::Object(Map::new())
        } else {
            serde_json::from_str(raw).map_err(|e| {
                invalid(format!("dqRuleParametersPayloadJson is not valid JSON: {}", e))
            })?
        };
        let Value::Object(params) = parsed else {
            return Err(invalid("dqRuleParametersPayloadJson must be a JSON object"));
        };

        for expected in self.dq_check_name.check().parameters {
            let value = params.get(expected.name).ok_or_else(|| {
                invalid(format!(
                    "{} requires parameter '{}'",
                    self.dq_check_name, expected.name
                ))
            })?;
            let ok = match expected.kind {
                ParameterKind::String => value.is_string(),
                ParameterKind::Number => {
                    value.is_number()
                        || value.as_str().is_some_and(|s| s.trim().parse::<f64>().is_ok())
                }
            };
            if !ok {
                return Err(invalid(format!(
                    "parameter '{}' of {} must be a {:?}",
                    expected.name, self.dq_check_name, expected.kind
                )));
            }
        }
        Ok(params)
    }
}

impl BuilderPayload for DqRuleBuilderPayload {
    const AGENT_NAME: &'static str = "DQRulesBuilderAgent";

    fn instructions() -> String {
        format!(
            "You are an expert in configuring data quality rules for a given data set. \
             Your job is to collect information from the user about the API for which they want \
             to configure DQ checks. The org, app, datasource, service and version, field and dq \
             check name need to be taken literally as provided by the user. Do not transform or \
             manipulate the information provided by the user. \
             dqRuleParametersPayloadJson must be a JSON object string with the parameters the \
             chosen check declares in this catalog:\n{}\n\
             Respond with a JSON ONLY. Do not add any other text.",
            catalog_json()
        )
    }

    fn validate(&self) -> Result<(), AgentError> {
        require_filled(&[
            ("orgName", &self.org_name),
            ("appName", &self.app_name),
            ("datasourceName", &self.datasource_name),
            ("serviceName", &self.service_name),
            ("fieldName", &self.field_name),
        ])?;
        if !VERSION_PATTERN.is_match(&self.version) {
            return Err(invalid(format!(
                "version '{}' must look like major.minor.revision",
                self.version
            )));
        }
        self.parameters().map(|_| ())
    }
}

/// A data-security profile and the users it is assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProfileBuilderPayload {
    /// The organization name used for querying
    #[serde(rename = "orgName")]
    pub org_name: String,
    /// The profile key. for example `region`.
    pub profile_key: String,
    /// The profile value. for example `USA`.
    pub profile_value: String,
    /// The profile description. Create your own based on the context if the user has not provided any.
    pub profile_description: String,
    /// List of user names to which the profile needs to be assigned to.
    pub user_names: Vec<String>,
}

impl ProfileBuilderPayload {
    /// Backend profile name, `key~value`.
    pub fn profile_name(&self) -> String {
        format!("{}~{}", self.profile_key, self.profile_value)
    }
}

impl BuilderPayload for ProfileBuilderPayload {
    const AGENT_NAME: &'static str = "ProfileBuilderAgent";

    fn instructions() -> String {
        "You are an expert in gathering information for creating data security profiles. \
         Your job is to collect information from the user, consolidate this information and \
         organize it in a structured way. Respond with a JSON ONLY. Do not add any other text."
            .to_string()
    }

    fn validate(&self) -> Result<(), AgentError> {
        require_filled(&[
            ("orgName", &self.org_name),
            ("profile_key", &self.profile_key),
            ("profile_value", &self.profile_value),
        ])?;
        if self.user_names.iter().all(|u| u.trim().is_empty()) {
            return Err(invalid("user_names must name at least one user"));
        }
        Ok(())
    }
}

fn require_filled(fields: &[(&str, &String)]) -> Result<(), AgentError> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(invalid(format!("{} must not be empty", name))),
        None => Ok(()),
    }
}

fn invalid(message: impl Into<String>) -> AgentError {
    AgentError::InvalidPayload {
        message: message.into(),
    }
}
