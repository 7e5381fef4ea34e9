//! Stacks
//!
//! Stack lifecycle, hosts, logs, actions and access rules. Log selection is
//! typed ([`LogType`], [`LogLevel`], [`LogDate`]) and every type only serves
//! the levels listed in [`LogType::levels`].

use super::find_id_by;
use crate::api::client::{entity_id, take_field, take_results, Operation, StackdioClient};
use crate::api::endpoint::PathArgs;
use crate::api::error::{Error, Result};
use crate::api::http::RequestOptions;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

const CREATE_STACK: Operation = Operation::post("create_stack", "stacks/");
const LIST_STACKS: Operation = Operation::get("list_stacks", "stacks/");
const GET_STACK: Operation = Operation::get("get_stack", "stacks/{stack_id}/");
const SEARCH_STACKS: Operation = Operation::get("search_stacks", "stacks/");
const DELETE_STACK: Operation = Operation::delete("delete_stack", "stacks/{stack_id}/");
const GET_VALID_STACK_ACTIONS: Operation =
    Operation::get("get_valid_stack_actions", "stacks/{stack_id}/action/");
const DO_STACK_ACTION: Operation = Operation::post("do_stack_action", "stacks/{stack_id}/action/");
const GET_STACK_HISTORY: Operation =
    Operation::get("get_stack_history", "stacks/{stack_id}/history/");
const GET_STACK_ID: Operation = Operation::get("get_stack_id", "stacks/")
    .accepted_versions(&["<0.7"])
    .deprecated();
const GET_STACK_HOSTS: Operation = Operation::get("get_stack_hosts", "stacks/{stack_id}/hosts/");
const GET_LOGS: Operation =
    Operation::get("get_logs", "stacks/{stack_id}/logs/{log_type}.{level}.{date}");

const LIST_ACCESS_RULES: Operation =
    Operation::get("list_access_rules", "stacks/{stack_id}/security_groups/");
const GET_ACCESS_RULE_ID: Operation =
    Operation::get("get_access_rule_id", "stacks/{stack_id}/security_groups/")
        .accepted_versions(&["<0.7"])
        .deprecated();
const LIST_RULES_FOR_GROUP: Operation =
    Operation::get("list_rules_for_group", "security_groups/{group_id}/rules/");
const EDIT_ACCESS_RULE: Operation =
    Operation::put("edit_access_rule", "security_groups/{group_id}/rules/");

/// Field of a host holding its EC2 instance metadata
const EC2_METADATA: &str = "ec2_metadata";

/// Kind of stack log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    Provisioning,
    GlobalOrchestration,
    Orchestration,
    Launch,
}

impl LogType {
    pub const ALL: [LogType; 4] = [
        LogType::Provisioning,
        LogType::GlobalOrchestration,
        LogType::Orchestration,
        LogType::Launch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogType::Provisioning => "provisioning",
            LogType::GlobalOrchestration => "global-orchestration",
            LogType::Orchestration => "orchestration",
            LogType::Launch => "launch",
        }
    }

    /// Levels the server keeps for this log type
    pub fn levels(self) -> &'static [LogLevel] {
        match self {
            LogType::Launch => &[LogLevel::Log],
            _ => &[LogLevel::Log, LogLevel::Error],
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        LogType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = LogType::ALL.iter().map(|t| t.as_str()).collect();
                Error::Validation(format!(
                    "Invalid log type, must be one of {}",
                    valid.join(", ")
                ))
            })
    }
}

/// Stream of a stack log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    #[default]
    Log,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Log => "log",
            LogLevel::Error => "err",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "log" => Ok(LogLevel::Log),
            "err" => Ok(LogLevel::Error),
            _ => Err(Error::Validation(
                "Invalid log level, must be one of log, err".to_string(),
            )),
        }
    }
}

/// Which day's log to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDate {
    #[default]
    Latest,
    On(NaiveDate),
}

impl fmt::Display for LogDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogDate::Latest => f.write_str("latest"),
            LogDate::On(date) => write!(f, "{}", date.format("%Y%m%d")),
        }
    }
}

impl FromStr for LogDate {
    type Err = Error;

    /// Accepts `latest`, `YYYYMMDD` or `YYYY-MM-DD`
    fn from_str(s: &str) -> Result<Self> {
        if s == "latest" {
            return Ok(LogDate::Latest);
        }
        NaiveDate::parse_from_str(s, "%Y%m%d")
            .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
            .map(LogDate::On)
            .map_err(|_| {
                Error::Validation(format!(
                    "Invalid log date '{}', expected 'latest' or YYYYMMDD",
                    s
                ))
            })
    }
}

/// Check a type/level pair against the server's allow-list
pub fn validate_log_selection(log_type: LogType, level: LogLevel) -> Result<()> {
    let levels = log_type.levels();
    if levels.contains(&level) {
        return Ok(());
    }

    let valid: Vec<&str> = levels.iter().map(|l| l.as_str()).collect();
    Err(Error::Validation(format!(
        "Invalid log level for {}, must be one of {}",
        log_type,
        valid.join(", ")
    )))
}

impl StackdioClient {
    /// Launch a stack described by `stack_data`
    pub async fn create_stack(&self, stack_data: &Value) -> Result<Value> {
        self.invoke_json_with(
            &CREATE_STACK,
            &PathArgs::new(),
            RequestOptions::new().json(stack_data.clone()),
        )
        .await
    }

    /// List all stacks
    pub async fn list_stacks(&self) -> Result<Vec<Value>> {
        self.invoke_results(&LIST_STACKS, &PathArgs::new(), RequestOptions::new())
            .await
    }

    /// The stack with the given id, or `None` on 404 when `none_on_404` is set
    pub async fn get_stack(&self, stack_id: u64, none_on_404: bool) -> Result<Option<Value>> {
        let args = PathArgs::new().arg("stack_id", stack_id);
        self.invoke_optional(&GET_STACK, &args, none_on_404).await
    }

    /// Stacks matching the given filters
    pub async fn search_stacks(&self, filters: &[(&str, &str)]) -> Result<Vec<Value>> {
        self.invoke_results(
            &SEARCH_STACKS,
            &PathArgs::new(),
            RequestOptions::new().query(filters),
        )
        .await
    }

    /// Destructively delete a stack forever
    pub async fn delete_stack(&self, stack_id: u64) -> Result<Value> {
        let args = PathArgs::new().arg("stack_id", stack_id);
        self.invoke_json(&DELETE_STACK, &args).await
    }

    /// Actions the server currently allows on the stack
    pub async fn get_valid_stack_actions(&self, stack_id: u64) -> Result<Vec<String>> {
        let args = PathArgs::new().arg("stack_id", stack_id);
        let body: Value = self.invoke_json(&GET_VALID_STACK_ACTIONS, &args).await?;
        Ok(serde_json::from_value(take_field(body, "available_actions")?)?)
    }

    /// Execute an action on a stack. The action is checked against the
    /// stack's available actions before anything is sent.
    pub async fn do_stack_action(&self, stack_id: u64, action: &str) -> Result<Value> {
        let valid_actions = self.get_valid_stack_actions(stack_id).await?;

        if !valid_actions.iter().any(|a| a == action) {
            return Err(Error::Validation(format!(
                "Invalid action, must be one of {}",
                valid_actions.join(", ")
            )));
        }

        tracing::info!("Running action '{}' on stack {}", action, stack_id);

        let args = PathArgs::new().arg("stack_id", stack_id);
        self.invoke_json_with(
            &DO_STACK_ACTION,
            &args,
            RequestOptions::new().json(json!({ "action": action })),
        )
        .await
    }

    /// History of a stack
    pub async fn get_stack_history(&self, stack_id: u64) -> Result<Value> {
        let args = PathArgs::new().arg("stack_id", stack_id);
        self.invoke_optional(&GET_STACK_HISTORY, &args, true)
            .await?
            .ok_or_else(|| Error::lookup("Stack", stack_id.to_string()))
    }

    /// Id of the stack titled `title`
    pub async fn get_stack_id(&self, title: &str) -> Result<u64> {
        let body: Value = self.invoke_json(&GET_STACK_ID, &PathArgs::new()).await?;
        find_id_by(&take_results(body)?, "title", title, "Stack")
    }

    /// All hosts of a stack
    pub async fn get_stack_hosts(&self, stack_id: u64) -> Result<Vec<Value>> {
        let args = PathArgs::new().arg("stack_id", stack_id);
        self.invoke_results(&GET_STACK_HOSTS, &args, RequestOptions::new())
            .await
    }

    /// One field of every host of a stack (e.g. `fqdn`). With `ec2` the field
    /// is read from the host's EC2 metadata instead. Hosts without the field
    /// are skipped; an empty result is an error.
    pub async fn describe_hosts(&self, stack_id: u64, key: &str, ec2: bool) -> Result<Vec<Value>> {
        let hosts = self.get_stack_hosts(stack_id).await?;

        let details: Vec<Value> = hosts
            .iter()
            .filter_map(|host| {
                let source = if ec2 { host.get(EC2_METADATA)? } else { host };
                source.get(key).filter(|v| !v.is_null()).cloned()
            })
            .collect();

        if details.is_empty() {
            return Err(Error::lookup(
                "Host key",
                format!("{} for stack {}", key, stack_id),
            ));
        }

        Ok(details)
    }

    /// Text of a stack log. `tail` limits the output to the last N lines.
    pub async fn get_logs(
        &self,
        stack_id: u64,
        log_type: LogType,
        level: LogLevel,
        date: LogDate,
        tail: Option<u32>,
    ) -> Result<String> {
        validate_log_selection(log_type, level)?;

        let args = PathArgs::new()
            .arg("stack_id", stack_id)
            .arg("log_type", log_type)
            .arg("level", level)
            .arg("date", date);

        let mut options = RequestOptions::new();
        if let Some(tail) = tail {
            options = options.query(&[("tail", tail)]);
        }

        self.invoke(&GET_LOGS, &args, options)
            .await?
            .map(|response| response.body)
            .ok_or_else(|| Error::UnexpectedResponse("get_logs returned no content".to_string()))
    }

    /// Access rules (security groups) of a stack
    pub async fn list_access_rules(&self, stack_id: u64) -> Result<Vec<Value>> {
        let args = PathArgs::new().arg("stack_id", stack_id);
        self.invoke_results(&LIST_ACCESS_RULES, &args, RequestOptions::new())
            .await
    }

    /// Id of the access rule whose host definition is titled `title`
    pub async fn get_access_rule_id(&self, stack_id: u64, title: &str) -> Result<u64> {
        let args = PathArgs::new().arg("stack_id", stack_id);
        let body: Value = self.invoke_json(&GET_ACCESS_RULE_ID, &args).await?;

        take_results(body)?
            .iter()
            .find(|group| {
                group
                    .pointer("/blueprint_host_definition/title")
                    .and_then(|t| t.as_str())
                    == Some(title)
            })
            .map(entity_id)
            .unwrap_or_else(|| Err(Error::lookup("Access Rule", title)))
    }

    /// Rules of a security group
    pub async fn list_rules_for_group(&self, group_id: u64) -> Result<Value> {
        let args = PathArgs::new().arg("group_id", group_id);
        self.invoke_json(&LIST_RULES_FOR_GROUP, &args).await
    }

    /// Add or remove a rule on a security group
    pub async fn edit_access_rule(&self, group_id: u64, data: &Value) -> Result<Value> {
        let args = PathArgs::new().arg("group_id", group_id);
        self.invoke_json_with(
            &EDIT_ACCESS_RULE,
            &args,
            RequestOptions::new().json(data.clone()),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::endpoint::placeholders;

    #[test]
    fn test_log_type_parse() {
        assert_eq!("launch".parse::<LogType>().unwrap(), LogType::Launch);
        assert_eq!(
            "global-orchestration".parse::<LogType>().unwrap(),
            LogType::GlobalOrchestration
        );
        let err = "deploy".parse::<LogType>().unwrap_err();
        assert!(err.to_string().contains("provisioning, global-orchestration"));
    }

    #[test]
    fn test_log_level_allow_list() {
        assert!(validate_log_selection(LogType::Provisioning, LogLevel::Error).is_ok());
        assert!(validate_log_selection(LogType::Launch, LogLevel::Log).is_ok());

        let err = validate_log_selection(LogType::Launch, LogLevel::Error).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("must be one of log"));
    }

    #[test]
    fn test_log_date() {
        assert_eq!(LogDate::Latest.to_string(), "latest");
        let date: LogDate = "2015-03-07".parse().unwrap();
        assert_eq!(date.to_string(), "20150307");
        assert_eq!("20150307".parse::<LogDate>().unwrap(), date);
        assert!("yesterday".parse::<LogDate>().is_err());
    }

    #[test]
    fn test_log_path() {
        let path = PathArgs::new()
            .arg("stack_id", 9)
            .arg("log_type", LogType::GlobalOrchestration)
            .arg("level", LogLevel::Error)
            .arg("date", LogDate::Latest)
            .resolve(GET_LOGS.endpoint)
            .unwrap();
        assert_eq!(path, "stacks/9/logs/global-orchestration.err.latest");
    }

    #[test]
    fn test_stack_templates_take_stack_id() {
        for op in [
            GET_STACK,
            DELETE_STACK,
            GET_VALID_STACK_ACTIONS,
            DO_STACK_ACTION,
            GET_STACK_HISTORY,
            GET_STACK_HOSTS,
            LIST_ACCESS_RULES,
        ] {
            assert_eq!(placeholders(op.endpoint), vec!["stack_id"], "{}", op.name);
        }
    }
}
