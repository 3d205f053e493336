//! Shared test fixtures: a scripted remote client and session helpers.

use anyhow::Result;
use clamity::aws::client::{Filter, RemoteClient, RemoteResponse};
use clamity::config::{OutputFormat, Settings};
use clamity::resource::ResourceKind;
use clamity::session::Session;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Remote client driven by queued responses. Every call is recorded as
/// `op:kind:region[:id]`; a call with no queued response fails the test.
#[derive(Default, Clone)]
pub struct ScriptedClient {
    pub calls: Rc<RefCell<Vec<String>>>,
    pub list_responses: Rc<RefCell<VecDeque<RemoteResponse>>>,
    pub describe_responses: Rc<RefCell<VecDeque<RemoteResponse>>>,
    pub create_responses: Rc<RefCell<VecDeque<RemoteResponse>>>,
    pub update_responses: Rc<RefCell<VecDeque<RemoteResponse>>>,
    pub delete_responses: Rc<RefCell<VecDeque<RemoteResponse>>>,
    pub value_responses: Rc<RefCell<VecDeque<RemoteResponse>>>,
    pub restore_responses: Rc<RefCell<VecDeque<RemoteResponse>>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls_matching(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn pop(queue: &RefCell<VecDeque<RemoteResponse>>, operation: &str) -> Result<RemoteResponse> {
        queue
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("unexpected {operation} call"))
    }
}

impl RemoteClient for ScriptedClient {
    fn list(&self, kind: ResourceKind, region: &str, _filters: &[Filter]) -> Result<RemoteResponse> {
        self.record(format!("list:{kind}:{region}"));
        Self::pop(&self.list_responses, "list")
    }

    fn describe(&self, kind: ResourceKind, region: &str, id: &str) -> Result<RemoteResponse> {
        self.record(format!("describe:{kind}:{region}:{id}"));
        Self::pop(&self.describe_responses, "describe")
    }

    fn create(&self, kind: ResourceKind, region: &str, _attributes: &Value) -> Result<RemoteResponse> {
        self.record(format!("create:{kind}:{region}"));
        Self::pop(&self.create_responses, "create")
    }

    fn update(
        &self,
        kind: ResourceKind,
        region: &str,
        id: &str,
        _changes: &Value,
    ) -> Result<RemoteResponse> {
        self.record(format!("update:{kind}:{region}:{id}"));
        Self::pop(&self.update_responses, "update")
    }

    fn delete(&self, kind: ResourceKind, region: &str, id: &str) -> Result<RemoteResponse> {
        self.record(format!("delete:{kind}:{region}:{id}"));
        Self::pop(&self.delete_responses, "delete")
    }

    fn read_value(&self, kind: ResourceKind, region: &str, id: &str) -> Result<RemoteResponse> {
        self.record(format!("read_value:{kind}:{region}:{id}"));
        Self::pop(&self.value_responses, "read_value")
    }

    fn restore(&self, kind: ResourceKind, region: &str, id: &str) -> Result<RemoteResponse> {
        self.record(format!("restore:{kind}:{region}:{id}"));
        Self::pop(&self.restore_responses, "restore")
    }
}

pub fn session_with(client: &ScriptedClient, region: &str) -> Session {
    let settings = Settings {
        region: region.to_string(),
        output: OutputFormat::Table,
        endpoint: None,
    };
    Session::new(settings, Box::new(client.clone()))
}
