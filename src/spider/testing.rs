//! Scripted transport for tests: canned responses per URL, consumed in order, with a call log.

use crate::model::FetchResult;
use crate::spider::{SpiderError, Transport};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    responses: HashMap<String, VecDeque<FetchResult>>,
    calls: Vec<String>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue `result` as the next response for `url`.
    pub(crate) fn respond(mut self, url: &str, result: FetchResult) -> Self {
        self.responses
            .entry(url.to_string())
            .or_default()
            .push_back(result);
        self
    }

    /// Every URL requested so far, in request order.
    pub(crate) fn calls(&self) -> &[String] {
        &self.calls
    }
}

impl Transport for ScriptedTransport {
    // Unscripted or exhausted URLs answer 404.
    fn get(&mut self, url: &str) -> Result<FetchResult, SpiderError> {
        self.calls.push(url.to_string());
        Ok(self
            .responses
            .get_mut(url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| FetchResult::status(404)))
    }
}
