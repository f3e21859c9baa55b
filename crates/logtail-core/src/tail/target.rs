//! What a session tails and how a connection request is parameterized.

/// Identifies one phase of one job's log stream on a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailTarget {
    /// Base URL of the log stream resource.
    pub endpoint: String,
    /// Logical phase being tailed (e.g. `plan`, `apply`).
    pub phase: String,
    /// Optional stream discriminator sent as `stream`.
    pub stream: Option<String>,
    /// Optional run identifier sent as `run_id`.
    pub run_id: Option<String>,
}

impl TailTarget {
    /// Create a target for `phase` on `endpoint`.
    pub fn new(endpoint: impl Into<String>, phase: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            phase: phase.into(),
            stream: None,
            run_id: None,
        }
    }

    /// Set the stream discriminator.
    #[must_use]
    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = Some(stream.into());
        self
    }

    /// Set the run identifier.
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    /// Display container that receives this phase's output.
    pub fn container_id(&self) -> String {
        container_id(&self.phase)
    }
}

/// Container identifier for a phase: `tailed-<phase>-logs`.
pub fn container_id(phase: &str) -> String {
    format!("tailed-{phase}-logs")
}

/// Everything a transport needs to open one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    /// The tailed stream.
    pub target: TailTarget,
    /// Offset to resume from.
    pub offset: u64,
    /// 1-based connection attempt number within the session.
    pub attempt: u32,
}

impl OpenRequest {
    /// Query parameters in wire order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(run_id) = &self.target.run_id {
            pairs.push(("run_id", run_id.clone()));
        }
        pairs.push(("phase", self.target.phase.clone()));
        pairs.push(("offset", self.offset.to_string()));
        if let Some(stream) = &self.target.stream {
            pairs.push(("stream", stream.clone()));
        }
        pairs
    }
}
