//! Reference model of a server session.
//!
//! A deliberately naive re-statement of the request rules over small integer
//! ids. Model-based tests drive the model and the real
//! [`ServerState`](stagewire_core::ServerState) with the same operations and
//! require both to accept and reject the same ones.

use std::collections::{HashMap, HashSet};

/// Content kinds the model distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Streamable text
    Text,
    /// Single-shot function call
    FunctionCall,
    /// Streamable audio
    Audio,
}

impl ModelKind {
    fn streamable(self) -> bool {
        self != Self::FunctionCall
    }
}

/// One step applied to both the model and the real state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Client configuration arrives
    Ready {
        /// Audio input mode instead of text
        audio: bool,
    },
    /// Client text input arrives
    ReceiveText,
    /// Client media chunk arrives
    ReceiveMedia,
    /// Input ends
    EndInput,
    /// Register a stage
    AddStage {
        /// Stage slot
        stage: u8,
        /// Parent slot
        parent: Option<u8>,
    },
    /// Move a stage
    Reparent {
        /// Stage slot
        stage: u8,
        /// New parent slot
        parent: Option<u8>,
    },
    /// Register content
    AddContent {
        /// Content slot
        content: u8,
        /// Owning stage slot
        stage: u8,
        /// Content kind
        kind: ModelKind,
    },
    /// Single-shot text payload
    SendText {
        /// Content slot
        content: u8,
    },
    /// Function call payload
    SendFunctionCall {
        /// Content slot
        content: u8,
    },
    /// Open a stream
    OpenStream {
        /// Content slot
        content: u8,
    },
    /// Close a stream
    CloseStream {
        /// Content slot
        content: u8,
    },
    /// End output
    EndOutput,
    /// Interrupt the request
    Interrupt,
    /// Start the next request
    Reset,
    /// End the session
    EndSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelPhase {
    NotReady,
    Ready,
    InputEnded,
    OutputEnded,
    Interrupted,
    Ended,
}

/// Reference server session.
#[derive(Debug, Clone)]
pub struct ModelSession {
    phase: ModelPhase,
    audio: Option<bool>,
    text_received: bool,
    stages: HashMap<u8, Option<u8>>,
    contents: HashMap<u8, ModelKind>,
    open: HashSet<u8>,
    associated: HashSet<u8>,
}

impl Default for ModelSession {
    fn default() -> Self {
        Self {
            phase: ModelPhase::NotReady,
            audio: None,
            text_received: false,
            stages: HashMap::new(),
            contents: HashMap::new(),
            open: HashSet::new(),
            associated: HashSet::new(),
        }
    }
}

impl ModelSession {
    /// Create a session waiting for configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an operation; returns whether it was accepted.
    ///
    /// Rejected operations leave the model unchanged.
    pub fn apply(&mut self, op: &Operation) -> bool {
        match *op {
            Operation::Ready { audio } => {
                if !self.live() || self.audio.is_some() {
                    return false;
                }
                self.audio = Some(audio);
                self.phase = ModelPhase::Ready;
                true
            },
            Operation::ReceiveText => {
                if !self.input_open() || self.audio != Some(false) || self.text_received {
                    return false;
                }
                self.text_received = true;
                true
            },
            Operation::ReceiveMedia => self.input_open() && self.audio == Some(true),
            Operation::EndInput => {
                if !self.input_open() {
                    return false;
                }
                self.phase = ModelPhase::InputEnded;
                true
            },
            Operation::AddStage { stage, parent } => {
                if !self.output_open() || self.stages.contains_key(&stage) {
                    return false;
                }
                if let Some(parent) = parent
                    && (parent == stage || !self.stages.contains_key(&parent))
                {
                    return false;
                }
                self.stages.insert(stage, parent);
                true
            },
            Operation::Reparent { stage, parent } => {
                if !self.output_open() || !self.stages.contains_key(&stage) {
                    return false;
                }
                if let Some(parent) = parent
                    && (self.is_ancestor_or_self(stage, parent)
                        || !self.stages.contains_key(&parent))
                {
                    return false;
                }
                self.stages.insert(stage, parent);
                true
            },
            Operation::AddContent { content, stage, kind } => {
                if !self.output_open()
                    || self.contents.contains_key(&content)
                    || !self.stages.contains_key(&stage)
                {
                    return false;
                }
                self.contents.insert(content, kind);
                true
            },
            Operation::SendText { content } => self.single_shot(content, ModelKind::Text),
            Operation::SendFunctionCall { content } => {
                self.single_shot(content, ModelKind::FunctionCall)
            },
            Operation::OpenStream { content } => {
                if !self.output_open() {
                    return false;
                }
                let Some(kind) = self.contents.get(&content) else {
                    return false;
                };
                if !kind.streamable() || self.associated.contains(&content) {
                    return false;
                }
                self.open.insert(content);
                self.associated.insert(content);
                true
            },
            Operation::CloseStream { content } => self.output_open() && self.open.remove(&content),
            Operation::EndOutput => {
                let complete = self.open.is_empty()
                    && self.contents.keys().all(|content| self.associated.contains(content));
                if !self.output_open() || !complete {
                    return false;
                }
                self.phase = ModelPhase::OutputEnded;
                true
            },
            Operation::Interrupt => {
                if matches!(self.phase, ModelPhase::Ended | ModelPhase::Interrupted) {
                    return false;
                }
                self.phase = ModelPhase::Interrupted;
                self.clear_output();
                true
            },
            Operation::Reset => {
                if self.phase == ModelPhase::Ended {
                    return false;
                }
                self.phase =
                    if self.audio.is_some() { ModelPhase::Ready } else { ModelPhase::NotReady };
                self.text_received = false;
                self.clear_output();
                true
            },
            Operation::EndSession => {
                if self.phase == ModelPhase::Ended {
                    return false;
                }
                self.phase = ModelPhase::Ended;
                true
            },
        }
    }

    /// Number of registered stages
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Number of registered content items
    pub fn content_count(&self) -> usize {
        self.contents.len()
    }

    /// Whether the session has ended
    pub fn session_ended(&self) -> bool {
        self.phase == ModelPhase::Ended
    }

    /// Whether output of the current request has ended
    pub fn output_ended(&self) -> bool {
        self.phase == ModelPhase::OutputEnded
    }

    fn live(&self) -> bool {
        !matches!(self.phase, ModelPhase::Ended | ModelPhase::Interrupted)
    }

    fn input_open(&self) -> bool {
        self.phase == ModelPhase::Ready
    }

    fn output_open(&self) -> bool {
        self.phase == ModelPhase::InputEnded
    }

    fn single_shot(&mut self, content: u8, expected: ModelKind) -> bool {
        if !self.output_open() || self.contents.get(&content) != Some(&expected) {
            return false;
        }
        self.associated.insert(content)
    }

    fn is_ancestor_or_self(&self, stage: u8, mut node: u8) -> bool {
        // Bounded by the number of stages since the forest stays acyclic
        for _ in 0..=self.stages.len() {
            if node == stage {
                return true;
            }
            match self.stages.get(&node).copied().flatten() {
                Some(parent) => node = parent,
                None => return false,
            }
        }
        false
    }

    fn clear_output(&mut self) {
        self.stages.clear();
        self.contents.clear();
        self.open.clear();
        self.associated.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_request_round() {
        let mut model = ModelSession::new();
        let ops = [
            Operation::Ready { audio: false },
            Operation::ReceiveText,
            Operation::EndInput,
            Operation::AddStage { stage: 0, parent: None },
            Operation::AddContent { content: 0, stage: 0, kind: ModelKind::Text },
            Operation::SendText { content: 0 },
            Operation::EndOutput,
        ];
        assert!(ops.iter().all(|op| model.apply(op)));
        assert!(model.output_ended());
    }

    #[test]
    fn reparent_under_descendant_rejected() {
        let mut model = ModelSession::new();
        model.apply(&Operation::Ready { audio: false });
        model.apply(&Operation::EndInput);
        model.apply(&Operation::AddStage { stage: 0, parent: None });
        model.apply(&Operation::AddStage { stage: 1, parent: Some(0) });

        assert!(!model.apply(&Operation::Reparent { stage: 0, parent: Some(1) }));
        assert!(model.apply(&Operation::Reparent { stage: 1, parent: None }));
    }
}
