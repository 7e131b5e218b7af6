//! Model-based property tests.
//!
//! These tests generate random operation sequences and verify that the real
//! server state accepts and rejects exactly what the reference model does.
//!
//! # Architecture
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!     ModelSession    ServerState     Compare
//!     (reference)       (real)        Results
//! ```

use proptest::prelude::*;
use stagewire_core::ServerState;
use stagewire_harness::{ModelKind, ModelSession, Operation};
use stagewire_proto::{AudioFormat, Config, Content, ContentKind, Id, Stage};

const SLOTS: u8 = 4;

fn stage_id(slot: u8) -> Id {
    Id::from_u128(0x100 + u128::from(slot))
}

fn content_id(slot: u8) -> Id {
    Id::from_u128(0x200 + u128::from(slot))
}

/// Real server state wrapper that mirrors ModelSession's interface.
struct RealSession {
    state: ServerState,
}

impl RealSession {
    fn new() -> Self {
        Self { state: ServerState::new() }
    }

    fn apply(&mut self, op: &Operation) -> bool {
        let state = &mut self.state;
        let result = match *op {
            Operation::Ready { audio } => {
                state.ready(if audio { Config::audio() } else { Config::default() })
            },
            Operation::ReceiveText => state.receive_text_input(),
            Operation::ReceiveMedia => state.receive_media_input(),
            Operation::EndInput => state.end_input(),
            Operation::AddStage { stage, parent } => state.add_stage(&Stage {
                id: stage_id(stage),
                parent_id: parent.map(stage_id),
                title: format!("stage {stage}"),
                description: String::new(),
            }),
            Operation::Reparent { stage, parent } => {
                state.reparent_stage(stage_id(stage), parent.map(stage_id))
            },
            Operation::AddContent { content, stage, kind } => state.add_content(&Content {
                id: content_id(content),
                stage_id: stage_id(stage),
                kind: match kind {
                    ModelKind::Text => ContentKind::Text,
                    ModelKind::FunctionCall => ContentKind::FunctionCall,
                    ModelKind::Audio => ContentKind::Audio(AudioFormat::default()),
                },
            }),
            Operation::SendText { content } => state.text(content_id(content)),
            Operation::SendFunctionCall { content } => state.function_call(content_id(content)),
            Operation::OpenStream { content } => state.open_stream(content_id(content)),
            Operation::CloseStream { content } => state.close_stream(content_id(content)),
            Operation::EndOutput => state.end_output(),
            Operation::Interrupt => state.interrupt(),
            Operation::Reset => state.reset(),
            Operation::EndSession => state.end_session(),
        };
        result.is_ok()
    }
}

fn slot() -> impl Strategy<Value = u8> {
    0..SLOTS
}

fn kind() -> impl Strategy<Value = ModelKind> {
    prop_oneof![Just(ModelKind::Text), Just(ModelKind::FunctionCall), Just(ModelKind::Audio)]
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        1 => any::<bool>().prop_map(|audio| Operation::Ready { audio }),
        1 => Just(Operation::ReceiveText),
        1 => Just(Operation::ReceiveMedia),
        3 => Just(Operation::EndInput),
        3 => (slot(), proptest::option::of(slot()))
            .prop_map(|(stage, parent)| Operation::AddStage { stage, parent }),
        1 => (slot(), proptest::option::of(slot()))
            .prop_map(|(stage, parent)| Operation::Reparent { stage, parent }),
        3 => (slot(), slot(), kind())
            .prop_map(|(content, stage, kind)| Operation::AddContent { content, stage, kind }),
        2 => slot().prop_map(|content| Operation::SendText { content }),
        1 => slot().prop_map(|content| Operation::SendFunctionCall { content }),
        2 => slot().prop_map(|content| Operation::OpenStream { content }),
        2 => slot().prop_map(|content| Operation::CloseStream { content }),
        2 => Just(Operation::EndOutput),
        1 => Just(Operation::Interrupt),
        2 => Just(Operation::Reset),
        1 => Just(Operation::EndSession),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_server_state_matches_model(ops in prop::collection::vec(operation(), 1..80)) {
        let mut model = ModelSession::new();
        let mut real = RealSession::new();

        for (step, op) in ops.iter().enumerate() {
            let expected = model.apply(op);
            let actual = real.apply(op);
            prop_assert_eq!(actual, expected, "step {} diverged on {:?}", step, op);

            let registry = real.state.registry();
            prop_assert_eq!(registry.stage_count(), model.stage_count());
            prop_assert_eq!(registry.content_count(), model.content_count());
            prop_assert_eq!(real.state.request().session_ended(), model.session_ended());
            prop_assert_eq!(real.state.request().output_ended(), model.output_ended());
        }
    }

    #[test]
    fn prop_nothing_after_session_end(ops in prop::collection::vec(operation(), 0..40)) {
        let mut real = RealSession::new();
        real.apply(&Operation::Ready { audio: false });
        prop_assert!(real.apply(&Operation::EndSession));

        for op in &ops {
            prop_assert!(!real.apply(op), "{:?} accepted after session end", op);
        }
    }
}
