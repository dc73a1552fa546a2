//! Deterministic provider replaying scripted turns
//!
//! Each call to `begin_turn` replays the next scripted turn verbatim. Used
//! by the orchestrator tests and for offline dry runs; asking for a turn
//! beyond the script is a transport error, which doubles as proof that the
//! loop stopped calling the model.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::provider::{
    ModelEvent, ModelProvider, ProviderError, TurnRequest, EVENT_CHANNEL_CAPACITY,
};

/// A provider that plays back pre-recorded turns
#[derive(Debug)]
pub struct ScriptedProvider {
    turns: Mutex<VecDeque<Vec<ModelEvent>>>,
}

impl ScriptedProvider {
    pub fn new(turns: Vec<Vec<ModelEvent>>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
        }
    }

    /// Turns not yet played back
    pub fn remaining_turns(&self) -> usize {
        self.turns.lock().map(|turns| turns.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn begin_turn(
        &self,
        _request: TurnRequest,
    ) -> Result<mpsc::Receiver<ModelEvent>, ProviderError> {
        let turn = self
            .turns
            .lock()
            .ok()
            .and_then(|mut turns| turns.pop_front());
        let Some(events) = turn else {
            return Err(ProviderError::Transport(
                "script exhausted: no turn left to play".to_string(),
            ));
        };

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        tokio::spawn(async move {
            let mut terminated = false;
            for event in events {
                terminated = matches!(
                    &event,
                    ModelEvent::TurnComplete | ModelEvent::TransportError(_)
                );
                if tx.send(event).await.is_err() {
                    return;
                }
                if terminated {
                    break;
                }
            }
            if !terminated {
                let _ = tx.send(ModelEvent::TurnComplete).await;
            }
        });
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_request() -> TurnRequest {
        TurnRequest {
            conversation: vec![],
            tools: vec![],
            temperature: 0.0,
            max_output_tokens: 16,
        }
    }

    #[tokio::test]
    async fn test_turns_play_back_in_order_with_completion_appended() {
        let provider = ScriptedProvider::new(vec![vec![
            ModelEvent::TextDelta("a".to_string()),
            ModelEvent::TextDelta("b".to_string()),
        ]]);

        let mut rx = provider.begin_turn(empty_request()).await.unwrap();
        assert_eq!(rx.recv().await, Some(ModelEvent::TextDelta("a".to_string())));
        assert_eq!(rx.recv().await, Some(ModelEvent::TextDelta("b".to_string())));
        assert_eq!(rx.recv().await, Some(ModelEvent::TurnComplete));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_exhausted_script_is_a_transport_error() {
        let provider = ScriptedProvider::new(vec![]);
        let err = provider.begin_turn(empty_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
