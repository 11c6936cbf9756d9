//! Publishes elicit requests over a websocket session and awaits a
//! response with a deadline. The actual socket plumbing (accepting the
//! connection, reading/writing frames) lives in `xentd`'s server surface;
//! this type only owns the request/response handoff.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use xent_core::{RegisterValue, XentError, XentEvent};
use xent_presentation::PresentationFn;

use crate::envelope::strip_move_tags;
use crate::local_view::LocalView;
use crate::player::{MoveResult, Player};

/// One outstanding elicit request published to whatever task owns the
/// websocket connection for `player_id`.
pub struct WsElicitRequest {
    pub player_id: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub reply: oneshot::Sender<String>,
}

pub struct WebSocketPlayer {
    player_id: String,
    outbound: mpsc::Sender<WsElicitRequest>,
    view: LocalView,
    deadline: Duration,
}

impl WebSocketPlayer {
    pub fn new(player_id: impl Into<String>, outbound: mpsc::Sender<WsElicitRequest>, present: PresentationFn, deadline: Duration) -> Self {
        Self {
            player_id: player_id.into(),
            outbound,
            view: LocalView::new(present),
            deadline,
        }
    }
}

#[async_trait::async_trait]
impl Player for WebSocketPlayer {
    async fn make_move(&self, _var_name: char, register_snapshot: BTreeMap<char, RegisterValue>, max_tokens: u32) -> Result<MoveResult, XentError> {
        let prompt = self.view.render(&register_snapshot);
        let (reply_tx, reply_rx) = oneshot::channel();
        self.outbound
            .send(WsElicitRequest {
                player_id: self.player_id.clone(),
                prompt: prompt.clone(),
                max_tokens,
                reply: reply_tx,
            })
            .await
            .map_err(|_| XentError::Game(format!("websocket session for player '{}' is closed", self.player_id)))?;

        let full_response = tokio::time::timeout(self.deadline, reply_rx)
            .await
            .map_err(|_| XentError::Game(format!("websocket player '{}' did not respond before the deadline", self.player_id)))?
            .map_err(|_| XentError::Game(format!("websocket session for player '{}' closed before replying", self.player_id)))?;

        Ok(MoveResult {
            response: strip_move_tags(&full_response),
            prompts: vec![prompt],
            full_response,
            token_usage: Default::default(),
        })
    }

    fn post(&self, event: XentEvent) {
        self.view.post(event);
    }

    fn player_type(&self) -> &'static str {
        "websocket"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present(ctx: &xent_presentation::PresentationContext) -> String {
        ctx.get('a').unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn delivers_the_reply_sent_on_the_reply_channel() {
        let (tx, mut rx) = mpsc::channel(1);
        let player = WebSocketPlayer::new("p1", tx, present, Duration::from_secs(1));

        let handle = tokio::spawn(async move {
            let request = rx.recv().await.unwrap();
            request.reply.send("<move>ok</move>".to_string()).unwrap();
        });

        let result = player.make_move('x', BTreeMap::new(), 10).await.unwrap();
        assert_eq!(result.response, "ok");
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn times_out_when_no_reply_arrives() {
        let (tx, _rx) = mpsc::channel(1);
        let player = WebSocketPlayer::new("p1", tx, present, Duration::from_millis(20));
        let err = player.make_move('x', BTreeMap::new(), 10).await.unwrap_err();
        assert!(matches!(err, XentError::Game(_)));
    }
}
