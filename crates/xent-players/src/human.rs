//! Prints the presentation to standard output and reads the move from
//! standard input — used for interactive play and manual debugging.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use xent_core::{RegisterValue, XentError, XentEvent};
use xent_presentation::PresentationFn;

use crate::envelope::strip_move_tags;
use crate::local_view::LocalView;
use crate::player::{MoveResult, Player};

pub struct HumanPlayer {
    view: LocalView,
}

impl HumanPlayer {
    pub fn new(present: PresentationFn) -> Self {
        Self {
            view: LocalView::new(present),
        }
    }
}

#[async_trait::async_trait]
impl Player for HumanPlayer {
    async fn make_move(&self, _var_name: char, register_snapshot: BTreeMap<char, RegisterValue>, _max_tokens: u32) -> Result<MoveResult, XentError> {
        let prompt = self.view.render(&register_snapshot);
        tokio::task::spawn_blocking(move || {
            println!("{prompt}");
            print!("> ");
            io::stdout().flush().map_err(|e| XentError::Internal(format!("failed to flush stdout: {e}")))?;
            let mut line = String::new();
            io::stdin()
                .lock()
                .read_line(&mut line)
                .map_err(|e| XentError::Internal(format!("failed to read from stdin: {e}")))?;
            let full_response = line.trim_end().to_string();
            let mut result = MoveResult::new(strip_move_tags(&full_response));
            result.full_response = full_response;
            result.prompts = vec![prompt];
            Ok(result)
        })
        .await
        .map_err(|e| XentError::Internal(format!("human player input task panicked: {e}")))?
    }

    fn post(&self, event: XentEvent) {
        self.view.post(event);
    }

    fn player_type(&self) -> &'static str {
        "human"
    }
}
