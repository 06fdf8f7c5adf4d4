use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use pulsecheck::api::HttpBackend;
use pulsecheck::clock::SystemClock;
use pulsecheck::config::EngineConfig;
use pulsecheck::engine::machine::{ModalView, RenderState};
use pulsecheck::engine::{CheckinEngine, EngineCommand};
use pulsecheck::model::InputMode;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let base_url = std::env::var("PULSECHECK_API")
        .unwrap_or_else(|_| "http://localhost:3000/api".to_string());
    tracing::info!(%base_url, "pulsecheck engine starting");

    let backend = Arc::new(HttpBackend::new(base_url));
    let (command_tx, command_rx) = mpsc::channel(16);
    let (render_tx, mut render_rx) = watch::channel(RenderState::default());
    let cancel = CancellationToken::new();

    let engine = CheckinEngine::new(
        backend,
        SystemClock,
        EngineConfig::default(),
        command_rx,
        render_tx,
        cancel.clone(),
    );
    let engine_task = tokio::spawn(engine.run());

    // Kick off a check-in right away, like the dashboard's trigger button.
    command_tx.send(EngineCommand::Trigger).await?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                break;
            }
            changed = render_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = render_rx.borrow_and_update().clone();
                print_state(&state);
            }
        }
    }

    engine_task.await?;
    Ok(())
}

fn print_state(state: &RenderState) {
    match &state.view {
        ModalView::Hidden => println!("[modal] hidden"),
        ModalView::Question {
            question,
            remaining_secs,
            ..
        } => {
            let hint = match question.kind.input_mode() {
                InputMode::FreeText => "free text",
                InputMode::Scale => "scale 1-10",
                InputMode::YesNo => "yes/no",
            };
            println!(
                "[modal] Q{} ({hint}, {remaining_secs}s left): {}",
                question.order, question.text
            );
        }
        ModalView::Break { remaining_secs } => {
            println!("[modal] break, next question in {remaining_secs}s");
        }
    }
    if let Some(notice) = state.notice {
        println!("[notice] {}", notice.message());
    }
}
