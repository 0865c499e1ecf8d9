//! The adapter object: poll loop, action handling and page bootstrap
//!
//! One [`Adapter`] owns the DOM capability and the sink. Its [`Adapter::run`]
//! loop is the single thread of control: it alternates between poll ticks and
//! action events and never runs two of them at once.

use crate::action::{self, ActionEvent, DispatchOutcome};
use crate::dom::PageDom;
use crate::extract::StateExtractor;
use crate::resolver::{ControlSet, ElementResolver};
use crate::sink::PlayerSink;
use crate::{AdapterConfig, Result, StateSnapshot};
use log::{debug, info};
use tokio::sync::mpsc;

pub struct Adapter<D: PageDom, S: PlayerSink> {
    dom: D,
    sink: S,
    config: AdapterConfig,
    resolver: ElementResolver,
    extractor: StateExtractor,
}

impl<D: PageDom, S: PlayerSink> Adapter<D, S> {
    /// Validate the config and wire the components together
    pub fn new(dom: D, sink: S, config: AdapterConfig) -> Result<Self> {
        config.validate()?;
        let resolver = ElementResolver::new(config.controls.clone(), &config.icons);
        let extractor = StateExtractor::new(config.fields.clone());
        Ok(Self { dom, sink, config, resolver, extractor })
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn into_parts(self) -> (D, S) {
        (self.dom, self.sink)
    }

    /// Fresh control lookup; the result must not outlive the current step.
    pub fn resolve_controls(&self) -> ControlSet<D::Handle> {
        self.resolver.resolve(&self.dom)
    }

    /// Read the page without pushing anything
    pub fn snapshot(&self) -> StateSnapshot {
        let controls = self.resolve_controls();
        self.extractor.extract(&self.dom, &controls)
    }

    /// One poll tick: extract and push unconditionally.
    pub fn tick(&self) -> StateSnapshot {
        let snapshot = self.snapshot();
        self.sink.push(&snapshot);
        snapshot
    }

    /// Handle one action event synchronously
    pub fn handle_action(&self, event: &ActionEvent) -> DispatchOutcome {
        action::dispatch(&self.dom, &self.resolver, event)
    }

    /// Resolve once the page reports it has loaded
    pub async fn wait_until_ready(&self) {
        if self.dom.ready_state().is_ready() {
            return;
        }
        info!("waiting for page to finish loading");
        let mut check = tokio::time::interval(self.config.ready_check_interval());
        loop {
            check.tick().await;
            if self.dom.ready_state().is_ready() {
                return;
            }
        }
    }

    /// Bootstrap and run for the lifetime of the page.
    ///
    /// Waits for the page, then ticks immediately and again `poll_interval`
    /// after each tick completes. Actions are handled between ticks as they
    /// arrive. Never returns; if the action source goes away, polling goes
    /// on.
    pub async fn run(&self, mut actions: mpsc::Receiver<ActionEvent>) {
        self.wait_until_ready().await;
        info!("page ready; polling every {}ms", self.config.poll_interval_ms);

        let mut actions_open = true;
        loop {
            self.tick();

            let next_tick = tokio::time::sleep(self.config.poll_interval());
            tokio::pin!(next_tick);
            loop {
                tokio::select! {
                    _ = &mut next_tick => break,
                    event = actions.recv(), if actions_open => match event {
                        Some(event) => {
                            let outcome = self.handle_action(&event);
                            debug!("action {:?}: {:?}", event.name, outcome);
                        }
                        None => {
                            debug!("action source closed");
                            actions_open = false;
                        }
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::PlayerAction;
    use crate::dom::ReadyState;
    use crate::icon::PLAY_ICON_PATH;
    use crate::resolver::tests::widget;
    use crate::resolver::Control;
    use crate::sink::RecordingSink;
    use crate::PlaybackState;
    use std::sync::Arc;
    use std::time::Duration;

    fn fast_config() -> AdapterConfig {
        AdapterConfig { poll_interval_ms: 20, ready_check_interval_ms: 5, ..Default::default() }
    }

    #[test]
    fn tick_pushes_and_returns_snapshot() {
        let w = widget(PLAY_ICON_PATH, true, false);
        let adapter = Adapter::new(w.page, RecordingSink::new(), AdapterConfig::default()).unwrap();
        let snap = adapter.tick();
        assert_eq!(snap.state, PlaybackState::Paused);
        assert_eq!(adapter.sink().events().len(), 6);
        adapter.tick();
        assert_eq!(adapter.sink().track_pushes(), 2);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let w = widget(PLAY_ICON_PATH, false, false);
        let cfg = AdapterConfig { poll_interval_ms: 0, ..Default::default() };
        assert!(Adapter::new(w.page, RecordingSink::new(), cfg).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn run_waits_for_page_then_polls() {
        let w = widget(PLAY_ICON_PATH, false, false);
        w.page.set_ready(ReadyState::Loading);
        let adapter = Arc::new(Adapter::new(w.page, RecordingSink::new(), fast_config()).unwrap());
        let (_tx, rx) = mpsc::channel(8);

        let runner = adapter.clone();
        let task = tokio::spawn(async move { runner.run(rx).await });

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(adapter.sink().track_pushes(), 0);

        adapter.dom().set_ready(ReadyState::Interactive);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(adapter.sink().track_pushes() >= 2);
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn actions_are_handled_between_ticks() {
        let w = widget(PLAY_ICON_PATH, false, false);
        let (toggle, next) = (w.toggle_button, w.next_button);
        let adapter = Arc::new(Adapter::new(w.page, RecordingSink::new(), fast_config()).unwrap());
        let (tx, rx) = mpsc::channel(8);

        let runner = adapter.clone();
        let task = tokio::spawn(async move { runner.run(rx).await });

        tx.send(PlayerAction::TogglePlay.into()).await.unwrap();
        tx.send(ActionEvent::new("next-song")).await.unwrap();
        tx.send(ActionEvent::new("shuffle")).await.unwrap();
        drop(tx);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(adapter.dom().clicks(), vec![toggle, next]);
        // Closing the action source does not stop polling
        let pushes = adapter.sink().track_pushes();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(adapter.sink().track_pushes() > pushes);
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_follow_the_poll_interval() {
        let w = widget(PLAY_ICON_PATH, false, false);
        let adapter = Arc::new(Adapter::new(w.page, RecordingSink::new(), fast_config()).unwrap());
        let (_tx, rx) = mpsc::channel(8);

        let runner = adapter.clone();
        let task = tokio::spawn(async move { runner.run(rx).await });

        // Immediate first tick, then at 20ms and 40ms
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(adapter.sink().track_pushes(), 3);
        task.abort();
    }

    #[test]
    fn handle_action_resolves_fresh() {
        let w = widget(PLAY_ICON_PATH, false, false);
        let adapter = Adapter::new(w.page, RecordingSink::new(), AdapterConfig::default()).unwrap();
        let out = adapter.handle_action(&PlayerAction::Play.into());
        assert_eq!(out, DispatchOutcome::Clicked { action: PlayerAction::Play, control: Control::Play });
        assert!(adapter.sink().events().is_empty());
    }
}
