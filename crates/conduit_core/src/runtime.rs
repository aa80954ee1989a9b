use std::sync::Arc;

use tokio::{
    sync::{broadcast, mpsc},
    task::JoinSet,
};
use tracing::{debug, info, warn};

use crate::{
    api::ConduitApi,
    page::Subscription,
    route,
    session::{decode_user, SessionChannel},
    shell::{self, Effect, Model, Msg, ShellConfig},
    view::Document,
};

pub struct Runtime {
    model: Model,
    api: Arc<dyn ConduitApi>,
    channel: Arc<dyn SessionChannel>,
    session_events: broadcast::Receiver<String>,
    queue_tx: mpsc::UnboundedSender<Msg>,
    queue_rx: mpsc::UnboundedReceiver<Msg>,
    in_flight: JoinSet<()>,
    location: String,
}

impl Runtime {
    /// Boots from whatever the session channel currently holds.
    pub fn boot(
        config: ShellConfig,
        api: Arc<dyn ConduitApi>,
        channel: Arc<dyn SessionChannel>,
        location: &str,
    ) -> Self {
        let payload = channel.load();
        Self::boot_with_payload(config, api, channel, payload.as_deref(), location)
    }

    pub fn boot_with_payload(
        config: ShellConfig,
        api: Arc<dyn ConduitApi>,
        channel: Arc<dyn SessionChannel>,
        boot_payload: Option<&str>,
        location: &str,
    ) -> Self {
        let session_events = channel.subscribe();
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (model, effects) = shell::init(config, boot_payload, route::resolve(location));
        let mut runtime = Self {
            model,
            api,
            channel,
            session_events,
            queue_tx,
            queue_rx,
            in_flight: JoinSet::new(),
            location: location.to_string(),
        };
        runtime.execute_all(effects);
        runtime
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<Msg> {
        self.queue_tx.clone()
    }

    pub fn dispatch(&self, msg: Msg) {
        self.enqueue(msg);
    }

    /// Records a user-initiated location change and queues its route.
    pub fn visit(&mut self, location: &str) {
        info!(location, "visiting");
        self.location = location.to_string();
        self.enqueue(Msg::SetRoute(route::resolve(location)));
    }

    pub fn render(&self) -> Document {
        shell::view(&self.model)
    }

    /// Runs until no message is queued and no effect is in flight.
    pub async fn settle(&mut self) {
        loop {
            self.poll_session_events();
            if let Ok(msg) = self.queue_rx.try_recv() {
                self.process(msg);
                continue;
            }
            match self.in_flight.join_next().await {
                Some(Ok(())) => {}
                Some(Err(err)) => warn!(error = %err, "effect task did not complete"),
                None => {
                    self.poll_session_events();
                    match self.queue_rx.try_recv() {
                        Ok(msg) => self.process(msg),
                        Err(_) => break,
                    }
                }
            }
        }
    }

    fn process(&mut self, msg: Msg) {
        let effects = shell::update(&mut self.model, msg);
        self.execute_all(effects);
    }

    fn execute_all(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::Load { epoch, request } => {
                debug!(%epoch, ?request, "spawning page load");
                let api = Arc::clone(&self.api);
                let queue = self.queue_tx.clone();
                self.in_flight.spawn(async move {
                    let msg = request.perform(api.as_ref(), epoch).await;
                    let _ = queue.send(msg);
                });
            }
            Effect::Page(request) => {
                let api = Arc::clone(&self.api);
                let queue = self.queue_tx.clone();
                self.in_flight.spawn(async move {
                    let msg = request.perform(api.as_ref()).await;
                    let _ = queue.send(Msg::Page(msg));
                });
            }
            Effect::StoreSession(user) => {
                if let Err(err) = self.channel.store(user.as_ref()) {
                    warn!(error = %err, "failed to persist session");
                }
            }
            Effect::ReplaceUrl(route) => {
                self.location = route.href();
                debug!(location = %self.location, "replacing location");
                self.enqueue(Msg::SetRoute(Some(route)));
            }
        }
    }

    fn enqueue(&self, msg: Msg) {
        if self.queue_tx.send(msg).is_err() {
            warn!("message queue closed; dropping message");
        }
    }

    fn poll_session_events(&mut self) {
        if !shell::subscriptions(&self.model).contains(&Subscription::SessionChanges) {
            return;
        }
        loop {
            match self.session_events.try_recv() {
                Ok(raw) => self.enqueue(Msg::SetUser(decode_user(&raw))),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "missed session notifications");
                }
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
