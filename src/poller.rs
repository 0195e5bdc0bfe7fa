use std::time::Duration;

use tracing::{debug, error, info};

use crate::error::HomeworkError;
use crate::homework::{check_response, parse_status, HomeworkRecord, Homeworks};
use crate::platform::Notifier;
use crate::practicum::HomeworkApi;

pub const NO_UPDATES_MESSAGE: &str = "Новых статусов нет";
pub const FAILURE_PREFIX: &str = "Сбой в работе программы";

/// Outcome of a single poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    StatusChanged(String),
    NoUpdates,
    Failed(String),
}

/// Polls the homework API and relays status changes to the chat.
pub struct Poller<A> {
    api: A,
    notifier: Notifier,
    retry_period: Duration,
    /// Lower bound (Unix seconds) of the next query window.
    cursor: i64,
}

impl<A: HomeworkApi> Poller<A> {
    pub fn new(api: A, notifier: Notifier, retry_period: Duration, start_from: i64) -> Self {
        Self {
            api,
            notifier,
            retry_period,
            cursor: start_from,
        }
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Poll forever. The delay is applied after each cycle, however long it took.
    pub async fn run(mut self) {
        info!(
            "Polling every {}s starting from {}",
            self.retry_period.as_secs(),
            self.cursor
        );
        loop {
            match self.poll_once().await {
                CycleOutcome::StatusChanged(message) => info!("Reported: {}", message),
                CycleOutcome::NoUpdates => {}
                CycleOutcome::Failed(message) => debug!("Failure reported to chat: {}", message),
            }
            tokio::time::sleep(self.retry_period).await;
        }
    }

    /// Run one fetch/validate/notify cycle without sleeping.
    pub async fn poll_once(&mut self) -> CycleOutcome {
        match self.check_for_updates().await {
            Ok(Some(message)) => {
                self.notifier.notify(&message).await;
                CycleOutcome::StatusChanged(message)
            }
            Ok(None) => {
                self.notifier.notify(NO_UPDATES_MESSAGE).await;
                CycleOutcome::NoUpdates
            }
            Err(e) => {
                let message = format!("{}: {}", FAILURE_PREFIX, e);
                error!("{}", message);
                self.notifier.notify(&message).await;
                CycleOutcome::Failed(message)
            }
        }
    }

    /// Fetch, validate and render. `None` means nothing changed.
    async fn check_for_updates(&mut self) -> Result<Option<String>, HomeworkError> {
        let from_date = if self.cursor == 0 {
            chrono::Utc::now().timestamp()
        } else {
            self.cursor
        };

        let response = self.api.fetch(from_date).await?;
        let checked = check_response(&response)?;

        let message = match &checked.homeworks {
            Homeworks::NoUpdates => {
                debug!("No new statuses");
                None
            }
            Homeworks::Updated(items) => {
                debug!("Homework status changed");
                // Only the newest record matters; the rest are older changes.
                let record = HomeworkRecord::from_value(&items[0])?;
                Some(parse_status(&record)?)
            }
        };

        self.advance_cursor(checked.current_date);
        Ok(message)
    }

    fn advance_cursor(&mut self, current_date: i64) {
        if current_date > self.cursor {
            debug!("Cursor advanced {} -> {}", self.cursor, current_date);
            self.cursor = current_date;
        }
    }
}
