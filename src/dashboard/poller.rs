// 🔄 Poller
// Refreshes whatever the dashboard is showing on a fixed interval, and right
// away whenever the view or the followed list changes.

use super::client::DashboardClient;
use crate::officers::{
    group_officers, officer_title, summarize_appointments, AppointmentSummary, OfficerGroup,
};
use crate::registry::{CompanyProfile, Filing};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

pub const COMPANIES_ERROR: &str = "Error loading followed companies. Please try again later.";
pub const COMPANY_ERROR: &str = "Error loading company information. Please try again later.";
pub const OFFICER_ERROR: &str = "Failed to load officer appointments.";

/// What is on screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Followed,
    Company(String),
    Officer(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanySnapshot {
    pub number: String,
    pub profile: CompanyProfile,
    pub officers: Vec<OfficerGroup>,
    pub filings: Vec<Filing>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficerSnapshot {
    pub officer_id: String,
    pub title: String,
    pub appointments: Vec<AppointmentSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Followed(Vec<CompanyProfile>),
    Company(CompanySnapshot),
    Officer(OfficerSnapshot),
    /// Generic failure message for `view`
    Failed { view: View, message: String },
    /// Result of a download, for the status line
    Downloaded(String),
}

impl Update {
    /// The view this update belongs to; None for view-independent updates.
    pub fn view(&self) -> Option<View> {
        match self {
            Update::Followed(_) => Some(View::Followed),
            Update::Company(s) => Some(View::Company(s.number.clone())),
            Update::Officer(s) => Some(View::Officer(s.officer_id.clone())),
            Update::Failed { view, .. } => Some(view.clone()),
            Update::Downloaded(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct Poller {
    client: DashboardClient,
    interval: Duration,
}

impl Poller {
    pub fn new(client: DashboardClient, interval: Duration) -> Self {
        Self { client, interval }
    }

    /// Fetch everything `view` needs. Any failure collapses into a generic message.
    pub async fn snapshot(&self, view: &View, follows: &[String]) -> Update {
        match view {
            View::Followed => {
                let mut profiles = Vec::with_capacity(follows.len());
                for number in follows {
                    match self.client.company_profile(number).await {
                        Ok(profile) => profiles.push(profile),
                        Err(e) => {
                            tracing::warn!(company_number = %number, error = %e, "profile refresh failed");
                            return failed(view, COMPANIES_ERROR);
                        }
                    }
                }
                Update::Followed(profiles)
            }
            View::Company(number) => match self.company(number).await {
                Ok(snapshot) => Update::Company(snapshot),
                Err(e) => {
                    tracing::warn!(company_number = %number, error = %e, "company refresh failed");
                    failed(view, COMPANY_ERROR)
                }
            },
            View::Officer(id) => match self.client.appointments(id).await {
                Ok(list) => Update::Officer(OfficerSnapshot {
                    officer_id: id.clone(),
                    title: officer_title(id, &list.items),
                    appointments: summarize_appointments(&list.items),
                }),
                Err(e) => {
                    tracing::warn!(officer_id = %id, error = %e, "appointments refresh failed");
                    failed(view, OFFICER_ERROR)
                }
            },
        }
    }

    async fn company(&self, number: &str) -> crate::error::Result<CompanySnapshot> {
        let profile = self.client.company_profile(number).await?;
        let officers = self.client.officers(number).await?;
        let filings = self.client.filings(number).await?;
        Ok(CompanySnapshot {
            number: number.to_string(),
            profile,
            officers: group_officers(&officers.items),
            filings: filings.items,
        })
    }

    /// Poll until the update receiver or either watch sender is gone.
    pub async fn run(
        self,
        mut view_rx: watch::Receiver<View>,
        mut follows_rx: watch::Receiver<Vec<String>>,
        tx: mpsc::UnboundedSender<Update>,
    ) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = view_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = follows_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }

            let view = view_rx.borrow_and_update().clone();
            let follows = follows_rx.borrow_and_update().clone();
            let update = self.snapshot(&view, &follows).await;

            if tx.send(update).is_err() {
                break;
            }
        }

        tracing::debug!("poller stopped");
    }
}

fn failed(view: &View, message: &str) -> Update {
    Update::Failed {
        view: view.clone(),
        message: message.to_string(),
    }
}
