//! Pipeline orchestration
//!
//! One webhook delivery runs classify → resolve → enrich → render → send to
//! completion. The webhook answer is always carried in the outcome body;
//! processing failures are logged, never surfaced as HTTP errors.

use crate::classifier::{self, DropReason};
use crate::enricher::{self, EventEnricher};
use crate::error::Result;
use crate::renderer;
use crate::resolver;
use chrono::{DateTime, Utc};
use fleetwatch_core::{ClassifiedEvent, Subscription};
use fleetwatch_db::Database;
use fleetwatch_fleet::{FleetApi, RoadSpeedLookup};
use fleetwatch_notify::{InlineButton, Notifier};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Body of the webhook response; the HTTP status is always 200
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookOutcome {
    pub status: &'static str,
    pub message: String,
}

impl WebhookOutcome {
    fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

/// The webhook-to-chat notification pipeline
pub struct NotificationPipeline {
    db: Arc<Database>,
    fleet: Arc<dyn FleetApi>,
    notifier: Arc<dyn Notifier>,
    enricher: EventEnricher,
}

impl NotificationPipeline {
    pub fn new(
        db: Arc<Database>,
        fleet: Arc<dyn FleetApi>,
        roads: Arc<dyn RoadSpeedLookup>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let enricher = EventEnricher::new(db.clone(), fleet.clone(), roads);
        Self {
            db,
            fleet,
            notifier,
            enricher,
        }
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn fleet(&self) -> &Arc<dyn FleetApi> {
        &self.fleet
    }

    /// Process one inbound webhook payload
    pub async fn handle_webhook(&self, payload: &Value) -> WebhookOutcome {
        let event = match classifier::classify(payload) {
            Ok(event) => event,
            Err(DropReason::MissingConditions) => {
                warn!("Dropping webhook payload: no conditions");
                return WebhookOutcome::error("No conditions in payload");
            }
            Err(reason) => {
                warn!("Dropping webhook payload: {}", reason);
                return WebhookOutcome::error("Invalid payload data");
            }
        };

        info!(
            "Classified {} event for vehicle {} ({})",
            event.raw_event_type, event.vehicle_id, event.category
        );

        match self.process(&event).await {
            Ok(sent) => info!("Delivered {} notification(s) for {}", sent, event.raw_event_type),
            Err(e) => error!("Failed to process {} event: {}", event.raw_event_type, e),
        }

        WebhookOutcome::success("Webhook processed")
    }

    /// Resolve, enrich, render, and deliver. Returns the number of sends.
    async fn process(&self, event: &ClassifiedEvent) -> Result<usize> {
        let recipients = resolver::resolve(&self.db, event).await?;
        if recipients.is_empty() {
            info!(
                "No subscribers for vehicle {} event {}",
                event.vehicle_id, event.raw_event_type
            );
            return Ok(0);
        }

        let enrichment = self.enricher.enrich(event).await?;
        if enricher::requires_enrichment(event) && enrichment.is_none() {
            warn!(
                "Enrichment unavailable for {} event, suppressing delivery",
                event.raw_event_type
            );
            return Ok(0);
        }

        let mut sent = 0;
        for recipient in recipients {
            let rendered = renderer::render(event, enrichment.as_ref(), &recipient.truck_name);
            let button = rendered
                .button_url
                .as_deref()
                .map(|url| InlineButton::new("Incident Details", url));

            let delivery = match rendered.video_url.as_deref() {
                Some(video_url) => {
                    self.notifier
                        .send_video(recipient.chat_id, video_url, &rendered.text, button.as_ref())
                        .await
                }
                None => {
                    self.notifier
                        .send_text(recipient.chat_id, &rendered.text, button.as_ref())
                        .await
                }
            };

            match delivery {
                Ok(()) => sent += 1,
                Err(e) => warn!("Send to chat {} failed: {}", recipient.chat_id, e),
            }
        }

        Ok(sent)
    }

    /// One pass of the timer sweep: send a status message for every due
    /// Timer subscription and mark it sent. Per-subscription failures are
    /// logged and skipped.
    pub async fn sweep_timers(&self, now: DateTime<Utc>) -> Result<usize> {
        let due = self.db.subscriptions().find_timer_due(now).await?;
        let mut sent = 0;

        for sub in due {
            match self.send_timer_status(&sub, now).await {
                Ok(()) => sent += 1,
                Err(e) => warn!("Timer status for subscription {} failed: {}", sub.id, e),
            }
        }

        Ok(sent)
    }

    async fn send_timer_status(&self, sub: &Subscription, now: DateTime<Utc>) -> Result<()> {
        let truck = self.db.trucks().get_by_vehicle_id(sub.truck_id).await?;
        let Some(truck) = truck else {
            warn!("Timer subscription {} references unknown vehicle {}", sub.id, sub.truck_id);
            self.db.subscriptions().mark_sent(sub.id, now).await?;
            return Ok(());
        };

        let Some(api_key) = self.db.trucks().api_key_for_vehicle(sub.truck_id).await? else {
            warn!("No tenant API key for vehicle {}", sub.truck_id);
            self.db.subscriptions().mark_sent(sub.id, now).await?;
            return Ok(());
        };

        let engine_state = self.fleet.get_engine_state(&api_key, sub.truck_id).await?;
        let fuel_percent = self.fleet.get_fuel_percent(&api_key, sub.truck_id).await?;

        let text = renderer::render_timer_status(&truck.name, engine_state.as_deref(), fuel_percent);
        self.notifier.send_text(sub.chat_id, &text, None).await?;
        self.db.subscriptions().mark_sent(sub.id, now).await?;
        Ok(())
    }

    /// One pass of the roster sync: reconcile every company's trucks against
    /// the provider's vehicle list. Per-company failures are logged and
    /// skipped.
    pub async fn sync_rosters(&self) -> Result<usize> {
        let companies = self.db.companies().get_all().await?;
        let mut synced = 0;

        for company in companies {
            let roster = match self.fleet.get_vehicle_list(&company.api_key).await {
                Ok(roster) => roster,
                Err(e) => {
                    warn!("Roster fetch for company {} failed: {}", company.name, e);
                    continue;
                }
            };

            let provider_trucks: Vec<fleetwatch_db::ProviderTruck> = roster
                .into_iter()
                .map(|v| fleetwatch_db::ProviderTruck {
                    vehicle_id: v.id,
                    name: v.name,
                })
                .collect();

            match self.db.trucks().reconcile(company.id, &provider_trucks).await {
                Ok(summary) if summary.is_noop() => {}
                Ok(summary) => info!(
                    "Roster for {}: {} inserted, {} renamed, {} deleted",
                    company.name, summary.inserted, summary.renamed, summary.deleted
                ),
                Err(e) => {
                    warn!("Roster reconcile for company {} failed: {}", company.name, e);
                    continue;
                }
            }
            synced += 1;
        }

        Ok(synced)
    }
}
