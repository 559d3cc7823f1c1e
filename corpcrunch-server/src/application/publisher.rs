//! Promotion of scheduled posts whose publish date has arrived.

use crate::data::post_repository::PostRepository;
use crate::domain::DomainError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize)]
pub struct PublishedPost {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub publish_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepError {
    pub id: i64,
    pub slug: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub checked_at: DateTime<Utc>,
    pub published: Vec<PublishedPost>,
    /// Already promoted by someone else between query and update.
    pub skipped: Vec<i64>,
    pub errors: Vec<SweepError>,
}

pub struct ScheduledPublisher {
    post_repo: Arc<dyn PostRepository + Send + Sync>,
    running: Mutex<()>,
}

impl ScheduledPublisher {
    pub fn new(post_repo: Arc<dyn PostRepository + Send + Sync>) -> Self {
        Self {
            post_repo,
            running: Mutex::new(()),
        }
    }

    /// Publishes every due post one by one. A failing post is reported and
    /// the sweep moves on to the next one.
    pub async fn run_sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, DomainError> {
        let _guard = self
            .running
            .try_lock()
            .map_err(|_| DomainError::SweepInProgress)?;

        let due = self.post_repo.find_due_scheduled(now).await?;
        tracing::info!(due = due.len(), "Starting scheduled publish sweep");

        let mut report = SweepReport {
            checked_at: now,
            published: Vec::new(),
            skipped: Vec::new(),
            errors: Vec::new(),
        };

        for post in due {
            match self.post_repo.mark_published(post.id).await {
                Ok(true) => {
                    tracing::info!(post_id = post.id, slug = %post.slug, "Scheduled post published");
                    report.published.push(PublishedPost {
                        id: post.id,
                        slug: post.slug,
                        title: post.title,
                        publish_date: post.publish_date,
                    });
                }
                Ok(false) => {
                    tracing::debug!(post_id = post.id, "Post no longer scheduled, skipping");
                    report.skipped.push(post.id);
                }
                Err(e) => {
                    tracing::error!(post_id = post.id, error = %e, "Failed to publish scheduled post");
                    report.errors.push(SweepError {
                        id: post.id,
                        slug: post.slug,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            published = report.published.len(),
            skipped = report.skipped.len(),
            errors = report.errors.len(),
            "Scheduled publish sweep finished"
        );

        Ok(report)
    }
}

/// Runs the sweep forever on a fixed interval. Used only when the
/// deployment has no external timer hitting the cron endpoint.
pub async fn start_publish_ticker(publisher: Arc<ScheduledPublisher>, interval: Duration) {
    tracing::info!(
        "Starting in-process publish ticker (interval={}s)",
        interval.as_secs()
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        match publisher.run_sweep(Utc::now()).await {
            Ok(_) => {}
            Err(DomainError::SweepInProgress) => {
                tracing::debug!("Previous sweep still running, tick skipped");
            }
            Err(e) => tracing::error!(error = %e, "Scheduled publish sweep failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::{published_post, InMemoryPostRepository};
    use crate::domain::{Post, PublishStatus};
    use chrono::Duration as ChronoDuration;

    fn scheduled(id: i64, publish_date: DateTime<Utc>) -> Post {
        let mut p = published_post(id, &format!("scheduled-{id}"));
        p.publish_status = PublishStatus::Scheduled;
        p.publish_date = Some(publish_date);
        p
    }

    #[tokio::test]
    async fn due_posts_are_published_and_future_posts_untouched() {
        let now = Utc::now();
        let repo = Arc::new(InMemoryPostRepository::with_posts(vec![
            scheduled(1, now - ChronoDuration::minutes(10)),
            scheduled(2, now),
            scheduled(3, now + ChronoDuration::hours(1)),
        ]));
        let publisher = ScheduledPublisher::new(repo.clone());

        let report = publisher.run_sweep(now).await.unwrap();

        let published: Vec<i64> = report.published.iter().map(|p| p.id).collect();
        assert_eq!(published, vec![1, 2]);
        assert!(report.errors.is_empty());
        assert_eq!(repo.snapshot(1).unwrap().publish_status, PublishStatus::Published);
        assert_eq!(repo.snapshot(2).unwrap().publish_status, PublishStatus::Published);
        assert_eq!(repo.snapshot(3).unwrap().publish_status, PublishStatus::Scheduled);
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_sweep() {
        let now = Utc::now();
        let repo = Arc::new(InMemoryPostRepository::with_posts(vec![
            scheduled(1, now - ChronoDuration::minutes(3)),
            scheduled(2, now - ChronoDuration::minutes(2)),
            scheduled(3, now - ChronoDuration::minutes(1)),
        ]));
        repo.fail_on(2);
        let publisher = ScheduledPublisher::new(repo.clone());

        let report = publisher.run_sweep(now).await.unwrap();

        let published: Vec<i64> = report.published.iter().map(|p| p.id).collect();
        assert_eq!(published, vec![1, 3]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].id, 2);
        assert_eq!(repo.snapshot(2).unwrap().publish_status, PublishStatus::Scheduled);
    }

    #[tokio::test]
    async fn second_sweep_finds_nothing() {
        let now = Utc::now();
        let repo = Arc::new(InMemoryPostRepository::with_posts(vec![scheduled(
            1,
            now - ChronoDuration::minutes(1),
        )]));
        let publisher = ScheduledPublisher::new(repo);

        assert_eq!(publisher.run_sweep(now).await.unwrap().published.len(), 1);
        let again = publisher.run_sweep(now).await.unwrap();
        assert!(again.published.is_empty());
        assert!(again.errors.is_empty());
    }

    #[tokio::test]
    async fn overlapping_sweep_is_rejected() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let publisher = ScheduledPublisher::new(repo);

        let _held = publisher.running.lock().await;
        let result = publisher.run_sweep(Utc::now()).await;
        assert!(matches!(result, Err(DomainError::SweepInProgress)));
    }
}
