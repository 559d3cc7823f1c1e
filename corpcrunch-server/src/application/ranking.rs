//! Read-time ranking of published posts.
//!
//! Scores are never stored: every request recomputes them from the
//! current counters, so a post climbs the trending list as soon as its
//! views or shares change.

use crate::domain::post::PostResponse;
use crate::domain::{ContentType, Post};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Length of every ranked list on a category page.
pub const CATEGORY_LIST_LIMIT: usize = 50;

/// Size of each content-type bucket in the trending overview.
pub const BUCKET_LIMIT: usize = 5;

/// Posts younger than this get their views doubled.
pub const RECENCY_WINDOW_DAYS: i64 = 30;

const RECENT_VIEW_MULTIPLIER: i64 = 2;
const SHARE_WEIGHT: i64 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct RankedPost {
    pub score: i64,
    #[serde(flatten)]
    pub post: PostResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRanking {
    pub trending: Vec<RankedPost>,
    pub most_viewed: Vec<RankedPost>,
    pub newest: Vec<RankedPost>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TrendingBuckets {
    pub news: Vec<RankedPost>,
    pub articles: Vec<RankedPost>,
    pub stories: Vec<RankedPost>,
    pub videos: Vec<RankedPost>,
}

pub fn is_recent(post: &Post, now: DateTime<Utc>) -> bool {
    now - post.recency_date() < Duration::days(RECENCY_WINDOW_DAYS)
}

pub fn trending_score(post: &Post, now: DateTime<Utc>) -> i64 {
    let multiplier = if is_recent(post, now) {
        RECENT_VIEW_MULTIPLIER
    } else {
        1
    };

    post.views_count
        .saturating_mul(multiplier)
        .saturating_add(post.shares_count.saturating_mul(SHARE_WEIGHT))
}

fn scored(posts: &[Post], now: DateTime<Utc>) -> Vec<(i64, &Post)> {
    posts
        .iter()
        .filter(|p| p.is_publicly_visible())
        .map(|p| (trending_score(p, now), p))
        .collect()
}

fn into_ranked(entries: Vec<(i64, &Post)>, limit: usize) -> Vec<RankedPost> {
    entries
        .into_iter()
        .take(limit)
        .map(|(score, post)| RankedPost {
            score,
            post: PostResponse::from(post.clone()),
        })
        .collect()
}

/// Builds the three category-page lists. Sorting is stable, so equal keys
/// keep the order the posts were passed in.
pub fn rank_category(posts: &[Post], now: DateTime<Utc>) -> CategoryRanking {
    let base = scored(posts, now);

    let mut trending = base.clone();
    trending.sort_by(|a, b| b.0.cmp(&a.0));

    let mut most_viewed = base.clone();
    most_viewed.sort_by(|a, b| b.1.views_count.cmp(&a.1.views_count));

    let mut newest = base;
    newest.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at));

    CategoryRanking {
        trending: into_ranked(trending, CATEGORY_LIST_LIMIT),
        most_viewed: into_ranked(most_viewed, CATEGORY_LIST_LIMIT),
        newest: into_ranked(newest, CATEGORY_LIST_LIMIT),
    }
}

/// Site-wide trending overview split by content type.
///
/// `news` is the overall top list; `articles`, `stories` and `videos` hold
/// article, magazine and video posts respectively.
pub fn trending_buckets(posts: &[Post], now: DateTime<Utc>, per_bucket: usize) -> TrendingBuckets {
    let mut trending = scored(posts, now);
    trending.sort_by(|a, b| b.0.cmp(&a.0));

    let of_type = |content_type: ContentType| {
        let entries = trending
            .iter()
            .filter(|(_, p)| p.content_type == content_type)
            .copied()
            .collect();
        into_ranked(entries, per_bucket)
    };

    TrendingBuckets {
        articles: of_type(ContentType::Article),
        stories: of_type(ContentType::Magazine),
        videos: of_type(ContentType::Video),
        news: into_ranked(trending.clone(), per_bucket),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::published_post;
    use crate::domain::{PublishStatus, Visibility};

    fn post(id: i64, views: i64, shares: i64, age_days: i64, now: DateTime<Utc>) -> Post {
        let mut p = published_post(id, &format!("post-{id}"));
        p.views_count = views;
        p.shares_count = shares;
        p.created_at = now - Duration::days(age_days);
        p.publish_date = Some(p.created_at);
        p
    }

    fn ids(list: &[RankedPost]) -> Vec<i64> {
        list.iter().map(|r| r.post.id).collect()
    }

    #[test]
    fn recent_posts_get_double_view_weight() {
        let now = Utc::now();
        let recent = post(1, 10, 3, 2, now);
        let old = post(2, 10, 3, 45, now);

        assert_eq!(trending_score(&recent, now), 23);
        assert_eq!(trending_score(&old, now), 13);
    }

    #[test]
    fn recent_score_is_at_least_twice_the_views() {
        let now = Utc::now();
        for (views, shares) in [(0, 0), (1, 0), (7, 9), (1_000, 0)] {
            let p = post(1, views, shares, 1, now);
            assert!(trending_score(&p, now) >= views * 2);
        }
    }

    #[test]
    fn recency_uses_publish_date_before_created_at() {
        let now = Utc::now();
        let mut p = post(1, 5, 0, 90, now);
        p.publish_date = Some(now - Duration::days(1));
        assert!(is_recent(&p, now));
    }

    #[test]
    fn category_lists_are_ordered() {
        let now = Utc::now();
        let posts = vec![
            post(1, 100, 0, 60, now),
            post(2, 40, 5, 1, now),
            post(3, 90, 0, 10, now),
        ];

        let ranking = rank_category(&posts, now);

        // scores: 1 -> 100, 2 -> 85, 3 -> 180
        assert_eq!(ids(&ranking.trending), vec![3, 1, 2]);
        assert_eq!(ids(&ranking.most_viewed), vec![1, 3, 2]);
        assert_eq!(ids(&ranking.newest), vec![2, 3, 1]);

        for pair in ranking.most_viewed.windows(2) {
            assert!(pair[0].post.views_count >= pair[1].post.views_count);
        }
    }

    #[test]
    fn ties_keep_input_order() {
        let now = Utc::now();
        let posts = vec![post(7, 10, 0, 1, now), post(3, 10, 0, 1, now), post(5, 10, 0, 1, now)];

        let ranking = rank_category(&posts, now);
        assert_eq!(ids(&ranking.trending), vec![7, 3, 5]);
        assert_eq!(ids(&ranking.most_viewed), vec![7, 3, 5]);
    }

    #[test]
    fn hidden_posts_are_never_ranked() {
        let now = Utc::now();
        let mut members_only = post(1, 1_000, 0, 1, now);
        members_only.visibility = Visibility::MembersOnly;
        let mut draft = post(2, 1_000, 0, 1, now);
        draft.publish_status = PublishStatus::Draft;
        let visible = post(3, 1, 0, 1, now);

        let ranking = rank_category(&[members_only, draft, visible], now);
        assert_eq!(ids(&ranking.trending), vec![3]);
    }

    #[test]
    fn lists_are_capped() {
        let now = Utc::now();
        let posts: Vec<Post> = (1..=80).map(|i| post(i, i, 0, 1, now)).collect();

        let ranking = rank_category(&posts, now);
        assert_eq!(ranking.trending.len(), CATEGORY_LIST_LIMIT);
        assert_eq!(ranking.most_viewed.len(), CATEGORY_LIST_LIMIT);
        assert_eq!(ranking.newest.len(), CATEGORY_LIST_LIMIT);
        assert_eq!(ranking.trending[0].post.id, 80);
    }

    #[test]
    fn buckets_split_by_content_type() {
        let now = Utc::now();
        let mut posts: Vec<Post> = (1..=12).map(|i| post(i, i * 10, 0, 1, now)).collect();
        for p in posts.iter_mut() {
            p.content_type = match p.id % 3 {
                0 => ContentType::Video,
                1 => ContentType::Magazine,
                _ => ContentType::Article,
            };
        }

        let buckets = trending_buckets(&posts, now, BUCKET_LIMIT);
        assert_eq!(ids(&buckets.news), vec![12, 11, 10, 9, 8]);
        assert_eq!(ids(&buckets.videos), vec![12, 9, 6, 3]);
        assert_eq!(ids(&buckets.stories), vec![10, 7, 4, 1]);
        assert_eq!(ids(&buckets.articles), vec![11, 8, 5, 2]);
    }
}
